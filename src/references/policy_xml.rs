//! Reference scanning and rewriting for XML policy documents
//!
//! Reference values live in the `stringValue` attribute of a slot element,
//! recognised by its local name and the local name of its parent, e.g.
//!
//! ```xml
//! <L7p:Include>
//!     <L7p:PolicyGuid stringValue="506589b0-eba5-4b3f-81b5-be7809817623"/>
//! </L7p:Include>
//! ```
//!
//! Documents are streamed with quick-xml. Events that are not rewritten are
//! written back verbatim, and a document without any rewritten slot is
//! returned as the original string.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::{DocumentError, Reference, ReferenceRewriter, ReferenceScanner, ReferenceSlot, Rewrites};

const VALUE_ATTRIBUTE: &[u8] = b"stringValue";
const ENCAPSULATED: &str = "Encapsulated";

/// Scanner and rewriter for XML policy documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyXml;

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn string_value(element: &BytesStart<'_>) -> Result<Option<String>, DocumentError> {
    for attr in element.attributes() {
        let attr = attr.map_err(DocumentError::from_display)?;
        if attr.key.local_name().as_ref() == VALUE_ATTRIBUTE {
            let value = attr.unescape_value().map_err(DocumentError::from_display)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Slot and value of an element, if it is a reference slot
fn slot_value(
    stack: &[String],
    name: &str,
    element: &BytesStart<'_>,
) -> Result<Option<(ReferenceSlot, String)>, DocumentError> {
    let Some(slot) = stack
        .last()
        .and_then(|parent| ReferenceSlot::locate(parent, name))
    else {
        return Ok(None);
    };
    Ok(string_value(element)?.map(|value| (slot, value)))
}

/// Accumulates the GUID and name of the `Encapsulated` element being read
#[derive(Default)]
struct OpenEncapsulated {
    guid: Option<String>,
    name: Option<String>,
}

struct Scan {
    stack: Vec<String>,
    open: Option<OpenEncapsulated>,
    references: Vec<Reference>,
}

impl Scan {
    fn visit(&mut self, element: &BytesStart<'_>, name: &str) -> Result<(), DocumentError> {
        let Some((slot, value)) = slot_value(&self.stack, name, element)? else {
            return Ok(());
        };
        match slot {
            ReferenceSlot::PolicyGuid => {
                self.references.push(Reference::PolicyInclude { guid: value });
            }
            ReferenceSlot::ConnectionName => {
                self.references.push(Reference::JdbcConnection { name: value });
            }
            ReferenceSlot::EncapsulatedGuid => {
                if let Some(open) = self.open.as_mut() {
                    open.guid = Some(value);
                }
            }
            ReferenceSlot::EncapsulatedName => {
                if let Some(open) = self.open.as_mut() {
                    open.name = Some(value);
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.stack.pop().as_deref() != Some(ENCAPSULATED) {
            return;
        }
        if let Some(OpenEncapsulated { guid, name }) = self.open.take() {
            if guid.is_some() || name.is_some() {
                self.references
                    .push(Reference::EncapsulatedAssertion { guid, name });
            }
        }
    }
}

impl ReferenceScanner for PolicyXml {
    fn scan(&self, body: &str) -> Result<Vec<Reference>, DocumentError> {
        let mut reader = Reader::from_str(body);
        let mut scan = Scan {
            stack: Vec::new(),
            open: None,
            references: Vec::new(),
        };

        loop {
            match reader.read_event().map_err(DocumentError::from_display)? {
                Event::Start(e) => {
                    let name = local_name(&e);
                    scan.visit(&e, &name)?;
                    if name == ENCAPSULATED {
                        scan.open = Some(OpenEncapsulated::default());
                    }
                    scan.stack.push(name);
                }
                Event::Empty(e) => {
                    let name = local_name(&e);
                    scan.visit(&e, &name)?;
                }
                Event::End(_) => scan.close(),
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(scan.references)
    }
}

/// Copy of `element` with its `stringValue` replaced
fn with_value(element: &BytesStart<'_>, value: &str) -> Result<BytesStart<'static>, DocumentError> {
    let qname = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut rewritten = BytesStart::new(qname);
    for attr in element.attributes() {
        let attr = attr.map_err(DocumentError::from_display)?;
        if attr.key.local_name().as_ref() == VALUE_ATTRIBUTE {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            rewritten.push_attribute((key.as_str(), value));
        } else {
            rewritten.push_attribute(attr);
        }
    }
    Ok(rewritten)
}

fn replacement(
    stack: &[String],
    name: &str,
    element: &BytesStart<'_>,
    rewrites: &Rewrites,
) -> Result<Option<BytesStart<'static>>, DocumentError> {
    let Some((slot, value)) = slot_value(stack, name, element)? else {
        return Ok(None);
    };
    match rewrites.get(slot, &value) {
        Some(new_value) => with_value(element, new_value).map(Some),
        None => Ok(None),
    }
}

impl ReferenceRewriter for PolicyXml {
    fn rewrite(&self, body: &str, rewrites: &Rewrites) -> Result<String, DocumentError> {
        if rewrites.is_empty() {
            return Ok(body.to_string());
        }

        let mut reader = Reader::from_str(body);
        let mut writer = Writer::new(Vec::with_capacity(body.len()));
        let mut stack: Vec<String> = Vec::new();
        let mut changed = false;

        loop {
            let event = reader.read_event().map_err(DocumentError::from_display)?;
            let written = match event {
                Event::Start(e) => {
                    let name = local_name(&e);
                    let replaced = replacement(&stack, &name, &e, rewrites)?;
                    stack.push(name);
                    match replaced {
                        Some(new) => {
                            changed = true;
                            writer.write_event(Event::Start(new))
                        }
                        None => writer.write_event(Event::Start(e)),
                    }
                }
                Event::Empty(e) => {
                    let name = local_name(&e);
                    match replacement(&stack, &name, &e, rewrites)? {
                        Some(new) => {
                            changed = true;
                            writer.write_event(Event::Empty(new))
                        }
                        None => writer.write_event(Event::Empty(e)),
                    }
                }
                Event::End(e) => {
                    stack.pop();
                    writer.write_event(Event::End(e))
                }
                Event::Eof => break,
                other => writer.write_event(other),
            };
            written.map_err(DocumentError::from_display)?;
        }

        if !changed {
            return Ok(body.to_string());
        }
        String::from_utf8(writer.into_inner()).map_err(DocumentError::from_display)
    }
}
