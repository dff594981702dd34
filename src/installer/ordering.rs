//! Dependency-first ordering of members within one category
//!
//! Policies include sibling policies and encapsulated assertions invoke
//! sibling assertions, so a member has to be installed after everything it
//! references. Members are sorted with a depth-first search using
//! three-color marking:
//!
//! 1. **WHITE** (unvisited): not processed yet
//! 2. **GRAY** (on the current path): reaching it again means a cycle
//! 3. **BLACK** (done): already placed in the output
//!
//! Members are visited in declared order, so independent members keep their
//! relative order.

use crate::domain::EntityCategory;
use crate::error::{self, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

struct Walk<'a> {
    names: &'a [String],
    deps: &'a [Vec<usize>],
    marks: Vec<Mark>,
    path: Vec<usize>,
    order: Vec<usize>,
}

/// Indices of `names` with every member after its dependencies
///
/// `deps[i]` lists the indices member `i` references. Self references and
/// out-of-range indices are ignored.
///
/// # Errors
///
/// Returns a circular-reference error naming the cycle.
pub(crate) fn dependency_order(
    category: EntityCategory,
    names: &[String],
    deps: &[Vec<usize>],
) -> Result<Vec<usize>> {
    let mut walk = Walk {
        names,
        deps,
        marks: vec![Mark::White; names.len()],
        path: Vec::new(),
        order: Vec::with_capacity(names.len()),
    };

    for node in 0..names.len() {
        if walk.marks[node] == Mark::White {
            visit(&mut walk, category, node)?;
        }
    }
    Ok(walk.order)
}

fn visit(walk: &mut Walk<'_>, category: EntityCategory, node: usize) -> Result<()> {
    match walk.marks[node] {
        Mark::Black => return Ok(()),
        Mark::Gray => {
            let start = walk.path.iter().position(|&n| n == node).unwrap_or(0);
            let chain: Vec<&str> = walk.path[start..]
                .iter()
                .chain(std::iter::once(&node))
                .map(|&n| walk.names[n].as_str())
                .collect();
            return Err(error::bundle::circular(category.plural(), chain.join(" -> ")));
        }
        Mark::White => {}
    }

    walk.marks[node] = Mark::Gray;
    walk.path.push(node);

    let deps = walk.deps.get(node).cloned().unwrap_or_default();
    for dep in deps {
        if dep != node && dep < walk.names.len() {
            visit(walk, category, dep)?;
        }
    }

    walk.path.pop();
    walk.marks[node] = Mark::Black;
    walk.order.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_independent_members_keep_declared_order() {
        let order =
            dependency_order(EntityCategory::Policy, &names(&["a", "b", "c"]), &[vec![], vec![], vec![]])
                .unwrap();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_dependencies_come_first() {
        // a -> c, b -> a
        let order = dependency_order(
            EntityCategory::Policy,
            &names(&["a", "b", "c"]),
            &[vec![2], vec![0], vec![]],
        )
        .unwrap();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let order =
            dependency_order(EntityCategory::Policy, &names(&["a"]), &[vec![0]]).unwrap();
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn test_cycle_is_reported_with_chain() {
        let err = dependency_order(
            EntityCategory::EncapsulatedAssertion,
            &names(&["a", "b", "c"]),
            &[vec![1], vec![2], vec![0]],
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("a -> b -> c -> a"), "{message}");
        assert!(message.contains("encapsulated assertions"), "{message}");
    }
}
