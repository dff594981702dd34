//! Configuration file handling for gatebundle
//!
//! This module contains data structures for:
//! - `gatebundle.yaml` - Installer configuration
//! - the mapping-override file named by `mapping:` or `--mapping`

pub mod installer;
pub mod mapping;

// Re-export commonly used types
pub use installer::InstallerConfig;
pub use mapping::load_mapping;
