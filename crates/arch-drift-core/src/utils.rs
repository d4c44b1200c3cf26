//! Utility functions shared by the collector, extractors, and checker.

pub mod paths;
pub mod source;

#[doc(inline)]
pub use paths::{module_name, normalize_path, normalize_separators};
#[doc(inline)]
pub use source::read_source;
