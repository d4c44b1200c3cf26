//! Heuristic extractors for TypeScript imports and Ruby database access.

pub mod ruby;
pub mod typescript;

pub use ruby::RubyDbAccess;
pub use typescript::TypeScriptImports;
