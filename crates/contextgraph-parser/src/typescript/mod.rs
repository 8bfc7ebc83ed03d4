//! TypeScript syntax walkers built on tree-sitter.

pub mod decorators;
pub mod entities;
pub mod imports;
pub mod services;
pub mod utils;

pub use entities::extract_entities;
pub use imports::{extract_symbols, FileSymbols};
pub use services::extract_services;
