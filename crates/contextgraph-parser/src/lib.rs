//! Source Model Extractor: walks a TypeScript tree and produces entities,
//! services and per-file dependency records.

pub mod complexity;
pub mod conventions;
pub mod coverage;
pub mod extractor;
pub mod file_collect;
pub mod language;
pub mod resolve;
pub mod typescript;

pub use conventions::Conventions;
pub use coverage::CoverageReport;
pub use extractor::SourceModelExtractor;
pub use file_collect::collect_source_files;
pub use language::Dialect;
pub use resolve::ImportResolver;
