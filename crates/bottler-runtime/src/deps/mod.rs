//! Dependency Resolver.
//!
//! Static scans read the import table through the binary-dump tool; dynamic
//! scans run the program with module-load tracing. Both feed the component
//! table in `bottler-core`.

mod parse;
mod resolver;

pub use parse::{TraceSummary, classify_trace_line, parse_import_table, parse_trace};
pub use resolver::{DependencyResolver, TRACE_ENV};
