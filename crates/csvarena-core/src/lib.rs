pub mod arena;
pub mod config;
pub mod diagnostics;
pub mod display;
pub mod edit;
pub mod error;
pub mod index;
pub mod infer;
pub mod io;
pub mod parser;
pub mod span;
pub mod stats;
pub mod table;
pub mod value;

pub use arena::{AllocError, Arena, ALIGNMENT, REGION_DEFAULT_CAPACITY};
pub use config::{ConfigOverrides, ParserConfig, RaggedRowPolicy};
pub use diagnostics::{
    CollectingDiagnosticHandler, Diagnostic, DiagnosticHandler, DiagnosticLevel,
    TracingDiagnosticHandler,
};
pub use error::{CsvError, Result};
pub use index::ColumnIndex;
pub use infer::ColumnType;
pub use parser::CsvParser;
pub use span::TextSpan;
pub use stats::ColumnSummary;
pub use table::{Column, ColumnSchema, Row, Table, TableSchema};
pub use value::CellValue;
