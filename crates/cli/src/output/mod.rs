mod format;
mod model;
mod result_builder;

pub use format::OutputFormat;
pub use model::{CommandError, CommandResult, Diagnostic, DiagnosticLevel, ErrorCode, SCHEMA_VERSION};
pub use result_builder::{RenderText, ResultBuilder, print_result};
