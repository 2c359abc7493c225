mod diagnostic;
mod source;
mod span;
mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use source::{Language, SourceFile, SourceId, SourceMap};
pub use span::{Span, Spanned};
pub use symbol::{Symbol, SymbolInterner};
