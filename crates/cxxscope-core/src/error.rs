//! Fatal-error taxonomy.
//!
//! Not-found and ambiguous are *data*, not errors: a query simply returns
//! an empty or multi-element [`crate::symtab::SymbolList`]. Only two
//! situations are fatal — a node kind the engine does not recognize where
//! one was demanded, and a template solve with no unique most-specialized
//! candidate — and those become a `CoreError`. Modeling them as a `Result`
//! rather than a process abort keeps the core reentrant for test harnesses
//! that compile multiple translation units in one process.

use cxxscope_common::Span;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::AstKind;
use crate::ids::SymbolId;

#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    #[error("internal error: unexpected AST node kind {kind:?} where an id-expression was required")]
    #[diagnostic(code(cxxscope::malformed_ast))]
    MalformedAst {
        kind: AstKind,
        #[label("here")]
        at: Option<SourceSpan>,
    },

    #[error("internal error: template solve has no unique most-specialized candidate")]
    #[diagnostic(code(cxxscope::template_selection_failure))]
    TemplateSelectionFailure {
        template: SymbolId,
        #[label("instantiated here")]
        at: Option<SourceSpan>,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;

fn to_source_span(span: Option<Span>) -> Option<SourceSpan> {
    span.map(|s| SourceSpan::new((s.start as usize).into(), s.len() as usize))
}

impl CoreError {
    pub fn malformed_ast(kind: AstKind, at: Option<Span>) -> Self {
        CoreError::MalformedAst {
            kind,
            at: to_source_span(at),
        }
    }

    pub fn template_selection_failure(template: SymbolId, at: Option<Span>) -> Self {
        CoreError::TemplateSelectionFailure {
            template,
            at: to_source_span(at),
        }
    }
}
