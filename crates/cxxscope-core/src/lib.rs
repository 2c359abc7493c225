mod ast;
mod context;
mod error;
mod ids;
mod lookup;
mod scope;
mod symtab;
mod template;
mod types;

pub use ast::{AstKind, AstNode};
#[cfg(feature = "tree-sitter")]
pub use ast::TsNode;
pub use context::CompilationContext;
pub use error::{CoreError, CoreResult};
pub use ids::{ScopeId, SymbolId, TypeId};
pub use lookup::{
    filter_by_kind, filter_by_non_kind, filter_simple_type_specifier, filter_symbol_kind_set,
    filter_symbol_non_kind_set, identifier_chain, query_id_expression, query_nested_name,
    query_unqualified, without_debugging_scopes, LookupFlags, NameIntern, QualifierStep,
    SymbolList,
};
pub use scope::{Scope, ScopeKind};
pub use symtab::{
    debugging_scope_name, DeclState, Linkage, Symbol, SymbolKind, TemplateParameter,
    TemplateParameterKind,
};
pub use template::{solve as solve_template, TemplateArgument};
pub use types::{
    AccessSpecifier, ArraySize, BaseClassInfo, BuiltinKind, BuiltinModifiers, ClassInfo,
    ClassKind, ConversionFunctionInfo, CvQualifier, EnumInfo, ExceptionSpec, FunctionFlags,
    Parameter, SimpleType, SimpleTypeKind, TypeNode, Types,
};
