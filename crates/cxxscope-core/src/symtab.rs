//! The symbol table: symbol kinds, declaration state and per-bucket
//! ordering. The mutating operations (`insert`/`new_symbol`/`lookup_local`)
//! live on `Scope` in `scope.rs`, since a bucket belongs to a scope; this
//! module only owns the entry's own shape.

use cxxscope_common::Symbol as Name;
use smol_str::SmolStr;

use crate::ids::{ScopeId, TypeId};
use crate::types::ClassInfo;

/// The closed set of entities a name can denote.
///
/// Buckets are heterogeneous on purpose — a class and its constructor
/// share a name, a struct tag and an object name can coexist — so callers
/// filter by kind rather than the table enforcing one kind per name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Enum,
    Enumerator,
    Function,
    Label,
    Namespace,
    Variable,
    Typedef,
    TemplatePrimaryClass,
    TemplateSpecializedClass,
    TemplateFunction,
    NonTypeTemplateParameter,
    TypeTemplateParameter,
    TemplateTemplateParameter,
    /// Inserted for every block scope under a generated name, for dumping
    /// only — never a target of user-visible lookup.
    DebuggingScope,
    GccBuiltinType,
    /// A name whose meaning cannot be resolved until template parameters
    /// are bound.
    DependentEntity,
}

/// How far along a declaration's visibility lifecycle has progressed.
/// Ordered: a symbol queryable as `Defined` is also queryable wherever
/// `Complete` or `ForwardDeclared` would suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclState {
    ForwardDeclared,
    Complete,
    Defined,
}

/// `extern "C"` and friends; `None` means ordinary internal/default linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    C,
    Cxx,
}

/// One template parameter of a template declaration.
#[derive(Debug, Clone)]
pub enum TemplateParameterKind {
    Type,
    NonType(TypeId),
    Template,
}

/// A template parameter, generic over the AST handle so a non-type
/// parameter's default-value expression (or a type parameter's
/// default-type expression) can be carried without the core needing to
/// interpret it.
#[derive(Debug, Clone)]
pub struct TemplateParameter<N> {
    pub name: Name,
    pub kind: TemplateParameterKind,
    pub default: Option<N>,
}

/// One entry in a scope's symbol table.
///
/// Generic in `N` purely to hold an optional initializer/default-expression
/// AST handle; everything else about a symbol is concrete.
#[derive(Debug, Clone)]
pub struct Symbol<N> {
    pub name: Name,
    pub kind: SymbolKind,
    pub state: DeclState,
    /// Incremented on each definition seen for this name; used by callers
    /// doing one-definition-rule diagnostics. The core itself never
    /// rejects a redefinition — that policy belongs to the driver.
    pub defined_count: u32,
    pub declaring_scope: ScopeId,
    /// `None` until declaration processing has built the type.
    pub ty: Option<TypeId>,
    /// Namespaces, classes and functions own an inner scope.
    pub related_scope: Option<ScopeId>,
    pub initializer: Option<N>,
    pub template_parameters: Vec<TemplateParameter<N>>,
    /// For a `TemplateSpecializedClass`, the argument pattern it was
    /// specialized with (what the solver unifies against). Empty for
    /// every other kind.
    pub specialization_pattern: Vec<crate::template::TemplateArgument<N>>,
    pub linkage: Option<Linkage>,
    /// Populated once declaration processing completes a `Class`/
    /// `TemplatePrimaryClass`/`TemplateSpecializedClass` symbol: its kind,
    /// destructor/constructor/operator/conversion lists and bases.
    /// `None` for every non-class kind, and for a class still only
    /// forward-declared.
    pub class_info: Option<ClassInfo>,
}

impl<N> Symbol<N> {
    /// A bare, forward-declared symbol with no type yet — what
    /// `new_symbol` installs before declaration processing fills in the
    /// rest.
    pub fn uninitialized(name: Name, kind: SymbolKind, declaring_scope: ScopeId) -> Self {
        Symbol {
            name,
            kind,
            state: DeclState::ForwardDeclared,
            defined_count: 0,
            declaring_scope,
            ty: None,
            related_scope: None,
            initializer: None,
            template_parameters: Vec::new(),
            specialization_pattern: Vec::new(),
            linkage: None,
            class_info: None,
        }
    }

    pub fn is_queryable(&self) -> bool {
        // Every state is queryable; this exists so callers have a single
        // place to express "I need at least Complete" via `>=`.
        true
    }
}

/// Synthesizes the generated, non-user-visible name a block scope's
/// debugging symbol is inserted under.
pub fn debugging_scope_name(scope: ScopeId) -> SmolStr {
    SmolStr::new(format!("(block scope #{})", scope.as_u32()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_state_orders_forward_before_complete_before_defined() {
        assert!(DeclState::ForwardDeclared < DeclState::Complete);
        assert!(DeclState::Complete < DeclState::Defined);
    }

    #[test]
    fn debugging_scope_name_embeds_the_scope_id() {
        let name = debugging_scope_name(ScopeId::from_raw(42));
        assert_eq!(name.as_str(), "(block scope #42)");
    }

    #[test]
    fn uninitialized_symbol_has_no_type_and_is_forward_declared() {
        let interner = cxxscope_common::SymbolInterner::new();
        let name = interner.intern("x");
        let sym: Symbol<()> = Symbol::uninitialized(name, SymbolKind::Variable, ScopeId::from_raw(0));
        assert_eq!(sym.state, DeclState::ForwardDeclared);
        assert!(sym.ty.is_none());
    }
}
