//! Scopes and the graph they form.
//!
//! Construction (`new_namespace_scope`, `new_block_scope`, ...) lives on
//! `CompilationContext` in `context.rs`, since creating a block scope also
//! has to insert a debugging symbol into its enclosing scope's table —
//! that needs the symbol arena, not just the scope arena. This module owns
//! the `Scope` shape itself and the bucket operations that only touch one
//! scope's own table.

use cxxscope_common::Symbol as Name;
use indexmap::IndexMap;

use crate::ids::ScopeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Namespace,
    Prototype,
    Block,
    Function,
    Class,
    Template,
}

/// A name's bucket within one scope: every symbol ever inserted under that
/// name, most-recent first.
#[derive(Debug, Clone, Default)]
pub struct Bucket(Vec<u32>);

impl Bucket {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// One node of the scope graph.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    table: IndexMap<Name, Bucket>,
    pub enclosing: Option<ScopeId>,
    /// Namespaces recorded via a `using`-directive. Duplicates are kept;
    /// the lookup engine is responsible for deduplicating the symbols it
    /// finds through them, not this list.
    pub used_namespaces: Vec<ScopeId>,
    /// Only populated for `Class` scopes.
    pub base_scopes: Vec<ScopeId>,
    /// For `Block` scopes: the enclosing function's parameter scope.
    pub prototype_scope: Option<ScopeId>,
    /// For `Block` scopes: the enclosing function scope, where labels
    /// live.
    pub function_scope: Option<ScopeId>,
    /// Inherited from the enclosing scope at construction time so template
    /// parameters stay visible inside the body that uses them.
    pub template_scope: Option<ScopeId>,
}

impl Scope {
    pub fn new(kind: ScopeKind, enclosing: Option<ScopeId>) -> Self {
        Scope {
            kind,
            table: IndexMap::new(),
            enclosing,
            used_namespaces: Vec::new(),
            base_scopes: Vec::new(),
            prototype_scope: None,
            function_scope: None,
            template_scope: None,
        }
    }

    /// Appends `symbol` to the bucket for `name`, keeping the bucket
    /// most-recent-first.
    pub fn insert(&mut self, name: Name, symbol_raw: u32) {
        self.table.entry(name).or_default().0.insert(0, symbol_raw);
    }

    /// Returns the bucket for `name` as stored, without traversing
    /// `enclosing` or `used_namespaces`.
    pub fn lookup_local(&self, name: Name) -> &[u32] {
        self.table.get(&name).map(Bucket::as_slice).unwrap_or(&[])
    }

    /// Records a `using`-directive. Permits duplicates: the lookup engine
    /// deduplicates the symbols it finds, not this list.
    pub fn add_using_directive(&mut self, namespace: ScopeId) {
        self.used_namespaces.push(namespace);
    }

    pub fn add_base_scope(&mut self, base: ScopeId) {
        self.base_scopes.push(base);
    }

    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.table.keys().copied()
    }
}
