//! The per-translation-unit "god object": owns every arena, the global
//! namespace scope and the reentrancy-depth counter used for debug
//! tracing. Every operation in `lookup.rs` and `template.rs` takes a
//! `&CompilationContext<N>` (or `&mut` when it creates entities) instead
//! of reaching for process-global state.

use std::cell::Cell;

use cxxscope_common::{Symbol as Name, SymbolInterner};

use crate::ast::AstNode;
use crate::ids::{Arena, ScopeId, SymbolId};
use crate::scope::{Scope, ScopeKind};
use crate::symtab::{debugging_scope_name, Symbol, SymbolKind};
use crate::types::Types;

thread_local! {
    /// Depth of nested `query_*` calls. Only touched when `debug_assertions`
    /// is on; resets naturally to zero between top-level queries because
    /// every increment is paired with a decrement in `ReentrancyGuard::drop`.
    static REENTRANCY_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// RAII bump of [`REENTRANCY_DEPTH`], emitting a `tracing` event on enter
/// and exit when built with `debug_assertions`. A no-op in release builds.
pub(crate) struct ReentrancyGuard {
    #[cfg(debug_assertions)]
    depth: u32,
}

impl ReentrancyGuard {
    pub(crate) fn enter(#[allow(unused_variables)] operation: &'static str) -> Self {
        #[cfg(debug_assertions)]
        {
            let depth = REENTRANCY_DEPTH.with(|d| {
                let next = d.get() + 1;
                d.set(next);
                next
            });
            tracing::trace!(operation, depth, "entering lookup operation");
            ReentrancyGuard { depth }
        }
        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard {}
        }
    }
}

#[cfg(debug_assertions)]
impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        REENTRANCY_DEPTH.with(|d| d.set(d.get() - 1));
        tracing::trace!(depth = self.depth, "leaving lookup operation");
    }
}

/// Owns every arena for one translation unit: scopes, symbols, types and
/// the name interner, plus the global namespace scope every qualified
/// lookup with a leading `::` starts from.
pub struct CompilationContext<N: AstNode> {
    pub scopes: Arena<Scope>,
    pub symbols: Arena<Symbol<N>>,
    pub types: Types,
    pub names: SymbolInterner,
    pub global_scope: ScopeId,
}

impl<N: AstNode> CompilationContext<N> {
    pub fn new() -> Self {
        let mut scopes = Arena::new();
        let global_scope = ScopeId::from_raw(scopes.insert(Scope::new(ScopeKind::Namespace, None)));
        CompilationContext {
            scopes,
            symbols: Arena::new(),
            types: Types::new(),
            names: SymbolInterner::new(),
            global_scope,
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.scopes.get(id.as_u32())
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        self.scopes.get_mut(id.as_u32())
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol<N> {
        self.symbols.get(id.as_u32())
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol<N> {
        self.symbols.get_mut(id.as_u32())
    }

    fn inherited_template_scope(&self, enclosing: ScopeId) -> Option<ScopeId> {
        let scope = self.scope(enclosing);
        if scope.kind == ScopeKind::Template {
            Some(enclosing)
        } else {
            scope.template_scope
        }
    }

    fn nearest_function_scope(&self, mut current: ScopeId) -> Option<ScopeId> {
        loop {
            let scope = self.scope(current);
            if scope.kind == ScopeKind::Function {
                return Some(current);
            }
            current = scope.enclosing?;
        }
    }

    fn push_scope(&mut self, scope: Scope) -> ScopeId {
        ScopeId::from_raw(self.scopes.insert(scope))
    }

    pub fn new_namespace_scope(&mut self, enclosing: ScopeId) -> ScopeId {
        let template_scope = self.inherited_template_scope(enclosing);
        let mut scope = Scope::new(ScopeKind::Namespace, Some(enclosing));
        scope.template_scope = template_scope;
        self.push_scope(scope)
    }

    pub fn new_class_scope(&mut self, enclosing: ScopeId) -> ScopeId {
        let template_scope = self.inherited_template_scope(enclosing);
        let mut scope = Scope::new(ScopeKind::Class, Some(enclosing));
        scope.template_scope = template_scope;
        self.push_scope(scope)
    }

    pub fn new_function_scope(&mut self, enclosing: ScopeId) -> ScopeId {
        let template_scope = self.inherited_template_scope(enclosing);
        let mut scope = Scope::new(ScopeKind::Function, Some(enclosing));
        scope.template_scope = template_scope;
        self.push_scope(scope)
    }

    /// The parameter scope of a function, created as a child of the
    /// function scope so labels (in `function_scope`) and parameters (in
    /// this scope) stay distinct buckets.
    pub fn new_prototype_scope(&mut self, enclosing: ScopeId) -> ScopeId {
        let template_scope = self.inherited_template_scope(enclosing);
        let mut scope = Scope::new(ScopeKind::Prototype, Some(enclosing));
        scope.template_scope = template_scope;
        self.push_scope(scope)
    }

    pub fn new_template_scope(&mut self, enclosing: ScopeId) -> ScopeId {
        let mut scope = Scope::new(ScopeKind::Template, Some(enclosing));
        // A template scope *is* the template scope for everything nested
        // in it; it does not inherit one from further out.
        scope.template_scope = None;
        self.push_scope(scope)
    }

    /// Creates a block scope under `enclosing`, inheriting the
    /// prototype/function/template pointers a nested block needs, and
    /// inserts a debugging symbol (kind [`SymbolKind::DebuggingScope`])
    /// into `enclosing` under a generated name — useful for dumping, never
    /// a target of user-visible lookup.
    pub fn new_block_scope(&mut self, enclosing: ScopeId) -> ScopeId {
        let template_scope = self.inherited_template_scope(enclosing);
        let enclosing_scope = self.scope(enclosing);
        let (prototype_scope, function_scope) = match enclosing_scope.kind {
            ScopeKind::Prototype => (Some(enclosing), self.nearest_function_scope(enclosing)),
            ScopeKind::Block => (
                enclosing_scope.prototype_scope,
                enclosing_scope.function_scope,
            ),
            _ => (None, self.nearest_function_scope(enclosing)),
        };

        let mut scope = Scope::new(ScopeKind::Block, Some(enclosing));
        scope.template_scope = template_scope;
        scope.prototype_scope = prototype_scope;
        scope.function_scope = function_scope;
        let id = self.push_scope(scope);

        let name = self.names.intern(debugging_scope_name(id).as_str());
        let debug_symbol = Symbol::uninitialized(name, SymbolKind::DebuggingScope, enclosing);
        let symbol_id = SymbolId::from_raw(self.symbols.insert(debug_symbol));
        self.scope_mut(enclosing).insert(name, symbol_id.as_u32());

        id
    }

    /// Records a `using`-directive in `scope`: `used_namespaces` gains
    /// `namespace`. Duplicates are permitted.
    pub fn add_using_directive(&mut self, scope: ScopeId, namespace: ScopeId) {
        self.scope_mut(scope).add_using_directive(namespace);
    }

    pub fn add_base_scope(&mut self, class_scope: ScopeId, base: ScopeId) {
        self.scope_mut(class_scope).add_base_scope(base);
    }

    /// Creates an uninitialized symbol of `kind` and inserts it into
    /// `scope`, before the type is known. Declaration processing fills in
    /// the type and other fields afterward via `symbol_mut`.
    pub fn new_symbol(&mut self, scope: ScopeId, name: Name, kind: SymbolKind) -> SymbolId {
        let symbol = Symbol::uninitialized(name, kind, scope);
        let id = SymbolId::from_raw(self.symbols.insert(symbol));
        self.scope_mut(scope).insert(name, id.as_u32());
        id
    }

    /// Appends an already-constructed symbol's id into `scope`'s bucket
    /// for its own name.
    pub fn insert_symbol(&mut self, scope: ScopeId, symbol: SymbolId) {
        let name = self.symbol(symbol).name;
        self.scope_mut(scope).insert(name, symbol.as_u32());
    }

    /// Returns the bucket for `name` in `scope` as stored, without
    /// traversing `enclosing` or `used_namespaces`.
    pub fn lookup_local(&self, scope: ScopeId, name: Name) -> Vec<SymbolId> {
        self.scope(scope)
            .lookup_local(name)
            .iter()
            .map(|&raw| SymbolId::from_raw(raw))
            .collect()
    }

    pub fn intern(&self, s: &str) -> Name {
        self.names.intern(s)
    }
}

impl<N: AstNode> Default for CompilationContext<N> {
    fn default() -> Self {
        Self::new()
    }
}
