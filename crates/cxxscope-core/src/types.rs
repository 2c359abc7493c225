//! Type algebra: the recursive `Type` representation and the table that
//! owns it.
//!
//! `Type` is a recursive sum (pointer → pointer-to-member → array →
//! function → direct-type) with cv-qualifiers at every level, alongside a
//! parallel `SimpleType` taxonomy for builtins, classes, enums, typedefs,
//! template parameters and `typeof` expressions. Construction
//! is pure; `Types` opportunistically hash-conses so `equivalent()` has a
//! fast `TypeId`-equality path before falling back to the structural
//! comparison.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::ids::{Arena, ScopeId, SymbolId, TypeId};

bitflags::bitflags! {
    /// `const` / `volatile` / `restrict`, matching `cv_qualifier_t` in the
    /// front end this core is modeled on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CvQualifier: u8 {
        const CONST    = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Declarator flags carried by a function type (`is_static/inline/virtual/pure/explicit/constructor/member`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionFlags: u16 {
        const STATIC      = 1 << 0;
        const INLINE      = 1 << 1;
        const VIRTUAL     = 1 << 2;
        const PURE        = 1 << 3;
        const EXPLICIT    = 1 << 4;
        const CONSTRUCTOR = 1 << 5;
        const MEMBER      = 1 << 6;
    }
}

/// Builtin arithmetic/void kind, with width/signedness flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Void,
    Bool,
    Int,
    Float,
    Double,
    Char,
    Wchar,
}

/// Width/signedness modifiers on a builtin type. `is_long` is 0, 1 (`long`)
/// or 2 (`long long`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BuiltinModifiers {
    pub is_long: u8,
    pub is_short: bool,
    pub is_signed: bool,
    pub is_unsigned: bool,
}

/// Struct/class/union discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Struct,
    Class,
    Union,
}

/// Access within a class: public/private/protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessSpecifier {
    Public,
    Private,
    Protected,
}

/// One base class of a `ClassInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseClassInfo {
    pub base_type: TypeId,
    pub access: AccessSpecifier,
}

/// One user-defined conversion operator (`operator T() const`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionFunctionInfo {
    pub target_type: TypeId,
    pub cv: CvQualifier,
}

/// Everything a class/struct/union symbol needs beyond its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassInfo {
    pub class_kind: ClassKind,
    pub inner_scope: ScopeId,
    pub destructor: Option<SymbolId>,
    pub constructors: Vec<SymbolId>,
    pub operator_functions: Vec<SymbolId>,
    pub conversion_functions: Vec<ConversionFunctionInfo>,
    pub bases: Vec<BaseClassInfo>,
}

/// One enumerator of an enum's value list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumInfo {
    pub enumerators: Vec<SymbolId>,
}

/// A non-evaluated or constant-folded array bound. Full constant-expression
/// evaluation is explicitly out of scope, so an
/// unevaluated bound is carried only as its source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArraySize {
    Known(u64),
    Unevaluated(SmolStr),
    /// `T[]` — an incomplete array type.
    Unbounded,
}

/// The "direct type" payload: builtins, user-defined entities, template
/// parameters and GCC's `va_list`/`typeof` extensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimpleTypeKind {
    Builtin(BuiltinKind, BuiltinModifiers),
    /// A plain class/struct/union. Carries the declaring symbol so
    /// `equivalent()` compares by symbol identity, not by name.
    Class(SymbolId),
    Enum(SymbolId, EnumInfo),
    /// Alias to another type; `advance_over_typedefs` follows this.
    TypedefAlias(TypeId),
    /// A user-defined reference that resolves to a symbol but is not
    /// itself the class/enum payload (e.g. an injected-class-name use).
    UserDefined(SymbolId),
    /// `T` in `template <class T>` — nesting depth + positional index.
    TypeTemplateParameter { depth: u32, index: u32 },
    /// A bare expression whose meaning depends on unbound template
    /// parameters, kept with the scope it was written in.
    TemplateDependent { spelling: SmolStr, scope: ScopeId },
    GccVaList,
    GccTypeof { spelling: SmolStr, scope: ScopeId },
}

/// `SimpleType`: every direct-type node carries its own cv-qualifier and
/// the scope it was declared in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleType {
    pub kind: SimpleTypeKind,
    pub cv: CvQualifier,
    pub scope: ScopeId,
}

/// An exception specification: the (possibly empty) list of types a
/// function is declared to throw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExceptionSpec {
    pub types: Vec<TypeId>,
}

/// One parameter of a function type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub ty: TypeId,
}

/// The recursive `Type` sum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    Direct(SimpleType),
    Pointer {
        cv: CvQualifier,
        pointee: TypeId,
    },
    /// No cv on the reference itself.
    Reference {
        pointee: TypeId,
    },
    PointerToMember {
        cv: CvQualifier,
        pointee: TypeId,
        owning_class: SymbolId,
    },
    Array {
        element: TypeId,
        size: ArraySize,
    },
    Function {
        return_type: TypeId,
        params: Vec<Parameter>,
        is_variadic: bool,
        cv: CvQualifier,
        exception_spec: ExceptionSpec,
        flags: FunctionFlags,
        owning_class: Option<SymbolId>,
    },
}

/// Owns every `TypeNode` for a translation unit and hash-conses on
/// construction.
#[derive(Debug, Default)]
pub struct Types {
    arena: Arena<TypeNode>,
    cache: FxHashMap<TypeNode, TypeId>,
}

impl Types {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TypeId) -> &TypeNode {
        self.arena.get(id.as_u32())
    }

    /// Pure constructor: the same structural `TypeNode` always gets the
    /// same `TypeId` back.
    fn intern(&mut self, node: TypeNode) -> TypeId {
        if let Some(&id) = self.cache.get(&node) {
            return id;
        }
        let id = TypeId::from_raw(self.arena.insert(node.clone()));
        self.cache.insert(node, id);
        id
    }

    pub fn make_direct(&mut self, simple: SimpleType) -> TypeId {
        self.intern(TypeNode::Direct(simple))
    }

    pub fn make_pointer(&mut self, cv: CvQualifier, pointee: TypeId) -> TypeId {
        self.intern(TypeNode::Pointer { cv, pointee })
    }

    pub fn make_reference(&mut self, pointee: TypeId) -> TypeId {
        self.intern(TypeNode::Reference { pointee })
    }

    pub fn make_pointer_to_member(
        &mut self,
        cv: CvQualifier,
        pointee: TypeId,
        owning_class: SymbolId,
    ) -> TypeId {
        self.intern(TypeNode::PointerToMember {
            cv,
            pointee,
            owning_class,
        })
    }

    pub fn make_array(&mut self, element: TypeId, size: ArraySize) -> TypeId {
        self.intern(TypeNode::Array { element, size })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn make_function(
        &mut self,
        return_type: TypeId,
        params: Vec<Parameter>,
        is_variadic: bool,
        cv: CvQualifier,
        exception_spec: ExceptionSpec,
        flags: FunctionFlags,
        owning_class: Option<SymbolId>,
    ) -> TypeId {
        self.intern(TypeNode::Function {
            return_type,
            params,
            is_variadic,
            cv,
            exception_spec,
            flags,
            owning_class,
        })
    }

    /// Follows a typedef alias chain until the head variant is not a
    /// typedef `SimpleType`. Typedef chains are acyclic by construction
    /// so this always terminates.
    pub fn advance_over_typedefs(&self, ty: TypeId) -> TypeId {
        let mut current = ty;
        loop {
            match self.get(current) {
                TypeNode::Direct(SimpleType {
                    kind: SimpleTypeKind::TypedefAlias(aliased),
                    ..
                }) => current = *aliased,
                _ => return current,
            }
        }
    }

    /// Structural equivalence modulo typedef advance on both sides
    /// cv-qualifiers must match exactly; a trailing
    /// ellipsis in a function type is significant.
    pub fn equivalent(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let a = self.advance_over_typedefs(a);
        let b = self.advance_over_typedefs(b);
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (TypeNode::Direct(sa), TypeNode::Direct(sb)) => self.simple_equivalent(sa, sb),
            (
                TypeNode::Pointer { cv: cva, pointee: pa },
                TypeNode::Pointer { cv: cvb, pointee: pb },
            ) => cva == cvb && self.equivalent(*pa, *pb),
            (TypeNode::Reference { pointee: pa }, TypeNode::Reference { pointee: pb }) => {
                self.equivalent(*pa, *pb)
            }
            (
                TypeNode::PointerToMember {
                    cv: cva,
                    pointee: pa,
                    owning_class: ca,
                },
                TypeNode::PointerToMember {
                    cv: cvb,
                    pointee: pb,
                    owning_class: cb,
                },
            ) => cva == cvb && ca == cb && self.equivalent(*pa, *pb),
            (
                TypeNode::Array { element: ea, size: sa },
                TypeNode::Array { element: eb, size: sb },
            ) => sa == sb && self.equivalent(*ea, *eb),
            (
                TypeNode::Function {
                    return_type: ra,
                    params: pa,
                    is_variadic: va,
                    cv: cva,
                    owning_class: oa,
                    ..
                },
                TypeNode::Function {
                    return_type: rb,
                    params: pb,
                    is_variadic: vb,
                    cv: cvb,
                    owning_class: ob,
                    ..
                },
            ) => {
                va == vb
                    && cva == cvb
                    && oa == ob
                    && self.equivalent(*ra, *rb)
                    && pa.len() == pb.len()
                    && pa
                        .iter()
                        .zip(pb.iter())
                        .all(|(x, y)| self.equivalent(x.ty, y.ty))
            }
            _ => false,
        }
    }

    fn simple_equivalent(&self, a: &SimpleType, b: &SimpleType) -> bool {
        if a.cv != b.cv {
            return false;
        }
        match (&a.kind, &b.kind) {
            (SimpleTypeKind::Builtin(ka, ma), SimpleTypeKind::Builtin(kb, mb)) => {
                ka == kb && ma == mb
            }
            // User-defined simple types compare by symbol identity, not name.
            (SimpleTypeKind::Class(sa), SimpleTypeKind::Class(sb)) => sa == sb,
            (SimpleTypeKind::Enum(sa, _), SimpleTypeKind::Enum(sb, _)) => sa == sb,
            (SimpleTypeKind::UserDefined(sa), SimpleTypeKind::UserDefined(sb)) => sa == sb,
            (
                SimpleTypeKind::TypeTemplateParameter { depth: da, index: ia },
                SimpleTypeKind::TypeTemplateParameter { depth: db, index: ib },
            ) => da == db && ia == ib,
            (SimpleTypeKind::GccVaList, SimpleTypeKind::GccVaList) => true,
            (
                SimpleTypeKind::TemplateDependent { spelling: sa, .. },
                SimpleTypeKind::TemplateDependent { spelling: sb, .. },
            ) => sa == sb,
            (
                SimpleTypeKind::GccTypeof { spelling: sa, .. },
                SimpleTypeKind::GccTypeof { spelling: sb, .. },
            ) => sa == sb,
            _ => false,
        }
    }

    /// Returns a type identical to `ty` but with its outermost cv-qualifier
    /// set to the union of the old and new bits.
    pub fn apply_cv(&mut self, ty: TypeId, cv: CvQualifier) -> TypeId {
        let node = self.get(ty).clone();
        let updated = match node {
            TypeNode::Direct(mut simple) => {
                simple.cv |= cv;
                TypeNode::Direct(simple)
            }
            TypeNode::Pointer { cv: old, pointee } => TypeNode::Pointer {
                cv: old | cv,
                pointee,
            },
            TypeNode::PointerToMember {
                cv: old,
                pointee,
                owning_class,
            } => TypeNode::PointerToMember {
                cv: old | cv,
                pointee,
                owning_class,
            },
            TypeNode::Function {
                return_type,
                params,
                is_variadic,
                cv: old,
                exception_spec,
                flags,
                owning_class,
            } => TypeNode::Function {
                return_type,
                params,
                is_variadic,
                cv: old | cv,
                exception_spec,
                flags,
                owning_class,
            },
            // References and arrays carry no cv of their own.
            other @ (TypeNode::Reference { .. } | TypeNode::Array { .. }) => other,
        };
        self.intern(updated)
    }

    /// Strips outer pointer/array/function/reference layers to reveal the
    /// innermost `SimpleType`'s `TypeId`.
    pub fn basic_type(&self, ty: TypeId) -> TypeId {
        let mut current = ty;
        loop {
            current = match self.get(current) {
                TypeNode::Pointer { pointee, .. } => *pointee,
                TypeNode::Reference { pointee } => *pointee,
                TypeNode::PointerToMember { pointee, .. } => *pointee,
                TypeNode::Array { element, .. } => *element,
                TypeNode::Function { return_type, .. } => *return_type,
                TypeNode::Direct(_) => return current,
            };
        }
    }

    /// True iff any `SimpleType` node on the spine is a type template
    /// parameter or a template-dependent type.
    pub fn is_dependent(&self, ty: TypeId) -> bool {
        match self.get(ty) {
            TypeNode::Direct(simple) => matches!(
                simple.kind,
                SimpleTypeKind::TypeTemplateParameter { .. }
                    | SimpleTypeKind::TemplateDependent { .. }
            ),
            TypeNode::Pointer { pointee, .. }
            | TypeNode::Reference { pointee }
            | TypeNode::PointerToMember { pointee, .. } => {
                let pointee = *pointee;
                self.is_dependent(pointee)
            }
            TypeNode::Array { element, .. } => {
                let element = *element;
                self.is_dependent(element)
            }
            TypeNode::Function {
                return_type, params, ..
            } => {
                let return_type = *return_type;
                self.is_dependent(return_type)
                    || params.clone().iter().any(|p| self.is_dependent(p.ty))
            }
        }
    }
}
