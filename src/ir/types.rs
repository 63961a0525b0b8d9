//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::ArenaMap;
use crate::ir::{Ident, NamedType, Type};
use crate::utility::SaHashMap;
use smallvec::SmallVec;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// The different floating-point formats that can be spelled in a module.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum FloatKind {
    /// `half`, IEEE `binary16`
    Half,
    /// `bfloat`, the truncated single-precision format
    BFloat,
    /// `float`, IEEE `binary32`
    Float,
    /// `double`, IEEE `binary64`
    Double,
    /// `x86_fp80`, the x87 extended-precision format
    X86Fp80,
    /// `fp128`, IEEE `binary128`
    Fp128,
    /// `ppc_fp128`, a pair of doubles
    PpcFp128,
}

impl FloatKind {
    /// Every kind, in the order they are checked against keywords.
    pub const ALL: [FloatKind; 7] = [
        FloatKind::Half,
        FloatKind::BFloat,
        FloatKind::Float,
        FloatKind::Double,
        FloatKind::X86Fp80,
        FloatKind::Fp128,
        FloatKind::PpcFp128,
    ];

    /// The keyword that spells this type.
    pub fn keyword(self) -> &'static str {
        match self {
            FloatKind::Half => "half",
            FloatKind::BFloat => "bfloat",
            FloatKind::Float => "float",
            FloatKind::Double => "double",
            FloatKind::X86Fp80 => "x86_fp80",
            FloatKind::Fp128 => "fp128",
            FloatKind::PpcFp128 => "ppc_fp128",
        }
    }

    /// Maps a keyword back to the float kind it spells.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == word)
    }

    /// The number of bits in the format.
    pub fn bits(self) -> u32 {
        match self {
            FloatKind::Half | FloatKind::BFloat => 16,
            FloatKind::Float => 32,
            FloatKind::Double => 64,
            FloatKind::X86Fp80 => 80,
            FloatKind::Fp128 | FloatKind::PpcFp128 => 128,
        }
    }
}

/// The structural description of a type. These are interned inside of a
/// [`TypeContext`], and are referred to everywhere else with [`Type`].
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum TypeData {
    /// `void`
    Void,
    /// `iN`
    Int(u32),
    /// `half`, `float`, `double`, etc.
    Float(FloatKind),
    /// `x86_mmx`
    X86Mmx,
    /// `label`
    Label,
    /// `token`
    Token,
    /// `metadata`
    Metadata,
    /// `T*` / `T addrspace(N)*` when `pointee` is set, `ptr` / `ptr addrspace(N)` when not.
    Pointer {
        /// The pointee for typed pointers
        pointee: Option<Type>,
        /// The address space, zero unless written otherwise
        addrspace: u32,
    },
    /// `[N x T]`
    Array {
        /// Number of elements
        len: u64,
        /// Element type
        elem: Type,
    },
    /// `<N x T>` or `<vscale x N x T>`
    Vector {
        /// Minimum number of elements
        len: u64,
        /// Element type
        elem: Type,
        /// Whether the vector is `vscale`
        scalable: bool,
    },
    /// `{ T, ... }` or `<{ T, ... }>`
    Struct {
        /// Member types
        fields: SmallVec<[Type; 4]>,
        /// Whether the struct is written `<{ }>`
        packed: bool,
    },
    /// `R (P, ...)`
    Function {
        /// Return type
        ret: Type,
        /// Parameter types
        params: SmallVec<[Type; 4]>,
        /// Whether the parameter list ends with `...`
        vararg: bool,
    },
    /// A reference to a named type, `%T`
    Named(NamedType),
}

/// The body of a named type definition.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum NamedBody {
    /// `%T = type opaque`
    Opaque,
    /// `%T = type <ty>`
    Defined(Type),
}

/// A single entry in the named type registry.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct NamedTypeDef {
    name: Ident,
    body: Option<NamedBody>,
}

impl NamedTypeDef {
    /// The name the type was declared with (without the `%`).
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// The body of the definition. This is `None` only while a module is
    /// being built, a resolved module always has every named type defined.
    pub fn body(&self) -> Option<NamedBody> {
        self.body
    }
}

/// Owns every type used inside of a module, along with the registry of
/// named types.
///
/// Types are de-duplicated on creation, so equality of [`Type`] keys is
/// equivalent to structural equality of the types they refer to. Named types
/// compare by identity: `%A` and `%B` are different types even if their
/// bodies are identical.
///
/// ```
/// # use llasm::ir::*;
/// let mut ctx = TypeContext::new();
/// let a = ctx.int(32);
/// let b = ctx.int(32);
/// let p = ctx.pointer(Some(a), 0);
///
/// assert_eq!(a, b);
/// assert_eq!(ctx.pointee(p), Some(a));
/// ```
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct TypeContext {
    types: ArenaMap<Type, TypeData>,
    named: ArenaMap<NamedType, NamedTypeDef>,
    // both lookups mirror the arenas above, they're rebuilt on demand if they
    // are out of sync (e.g. after deserializing)
    #[cfg_attr(feature = "enable-serde", serde(skip))]
    lookup: SaHashMap<TypeData, Type>,
    #[cfg_attr(feature = "enable-serde", serde(skip))]
    named_lookup: SaHashMap<Ident, NamedType>,
}

impl PartialEq for TypeContext {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types && self.named == other.named
    }
}

impl Eq for TypeContext {}

impl TypeContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `data`, returning the key of the existing identical type if
    /// one has already been created.
    pub fn intern(&mut self, data: TypeData) -> Type {
        if self.lookup.len() != self.types.len() {
            self.lookup = self.types.iter().map(|(k, v)| (v.clone(), k)).collect();
        }

        if let Some(ty) = self.lookup.get(&data) {
            return *ty;
        }

        let ty = self.types.insert(data.clone());
        self.lookup.insert(data, ty);

        ty
    }

    /// Gets the structure of a type.
    pub fn data(&self, ty: Type) -> &TypeData {
        &self.types[ty]
    }

    /// The number of distinct types that have been interned.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Checks if no types have been interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// `void`
    pub fn void(&mut self) -> Type {
        self.intern(TypeData::Void)
    }

    /// `iN`
    pub fn int(&mut self, width: u32) -> Type {
        self.intern(TypeData::Int(width))
    }

    /// `i1`
    pub fn bool(&mut self) -> Type {
        self.int(1)
    }

    /// `half`, `float`, `double`, etc.
    pub fn float(&mut self, kind: FloatKind) -> Type {
        self.intern(TypeData::Float(kind))
    }

    /// `label`
    pub fn label(&mut self) -> Type {
        self.intern(TypeData::Label)
    }

    /// `metadata`
    pub fn metadata(&mut self) -> Type {
        self.intern(TypeData::Metadata)
    }

    /// `token`
    pub fn token(&mut self) -> Type {
        self.intern(TypeData::Token)
    }

    /// A typed pointer to `pointee`, or an opaque `ptr` if `pointee` is `None`.
    pub fn pointer(&mut self, pointee: Option<Type>, addrspace: u32) -> Type {
        self.intern(TypeData::Pointer { pointee, addrspace })
    }

    /// `[len x elem]`
    pub fn array(&mut self, len: u64, elem: Type) -> Type {
        self.intern(TypeData::Array { len, elem })
    }

    /// `<len x elem>` or `<vscale x len x elem>`
    pub fn vector(&mut self, len: u64, elem: Type, scalable: bool) -> Type {
        self.intern(TypeData::Vector {
            len,
            elem,
            scalable,
        })
    }

    /// `{ fields... }` or `<{ fields... }>`
    pub fn structure(&mut self, fields: &[Type], packed: bool) -> Type {
        self.intern(TypeData::Struct {
            fields: fields.into(),
            packed,
        })
    }

    /// `ret (params...)`
    pub fn function(&mut self, ret: Type, params: &[Type], vararg: bool) -> Type {
        self.intern(TypeData::Function {
            ret,
            params: params.into(),
            vararg,
        })
    }

    /// Gets the type for a named type, creating an (undefined) registry entry
    /// the first time a name is seen.
    pub fn named_type(&mut self, name: Ident) -> Type {
        let named = self.named_entry(name);

        self.intern(TypeData::Named(named))
    }

    /// Gets or creates the registry entry for `name`.
    pub fn named_entry(&mut self, name: Ident) -> NamedType {
        if self.named_lookup.len() != self.named.len() {
            self.named_lookup = self.named.iter().map(|(k, v)| (v.name.clone(), k)).collect();
        }

        if let Some(named) = self.named_lookup.get(&name) {
            return *named;
        }

        let named = self.named.insert(NamedTypeDef {
            name: name.clone(),
            body: None,
        });

        self.named_lookup.insert(name, named);

        named
    }

    /// Finds the registry entry for `name` without creating one.
    pub fn find_named(&self, name: &Ident) -> Option<NamedType> {
        self.named
            .iter()
            .find_map(|(k, def)| (def.name == *name).then_some(k))
    }

    /// Gets a named type's registry entry.
    pub fn named(&self, named: NamedType) -> &NamedTypeDef {
        &self.named[named]
    }

    /// Every named type in the registry, in the order they were first seen.
    pub fn named_types(&self) -> impl Iterator<Item = (NamedType, &NamedTypeDef)> + '_ {
        self.named.iter()
    }

    /// Sets the body of a named type.
    pub fn define_named(&mut self, named: NamedType, body: NamedBody) {
        self.named[named].body = Some(body);
    }

    /// Looks through any named types to get the structure they resolve to.
    /// Opaque and undefined named types stay as-is.
    pub fn resolve(&self, mut ty: Type) -> Type {
        // a named type defined as itself can't be spelled, but bound the walk anyway
        for _ in 0..=self.named.len() {
            match self.data(ty) {
                TypeData::Named(named) => match self.named[*named].body {
                    Some(NamedBody::Defined(inner)) => ty = inner,
                    _ => return ty,
                },
                _ => return ty,
            }
        }

        ty
    }

    /// Checks if `ty` is `void`.
    pub fn is_void(&self, ty: Type) -> bool {
        matches!(self.data(ty), TypeData::Void)
    }

    /// Checks if `ty` is `label`.
    pub fn is_label(&self, ty: Type) -> bool {
        matches!(self.data(ty), TypeData::Label)
    }

    /// Checks if `ty` is `metadata`.
    pub fn is_metadata(&self, ty: Type) -> bool {
        matches!(self.data(ty), TypeData::Metadata)
    }

    /// Gets the width if `ty` is an integer.
    pub fn int_width(&self, ty: Type) -> Option<u32> {
        match self.data(ty) {
            TypeData::Int(width) => Some(*width),
            _ => None,
        }
    }

    /// Gets the float format if `ty` is a floating-point type.
    pub fn float_kind(&self, ty: Type) -> Option<FloatKind> {
        match self.data(ty) {
            TypeData::Float(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Checks if `ty` is any pointer type.
    pub fn is_pointer(&self, ty: Type) -> bool {
        matches!(self.data(ty), TypeData::Pointer { .. })
    }

    /// Gets the pointee of a typed pointer.
    pub fn pointee(&self, ty: Type) -> Option<Type> {
        match self.data(ty) {
            TypeData::Pointer { pointee, .. } => *pointee,
            _ => None,
        }
    }

    /// Gets the address space of a pointer.
    pub fn addrspace(&self, ty: Type) -> Option<u32> {
        match self.data(ty) {
            TypeData::Pointer { addrspace, .. } => Some(*addrspace),
            _ => None,
        }
    }

    /// Gets the element count and element type of a vector.
    pub fn vector_info(&self, ty: Type) -> Option<(u64, Type, bool)> {
        match self.data(ty) {
            TypeData::Vector {
                len,
                elem,
                scalable,
            } => Some((*len, *elem, *scalable)),
            _ => None,
        }
    }

    /// For vectors, the element type. For everything else, `ty` itself.
    pub fn scalar(&self, ty: Type) -> Type {
        match self.data(ty) {
            TypeData::Vector { elem, .. } => *elem,
            _ => ty,
        }
    }

    /// Checks if `ty` is an integer or a vector of integers.
    pub fn is_int_or_int_vector(&self, ty: Type) -> bool {
        self.int_width(self.scalar(ty)).is_some()
    }

    /// Checks if `ty` is a float or a vector of floats.
    pub fn is_fp_or_fp_vector(&self, ty: Type) -> bool {
        self.float_kind(self.scalar(ty)).is_some()
    }

    /// Checks if `ty` is a pointer or a vector of pointers.
    pub fn is_ptr_or_ptr_vector(&self, ty: Type) -> bool {
        self.is_pointer(self.scalar(ty))
    }

    /// Gets the signature parts of a function type.
    pub fn function_info(&self, ty: Type) -> Option<(Type, &[Type], bool)> {
        match self.data(ty) {
            TypeData::Function {
                ret,
                params,
                vararg,
            } => Some((*ret, params, *vararg)),
            _ => None,
        }
    }

    /// Checks if `ty` is a struct or an array once named types are looked through.
    pub fn is_aggregate(&self, ty: Type) -> bool {
        matches!(
            self.data(self.resolve(ty)),
            TypeData::Struct { .. } | TypeData::Array { .. }
        )
    }

    /// Indexes into an aggregate type (struct, array or vector) with a
    /// constant index, returning the member type.
    pub fn member(&self, ty: Type, index: u64) -> Option<Type> {
        match self.data(self.resolve(ty)) {
            TypeData::Struct { fields, .. } => {
                usize::try_from(index).ok().and_then(|i| fields.get(i).copied())
            }
            TypeData::Array { len, elem } => (index < *len).then_some(*elem),
            TypeData::Vector { elem, .. } => Some(*elem),
            _ => None,
        }
    }

    /// Checks if `ty` can be indexed by a `getelementptr` index that isn't
    /// a constant, i.e. it is an array or vector.
    pub fn is_sequential(&self, ty: Type) -> bool {
        matches!(
            self.data(self.resolve(ty)),
            TypeData::Array { .. } | TypeData::Vector { .. }
        )
    }

    /// Checks if `ty` is a struct (after looking through named types).
    pub fn is_struct(&self, ty: Type) -> bool {
        matches!(self.data(self.resolve(ty)), TypeData::Struct { .. })
    }

    /// Checks if a value written with type `written` can refer to an entity of
    /// type `actual`. Types have to be identical, except that opaque pointers
    /// are compatible with every pointer in the same address space.
    pub fn compatible(&self, written: Type, actual: Type) -> bool {
        if written == actual {
            return true;
        }

        match (self.data(written), self.data(actual)) {
            (
                TypeData::Pointer {
                    pointee: a,
                    addrspace: x,
                },
                TypeData::Pointer {
                    pointee: b,
                    addrspace: y,
                },
            ) => x == y && (a.is_none() || b.is_none()),
            _ => false,
        }
    }

    /// The size in bits of a type whose size doesn't depend on a data layout.
    pub fn primitive_bits(&self, ty: Type) -> Option<u64> {
        match self.data(ty) {
            TypeData::Int(width) => Some(u64::from(*width)),
            TypeData::Float(kind) => Some(u64::from(kind.bits())),
            TypeData::X86Mmx => Some(64),
            TypeData::Vector {
                len,
                elem,
                scalable: false,
            } => self.primitive_bits(*elem).map(|bits| bits * len),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups() {
        let mut ctx = TypeContext::new();
        let i32_ty = ctx.int(32);
        let i8_ty = ctx.int(8);
        let a = ctx.structure(&[i32_ty, i8_ty], false);
        let b = ctx.structure(&[i32_ty, i8_ty], false);
        let c = ctx.structure(&[i32_ty, i8_ty], true);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(ctx.len(), 4);
    }

    #[test]
    fn named_types_compare_by_identity() {
        let mut ctx = TypeContext::new();
        let a = ctx.named_type(Ident::Name("A".into()));
        let b = ctx.named_type(Ident::Name("B".into()));
        let a2 = ctx.named_type(Ident::Name("A".into()));

        assert_ne!(a, b);
        assert_eq!(a, a2);
        assert_eq!(ctx.named_types().count(), 2);
    }

    #[test]
    fn resolve_looks_through_names() {
        let mut ctx = TypeContext::new();
        let i32_ty = ctx.int(32);
        let body = ctx.structure(&[i32_ty], false);
        let named = ctx.named_entry(Ident::Name("S".into()));
        let ty = ctx.named_type(Ident::Name("S".into()));

        assert_eq!(ctx.resolve(ty), ty);

        ctx.define_named(named, NamedBody::Defined(body));

        assert_eq!(ctx.resolve(ty), body);
        assert_eq!(ctx.member(ty, 0), Some(i32_ty));
        assert_eq!(ctx.member(ty, 1), None);
    }

    #[test]
    fn opaque_pointers_are_compatible_within_an_address_space() {
        let mut ctx = TypeContext::new();
        let i8_ty = ctx.int(8);
        let typed = ctx.pointer(Some(i8_ty), 0);
        let opaque = ctx.pointer(None, 0);
        let far = ctx.pointer(None, 1);

        assert!(ctx.compatible(opaque, typed));
        assert!(ctx.compatible(typed, opaque));
        assert!(!ctx.compatible(far, typed));
        assert!(!ctx.compatible(i8_ty, typed));
    }

    #[test]
    fn equality_ignores_lookup_tables() {
        let mut a = TypeContext::new();
        let mut b = TypeContext::new();

        a.int(32);
        b.int(32);

        assert_eq!(a, b);

        b.int(64);

        assert_ne!(a, b);
    }
}
