//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{AttrGroup, Ref, Type};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

keyword_enum! {
    /// Attributes that are spelled with a single keyword.
    pub enum AttrKind {
        AlwaysInline => "alwaysinline",
        ArgMemOnly => "argmemonly",
        Builtin => "builtin",
        ByVal => "byval",
        Cold => "cold",
        Convergent => "convergent",
        DisableSanitizerInstrumentation => "disable_sanitizer_instrumentation",
        Hot => "hot",
        ImmArg => "immarg",
        InAlloca => "inalloca",
        InReg => "inreg",
        InaccessibleMemOnly => "inaccessiblememonly",
        InaccessibleMemOrArgMemOnly => "inaccessiblemem_or_argmemonly",
        InlineHint => "inlinehint",
        JumpTable => "jumptable",
        MinSize => "minsize",
        MustProgress => "mustprogress",
        Naked => "naked",
        Nest => "nest",
        NoAlias => "noalias",
        NoBuiltin => "nobuiltin",
        NoCallback => "nocallback",
        NoCapture => "nocapture",
        NoCfCheck => "nocf_check",
        NoDuplicate => "noduplicate",
        NoFree => "nofree",
        NoImplicitFloat => "noimplicitfloat",
        NoInline => "noinline",
        NoMerge => "nomerge",
        NoProfile => "noprofile",
        NoRecurse => "norecurse",
        NoRedZone => "noredzone",
        NoReturn => "noreturn",
        NoSanitizeCoverage => "nosanitize_coverage",
        NoSync => "nosync",
        NoUndef => "noundef",
        NoUnwind => "nounwind",
        NonLazyBind => "nonlazybind",
        NonNull => "nonnull",
        NullPointerIsValid => "null_pointer_is_valid",
        OptForFuzzing => "optforfuzzing",
        OptNone => "optnone",
        OptSize => "optsize",
        Preallocated => "preallocated",
        ReadNone => "readnone",
        ReadOnly => "readonly",
        Returned => "returned",
        ReturnsTwice => "returns_twice",
        SExt => "signext",
        SafeStack => "safestack",
        SanitizeAddress => "sanitize_address",
        SanitizeHwAddress => "sanitize_hwaddress",
        SanitizeMemTag => "sanitize_memtag",
        SanitizeMemory => "sanitize_memory",
        SanitizeThread => "sanitize_thread",
        ShadowCallStack => "shadowcallstack",
        Speculatable => "speculatable",
        SpeculativeLoadHardening => "speculative_load_hardening",
        Ssp => "ssp",
        SspReq => "sspreq",
        SspStrong => "sspstrong",
        StrictFp => "strictfp",
        StructRet => "sret",
        SwiftAsync => "swiftasync",
        SwiftError => "swifterror",
        SwiftSelf => "swiftself",
        UwTable => "uwtable",
        WillReturn => "willreturn",
        WriteOnly => "writeonly",
        ZExt => "zeroext",
    }
}

keyword_enum! {
    /// Attributes that carry a single integer.
    pub enum IntAttrKind {
        Align => "align",
        AlignStack => "alignstack",
        Dereferenceable => "dereferenceable",
        DereferenceableOrNull => "dereferenceable_or_null",
    }
}

keyword_enum! {
    /// Attributes that carry a type, `byval(%T)`.
    pub enum TypeAttrKind {
        ByVal => "byval",
        ByRef => "byref",
        StructRet => "sret",
        InAlloca => "inalloca",
        Preallocated => "preallocated",
        ElementType => "elementtype",
    }
}

/// A single attribute on a function, parameter, return value or call site.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Attribute {
    /// `nounwind`, `noalias`, etc.
    Enum(AttrKind),
    /// `align 8`, `dereferenceable(4)`, etc.
    Int(IntAttrKind, u64),
    /// `byval(%T)`, `sret(%T)`, etc.
    Type(TypeAttrKind, Type),
    /// `allocsize(0)` or `allocsize(0, 1)`
    AllocSize(u32, Option<u32>),
    /// `"key"` or `"key"="value"`
    String {
        /// The key
        key: Vec<u8>,
        /// The value, if one was written
        value: Option<Vec<u8>>,
    },
    /// A reference to an attribute group, `#0`
    Group(Ref<AttrGroup>),
}

/// An attribute group definition, `attributes #0 = { ... }`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct AttrGroupDef {
    /// The group's number
    pub id: u32,
    /// Every attribute in the group
    pub attrs: Vec<Attribute>,
}
