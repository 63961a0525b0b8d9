//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{Attachment, Comdat, Constant, Function, Ident, Ref, Type, TypedConst};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

keyword_enum! {
    /// Linkage types.
    pub enum Linkage {
        Private => "private",
        Internal => "internal",
        AvailableExternally => "available_externally",
        LinkOnce => "linkonce",
        Weak => "weak",
        Common => "common",
        Appending => "appending",
        ExternWeak => "extern_weak",
        LinkOnceOdr => "linkonce_odr",
        WeakOdr => "weak_odr",
        External => "external",
    }
}

keyword_enum! {
    /// Runtime preemption specifiers.
    pub enum Preemption {
        DsoPreemptable => "dso_preemptable",
        DsoLocal => "dso_local",
    }
}

keyword_enum! {
    /// Visibility styles.
    pub enum Visibility {
        Default => "default",
        Hidden => "hidden",
        Protected => "protected",
    }
}

keyword_enum! {
    /// DLL storage classes.
    pub enum DllStorage {
        Import => "dllimport",
        Export => "dllexport",
    }
}

keyword_enum! {
    /// The non-default thread-local storage models, `thread_local(initialexec)`.
    pub enum TlsModel {
        LocalDynamic => "localdynamic",
        InitialExec => "initialexec",
        LocalExec => "localexec",
    }
}

keyword_enum! {
    /// `unnamed_addr` markers.
    pub enum UnnamedAddr {
        Global => "unnamed_addr",
        Local => "local_unnamed_addr",
    }
}

keyword_enum! {
    /// Comdat selection kinds.
    pub enum SelectionKind {
        Any => "any",
        ExactMatch => "exactmatch",
        Largest => "largest",
        NoDeduplicate => "nodeduplicate",
        NoDuplicates => "noduplicates",
        SameSize => "samesize",
    }
}

/// A `thread_local` marker.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum ThreadLocal {
    /// Plain `thread_local`
    Default,
    /// `thread_local(model)`
    Model(TlsModel),
}

/// The specifiers that every kind of global value can carry, in the order
/// they are written.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct GlobalHeader {
    /// Linkage, if written
    pub linkage: Option<Linkage>,
    /// `dso_local` or `dso_preemptable`
    pub preemption: Option<Preemption>,
    /// Visibility, if written
    pub visibility: Option<Visibility>,
    /// `dllimport` or `dllexport`
    pub dll_storage: Option<DllStorage>,
    /// `thread_local`
    pub thread_local: Option<ThreadLocal>,
    /// `unnamed_addr` or `local_unnamed_addr`
    pub unnamed_addr: Option<UnnamedAddr>,
}

/// A comdat reference on a global value.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct ComdatRef {
    /// The comdat being referenced
    pub comdat: Ref<Comdat>,
    /// `true` for `comdat($name)`, `false` for a bare `comdat` that names
    /// the comdat with the same name as the global
    pub explicit: bool,
}

/// A comdat definition, `$name = comdat any`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct ComdatDef {
    /// The comdat's name
    pub name: Ident,
    /// The selection kind
    pub selection: SelectionKind,
}

/// A global variable, `@g = global i32 0`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct GlobalVariable {
    /// The common specifiers
    pub header: GlobalHeader,
    /// `addrspace(N)`
    pub addrspace: Option<u32>,
    /// `externally_initialized`
    pub externally_initialized: bool,
    /// `constant` instead of `global`
    pub constant: bool,
    /// The type of the variable's contents
    pub content_ty: Type,
    /// The initializer, `None` for declarations
    pub init: Option<Constant>,
    /// `section "name"`
    pub section: Option<Vec<u8>>,
    /// `partition "name"`
    pub partition: Option<Vec<u8>>,
    /// `comdat` or `comdat($name)`
    pub comdat: Option<ComdatRef>,
    /// `align N`
    pub align: Option<u64>,
    /// Metadata attachments
    pub attachments: Vec<Attachment>,
}

/// An alias or an ifunc. For aliases, `target` is the aliasee, for ifuncs
/// it is the resolver function.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Alias {
    /// The common specifiers
    pub header: GlobalHeader,
    /// The type of the value being aliased
    pub value_ty: Type,
    /// The aliasee or resolver
    pub target: TypedConst,
}

/// The different kinds of global value.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum GlobalKind {
    /// `@g = global ...`
    Variable(GlobalVariable),
    /// `define ...` or `declare ...`
    Function(Function),
    /// `@a = alias ...`
    Alias(Alias),
    /// `@f = ifunc ...`
    IFunc(Alias),
}

/// Anything living in the module's global scope, named with `@`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct GlobalValue {
    pub(crate) name: Ident,
    pub(crate) kind: GlobalKind,
}

impl GlobalValue {
    /// Creates a global value.
    pub fn new(name: Ident, kind: GlobalKind) -> Self {
        Self { name, kind }
    }

    /// The name, without the `@`.
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// What kind of global this is.
    pub fn kind(&self) -> &GlobalKind {
        &self.kind
    }

    /// Mutable access to the global's contents.
    pub fn kind_mut(&mut self) -> &mut GlobalKind {
        &mut self.kind
    }

    /// Gets the function, if this is one.
    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            GlobalKind::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Gets the variable, if this is one.
    pub fn as_variable(&self) -> Option<&GlobalVariable> {
        match &self.kind {
            GlobalKind::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// The specifiers common to every global.
    pub fn header(&self) -> &GlobalHeader {
        match &self.kind {
            GlobalKind::Variable(var) => &var.header,
            GlobalKind::Function(func) => &func.header,
            GlobalKind::Alias(alias) | GlobalKind::IFunc(alias) => &alias.header,
        }
    }
}
