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
use crate::ir::*;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// One top-level entity of a module, in declaration order.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Entity {
    /// `source_filename = "..."`
    SourceFilename(Vec<u8>),
    /// `target datalayout = "..."`
    DataLayout(Vec<u8>),
    /// `target triple = "..."`
    Triple(Vec<u8>),
    /// `module asm "..."`
    ModuleAsm(Vec<u8>),
    /// `%T = type ...`
    TypeDef(NamedType),
    /// `$c = comdat ...`
    Comdat(Comdat),
    /// A global variable, function, alias or ifunc
    Global(Global),
    /// `attributes #N = { ... }`
    AttrGroup(AttrGroup),
    /// `!name = !{...}`, an index into [`Module::named_metadata`]
    NamedMetadata(usize),
    /// `!N = ...`
    Metadata(MdNode),
}

/// The root of the tree: everything that was parsed out of one source file.
///
/// Every entity that can be referenced lives in an arena owned by the module,
/// and [`Module::entities`] lists them in the order they were declared.
/// Equality is structural, so two modules parsed from texts that differ only
/// in formatting compare equal.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Module {
    pub(crate) types: TypeContext,
    pub(crate) globals: ArenaMap<Global, GlobalValue>,
    pub(crate) comdats: ArenaMap<Comdat, ComdatDef>,
    pub(crate) attr_groups: ArenaMap<AttrGroup, AttrGroupDef>,
    pub(crate) metadata: ArenaMap<MdNode, MetadataDef>,
    pub(crate) named_metadata: Vec<NamedMetadata>,
    pub(crate) entities: Vec<Entity>,
}

impl Module {
    /// Creates an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// The module's types.
    pub fn types(&self) -> &TypeContext {
        &self.types
    }

    /// Mutable access to the module's types, for interning new ones.
    pub fn types_mut(&mut self) -> &mut TypeContext {
        &mut self.types
    }

    /// Every top-level entity in declaration order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Gets a global value.
    pub fn global(&self, global: Global) -> &GlobalValue {
        &self.globals[global]
    }

    /// Gets a global value mutably.
    pub fn global_mut(&mut self, global: Global) -> &mut GlobalValue {
        &mut self.globals[global]
    }

    /// Every global value in declaration order.
    pub fn globals(&self) -> impl DoubleEndedIterator<Item = (Global, &GlobalValue)> + '_ {
        self.globals.iter()
    }

    /// Every function (declarations included) in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = (Global, &Function)> + '_ {
        self.globals
            .iter()
            .filter_map(|(k, g)| g.as_function().map(|f| (k, f)))
    }

    /// Looks up a global value by name.
    ///
    /// ```
    /// # use llasm::ir::Ident;
    /// let module = llasm::parse("@x = global i32 0").unwrap();
    ///
    /// assert!(module.find_global(&Ident::Name("x".into())).is_some());
    /// assert!(module.find_global(&Ident::Name("y".into())).is_none());
    /// ```
    pub fn find_global(&self, name: &Ident) -> Option<Global> {
        self.globals
            .iter()
            .find_map(|(k, g)| (g.name == *name).then_some(k))
    }

    /// Gets a comdat definition.
    pub fn comdat(&self, comdat: Comdat) -> &ComdatDef {
        &self.comdats[comdat]
    }

    /// Gets an attribute group definition.
    pub fn attr_group(&self, group: AttrGroup) -> &AttrGroupDef {
        &self.attr_groups[group]
    }

    /// Gets a metadata node definition.
    pub fn metadata_node(&self, node: MdNode) -> &MetadataDef {
        &self.metadata[node]
    }

    /// Every metadata node definition in declaration order.
    pub fn metadata_nodes(&self) -> impl DoubleEndedIterator<Item = (MdNode, &MetadataDef)> + '_ {
        self.metadata.iter()
    }

    /// Every named metadata definition in declaration order.
    pub fn named_metadata(&self) -> &[NamedMetadata] {
        &self.named_metadata
    }

    /// Appends a module-level directive (source filename, datalayout, triple or module asm).
    pub fn push_directive(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Appends a named type definition with a given body.
    pub fn push_type_def(&mut self, named: NamedType, body: NamedBody) {
        self.types.define_named(named, body);
        self.entities.push(Entity::TypeDef(named));
    }

    /// Appends a global value.
    pub fn push_global(&mut self, global: GlobalValue) -> Global {
        let key = self.globals.insert(global);

        self.entities.push(Entity::Global(key));

        key
    }

    /// Appends a comdat definition.
    pub fn push_comdat(&mut self, comdat: ComdatDef) -> Comdat {
        let key = self.comdats.insert(comdat);

        self.entities.push(Entity::Comdat(key));

        key
    }

    /// Appends an attribute group definition.
    pub fn push_attr_group(&mut self, group: AttrGroupDef) -> AttrGroup {
        let key = self.attr_groups.insert(group);

        self.entities.push(Entity::AttrGroup(key));

        key
    }

    /// Appends a metadata node definition.
    pub fn push_metadata(&mut self, def: MetadataDef) -> MdNode {
        let key = self.metadata.insert(def);

        self.entities.push(Entity::Metadata(key));

        key
    }

    /// Appends a named metadata definition.
    pub fn push_named_metadata(&mut self, named: NamedMetadata) {
        self.named_metadata.push(named);
        self.entities.push(Entity::NamedMetadata(self.named_metadata.len() - 1));
    }

    /// The type a reference to `global` has: a pointer to the global's
    /// contents (or its function type, for functions and ifuncs).
    pub fn global_value_type(&mut self, global: Global) -> Type {
        let (pointee, addrspace) = match &self.globals[global].kind {
            GlobalKind::Variable(var) => (var.content_ty, var.addrspace.unwrap_or(0)),
            GlobalKind::Function(func) => (func.sig, func.addrspace.unwrap_or(0)),
            GlobalKind::Alias(alias) => (
                alias.value_ty,
                self.types.addrspace(alias.target.ty).unwrap_or(0),
            ),
            GlobalKind::IFunc(ifunc) => (ifunc.value_ty, 0),
        };

        self.types.pointer(Some(pointee), addrspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_follow_push_order() {
        let mut module = Module::new();
        let i32_ty = module.types_mut().int(32);
        let named = module.types_mut().named_entry(Ident::Name("T".into()));

        module.push_directive(Entity::Triple(b"x86_64-unknown-linux-gnu".to_vec()));
        module.push_type_def(named, NamedBody::Defined(i32_ty));

        let var = GlobalVariable {
            header: GlobalHeader::default(),
            addrspace: None,
            externally_initialized: false,
            constant: false,
            content_ty: i32_ty,
            init: Some(Constant::Int(0.into())),
            section: None,
            partition: None,
            comdat: None,
            align: None,
            attachments: Vec::new(),
        };

        let g = module.push_global(GlobalValue::new(
            Ident::Name("g".into()),
            GlobalKind::Variable(var),
        ));

        assert_eq!(
            module.entities(),
            &[
                Entity::Triple(b"x86_64-unknown-linux-gnu".to_vec()),
                Entity::TypeDef(named),
                Entity::Global(g)
            ]
        );

        let ptr = module.global_value_type(g);

        assert_eq!(module.types().pointee(ptr), Some(i32_ty));
    }

    #[test]
    fn modules_are_send_and_sync() {
        static_assertions::assert_impl_all!(Module: Send, Sync);
    }
}
