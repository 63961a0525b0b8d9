//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Binds every placeholder the parser left behind to the entity it names.
//!
//! Resolution happens in two phases. The first scans every definition and
//! builds the scope tables (rejecting duplicates), the second walks every
//! operand in the module and patches placeholders in-place, checking the
//! type written at each use against the type of the definition.

use crate::ir::*;
use crate::reader::{ParseError, ParseResult, SourcePos};
use crate::utility::SaHashMap;
use crate::writer::stringify_ty;

/// The namespace a reference is looked up in.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub(crate) enum Scope {
    /// `@name`, global values
    Module,
    /// `%name`, the locals of one function body
    Function(Global),
    /// The block of a `blockaddress`, looked up in whichever function the
    /// other half of the constant resolves to
    BlockAddress,
    /// `!N`
    Metadata,
    /// `#N`
    AttrGroup,
    /// `$name`
    Comdat,
}

impl Scope {
    fn sigil(self) -> char {
        match self {
            Scope::Module => '@',
            Scope::Function(_) | Scope::BlockAddress => '%',
            Scope::Metadata => '!',
            Scope::AttrGroup => '#',
            Scope::Comdat => '$',
        }
    }
}

/// One use of a name that hasn't been bound yet.
#[derive(Clone, Debug)]
pub(crate) struct PendingRef {
    scope: Scope,
    ident: Ident,
    pos: SourcePos,
    expected: Option<Type>,
}

/// Every unresolved use in a module, indexed by [`Placeholder`].
#[derive(Clone, Debug, Default)]
pub(crate) struct PendingRefs {
    refs: Vec<PendingRef>,
}

impl PendingRefs {
    /// Records a use of `ident`, giving back the placeholder that stands in for it.
    pub(crate) fn register(&mut self, scope: Scope, ident: Ident, pos: SourcePos, expected: Option<Type>) -> Placeholder {
        self.refs.push(PendingRef {
            scope,
            ident,
            pos,
            expected,
        });

        Placeholder::new(self.refs.len() - 1)
    }

    /// Changes the type a use is expected to have. Used for callees, whose
    /// type is only known after the argument list.
    pub(crate) fn expect(&mut self, placeholder: Placeholder, ty: Type) {
        self.refs[placeholder.index()].expected = Some(ty);
    }

    /// The number of unresolved uses.
    pub(crate) fn len(&self) -> usize {
        self.refs.len()
    }

    fn get(&self, placeholder: Placeholder) -> &PendingRef {
        &self.refs[placeholder.index()]
    }
}

/// Something with a definition site, for error positions.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub(crate) enum Site {
    Global(Global),
    Param(Global, Param),
    Block(Global, Block),
    Inst(Global, Inst),
    Metadata(MdNode),
    AttrGroup(AttrGroup),
    Comdat(Comdat),
    /// A type definition, by its index into the module's entity list
    TypeDef(usize),
    /// The first use of a named type
    TypeUse(NamedType),
}

/// Where each definition (and each named type's first use) was written.
#[derive(Clone, Debug, Default)]
pub(crate) struct Sites {
    map: SaHashMap<Site, SourcePos>,
}

impl Sites {
    /// Records the position of a site, the first recording wins.
    pub(crate) fn record(&mut self, site: Site, pos: SourcePos) {
        self.map.entry(site).or_insert(pos);
    }

    /// Gets the position of a site.
    pub(crate) fn get(&self, site: Site) -> SourcePos {
        self.map.get(&site).copied().unwrap_or_else(SourcePos::start)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Local {
    Param(Param),
    Block(Block),
    Inst(Inst),
}

#[derive(Debug, Default)]
struct Declarations {
    globals: SaHashMap<Ident, (Global, Type)>,
    locals: SaHashMap<Global, SaHashMap<Ident, (Local, Type)>>,
    metadata: SaHashMap<u32, MdNode>,
    attr_groups: SaHashMap<u32, AttrGroup>,
    comdats: SaHashMap<Ident, Comdat>,
    // for error messages
    names: SaHashMap<Global, String>,
}

fn duplicate(ident: String, scope: impl Into<String>, pos: SourcePos) -> ParseError {
    ParseError::DuplicateDefinition {
        ident,
        scope: scope.into(),
        pos,
    }
}

/// Resolves every pending reference in `module`.
pub(crate) fn resolve(module: &mut Module, pending: &mut PendingRefs, sites: &Sites) -> ParseResult<()> {
    log::debug!("resolver: scanning definitions");

    check_named_types(module, sites)?;

    let decls = declare(module, sites)?;

    log::debug!(
        "resolver: {} globals, {} function scopes, patching {} references",
        decls.globals.len(),
        decls.locals.len(),
        pending.len()
    );

    let Module {
        types,
        globals,
        attr_groups,
        metadata,
        named_metadata,
        ..
    } = module;

    let mut patcher = Patcher {
        types,
        pending,
        decls: &decls,
        func: None,
        inst: None,
        patched: vec![false; pending.len()],
    };

    for (key, global) in globals.iter_mut() {
        patcher.global(key, global)?;
    }

    for def in metadata.values_mut() {
        patcher.node(&mut def.node)?;
    }

    for named in named_metadata.iter_mut() {
        for node in named.nodes.iter_mut() {
            patcher.md_node(node)?;
        }
    }

    for group in attr_groups.values_mut() {
        patcher.attrs(&mut group.attrs)?;
    }

    // every placeholder is reachable from the walk above
    if let Some(index) = patcher.patched.iter().position(|done| !done) {
        let r = &pending.refs[index];

        return Err(patcher.unresolved(r));
    }

    Ok(())
}

// every named type has to be defined exactly once
fn check_named_types(module: &Module, sites: &Sites) -> ParseResult<()> {
    let mut seen = SaHashMap::default();

    for (index, entity) in module.entities().iter().enumerate() {
        if let Entity::TypeDef(named) = entity {
            if seen.insert(*named, index).is_some() {
                let name = module.types().named(*named).name().with_sigil('%');

                return Err(duplicate(name, "module", sites.get(Site::TypeDef(index))));
            }
        }
    }

    for (named, def) in module.types().named_types() {
        if def.body().is_none() {
            return Err(ParseError::UnresolvedReference {
                ident: def.name().with_sigil('%'),
                scope: "module".into(),
                pos: sites.get(Site::TypeUse(named)),
            });
        }
    }

    Ok(())
}

fn declare(module: &mut Module, sites: &Sites) -> ParseResult<Declarations> {
    let mut decls = Declarations::default();
    let keys: Vec<Global> = module.globals().map(|(k, _)| k).collect();

    for key in keys {
        let ty = module.global_value_type(key);
        let name = module.global(key).name().clone();

        decls.names.insert(key, name.with_sigil('@'));

        if decls.globals.insert(name.clone(), (key, ty)).is_some() {
            return Err(duplicate(name.with_sigil('@'), "module", sites.get(Site::Global(key))));
        }
    }

    let label = module.types_mut().label();

    for (key, func) in module.functions() {
        if let Some(body) = &func.body {
            let scope = declare_locals(key, func, body, label, module.types(), &decls, sites)?;

            decls.locals.insert(key, scope);
        }
    }

    for (key, def) in module.metadata_nodes() {
        if decls.metadata.insert(def.id, key).is_some() {
            return Err(duplicate(format!("!{}", def.id), "module", sites.get(Site::Metadata(key))));
        }
    }

    for (key, def) in module.attr_groups.iter() {
        if decls.attr_groups.insert(def.id, key).is_some() {
            return Err(duplicate(format!("#{}", def.id), "module", sites.get(Site::AttrGroup(key))));
        }
    }

    for (key, def) in module.comdats.iter() {
        if decls.comdats.insert(def.name.clone(), key).is_some() {
            return Err(duplicate(def.name.with_sigil('$'), "module", sites.get(Site::Comdat(key))));
        }
    }

    Ok(decls)
}

// numbers the unnamed locals the same way the parser checked them: params,
// then each block's label followed by its non-void instructions
fn declare_locals(
    key: Global,
    func: &Function,
    body: &FunctionBody,
    label: Type,
    types: &TypeContext,
    decls: &Declarations,
    sites: &Sites,
) -> ParseResult<SaHashMap<Ident, (Local, Type)>> {
    let mut scope = SaHashMap::default();
    let mut slots = SlotCounter::new();
    let scope_name = || format!("function '{}'", decls.names[&key]);

    let mut define = |ident: Ident, local: Local, ty: Type, site: Site| {
        if scope.insert(ident.clone(), (local, ty)).is_some() {
            return Err(duplicate(ident.with_sigil('%'), scope_name(), sites.get(site)));
        }

        Ok(())
    };

    for (param, def) in func.params.iter() {
        let ident = match &def.name {
            Some(name) => Ident::Name(name.clone()),
            None => Ident::Id(slots.take()),
        };

        define(ident, Local::Param(param), def.ty, Site::Param(key, param))?;
    }

    for (block, def) in body.blocks() {
        let ident = match def.name() {
            Some(name) => Ident::Name(name.to_owned()),
            None => Ident::Id(slots.take()),
        };

        define(ident, Local::Block(block), label, Site::Block(key, block))?;

        for &inst in def.insts() {
            let data = body.inst(inst);
            let ident = match data.name() {
                Some(name) => Ident::Name(name.to_owned()),
                None if types.is_void(data.ty()) => continue,
                None => Ident::Id(slots.take()),
            };

            define(ident, Local::Inst(inst), data.ty(), Site::Inst(key, inst))?;
        }
    }

    Ok(scope)
}

// walks the module and patches placeholders in place
struct Patcher<'r> {
    types: &'r TypeContext,
    pending: &'r PendingRefs,
    decls: &'r Declarations,
    func: Option<Global>,
    // the instruction whose operands are being patched, and whether it's a phi
    inst: Option<(Inst, bool)>,
    patched: Vec<bool>,
}

impl<'r> Patcher<'r> {
    fn scope_name(&self, scope: Scope) -> String {
        match scope {
            Scope::Function(func) => format!("function '{}'", self.decls.names[&func]),
            Scope::BlockAddress => match self.func {
                Some(func) => format!("function '{}'", self.decls.names[&func]),
                None => "module".into(),
            },
            _ => "module".into(),
        }
    }

    fn unresolved(&self, r: &PendingRef) -> ParseError {
        ParseError::UnresolvedReference {
            ident: r.ident.with_sigil(r.scope.sigil()),
            scope: self.scope_name(r.scope),
            pos: r.pos,
        }
    }

    // takes a placeholder, marking it as handled
    fn take(&mut self, placeholder: Placeholder) -> &'r PendingRef {
        self.patched[placeholder.index()] = true;
        self.pending.get(placeholder)
    }

    fn check_type(&self, r: &PendingRef, actual: Type) -> ParseResult<()> {
        match r.expected {
            Some(expected) if !self.types.compatible(expected, actual) => Err(ParseError::mismatch(
                r.pos,
                format!(
                    "'{}' is defined with type '{}' but used as '{}'",
                    r.ident.with_sigil(r.scope.sigil()),
                    stringify_ty(self.types, actual),
                    stringify_ty(self.types, expected)
                ),
            )),
            _ => Ok(()),
        }
    }

    fn lookup_global(&mut self, placeholder: Placeholder) -> ParseResult<Global> {
        let r = self.take(placeholder);
        let (global, ty) = *self.decls.globals.get(&r.ident).ok_or_else(|| self.unresolved(r))?;

        self.check_type(r, ty)?;

        Ok(global)
    }

    fn global(&mut self, key: Global, global: &mut GlobalValue) -> ParseResult<()> {
        match &mut global.kind {
            GlobalKind::Variable(var) => {
                if let Some(init) = &mut var.init {
                    self.constant(init)?;
                }

                if let Some(comdat) = &mut var.comdat {
                    self.comdat(comdat)?;
                }

                self.attachments(&mut var.attachments)
            }
            GlobalKind::Alias(alias) | GlobalKind::IFunc(alias) => self.constant(&mut alias.target.value),
            GlobalKind::Function(func) => {
                self.func = Some(key);

                let result = self.function(func);

                self.func = None;

                result
            }
        }
    }

    fn function(&mut self, func: &mut Function) -> ParseResult<()> {
        self.attrs(&mut func.ret_attrs)?;
        self.attrs(&mut func.fn_attrs)?;

        for param in func.params.values_mut() {
            self.attrs(&mut param.attrs)?;
        }

        if let Some(comdat) = &mut func.comdat {
            self.comdat(comdat)?;
        }

        for c in [&mut func.prefix, &mut func.prologue, &mut func.personality]
            .into_iter()
            .flatten()
        {
            self.constant(&mut c.value)?;
        }

        self.attachments(&mut func.attachments)?;

        let body = match &mut func.body {
            Some(body) => body,
            None => return Ok(()),
        };

        let keys: Vec<Inst> = body.insts().map(|(k, _)| k).collect();

        for key in keys {
            let inst = body.inst_mut(key);

            self.inst = Some((key, inst.kind.is_phi()));
            self.inst_kind(&mut inst.kind)?;
            self.attachments(&mut inst.attachments)?;
        }

        self.inst = None;

        Ok(())
    }

    fn value(&mut self, value: &mut Value) -> ParseResult<()> {
        match value {
            Value::Placeholder(placeholder) => {
                let r = self.take(*placeholder);

                *value = match r.scope {
                    Scope::Module => {
                        let (global, ty) = *self.decls.globals.get(&r.ident).ok_or_else(|| self.unresolved(r))?;

                        self.check_type(r, ty)?;

                        Value::Global(global)
                    }
                    Scope::Function(func) => {
                        let (local, ty) = self
                            .decls
                            .locals
                            .get(&func)
                            .and_then(|scope| scope.get(&r.ident))
                            .copied()
                            .ok_or_else(|| self.unresolved(r))?;

                        if let (Local::Inst(inst), Some((current, false))) = (local, self.inst) {
                            if inst == current {
                                return Err(self.unresolved(r));
                            }
                        }

                        self.check_type(r, ty)?;

                        match local {
                            Local::Param(param) => Value::Argument(param),
                            Local::Block(block) => Value::Block(block),
                            Local::Inst(inst) => Value::Inst(inst),
                        }
                    }
                    _ => return Err(self.unresolved(r)),
                };

                Ok(())
            }
            Value::Const(c) => self.constant(c),
            Value::Metadata(md) => self.metadata(md),
            _ => Ok(()),
        }
    }

    fn typed(&mut self, value: &mut TypedValue) -> ParseResult<()> {
        self.value(&mut value.value)
    }

    fn typed_all<'v>(&mut self, values: impl IntoIterator<Item = &'v mut TypedValue>) -> ParseResult<()> {
        for value in values {
            self.typed(value)?;
        }

        Ok(())
    }

    fn constant(&mut self, c: &mut Constant) -> ParseResult<()> {
        match c {
            Constant::Global(global) => {
                if let Ref::Pending(placeholder) = *global {
                    *global = Ref::Resolved(self.lookup_global(placeholder)?);
                }

                Ok(())
            }
            Constant::Array(elems) | Constant::Vector(elems) | Constant::Struct(elems) => {
                for elem in elems {
                    self.constant(&mut elem.value)?;
                }

                Ok(())
            }
            Constant::BlockAddress { func, block } => {
                let target = match *func {
                    Ref::Pending(placeholder) => {
                        let target = self.lookup_global(placeholder)?;

                        *func = Ref::Resolved(target);

                        target
                    }
                    Ref::Resolved(target) => target,
                };

                if let Ref::Pending(placeholder) = *block {
                    let r = self.take(placeholder);
                    let found = self
                        .decls
                        .locals
                        .get(&target)
                        .and_then(|scope| scope.get(&r.ident))
                        .copied();

                    match found {
                        Some((Local::Block(b), _)) => *block = Ref::Resolved(b),
                        _ => {
                            return Err(ParseError::UnresolvedReference {
                                ident: r.ident.with_sigil('%'),
                                scope: format!("function '{}'", self.decls.names[&target]),
                                pos: r.pos,
                            })
                        }
                    }
                }

                Ok(())
            }
            Constant::Expr(expr) => self.const_expr(expr),
            _ => Ok(()),
        }
    }

    fn const_expr(&mut self, expr: &mut ConstExpr) -> ParseResult<()> {
        let operands: Vec<&mut TypedConst> = match expr {
            ConstExpr::Binary { lhs, rhs, .. } | ConstExpr::ICmp { lhs, rhs, .. } | ConstExpr::FCmp { lhs, rhs, .. } => {
                vec![lhs, rhs]
            }
            ConstExpr::FNeg(operand) => vec![operand],
            ConstExpr::Cast { value, .. } => vec![value],
            ConstExpr::GetElementPtr { base, indices, .. } => {
                let mut all = vec![base];

                all.extend(indices.iter_mut());
                all
            }
            ConstExpr::Select {
                cond,
                on_true,
                on_false,
            } => vec![cond, on_true, on_false],
            ConstExpr::ExtractElement { vector, index } => vec![vector, index],
            ConstExpr::InsertElement { vector, elem, index } => vec![vector, elem, index],
            ConstExpr::ShuffleVector { lhs, rhs, mask } => vec![lhs, rhs, mask],
            ConstExpr::ExtractValue { aggregate, .. } => vec![aggregate],
            ConstExpr::InsertValue { aggregate, elem, .. } => vec![aggregate, elem],
        };

        for operand in operands {
            self.constant(&mut operand.value)?;
        }

        Ok(())
    }

    fn md_node(&mut self, node: &mut Ref<MdNode>) -> ParseResult<()> {
        if let Ref::Pending(placeholder) = *node {
            let r = self.take(placeholder);
            let id = match r.ident {
                Ident::Id(id) => id,
                Ident::Name(_) => return Err(self.unresolved(r)),
            };

            let key = *self.decls.metadata.get(&id).ok_or_else(|| self.unresolved(r))?;

            *node = Ref::Resolved(key);
        }

        Ok(())
    }

    fn metadata(&mut self, md: &mut Metadata) -> ParseResult<()> {
        match md {
            Metadata::Node(node) => self.md_node(node),
            Metadata::Inline(data) => self.node(data),
            Metadata::Value(value) => self.typed(value),
            Metadata::Null | Metadata::String(_) => Ok(()),
        }
    }

    fn node(&mut self, data: &mut MdNodeData) -> ParseResult<()> {
        match &mut data.kind {
            MdNodeKind::Tuple(elems) => {
                for elem in elems {
                    self.metadata(elem)?;
                }
            }
            MdNodeKind::Specialized { fields, .. } => {
                for field in fields {
                    if let MdFieldValue::Metadata(md) = &mut field.value {
                        self.metadata(md)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn attachments(&mut self, attachments: &mut [Attachment]) -> ParseResult<()> {
        for attachment in attachments {
            self.metadata(&mut attachment.node)?;
        }

        Ok(())
    }

    fn attrs(&mut self, attrs: &mut [Attribute]) -> ParseResult<()> {
        for attr in attrs {
            if let Attribute::Group(group) = attr {
                if let Ref::Pending(placeholder) = *group {
                    let r = self.take(placeholder);
                    let id = match r.ident {
                        Ident::Id(id) => id,
                        Ident::Name(_) => return Err(self.unresolved(r)),
                    };

                    let key = *self.decls.attr_groups.get(&id).ok_or_else(|| self.unresolved(r))?;

                    *group = Ref::Resolved(key);
                }
            }
        }

        Ok(())
    }

    fn comdat(&mut self, comdat: &mut ComdatRef) -> ParseResult<()> {
        if let Ref::Pending(placeholder) = comdat.comdat {
            let r = self.take(placeholder);
            let key = *self.decls.comdats.get(&r.ident).ok_or_else(|| self.unresolved(r))?;

            comdat.comdat = Ref::Resolved(key);
        }

        Ok(())
    }

    fn call_site(&mut self, site: &mut CallSite) -> ParseResult<()> {
        self.attrs(&mut site.ret_attrs)?;
        self.attrs(&mut site.fn_attrs)?;
        self.value(&mut site.callee)?;

        for arg in &mut site.args {
            self.attrs(&mut arg.attrs)?;
            self.value(&mut arg.value)?;
        }

        for bundle in &mut site.bundles {
            self.typed_all(&mut bundle.inputs)?;
        }

        Ok(())
    }

    fn inst_kind(&mut self, kind: &mut InstKind) -> ParseResult<()> {
        match kind {
            InstKind::Binary { lhs, rhs, .. }
            | InstKind::ICmp { lhs, rhs, .. }
            | InstKind::FCmp { lhs, rhs, .. } => self.typed_all([lhs, rhs]),
            InstKind::FNeg { operand, .. } => self.typed(operand),
            InstKind::ExtractElement { vector, index } => self.typed_all([vector, index]),
            InstKind::InsertElement { vector, elem, index } => self.typed_all([vector, elem, index]),
            InstKind::ShuffleVector { lhs, rhs, mask } => self.typed_all([lhs, rhs, mask]),
            InstKind::ExtractValue { aggregate, .. } => self.typed(aggregate),
            InstKind::InsertValue { aggregate, elem, .. } => self.typed_all([aggregate, elem]),
            InstKind::Alloca { count, .. } => self.typed_all(count.iter_mut()),
            InstKind::Load { ptr, .. } => self.typed(ptr),
            InstKind::Store { value, ptr, .. } => self.typed_all([value, ptr]),
            InstKind::Fence { .. } | InstKind::Unreachable => Ok(()),
            InstKind::CmpXchg { ptr, cmp, new, .. } => self.typed_all([ptr, cmp, new]),
            InstKind::AtomicRmw { ptr, value, .. } => self.typed_all([ptr, value]),
            InstKind::GetElementPtr { base, indices, .. } => {
                self.typed(base)?;
                self.typed_all(indices.iter_mut())
            }
            InstKind::Cast { value, .. }
            | InstKind::VaArg { list: value }
            | InstKind::Freeze { value }
            | InstKind::Resume { value } => self.typed(value),
            InstKind::Phi { incoming, .. } => {
                for edge in incoming {
                    self.value(&mut edge.value)?;
                    self.value(&mut edge.block)?;
                }

                Ok(())
            }
            InstKind::Select {
                cond,
                on_true,
                on_false,
                ..
            } => self.typed_all([cond, on_true, on_false]),
            InstKind::Call { site, .. } => self.call_site(site),
            InstKind::LandingPad { clauses, .. } => {
                for clause in clauses {
                    match clause {
                        Clause::Catch(value) | Clause::Filter(value) => self.typed(value)?,
                    }
                }

                Ok(())
            }
            InstKind::CatchPad { within, args } | InstKind::CleanupPad { within, args } => {
                self.value(within)?;
                self.typed_all(args.iter_mut())
            }
            InstKind::Ret { value } => self.typed_all(value.iter_mut()),
            InstKind::Br { dest } => self.typed(dest),
            InstKind::CondBr { cond, if_true, if_false } => self.typed_all([cond, if_true, if_false]),
            InstKind::Switch { value, default, cases } => {
                self.typed_all([value, default])?;

                for (case, dest) in cases {
                    self.typed_all([case, dest])?;
                }

                Ok(())
            }
            InstKind::IndirectBr { address, dests } => {
                self.typed(address)?;
                self.typed_all(dests.iter_mut())
            }
            InstKind::Invoke { site, normal, unwind } => {
                self.call_site(site)?;
                self.typed_all([normal, unwind])
            }
            InstKind::CallBr {
                site,
                fallthrough,
                indirect,
            } => {
                self.call_site(site)?;
                self.typed(fallthrough)?;
                self.typed_all(indirect.iter_mut())
            }
            InstKind::CatchSwitch {
                within,
                handlers,
                unwind,
            } => {
                self.value(within)?;
                self.typed_all(handlers.iter_mut())?;
                self.typed_all(unwind.iter_mut())
            }
            InstKind::CatchRet { from, dest } => {
                self.value(from)?;
                self.typed(dest)
            }
            InstKind::CleanupRet { from, unwind } => {
                self.value(from)?;
                self.typed_all(unwind.iter_mut())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::*;
    use crate::reader::{parse_module, ParseError};

    fn parse(source: &str) -> Module {
        parse_module("test.ll", source).expect("parse failed")
    }

    fn error(source: &str) -> ParseError {
        parse_module("test.ll", source).expect_err("parse succeeded")
    }

    #[test]
    fn forward_references_bind_to_definitions() {
        let module = parse("@p = global i32* @x\n@x = global i32 1\n");
        let x = module.find_global(&Ident::Name("x".into())).unwrap();
        let p = module.find_global(&Ident::Name("p".into())).unwrap();

        assert_eq!(
            module.global(p).as_variable().unwrap().init,
            Some(Constant::Global(Ref::Resolved(x)))
        );
    }

    #[test]
    fn locals_are_scoped_to_their_function() {
        let err = error(
            "define i32 @f(i32 %a) {\n  ret i32 %a\n}\ndefine i32 @g() {\n  ret i32 %a\n}\n",
        );

        assert_eq!(
            err,
            ParseError::UnresolvedReference {
                ident: "%a".into(),
                scope: "function '@g'".into(),
                pos: crate::reader::SourcePos {
                    offset: 67,
                    line: 5,
                    col: 11,
                },
            }
        );
    }

    #[test]
    fn numbered_locals_resolve_in_order() {
        let module = parse("define i32 @f(i32) {\n  %2 = add i32 %0, 1\n  br label %3\n\n  ret i32 %2\n}\n");
        let (_, func) = module.functions().next().unwrap();
        let body = func.body.as_ref().unwrap();
        let insts: Vec<_> = body.insts().collect();

        match insts[0].1.kind() {
            InstKind::Binary { lhs, .. } => assert!(matches!(lhs.value, Value::Argument(_))),
            other => panic!("unexpected {other:?}"),
        }

        match insts[2].1.kind() {
            InstKind::Ret { value: Some(v) } => assert_eq!(v.value, Value::Inst(insts[0].0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cyclic_metadata() {
        let module = parse("!0 = !{!1}\n!1 = !{!0}\n");
        let nodes: Vec<_> = module.metadata_nodes().collect();

        match &nodes[0].1.node.kind {
            MdNodeKind::Tuple(elems) => assert_eq!(elems[0], Metadata::Node(Ref::Resolved(nodes[1].0))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn duplicates() {
        assert!(matches!(
            error("@x = global i32 0\n@x = global i32 1\n"),
            ParseError::DuplicateDefinition { pos, .. } if pos.line == 2
        ));
        assert!(matches!(
            error("define void @f(i32 %a) {\n  %a = add i32 1, 2\n  ret void\n}\n"),
            ParseError::DuplicateDefinition { ref scope, .. } if scope == "function '@f'"
        ));
        assert!(matches!(
            error("%T = type i32\n%T = type i8\n"),
            ParseError::DuplicateDefinition { ref ident, .. } if ident == "%T"
        ));
        assert!(matches!(error("!0 = !{}\n!0 = !{}\n"), ParseError::DuplicateDefinition { .. }));
    }

    #[test]
    fn undefined_named_types() {
        assert!(matches!(
            error("@x = external global %Missing\n"),
            ParseError::UnresolvedReference { ref ident, pos, .. } if ident == "%Missing" && pos.col == 22
        ));
    }

    #[test]
    fn self_reference_outside_phi() {
        assert!(matches!(
            error("define i32 @f() {\n  %x = add i32 %x, 1\n  ret i32 %x\n}\n"),
            ParseError::UnresolvedReference { .. }
        ));

        parse("define i32 @f() {\nentry:\n  br label %loop\nloop:\n  %x = phi i32 [0, %entry], [%x, %loop]\n  br label %loop\n}\n");
    }

    #[test]
    fn use_types_are_checked() {
        assert!(matches!(
            error("define void @f(i32 %a) {\n  %b = add i64 %a, 1\n  ret void\n}\n"),
            ParseError::TypeMismatch { .. }
        ));
        assert!(matches!(
            error("define void @f() {\n  call void @g(i32 1)\n  ret void\n}\ndeclare void @g(i64)\n"),
            ParseError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn opaque_pointers_accept_any_pointee() {
        parse("@x = global i32 0\n@p = global ptr @x\n");
    }

    #[test]
    fn implicit_comdats_need_a_definition() {
        parse("$f = comdat any\ndefine void @f() comdat {\n  ret void\n}\n");

        assert!(matches!(
            error("define void @f() comdat {\n  ret void\n}\n"),
            ParseError::UnresolvedReference { ref ident, .. } if ident == "$f"
        ));
    }

    #[test]
    fn block_addresses() {
        let module = parse("@a = global i8* blockaddress(@f, %bb)\ndefine void @f() {\n  br label %bb\nbb:\n  ret void\n}\n");
        let a = module.find_global(&Ident::Name("a".into())).unwrap();

        assert!(matches!(
            module.global(a).as_variable().unwrap().init,
            Some(Constant::BlockAddress {
                func: Ref::Resolved(_),
                block: Ref::Resolved(_)
            })
        ));

        assert!(matches!(
            error("@a = global i8* blockaddress(@f, %nope)\ndefine void @f() {\n  ret void\n}\n"),
            ParseError::UnresolvedReference { ref scope, .. } if scope == "function '@f'"
        ));
    }
}
