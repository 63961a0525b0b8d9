//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Module -> text.
//!
//! The output is canonical: every optional piece of syntax is written in one
//! fixed order and spacing, unnamed locals get their numbers back, and
//! parsing the output again gives a module equal to the one printed.

mod instructions;
mod values;

use crate::ir::*;
use crate::utility::{metadata_name_text, quoted, SaHashMap};
use std::ops::Range;

pub use values::stringify_ty;

/// Turns an entire module into text, and then maps each global, block and
/// instruction to the range of text it was printed as.
///
/// ```
/// let module = llasm::parse("define i32 @id(i32 %x) {\n  ret i32 %x\n}\n").unwrap();
/// let writer = llasm::writer::ModuleWriter::new(&module);
/// let (id, _) = module.functions().next().unwrap();
///
/// assert!(writer.global(id).starts_with("define i32 @id(i32 %x) {"));
/// ```
#[derive(Debug, Clone)]
pub struct ModuleWriter {
    whole: String,
    global_ranges: SaHashMap<Global, Range<usize>>,
    block_ranges: SaHashMap<(Global, Block), Range<usize>>,
    inst_ranges: SaHashMap<(Global, Inst), Range<usize>>,
}

impl ModuleWriter {
    /// Prints `module`.
    pub fn new(module: &Module) -> Self {
        let mut writer_impl = WriterImpl {
            module,
            state: ModuleWriter {
                whole: String::default(),
                global_ranges: SaHashMap::default(),
                block_ranges: SaHashMap::default(),
                inst_ranges: SaHashMap::default(),
            },
            locals: SaHashMap::default(),
            func: None,
        };

        writer_impl.walk();

        writer_impl.state
    }

    /// The text of a global, from its first keyword up to (and including)
    /// the newline that ends it. For definitions this is the entire body.
    ///
    /// # Panics
    /// Panics if `global` isn't in the module that was printed.
    pub fn global(&self, global: Global) -> &str {
        &self.whole[self.global_ranges[&global].clone()]
    }

    /// The text of a block: its label (if printed) and every instruction.
    ///
    /// # Panics
    /// Panics if `block` isn't a block of `func` in the module that was printed.
    pub fn block(&self, func: Global, block: Block) -> &str {
        &self.whole[self.block_ranges[&(func, block)].clone()]
    }

    /// The text of a single instruction, indentation and newline included.
    ///
    /// # Panics
    /// Panics if `inst` isn't an instruction of `func` in the module that was printed.
    pub fn inst(&self, func: Global, inst: Inst) -> &str {
        &self.whole[self.inst_ranges[&(func, inst)].clone()]
    }

    /// Returns the entire module as a string.
    pub fn module(&self) -> &str {
        &self.whole
    }

    /// Takes the text of the entire module.
    pub fn into_string(self) -> String {
        self.whole
    }
}

// the names locals print with, following the same numbering the parser checks
#[derive(Debug, Default)]
struct LocalNames {
    params: SaHashMap<Param, Ident>,
    blocks: SaHashMap<Block, Ident>,
    insts: SaHashMap<Inst, Ident>,
}

impl LocalNames {
    fn number(types: &TypeContext, func: &Function) -> Self {
        let mut names = Self::default();
        let mut slots = SlotCounter::new();

        for (param, def) in func.params.iter() {
            let ident = match &def.name {
                Some(name) => Ident::Name(name.clone()),
                // declarations don't number their parameters
                None if func.is_definition() => Ident::Id(slots.take()),
                None => continue,
            };

            names.params.insert(param, ident);
        }

        let Some(body) = &func.body else {
            return names;
        };

        for (block, data) in body.blocks() {
            let ident = match data.name() {
                Some(name) => Ident::Name(name.to_owned()),
                None => Ident::Id(slots.take()),
            };

            names.blocks.insert(block, ident);

            for &inst in data.insts() {
                let inst_data = body.inst(inst);
                let ident = match inst_data.name() {
                    Some(name) => Ident::Name(name.to_owned()),
                    None if types.is_void(inst_data.ty()) => continue,
                    None => Ident::Id(slots.take()),
                };

                names.insts.insert(inst, ident);
            }
        }

        names
    }
}

// entities of one class print without blank lines between them, except
// functions, which are always separated
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum EntityClass {
    Directive,
    ModuleAsm,
    TypeDef,
    Comdat,
    Variable,
    Alias,
    IFunc,
    Function,
    AttrGroup,
    NamedMetadata,
    Metadata,
}

struct WriterImpl<'m> {
    module: &'m Module,
    state: ModuleWriter,
    locals: SaHashMap<Global, LocalNames>,
    // the function whose locals are in scope
    func: Option<Global>,
}

impl<'m> WriterImpl<'m> {
    fn types(&self) -> &'m TypeContext {
        self.module.types()
    }

    fn ty(&self, ty: Type) -> String {
        stringify_ty(self.types(), ty)
    }

    fn walk(&mut self) {
        let module = self.module;

        for (key, func) in module.functions() {
            self.locals.insert(key, LocalNames::number(self.types(), func));
        }

        log::debug!("writer: printing {} entities", module.entities().len());

        let mut prev = None;

        for entity in module.entities() {
            let class = self.class_of(entity);

            if let Some(prev) = prev {
                if prev != class || class == EntityClass::Function {
                    self.state.whole += "\n";
                }
            }

            prev = Some(class);

            self.visit_entity(entity);
        }
    }

    fn class_of(&self, entity: &Entity) -> EntityClass {
        match entity {
            Entity::SourceFilename(_) | Entity::DataLayout(_) | Entity::Triple(_) => EntityClass::Directive,
            Entity::ModuleAsm(_) => EntityClass::ModuleAsm,
            Entity::TypeDef(_) => EntityClass::TypeDef,
            Entity::Comdat(_) => EntityClass::Comdat,
            Entity::Global(g) => match self.module.global(*g).kind() {
                GlobalKind::Variable(_) => EntityClass::Variable,
                GlobalKind::Alias(_) => EntityClass::Alias,
                GlobalKind::IFunc(_) => EntityClass::IFunc,
                GlobalKind::Function(_) => EntityClass::Function,
            },
            Entity::AttrGroup(_) => EntityClass::AttrGroup,
            Entity::NamedMetadata(_) => EntityClass::NamedMetadata,
            Entity::Metadata(_) => EntityClass::Metadata,
        }
    }

    fn visit_entity(&mut self, entity: &Entity) {
        let module = self.module;

        match entity {
            Entity::SourceFilename(name) => self.line(format!("source_filename = {}", quoted(name))),
            Entity::DataLayout(layout) => self.line(format!("target datalayout = {}", quoted(layout))),
            Entity::Triple(triple) => self.line(format!("target triple = {}", quoted(triple))),
            Entity::ModuleAsm(asm) => self.line(format!("module asm {}", quoted(asm))),
            Entity::TypeDef(named) => {
                let def = self.types().named(*named);
                let body = match def.body() {
                    Some(NamedBody::Defined(ty)) => self.ty(ty),
                    _ => "opaque".to_owned(),
                };

                self.line(format!("{} = type {body}", def.name().with_sigil('%')));
            }
            Entity::Comdat(comdat) => {
                let def = module.comdat(*comdat);

                self.line(format!(
                    "{} = comdat {}",
                    def.name.with_sigil('$'),
                    def.selection.keyword()
                ));
            }
            Entity::Global(global) => self.visit_global(*global),
            Entity::AttrGroup(group) => {
                let def = module.attr_group(*group);
                let attrs = self.attrs(&def.attrs, AttrStyle::Group);

                if attrs.is_empty() {
                    self.line(format!("attributes #{} = {{ }}", def.id));
                } else {
                    self.line(format!("attributes #{} = {{ {attrs} }}", def.id));
                }
            }
            Entity::NamedMetadata(index) => {
                let named = &module.named_metadata()[*index];
                let nodes: Vec<String> = named.nodes.iter().map(|node| self.md_ref(*node)).collect();

                self.line(format!(
                    "!{} = !{{{}}}",
                    metadata_name_text(&named.name),
                    nodes.join(", ")
                ));
            }
            Entity::Metadata(node) => {
                let def = module.metadata_node(*node);
                let text = self.md_node(&def.node);

                self.line(format!("!{} = {text}", def.id));
            }
        }
    }

    fn line(&mut self, text: String) {
        self.state.whole += &text;
        self.state.whole += "\n";
    }

    fn visit_global(&mut self, key: Global) {
        let begin = self.state.whole.len();
        let module = self.module;
        let global = module.global(key);
        let name = global.name().with_sigil('@');

        match global.kind() {
            GlobalKind::Variable(var) => {
                let text = self.variable(&name, var);

                self.line(text);
            }
            GlobalKind::Alias(alias) => {
                let text = self.alias(&name, "alias", alias);

                self.line(text);
            }
            GlobalKind::IFunc(ifunc) => {
                let text = self.alias(&name, "ifunc", ifunc);

                self.line(text);
            }
            GlobalKind::Function(func) => self.visit_function(key, &name, func),
        }

        let end = self.state.whole.len();

        self.state.global_ranges.insert(key, begin..end);
    }

    // linkage, preemption, visibility and DLL storage, each followed by a space
    fn header(header: &GlobalHeader) -> String {
        let mut result = String::default();

        let words = [
            header.linkage.map(Linkage::keyword),
            header.preemption.map(Preemption::keyword),
            header.visibility.map(Visibility::keyword),
            header.dll_storage.map(DllStorage::keyword),
        ];

        for word in words.into_iter().flatten() {
            result += word;
            result += " ";
        }

        result
    }

    // `thread_local` and `unnamed_addr`, which only variables and aliases write here
    fn storage(header: &GlobalHeader) -> String {
        let mut result = String::default();

        match header.thread_local {
            Some(ThreadLocal::Default) => result += "thread_local ",
            Some(ThreadLocal::Model(model)) => result += &format!("thread_local({}) ", model.keyword()),
            None => {}
        }

        if let Some(unnamed) = header.unnamed_addr {
            result += unnamed.keyword();
            result += " ";
        }

        result
    }

    fn variable(&self, name: &str, var: &GlobalVariable) -> String {
        let mut result = format!("{name} = {}{}", Self::header(&var.header), Self::storage(&var.header));

        if let Some(addrspace) = var.addrspace {
            result += &format!("addrspace({addrspace}) ");
        }

        if var.externally_initialized {
            result += "externally_initialized ";
        }

        result += if var.constant { "constant " } else { "global " };
        result += &self.ty(var.content_ty);

        if let Some(init) = &var.init {
            result += " ";
            result += &self.constant(var.content_ty, init);
        }

        if let Some(section) = &var.section {
            result += &format!(", section {}", quoted(section));
        }

        if let Some(partition) = &var.partition {
            result += &format!(", partition {}", quoted(partition));
        }

        if let Some(comdat) = &var.comdat {
            result += ", ";
            result += &self.comdat_ref(comdat);
        }

        if let Some(align) = var.align {
            result += &format!(", align {align}");
        }

        for attachment in &var.attachments {
            result += ", ";
            result += &self.attachment(attachment);
        }

        result
    }

    fn alias(&self, name: &str, keyword: &str, alias: &Alias) -> String {
        format!(
            "{name} = {}{}{keyword} {}, {}",
            Self::header(&alias.header),
            Self::storage(&alias.header),
            self.ty(alias.value_ty),
            self.typed_const(&alias.target)
        )
    }

    fn comdat_ref(&self, comdat: &ComdatRef) -> String {
        match (comdat.explicit, comdat.comdat) {
            (true, Ref::Resolved(key)) => format!("comdat({})", self.module.comdat(key).name.with_sigil('$')),
            _ => "comdat".to_owned(),
        }
    }

    fn attachment(&self, attachment: &Attachment) -> String {
        format!(
            "!{} {}",
            metadata_name_text(&attachment.kind),
            self.metadata(&attachment.node)
        )
    }

    fn cconv(cconv: CallingConv) -> String {
        match cconv {
            CallingConv::Named(kind) => kind.keyword().to_owned(),
            CallingConv::Numbered(n) => format!("cc {n}"),
        }
    }

    fn visit_function(&mut self, key: Global, name: &str, func: &Function) {
        self.func = Some(key);

        let prototype = self.prototype(key, name, func);

        self.state.whole += &prototype;

        if let Some(body) = &func.body {
            log::trace!("writer: printing body of '{name}'");

            self.state.whole += " {\n";

            let mut first = true;

            for (block, data) in body.blocks() {
                if !first {
                    self.state.whole += "\n";
                }

                self.visit_block(key, block, data, body, first);

                first = false;
            }

            self.state.whole += "}";
        }

        self.state.whole += "\n";
        self.func = None;
    }

    // everything from `define`/`declare` up to the body
    fn prototype(&self, key: Global, name: &str, func: &Function) -> String {
        let types = self.types();
        let mut result = if func.is_definition() { "define " } else { "declare " }.to_owned();

        result += &Self::header(&func.header);

        if let Some(cconv) = func.cconv {
            result += &Self::cconv(cconv);
            result += " ";
        }

        if !func.ret_attrs.is_empty() {
            result += &self.attrs(&func.ret_attrs, AttrStyle::Param);
            result += " ";
        }

        let ret = func.return_ty(types).unwrap_or(func.sig);

        result += &format!("{} {name}(", self.ty(ret));

        let mut params = Vec::new();

        for (param, def) in func.params.iter() {
            let mut text = self.ty(def.ty);

            if !def.attrs.is_empty() {
                text += " ";
                text += &self.attrs(&def.attrs, AttrStyle::Param);
            }

            if let Some(ident) = self.locals.get(&key).and_then(|names| names.params.get(&param)) {
                text += " ";
                text += &ident.with_sigil('%');
            }

            params.push(text);
        }

        if func.is_vararg(types) {
            params.push("...".to_owned());
        }

        result += &params.join(", ");
        result += ")";

        if let Some(unnamed) = func.header.unnamed_addr {
            result += " ";
            result += unnamed.keyword();
        }

        if let Some(addrspace) = func.addrspace {
            result += &format!(" addrspace({addrspace})");
        }

        if !func.fn_attrs.is_empty() {
            result += " ";
            result += &self.attrs(&func.fn_attrs, AttrStyle::Param);
        }

        if let Some(section) = &func.section {
            result += &format!(" section {}", quoted(section));
        }

        if let Some(partition) = &func.partition {
            result += &format!(" partition {}", quoted(partition));
        }

        if let Some(comdat) = &func.comdat {
            result += " ";
            result += &self.comdat_ref(comdat);
        }

        if let Some(align) = func.align {
            result += &format!(" align {align}");
        }

        if let Some(gc) = &func.gc {
            result += &format!(" gc {}", quoted(gc));
        }

        for (keyword, value) in [
            ("prefix", &func.prefix),
            ("prologue", &func.prologue),
            ("personality", &func.personality),
        ] {
            if let Some(value) = value {
                result += &format!(" {keyword} {}", self.typed_const(value));
            }
        }

        for attachment in &func.attachments {
            result += " ";
            result += &self.attachment(attachment);
        }

        result
    }

    fn visit_block(&mut self, func: Global, block: Block, data: &BasicBlock, body: &FunctionBody, entry: bool) {
        let begin = self.state.whole.len();

        // an unnamed entry block gets its number implicitly
        if !(entry && data.name().is_none()) {
            let label = self.locals[&func].blocks[&block].to_string();

            self.state.whole += &label;
            self.state.whole += ":\n";
        }

        for &inst in data.insts() {
            let begin = self.state.whole.len();
            let text = self.inst_text(inst, body.inst(inst));

            self.state.whole += "  ";
            self.state.whole += &text;
            self.state.whole += "\n";

            let end = self.state.whole.len();

            self.state.inst_ranges.insert((func, inst), begin..end);
        }

        let end = self.state.whole.len();

        self.state.block_ranges.insert((func, block), begin..end);
    }
}

/// How an attribute list is spelled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum AttrStyle {
    /// On parameters, return values, calls and function headers, `align 8`
    Param,
    /// Inside of an attribute group, `align=8`
    Group,
}

#[cfg(test)]
mod tests {
    use crate::ir::*;

    fn roundtrip(source: &str) -> String {
        let module = crate::parse(source).expect("parse failed");
        let text = crate::print(&module);
        let again = crate::parse(&text).expect("reparse failed");

        assert_eq!(module, again, "reparsed module differs:\n{text}");

        text
    }

    #[test]
    fn canonical_text_is_unchanged() {
        let source = r#"source_filename = "a.c"
target datalayout = "e-m:e-i64:64"
target triple = "x86_64-unknown-linux-gnu"

%struct.S = type { i32, i8* }
%opaque = type opaque

@g = global i32 42, align 4
@s = private unnamed_addr constant [3 x i8] c"hi\00", align 1
@e = external global %struct.S

define i32 @add(i32 %a, i32 %b) {
entry:
  %sum = add nsw i32 %a, %b
  ret i32 %sum
}

declare void @g2(i8*, ...)

attributes #0 = { nounwind "frame-pointer"="all" }
"#;

        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn unnamed_locals_are_numbered() {
        let source = "define i32 @f(i32 %0) {\n  %2 = add i32 %0, 1\n  br label %3\n\n3:\n  ret i32 %2\n}\n";

        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn blank_lines_follow_entity_classes() {
        let text = roundtrip(
            "@a = global i32 0\n@b = global i32 1\ndeclare void @f()\ndeclare void @g()\ndefine void @h() {\n  ret void\n}\ndefine void @i() {\n  ret void\n}\n",
        );

        assert_eq!(
            text,
            "@a = global i32 0\n@b = global i32 1\n\ndeclare void @f()\n\ndeclare void @g()\n\ndefine void @h() {\n  ret void\n}\n\ndefine void @i() {\n  ret void\n}\n"
        );
    }

    #[test]
    fn module_asm_aliases_and_ifuncs_are_separate_groups() {
        let text = roundtrip(
            "target triple = \"x86_64-unknown-linux-gnu\"\nmodule asm \"nop\"\nmodule asm \"ret\"\n@a = alias i32, i32* @v\n@b = alias i32, i32* @v\n@i = ifunc void (), void ()* ()* @r\n@v = global i32 0\ndeclare void ()* @r()\n",
        );

        assert_eq!(
            text,
            "target triple = \"x86_64-unknown-linux-gnu\"\n\nmodule asm \"nop\"\nmodule asm \"ret\"\n\n@a = alias i32, i32* @v\n@b = alias i32, i32* @v\n\n@i = ifunc void (), void ()* ()* @r\n\n@v = global i32 0\n\ndeclare void ()* @r()\n"
        );
    }

    #[test]
    fn non_canonical_spellings_are_normalized() {
        let text = roundtrip(
            "@x = global i8 255\n@y = global i64 u0x10\n@b = global i1 1\ndefine void @f() {\nbb:\n  br label %bb\n}\n",
        );

        assert!(text.contains("@x = global i8 -1\n"));
        assert!(text.contains("@y = global i64 16\n"));
        assert!(text.contains("@b = global i1 true\n"));
    }

    #[test]
    fn names_are_quoted_when_needed() {
        let text = roundtrip("@\"a b\" = global i32 0\n@\"1x\" = global i32 1\n@ok.name$ = global i32 2\n");

        assert!(text.contains("@\"a b\" = global i32 0"));
        assert!(text.contains("@\"1x\" = global i32 1"));
        assert!(text.contains("@ok.name$ = global i32 2"));
    }

    #[test]
    fn writer_ranges() {
        let module = crate::parse("define void @f() {\nentry:\n  br label %next\n\nnext:\n  ret void\n}\n").unwrap();
        let writer = super::ModuleWriter::new(&module);
        let (key, func) = module.functions().next().unwrap();
        let body = func.body.as_ref().unwrap();
        let blocks: Vec<_> = body.blocks().map(|(b, _)| b).collect();
        let insts: Vec<_> = body.insts().map(|(i, _)| i).collect();

        assert_eq!(writer.block(key, blocks[1]), "next:\n  ret void\n");
        assert_eq!(writer.inst(key, insts[0]), "  br label %next\n");
        assert!(writer.global(key).ends_with("}\n"));
    }

    #[test]
    fn metadata_and_attachments() {
        let source = r#"define void @f() !dbg !2 {
  ret void, !dbg !3
}

!llvm.dbg.cu = !{!0}

!0 = distinct !{!0, !"name", null, i32 7}
!1 = !{}
!2 = distinct !DISubprogram(name: "f", line: 1, spFlags: DISPFlagDefinition | DISPFlagOptimized, unit: !0)
!3 = !DILocation(line: 2, column: 3, scope: !2)
"#;

        assert_eq!(roundtrip(source), source);
    }
}
