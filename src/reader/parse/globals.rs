//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::Parser;
use crate::ir::*;
use crate::reader::resolve::{Scope, Site};
use crate::reader::{ParseError, ParseResult, SourcePos, Token};

impl<'a> Parser<'a> {
    /// `source_filename = "..."`, `target datalayout/triple = "..."` or
    /// `module asm "..."`.
    pub(super) fn parse_directive(&mut self) -> ParseResult<()> {
        let pair = self.next_pair("a directive")?;

        let entity = match pair.tok {
            Token::Word("source_filename") => {
                self.expect(Token::Equal, "'='")?;

                Entity::SourceFilename(self.parse_string("a file name")?)
            }
            Token::Word("target") => {
                let which = self.next_pair("'datalayout' or 'triple'")?;

                self.expect(Token::Equal, "'='")?;

                match which.tok {
                    Token::Word("datalayout") => Entity::DataLayout(self.parse_string("a data layout")?),
                    Token::Word("triple") => Entity::Triple(self.parse_string("a target triple")?),
                    _ => {
                        return Err(ParseError::syntax(
                            which.pos,
                            "'datalayout' or 'triple'",
                            which.tok.describe(),
                        ))
                    }
                }
            }
            Token::Word("module") => {
                self.expect_word("asm")?;

                Entity::ModuleAsm(self.parse_string("an assembly string")?)
            }
            _ => return Err(ParseError::syntax(pair.pos, "a directive", pair.tok.describe())),
        };

        self.module.push_directive(entity);

        Ok(())
    }

    /// `%T = type opaque` or `%T = type <type>`
    pub(super) fn parse_type_def(&mut self) -> ParseResult<()> {
        let pair = self.next_pair("a type name")?;
        let ident = match pair.tok {
            Token::Local(name) => self.ident(name, pair.pos)?,
            _ => return Err(ParseError::syntax(pair.pos, "a type name", pair.tok.describe())),
        };

        Self::check_slot(&mut self.type_slots, &ident, '%', pair.pos)?;

        self.expect(Token::Equal, "'='")?;
        self.expect_word("type")?;

        let named = self.types().named_entry(ident);
        let body = if self.eat_word("opaque")? {
            NamedBody::Opaque
        } else {
            NamedBody::Defined(self.parse_type()?)
        };

        let index = self.module.entities().len();

        self.module.push_type_def(named, body);
        self.record(Site::TypeDef(index), pair.pos);

        Ok(())
    }

    /// `$name = comdat <selection>`
    pub(super) fn parse_comdat(&mut self) -> ParseResult<()> {
        let pair = self.next_pair("a comdat name")?;
        let name = match pair.tok {
            Token::Comdat(name) => self.ident(name, pair.pos)?,
            _ => return Err(ParseError::syntax(pair.pos, "a comdat name", pair.tok.describe())),
        };

        self.expect(Token::Equal, "'='")?;
        self.expect_word("comdat")?;

        let selection = self.expect_keyword(SelectionKind::from_keyword, "a comdat selection kind")?;
        let key = self.module.push_comdat(ComdatDef { name, selection });

        self.record(Site::Comdat(key), pair.pos);

        Ok(())
    }

    /// `@name = ...`, a global variable, alias or ifunc
    pub(super) fn parse_global(&mut self) -> ParseResult<()> {
        let pair = self.next_pair("a global name")?;
        let name = match pair.tok {
            Token::Global(name) => self.ident(name, pair.pos)?,
            _ => return Err(ParseError::syntax(pair.pos, "a global name", pair.tok.describe())),
        };

        Self::check_slot(&mut self.global_slots, &name, '@', pair.pos)?;

        self.expect(Token::Equal, "'='")?;

        let mut header = self.parse_global_header()?;

        header.thread_local = self.parse_thread_local()?;
        header.unnamed_addr = self.eat_keyword(UnnamedAddr::from_keyword)?;

        let kind = if self.eat_word("alias")? {
            GlobalKind::Alias(self.parse_alias_body(header)?)
        } else if self.eat_word("ifunc")? {
            GlobalKind::IFunc(self.parse_alias_body(header)?)
        } else {
            GlobalKind::Variable(self.parse_variable_body(header, &name)?)
        };

        let key = self.module.push_global(GlobalValue::new(name, kind));

        self.record(Site::Global(key), pair.pos);

        Ok(())
    }

    /// Linkage, preemption, visibility and DLL storage, each optional.
    pub(super) fn parse_global_header(&mut self) -> ParseResult<GlobalHeader> {
        Ok(GlobalHeader {
            linkage: self.eat_keyword(Linkage::from_keyword)?,
            preemption: self.eat_keyword(Preemption::from_keyword)?,
            visibility: self.eat_keyword(Visibility::from_keyword)?,
            dll_storage: self.eat_keyword(DllStorage::from_keyword)?,
            thread_local: None,
            unnamed_addr: None,
        })
    }

    // `thread_local` or `thread_local(model)`
    fn parse_thread_local(&mut self) -> ParseResult<Option<ThreadLocal>> {
        if !self.eat_word("thread_local")? {
            return Ok(None);
        }

        if !self.eat(Token::LParen)? {
            return Ok(Some(ThreadLocal::Default));
        }

        let model = self.expect_keyword(TlsModel::from_keyword, "a TLS model")?;

        self.expect(Token::RParen, "')'")?;

        Ok(Some(ThreadLocal::Model(model)))
    }

    // `T, T2 @target` after `alias` or `ifunc`
    fn parse_alias_body(&mut self, header: GlobalHeader) -> ParseResult<Alias> {
        let value_ty = self.parse_type()?;

        self.expect(Token::Comma, "','")?;

        let pos = self.position();
        let target = self.parse_typed_const()?;

        if !self.module.types().is_pointer(target.ty) {
            return Err(ParseError::mismatch(pos, "an alias must have pointer type"));
        }

        Ok(Alias {
            header,
            value_ty,
            target,
        })
    }

    fn parse_variable_body(&mut self, header: GlobalHeader, name: &Ident) -> ParseResult<GlobalVariable> {
        let addrspace = self.parse_opt_addrspace()?;
        let externally_initialized = self.eat_word("externally_initialized")?;

        let constant = match self.peek_keyword()? {
            Some("global") => false,
            Some("constant") => true,
            _ => return self.unexpected("'global' or 'constant'"),
        };

        self.bump()?;

        let ty_pos = self.position();
        let content_ty = self.parse_type()?;

        {
            let types = self.module.types();

            if types.is_void(content_ty) || types.is_label(content_ty) || types.function_info(content_ty).is_some() {
                return Err(ParseError::mismatch(ty_pos, "invalid type for global variable"));
            }
        }

        let declared_only = matches!(header.linkage, Some(Linkage::External | Linkage::ExternWeak));
        let init = if declared_only {
            None
        } else {
            Some(self.parse_const(content_ty)?)
        };

        let mut var = GlobalVariable {
            header,
            addrspace,
            externally_initialized,
            constant,
            content_ty,
            init,
            section: None,
            partition: None,
            comdat: None,
            align: None,
            attachments: Vec::new(),
        };

        while self.peek_tok()? == Some(Token::Comma) {
            if self.at_attachment()? {
                var.attachments = self.parse_trailing_attachments(None)?;

                break;
            }

            self.bump()?;

            let pos = self.position();

            match self.peek_keyword()? {
                Some("section") => {
                    self.bump()?;
                    var.section = Some(self.parse_string("a section name")?);
                }
                Some("partition") => {
                    self.bump()?;
                    var.partition = Some(self.parse_string("a partition name")?);
                }
                Some("comdat") => var.comdat = Some(self.parse_comdat_ref(name)?),
                Some("align") => {
                    self.bump()?;
                    var.align = Some(self.parse_alignment(pos)?);
                }
                _ => return self.unexpected("'section', 'partition', 'comdat', 'align' or an attachment"),
            }
        }

        Ok(var)
    }

    /// `comdat` or `comdat($name)`. A bare `comdat` refers to the comdat
    /// with the same name as the global it's on.
    pub(super) fn parse_comdat_ref(&mut self, owner: &Ident) -> ParseResult<ComdatRef> {
        let pos = self.position();

        self.expect_word("comdat")?;

        if !self.eat(Token::LParen)? {
            let placeholder = self.register(Scope::Comdat, owner.clone(), pos, None);

            return Ok(ComdatRef {
                comdat: Ref::Pending(placeholder),
                explicit: false,
            });
        }

        let pair = self.next_pair("a comdat name")?;
        let ident = match pair.tok {
            Token::Comdat(name) => self.ident(name, pair.pos)?,
            _ => return Err(ParseError::syntax(pair.pos, "a comdat name", pair.tok.describe())),
        };

        self.expect(Token::RParen, "')'")?;

        let placeholder = self.register(Scope::Comdat, ident, pair.pos, None);

        Ok(ComdatRef {
            comdat: Ref::Pending(placeholder),
            explicit: true,
        })
    }

    /// The `N` of an `align N`, which must be a power of two.
    pub(super) fn parse_alignment(&mut self, pos: SourcePos) -> ParseResult<u64> {
        let align = self.parse_u64("an alignment")?;

        if !align.is_power_of_two() {
            return Err(ParseError::syntax(pos, "a power of two alignment", align.to_string()));
        }

        Ok(align)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse::tests::{parse_error, parse_unresolved};

    #[test]
    fn directives() {
        let parsed = parse_unresolved(
            "source_filename = \"a.c\"\ntarget datalayout = \"e-m:e\"\ntarget triple = \"x86_64\"\nmodule asm \"nop\"\n",
        );

        assert_eq!(
            parsed.module.entities(),
            &[
                Entity::SourceFilename(b"a.c".to_vec()),
                Entity::DataLayout(b"e-m:e".to_vec()),
                Entity::Triple(b"x86_64".to_vec()),
                Entity::ModuleAsm(b"nop".to_vec()),
            ]
        );
    }

    #[test]
    fn variable_header_and_trailers() {
        let parsed = parse_unresolved(
            "$c = comdat any\n@g = internal dso_local thread_local(initialexec) local_unnamed_addr addrspace(1) constant i32 7, section \"data\", comdat, align 4\n",
        );
        let (_, global) = parsed.module.globals().next().unwrap();
        let var = global.as_variable().unwrap();

        assert_eq!(var.header.linkage, Some(Linkage::Internal));
        assert_eq!(var.header.preemption, Some(Preemption::DsoLocal));
        assert_eq!(var.header.thread_local, Some(ThreadLocal::Model(TlsModel::InitialExec)));
        assert_eq!(var.header.unnamed_addr, Some(UnnamedAddr::Local));
        assert_eq!(var.addrspace, Some(1));
        assert!(var.constant);
        assert_eq!(var.init, Some(Constant::Int(7.into())));
        assert_eq!(var.section.as_deref(), Some(&b"data"[..]));
        assert!(matches!(var.comdat, Some(ComdatRef { explicit: false, .. })));
        assert_eq!(var.align, Some(4));
    }

    #[test]
    fn external_globals_have_no_initializer() {
        let parsed = parse_unresolved("@e = external global i32\n@w = extern_weak global i8\n");

        assert!(parsed
            .module
            .globals()
            .all(|(_, g)| g.as_variable().unwrap().init.is_none()));
    }

    #[test]
    fn aliases() {
        let parsed = parse_unresolved("@a = hidden alias i32, i32* @x\n@i = ifunc void (), void ()* ()* @r\n");
        let kinds: Vec<_> = parsed.module.globals().map(|(_, g)| g.kind().clone()).collect();

        assert!(matches!(&kinds[0], GlobalKind::Alias(a) if a.header.visibility == Some(Visibility::Hidden)));
        assert!(matches!(&kinds[1], GlobalKind::IFunc(_)));
    }

    #[test]
    fn type_definitions() {
        let parsed = parse_unresolved("%0 = type { i32 }\n%T = type opaque\n");
        let types = parsed.module.types();
        let named = types.find_named(&Ident::Name("T".into())).unwrap();

        assert_eq!(types.named(named).body(), Some(NamedBody::Opaque));
        assert!(matches!(parse_error("%1 = type i32"), ParseError::Syntax { .. }));
    }

    #[test]
    fn bad_alignment() {
        assert!(matches!(
            parse_error("@x = global i32 0, align 3"),
            ParseError::Syntax { .. }
        ));
    }
}
