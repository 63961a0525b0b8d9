//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::values::{fast_math_text, index_list, wrap_flags_text};
use super::{AttrStyle, WriterImpl};
use crate::ir::*;
use crate::utility::quoted;

// continuation lines of `invoke` and `landingpad`
const CONTINUATION: &str = "\n          ";

fn syncscope_text(scope: &Option<Vec<u8>>) -> String {
    match scope {
        Some(scope) => format!(" syncscope({})", quoted(scope)),
        None => String::default(),
    }
}

fn align_text(align: Option<u64>) -> String {
    match align {
        Some(align) => format!(", align {align}"),
        None => String::default(),
    }
}

impl<'m> WriterImpl<'m> {
    /// One instruction without its indentation or newline.
    pub(super) fn inst_text(&self, inst: Inst, data: &Instruction) -> String {
        let mut result = String::default();

        if let Some(ident) = self
            .func
            .and_then(|func| self.locals.get(&func))
            .and_then(|names| names.insts.get(&inst))
        {
            result += &ident.with_sigil('%');
            result += " = ";
        }

        result += &self.inst_kind(data.ty(), data.kind());

        for attachment in data.attachments() {
            result += ", ";
            result += &self.attachment(attachment);
        }

        result
    }

    fn values(&self, values: &[TypedValue]) -> String {
        values
            .iter()
            .map(|tv| self.typed_value(tv))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn unwind_dest(&self, unwind: &Option<TypedValue>) -> String {
        match unwind {
            Some(label) => self.typed_value(label),
            None => "to caller".to_owned(),
        }
    }

    // everything after `call` and its fast-math flags, or after `invoke`
    fn call_site(&self, site: &CallSite) -> String {
        let mut result = String::default();

        if let Some(cconv) = site.cconv {
            result += &Self::cconv(cconv);
            result += " ";
        }

        if !site.ret_attrs.is_empty() {
            result += &self.attrs(&site.ret_attrs, AttrStyle::Param);
            result += " ";
        }

        if let Some(addrspace) = site.addrspace {
            result += &format!("addrspace({addrspace}) ");
        }

        let args: Vec<String> = site
            .args
            .iter()
            .map(|arg| {
                let mut text = self.ty(arg.ty);

                if !arg.attrs.is_empty() {
                    text += " ";
                    text += &self.attrs(&arg.attrs, AttrStyle::Param);
                }

                text + " " + &self.value(arg.ty, &arg.value)
            })
            .collect();

        result += &format!(
            "{} {}({})",
            self.ty(site.written_ty),
            self.value(site.fn_ty, &site.callee),
            args.join(", ")
        );

        if !site.fn_attrs.is_empty() {
            result += " ";
            result += &self.attrs(&site.fn_attrs, AttrStyle::Param);
        }

        if !site.bundles.is_empty() {
            let bundles: Vec<String> = site
                .bundles
                .iter()
                .map(|bundle| format!("{}({})", quoted(&bundle.tag), self.values(&bundle.inputs)))
                .collect();

            result += &format!(" [ {} ]", bundles.join(", "));
        }

        result
    }

    fn inst_kind(&self, ty: Type, kind: &InstKind) -> String {
        match kind {
            InstKind::Binary {
                op,
                flags,
                fmf,
                lhs,
                rhs,
            } => format!(
                "{}{}{} {}, {}",
                op.keyword(),
                wrap_flags_text(*flags),
                fast_math_text(*fmf),
                self.typed_value(lhs),
                self.value(rhs.ty, &rhs.value)
            ),
            InstKind::FNeg { fmf, operand } => {
                format!("fneg{} {}", fast_math_text(*fmf), self.typed_value(operand))
            }
            InstKind::ExtractElement { vector, index } => {
                format!("extractelement {}, {}", self.typed_value(vector), self.typed_value(index))
            }
            InstKind::InsertElement { vector, elem, index } => format!(
                "insertelement {}, {}, {}",
                self.typed_value(vector),
                self.typed_value(elem),
                self.typed_value(index)
            ),
            InstKind::ShuffleVector { lhs, rhs, mask } => format!(
                "shufflevector {}, {}, {}",
                self.typed_value(lhs),
                self.typed_value(rhs),
                self.typed_value(mask)
            ),
            InstKind::ExtractValue { aggregate, indices } => {
                format!("extractvalue {}{}", self.typed_value(aggregate), index_list(indices))
            }
            InstKind::InsertValue {
                aggregate,
                elem,
                indices,
            } => format!(
                "insertvalue {}, {}{}",
                self.typed_value(aggregate),
                self.typed_value(elem),
                index_list(indices)
            ),
            InstKind::Alloca {
                inalloca,
                allocated,
                count,
                align,
                addrspace,
            } => {
                let mut result = format!(
                    "alloca{} {}",
                    if *inalloca { " inalloca" } else { "" },
                    self.ty(*allocated)
                );

                if let Some(count) = count {
                    result += ", ";
                    result += &self.typed_value(count);
                }

                result += &align_text(*align);

                if let Some(addrspace) = addrspace {
                    result += &format!(", addrspace({addrspace})");
                }

                result
            }
            InstKind::Load {
                atomic,
                volatile,
                ptr,
                syncscope,
                ordering,
                align,
            } => format!(
                "load{}{} {}, {}{}{}{}",
                if *atomic { " atomic" } else { "" },
                if *volatile { " volatile" } else { "" },
                self.ty(ty),
                self.typed_value(ptr),
                syncscope_text(syncscope),
                ordering.map(|o| format!(" {}", o.keyword())).unwrap_or_default(),
                align_text(*align)
            ),
            InstKind::Store {
                atomic,
                volatile,
                value,
                ptr,
                syncscope,
                ordering,
                align,
            } => format!(
                "store{}{} {}, {}{}{}{}",
                if *atomic { " atomic" } else { "" },
                if *volatile { " volatile" } else { "" },
                self.typed_value(value),
                self.typed_value(ptr),
                syncscope_text(syncscope),
                ordering.map(|o| format!(" {}", o.keyword())).unwrap_or_default(),
                align_text(*align)
            ),
            InstKind::Fence { syncscope, ordering } => {
                format!("fence{} {}", syncscope_text(syncscope), ordering.keyword())
            }
            InstKind::CmpXchg {
                weak,
                volatile,
                ptr,
                cmp,
                new,
                syncscope,
                success,
                failure,
                align,
            } => format!(
                "cmpxchg{}{} {}, {}, {}{} {} {}{}",
                if *weak { " weak" } else { "" },
                if *volatile { " volatile" } else { "" },
                self.typed_value(ptr),
                self.typed_value(cmp),
                self.typed_value(new),
                syncscope_text(syncscope),
                success.keyword(),
                failure.keyword(),
                align_text(*align)
            ),
            InstKind::AtomicRmw {
                volatile,
                op,
                ptr,
                value,
                syncscope,
                ordering,
                align,
            } => format!(
                "atomicrmw{} {} {}, {}{} {}{}",
                if *volatile { " volatile" } else { "" },
                op.keyword(),
                self.typed_value(ptr),
                self.typed_value(value),
                syncscope_text(syncscope),
                ordering.keyword(),
                align_text(*align)
            ),
            InstKind::GetElementPtr {
                inbounds,
                source,
                base,
                indices,
            } => {
                let mut result = format!(
                    "getelementptr{} {}, {}",
                    if *inbounds { " inbounds" } else { "" },
                    self.ty(*source),
                    self.typed_value(base)
                );

                for index in indices {
                    result += ", ";
                    result += &self.typed_value(index);
                }

                result
            }
            InstKind::Cast { op, value } => {
                format!("{} {} to {}", op.keyword(), self.typed_value(value), self.ty(ty))
            }
            InstKind::ICmp { pred, lhs, rhs } => format!(
                "icmp {} {}, {}",
                pred.keyword(),
                self.typed_value(lhs),
                self.value(rhs.ty, &rhs.value)
            ),
            InstKind::FCmp { fmf, pred, lhs, rhs } => format!(
                "fcmp{} {} {}, {}",
                fast_math_text(*fmf),
                pred.keyword(),
                self.typed_value(lhs),
                self.value(rhs.ty, &rhs.value)
            ),
            InstKind::Phi { fmf, incoming } => {
                let incoming: Vec<String> = incoming
                    .iter()
                    .map(|inc| format!("[ {}, {} ]", self.value(ty, &inc.value), self.value(ty, &inc.block)))
                    .collect();

                format!("phi{} {} {}", fast_math_text(*fmf), self.ty(ty), incoming.join(", "))
            }
            InstKind::Select {
                fmf,
                cond,
                on_true,
                on_false,
            } => format!(
                "select{} {}, {}, {}",
                fast_math_text(*fmf),
                self.typed_value(cond),
                self.typed_value(on_true),
                self.typed_value(on_false)
            ),
            InstKind::Call { tail, fmf, site } => {
                let tail = tail.map(|t| format!("{} ", t.keyword())).unwrap_or_default();

                format!("{tail}call{} {}", fast_math_text(*fmf), self.call_site(site))
            }
            InstKind::VaArg { list } => format!("va_arg {}, {}", self.typed_value(list), self.ty(ty)),
            InstKind::LandingPad { cleanup, clauses } => {
                let mut result = format!("landingpad {}", self.ty(ty));

                if *cleanup {
                    result += CONTINUATION;
                    result += "cleanup";
                }

                for clause in clauses {
                    let (word, tv) = match clause {
                        Clause::Catch(tv) => ("catch", tv),
                        Clause::Filter(tv) => ("filter", tv),
                    };

                    result += CONTINUATION;
                    result += &format!("{word} {}", self.typed_value(tv));
                }

                result
            }
            InstKind::CatchPad { within, args } => {
                format!("catchpad within {} [{}]", self.value(ty, within), self.values(args))
            }
            InstKind::CleanupPad { within, args } => {
                format!("cleanuppad within {} [{}]", self.value(ty, within), self.values(args))
            }
            InstKind::Freeze { value } => format!("freeze {}", self.typed_value(value)),
            InstKind::Ret { value: None } => "ret void".to_owned(),
            InstKind::Ret { value: Some(value) } => format!("ret {}", self.typed_value(value)),
            InstKind::Br { dest } => format!("br {}", self.typed_value(dest)),
            InstKind::CondBr {
                cond,
                if_true,
                if_false,
            } => format!(
                "br {}, {}, {}",
                self.typed_value(cond),
                self.typed_value(if_true),
                self.typed_value(if_false)
            ),
            InstKind::Switch { value, default, cases } => {
                let mut result = format!("switch {}, {} [", self.typed_value(value), self.typed_value(default));

                for (case, dest) in cases {
                    result += &format!("\n    {}, {}", self.typed_value(case), self.typed_value(dest));
                }

                result + "\n  ]"
            }
            InstKind::IndirectBr { address, dests } => {
                format!("indirectbr {}, [{}]", self.typed_value(address), self.values(dests))
            }
            InstKind::Invoke { site, normal, unwind } => format!(
                "invoke {}{CONTINUATION}to {} unwind {}",
                self.call_site(site),
                self.typed_value(normal),
                self.typed_value(unwind)
            ),
            InstKind::CallBr {
                site,
                fallthrough,
                indirect,
            } => format!(
                "callbr {}{CONTINUATION}to {} [{}]",
                self.call_site(site),
                self.typed_value(fallthrough),
                self.values(indirect)
            ),
            InstKind::Resume { value } => format!("resume {}", self.typed_value(value)),
            InstKind::CatchSwitch {
                within,
                handlers,
                unwind,
            } => format!(
                "catchswitch within {} [{}] unwind {}",
                self.value(ty, within),
                self.values(handlers),
                self.unwind_dest(unwind)
            ),
            InstKind::CatchRet { from, dest } => {
                format!("catchret from {} to {}", self.value(ty, from), self.typed_value(dest))
            }
            InstKind::CleanupRet { from, unwind } => {
                format!("cleanupret from {} unwind {}", self.value(ty, from), self.unwind_dest(unwind))
            }
            InstKind::Unreachable => "unreachable".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    fn roundtrip(source: &str) {
        let module = crate::parse(source).expect("parse failed");
        let text = crate::print(&module);

        assert_eq!(text, source);
    }

    #[test]
    fn arithmetic_and_memory() {
        roundtrip(
            r#"define float @f(i32 %a, float %b, i32* %p, <4 x i32> %v) {
entry:
  %0 = add nuw nsw i32 %a, 1
  %1 = udiv exact i32 %0, 2
  %2 = fadd nnan nsz float %b, 1.000000e+00
  %3 = fneg fast float %2
  %4 = alloca i32, i32 4, align 16
  %5 = load volatile i32, i32* %p, align 4
  store atomic i32 %5, i32* %4 syncscope("agent") release, align 4
  fence seq_cst
  %6 = cmpxchg weak i32* %p, i32 0, i32 1 acq_rel monotonic
  %7 = extractvalue { i32, i1 } %6, 0
  %8 = atomicrmw volatile add i32* %p, i32 1 seq_cst
  %9 = getelementptr inbounds i32, i32* %p, i64 1
  %10 = bitcast i32* %9 to i8*
  %11 = icmp slt i32 %7, %8
  %12 = fcmp fast olt float %3, 0.000000e+00
  %13 = select i1 %11, i32 %7, i32 %8
  %14 = extractelement <4 x i32> %v, i32 0
  %15 = insertelement <4 x i32> %v, i32 %14, i32 1
  %16 = shufflevector <4 x i32> %15, <4 x i32> undef, <4 x i32> zeroinitializer
  %17 = freeze i32 %13
  ret float %3
}
"#,
        );
    }

    #[test]
    fn control_flow() {
        roundtrip(
            r#"define i32 @f(i1 %c, i32 %v, i8* %addr) {
entry:
  br i1 %c, label %a, label %b

a:
  switch i32 %v, label %b [
    i32 0, label %a
    i32 7, label %b
  ]

b:
  %r = phi i32 [ 0, %entry ], [ %v, %a ]
  indirectbr i8* %addr, [label %a, label %b]
}
"#,
        );
    }

    #[test]
    fn calls_and_exception_handling() {
        roundtrip(
            r#"declare i32 @g(i32, ...)

declare i32 @__gxx_personality_v0(...)

define void @f() personality i32 (...)* @__gxx_personality_v0 {
entry:
  %0 = tail call fastcc noundef i32 (i32, ...) @g(i32 signext 1, i32 2) #0 [ "deopt"(i32 3) ]
  %1 = call i32 asm sideeffect "nop", "=r"()
  %2 = invoke i32 (i32, ...) @g(i32 1)
          to label %ok unwind label %lpad

ok:
  ret void

lpad:
  %3 = landingpad { i8*, i32 }
          cleanup
          catch i8* null
  resume { i8*, i32 } %3
}

attributes #0 = { nounwind }
"#,
        );
    }

    #[test]
    fn callbr_targets() {
        roundtrip(
            r#"define i32 @f(i32 %x) {
entry:
  %r = callbr i32 asm "jmp ${1:l}", "=r,!i"()
          to label %next [label %fail]

next:
  ret i32 %r

fail:
  ret i32 %x
}
"#,
        );
    }

    #[test]
    fn funclet_pads() {
        roundtrip(
            r#"declare void @g()

declare i32 @__CxxFrameHandler3(...)

define void @f() personality i32 (...)* @__CxxFrameHandler3 {
entry:
  invoke void @g()
          to label %ok unwind label %dispatch

ok:
  ret void

dispatch:
  %cs = catchswitch within none [label %handler] unwind to caller

handler:
  %p = catchpad within %cs [i8* null, i32 64]
  catchret from %p to label %ok

cleanup:
  %c = cleanuppad within none []
  cleanupret from %c unwind label %dispatch
}
"#,
        );
    }
}
