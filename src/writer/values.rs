//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::{AttrStyle, LocalNames, WriterImpl};
use crate::ir::*;
use crate::utility::{metadata_name_text, name_text, quoted, write_escaped};
use num_bigint::Sign;

/// Spells a type the way it would be written in a module.
///
/// ```
/// # use llasm::ir::TypeContext;
/// # use llasm::writer::stringify_ty;
/// let mut types = TypeContext::new();
/// let i32_ty = types.int(32);
/// let ptr = types.pointer(None, 1);
/// let s = types.structure(&[i32_ty, ptr], true);
///
/// assert_eq!(stringify_ty(&types, s), "<{ i32, ptr addrspace(1) }>");
/// ```
pub fn stringify_ty(types: &TypeContext, ty: Type) -> String {
    match types.data(ty) {
        TypeData::Void => "void".to_owned(),
        TypeData::Int(width) => format!("i{width}"),
        TypeData::Float(kind) => kind.keyword().to_owned(),
        TypeData::X86Mmx => "x86_mmx".to_owned(),
        TypeData::Label => "label".to_owned(),
        TypeData::Token => "token".to_owned(),
        TypeData::Metadata => "metadata".to_owned(),
        TypeData::Pointer { pointee: None, addrspace: 0 } => "ptr".to_owned(),
        TypeData::Pointer {
            pointee: None,
            addrspace,
        } => format!("ptr addrspace({addrspace})"),
        TypeData::Pointer {
            pointee: Some(pointee),
            addrspace: 0,
        } => format!("{}*", stringify_ty(types, *pointee)),
        TypeData::Pointer {
            pointee: Some(pointee),
            addrspace,
        } => format!("{} addrspace({addrspace})*", stringify_ty(types, *pointee)),
        TypeData::Array { len, elem } => format!("[{len} x {}]", stringify_ty(types, *elem)),
        TypeData::Vector {
            len,
            elem,
            scalable,
        } => {
            let vscale = if *scalable { "vscale x " } else { "" };

            format!("<{vscale}{len} x {}>", stringify_ty(types, *elem))
        }
        TypeData::Struct { fields, packed } => {
            let body = if fields.is_empty() {
                "{}".to_owned()
            } else {
                let fields: Vec<String> = fields.iter().map(|f| stringify_ty(types, *f)).collect();

                format!("{{ {} }}", fields.join(", "))
            };

            if *packed {
                format!("<{body}>")
            } else {
                body
            }
        }
        TypeData::Function {
            ret,
            params,
            vararg,
        } => {
            let mut params: Vec<String> = params.iter().map(|p| stringify_ty(types, *p)).collect();

            if *vararg {
                params.push("...".to_owned());
            }

            format!("{} ({})", stringify_ty(types, *ret), params.join(", "))
        }
        TypeData::Named(named) => types.named(*named).name().with_sigil('%'),
    }
}

// `%e` with six digits, if that reads back as exactly `value`
fn exact_decimal(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let text = format!("{value:.6e}");
    let (mantissa, exp) = text.split_once('e')?;
    let exp: i32 = exp.parse().ok()?;
    let sign = if exp < 0 { '-' } else { '+' };
    let text = format!("{mantissa}e{sign}{:02}", exp.unsigned_abs());

    (text.parse::<f64>().ok()?.to_bits() == value.to_bits()).then_some(text)
}

/// Spells a floating-point constant of format `kind`.
pub(super) fn float_text(kind: Option<FloatKind>, value: FloatValue) -> String {
    match value {
        FloatValue::Double(bits) => {
            let decimal = match kind {
                Some(FloatKind::Float | FloatKind::Double) => exact_decimal(f64::from_bits(bits)),
                _ => None,
            };

            decimal.unwrap_or_else(|| format!("0x{bits:016X}"))
        }
        FloatValue::Half(bits) => format!("0xH{bits:04X}"),
        FloatValue::BFloat(bits) => format!("0xR{bits:04X}"),
        FloatValue::X86Fp80(bits) => format!("0xK{bits:020X}"),
        FloatValue::Fp128(bits) => format!("0xL{bits:032X}"),
        FloatValue::PpcFp128(bits) => format!("0xM{bits:032X}"),
    }
}

/// ` nuw nsw exact`, whichever are set, each with a leading space.
pub(super) fn wrap_flags_text(flags: WrapFlags) -> String {
    let mut result = String::default();

    for (set, word) in [(flags.nuw, " nuw"), (flags.nsw, " nsw"), (flags.exact, " exact")] {
        if set {
            result += word;
        }
    }

    result
}

/// Fast-math flags, each with a leading space.
pub(super) fn fast_math_text(fmf: FastMathFlags) -> String {
    if fmf.is_fast() {
        return " fast".to_owned();
    }

    fmf.keywords().map(|word| format!(" {word}")).collect()
}

fn pending(placeholder: Placeholder) -> String {
    format!("<pending #{}>", placeholder.index())
}

impl<'m> WriterImpl<'m> {
    fn current_locals(&self) -> Option<&LocalNames> {
        self.func.and_then(|func| self.locals.get(&func))
    }

    fn local(ident: Option<&Ident>) -> String {
        match ident {
            Some(ident) => ident.with_sigil('%'),
            None => "%<unknown>".to_owned(),
        }
    }

    pub(super) fn global_name(&self, global: Ref<Global>) -> String {
        match global {
            Ref::Resolved(key) => self.module.global(key).name().with_sigil('@'),
            Ref::Pending(placeholder) => pending(placeholder),
        }
    }

    /// `T v`
    pub(super) fn typed_value(&self, tv: &TypedValue) -> String {
        format!("{} {}", self.ty(tv.ty), self.value(tv.ty, &tv.value))
    }

    /// An operand of type `ty`, without the type.
    pub(super) fn value(&self, ty: Type, value: &Value) -> String {
        match value {
            Value::Placeholder(placeholder) => pending(*placeholder),
            Value::Argument(param) => Self::local(self.current_locals().and_then(|n| n.params.get(param))),
            Value::Inst(inst) => Self::local(self.current_locals().and_then(|n| n.insts.get(inst))),
            Value::Block(block) => Self::local(self.current_locals().and_then(|n| n.blocks.get(block))),
            Value::Global(global) => self.global_name(Ref::Resolved(*global)),
            Value::Const(c) => self.constant(ty, c),
            Value::Metadata(md) => self.metadata(md),
            Value::InlineAsm(asm) => {
                let mut result = "asm".to_owned();

                for (set, word) in [
                    (asm.side_effect, " sideeffect"),
                    (asm.align_stack, " alignstack"),
                    (asm.intel_dialect, " inteldialect"),
                    (asm.unwind, " unwind"),
                ] {
                    if set {
                        result += word;
                    }
                }

                format!("{result} {}, {}", quoted(&asm.template), quoted(&asm.constraints))
            }
        }
    }

    /// `T c`
    pub(super) fn typed_const(&self, tc: &TypedConst) -> String {
        format!("{} {}", self.ty(tc.ty), self.constant(tc.ty, &tc.value))
    }

    fn const_list(&self, elems: &[TypedConst]) -> String {
        elems
            .iter()
            .map(|elem| self.typed_const(elem))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// A constant of type `ty`, without the type.
    pub(super) fn constant(&self, ty: Type, constant: &Constant) -> String {
        let types = self.types();

        match constant {
            Constant::Int(value) => match types.int_width(types.scalar(ty)) {
                Some(1) => if value.sign() != Sign::NoSign { "true" } else { "false" }.to_owned(),
                _ => value.to_string(),
            },
            Constant::Float(value) => float_text(types.float_kind(ty), *value),
            Constant::Null => "null".to_owned(),
            Constant::None => "none".to_owned(),
            Constant::Undef => "undef".to_owned(),
            Constant::Poison => "poison".to_owned(),
            Constant::ZeroInitializer => "zeroinitializer".to_owned(),
            Constant::Bytes(bytes) => {
                let mut result = "c\"".to_owned();

                write_escaped(&mut result, bytes);
                result.push('"');

                result
            }
            Constant::Array(elems) => format!("[{}]", self.const_list(elems)),
            Constant::Vector(elems) => format!("<{}>", self.const_list(elems)),
            Constant::Struct(elems) => {
                let packed = matches!(types.data(types.resolve(ty)), TypeData::Struct { packed: true, .. });
                let body = if elems.is_empty() {
                    "{}".to_owned()
                } else {
                    format!("{{ {} }}", self.const_list(elems))
                };

                if packed {
                    format!("<{body}>")
                } else {
                    body
                }
            }
            Constant::Global(global) => self.global_name(*global),
            Constant::BlockAddress { func, block } => {
                let label = match (func, block) {
                    (Ref::Resolved(func), Ref::Resolved(block)) => {
                        Self::local(self.locals.get(func).and_then(|n| n.blocks.get(block)))
                    }
                    (_, Ref::Pending(placeholder)) | (Ref::Pending(placeholder), _) => pending(*placeholder),
                };

                format!("blockaddress({}, {label})", self.global_name(*func))
            }
            Constant::Expr(expr) => self.const_expr(expr),
        }
    }

    fn const_expr(&self, expr: &ConstExpr) -> String {
        match expr {
            ConstExpr::Binary { op, flags, lhs, rhs } => format!(
                "{}{} ({}, {})",
                op.keyword(),
                wrap_flags_text(*flags),
                self.typed_const(lhs),
                self.typed_const(rhs)
            ),
            ConstExpr::FNeg(operand) => format!("fneg ({})", self.typed_const(operand)),
            ConstExpr::Cast { op, value, to } => {
                format!("{} ({} to {})", op.keyword(), self.typed_const(value), self.ty(*to))
            }
            ConstExpr::GetElementPtr {
                inbounds,
                source,
                base,
                indices,
            } => {
                let mut result = format!(
                    "getelementptr{} ({}, {}",
                    if *inbounds { " inbounds" } else { "" },
                    self.ty(*source),
                    self.typed_const(base)
                );

                for index in indices {
                    result += ", ";
                    result += &self.typed_const(index);
                }

                result + ")"
            }
            ConstExpr::ICmp { pred, lhs, rhs } => format!(
                "icmp {} ({}, {})",
                pred.keyword(),
                self.typed_const(lhs),
                self.typed_const(rhs)
            ),
            ConstExpr::FCmp { pred, lhs, rhs } => format!(
                "fcmp {} ({}, {})",
                pred.keyword(),
                self.typed_const(lhs),
                self.typed_const(rhs)
            ),
            ConstExpr::Select {
                cond,
                on_true,
                on_false,
            } => format!(
                "select ({}, {}, {})",
                self.typed_const(cond),
                self.typed_const(on_true),
                self.typed_const(on_false)
            ),
            ConstExpr::ExtractElement { vector, index } => format!(
                "extractelement ({}, {})",
                self.typed_const(vector),
                self.typed_const(index)
            ),
            ConstExpr::InsertElement { vector, elem, index } => format!(
                "insertelement ({}, {}, {})",
                self.typed_const(vector),
                self.typed_const(elem),
                self.typed_const(index)
            ),
            ConstExpr::ShuffleVector { lhs, rhs, mask } => format!(
                "shufflevector ({}, {}, {})",
                self.typed_const(lhs),
                self.typed_const(rhs),
                self.typed_const(mask)
            ),
            ConstExpr::ExtractValue { aggregate, indices } => {
                format!("extractvalue ({}{})", self.typed_const(aggregate), index_list(indices))
            }
            ConstExpr::InsertValue {
                aggregate,
                elem,
                indices,
            } => format!(
                "insertvalue ({}, {}{})",
                self.typed_const(aggregate),
                self.typed_const(elem),
                index_list(indices)
            ),
        }
    }

    /// `!N`
    pub(super) fn md_ref(&self, node: Ref<MdNode>) -> String {
        match node {
            Ref::Resolved(key) => format!("!{}", self.module.metadata_node(key).id),
            Ref::Pending(placeholder) => pending(placeholder),
        }
    }

    /// One metadata operand.
    pub(super) fn metadata(&self, md: &Metadata) -> String {
        match md {
            Metadata::Null => "null".to_owned(),
            Metadata::String(bytes) => format!("!{}", quoted(bytes)),
            Metadata::Node(node) => self.md_ref(*node),
            Metadata::Inline(node) => self.md_node(node),
            Metadata::Value(tv) => self.typed_value(tv),
        }
    }

    /// `[distinct] !{...}` or `[distinct] !Name(...)`
    pub(super) fn md_node(&self, node: &MdNodeData) -> String {
        let distinct = if node.distinct { "distinct " } else { "" };

        match &node.kind {
            MdNodeKind::Tuple(elems) => {
                let elems: Vec<String> = elems.iter().map(|md| self.metadata(md)).collect();

                format!("{distinct}!{{{}}}", elems.join(", "))
            }
            MdNodeKind::Specialized { name, fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|field| {
                        let value = self.md_field_value(&field.value);

                        match &field.name {
                            Some(name) => format!("{}: {value}", name_text(name)),
                            None => value,
                        }
                    })
                    .collect();

                format!("{distinct}!{}({})", metadata_name_text(name), fields.join(", "))
            }
        }
    }

    fn md_field_value(&self, value: &MdFieldValue) -> String {
        match value {
            MdFieldValue::Int(value) => value.to_string(),
            MdFieldValue::Str(bytes) => quoted(bytes),
            MdFieldValue::Bool(value) => value.to_string(),
            MdFieldValue::Metadata(md) => self.metadata(md),
            MdFieldValue::Word(word) => word.clone(),
            MdFieldValue::Flags(flags) => flags.join(" | "),
        }
    }

    /// A space-separated attribute list.
    pub(super) fn attrs(&self, attrs: &[Attribute], style: AttrStyle) -> String {
        attrs
            .iter()
            .map(|attr| self.attr(attr, style))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn attr(&self, attr: &Attribute, style: AttrStyle) -> String {
        match attr {
            Attribute::Enum(kind) => kind.keyword().to_owned(),
            Attribute::Int(kind @ (IntAttrKind::Align | IntAttrKind::AlignStack), value)
                if style == AttrStyle::Group =>
            {
                format!("{}={value}", kind.keyword())
            }
            Attribute::Int(IntAttrKind::Align, value) => format!("align {value}"),
            Attribute::Int(kind, value) => format!("{}({value})", kind.keyword()),
            Attribute::Type(kind, ty) => format!("{}({})", kind.keyword(), self.ty(*ty)),
            Attribute::AllocSize(size, None) => format!("allocsize({size})"),
            Attribute::AllocSize(size, Some(count)) => format!("allocsize({size},{count})"),
            Attribute::String { key, value: None } => quoted(key),
            Attribute::String {
                key,
                value: Some(value),
            } => format!("{}={}", quoted(key), quoted(value)),
            Attribute::Group(Ref::Resolved(group)) => format!("#{}", self.module.attr_group(*group).id),
            Attribute::Group(Ref::Pending(placeholder)) => pending(*placeholder),
        }
    }
}

/// `, 0, 1` for `extractvalue` and `insertvalue`.
pub(super) fn index_list(indices: &[u32]) -> String {
    indices.iter().map(|i| format!(", {i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_are_spelled_canonically() {
        let mut types = TypeContext::new();
        let i8_ty = types.int(8);
        let i32_ty = types.int(32);
        let typed = types.pointer(Some(i8_ty), 0);
        let far = types.pointer(Some(i8_ty), 3);
        let arr = types.array(4, typed);
        let vec = types.vector(2, i32_ty, true);
        let empty = types.structure(&[], false);
        let func = types.function(i32_ty, &[typed], true);
        let named = types.named_type(Ident::Name("struct.S".into()));
        let quoted_name = types.named_type(Ident::Name("a b".into()));

        assert_eq!(stringify_ty(&types, arr), "[4 x i8*]");
        assert_eq!(stringify_ty(&types, far), "i8 addrspace(3)*");
        assert_eq!(stringify_ty(&types, vec), "<vscale x 2 x i32>");
        assert_eq!(stringify_ty(&types, empty), "{}");
        assert_eq!(stringify_ty(&types, func), "i32 (i8*, ...)");
        assert_eq!(stringify_ty(&types, named), "%struct.S");
        assert_eq!(stringify_ty(&types, quoted_name), "%\"a b\"");
    }

    #[test]
    fn doubles_print_in_decimal_when_exact() {
        let double = Some(FloatKind::Double);

        assert_eq!(float_text(double, FloatValue::from_f64(1.0)), "1.000000e+00");
        assert_eq!(float_text(double, FloatValue::from_f64(-2.5e-3)), "-2.500000e-03");
        assert_eq!(float_text(double, FloatValue::from_f64(1e100)), "1.000000e+100");
        assert_eq!(float_text(double, FloatValue::from_f64(0.1)), "1.000000e-01");
        assert_eq!(float_text(double, FloatValue::from_f64(1.0 / 3.0)), "0x3FD5555555555555");
        assert_eq!(float_text(double, FloatValue::from_f64(f64::INFINITY)), "0x7FF0000000000000");
    }

    #[test]
    fn decimal_literals_of_other_formats_print_in_their_own_hex() {
        let module = crate::parse(
            "@h = global half 1.0\n@b = global bfloat 0x3FF8000000000000\n@x = global x86_fp80 1.0\n@q = global fp128 -2.0\n@p = global ppc_fp128 1.0\n",
        )
        .unwrap();

        assert_eq!(
            crate::print(&module),
            "@h = global half 0xH3C00\n@b = global bfloat 0xR3FC0\n@x = global x86_fp80 0xK3FFF8000000000000000\n@q = global fp128 0xLC0000000000000000000000000000000\n@p = global ppc_fp128 0xM3FF00000000000000000000000000000\n"
        );
    }

    #[test]
    fn wide_integers_print_in_decimal() {
        let source = "@a = global i128 -1\n@b = global i256 340282366920938463463374607431768211456\n@c = global i1 true\n";
        let module = crate::parse(source).unwrap();

        assert_eq!(crate::print(&module), source);
    }

    #[test]
    fn narrow_and_wide_formats_print_in_hex() {
        assert_eq!(float_text(Some(FloatKind::Half), FloatValue::Half(0x3C00)), "0xH3C00");
        assert_eq!(float_text(Some(FloatKind::BFloat), FloatValue::BFloat(0x3F80)), "0xR3F80");
        assert_eq!(
            float_text(Some(FloatKind::X86Fp80), FloatValue::X86Fp80(0x3FFF8000000000000000)),
            "0xK3FFF8000000000000000"
        );
        assert_eq!(
            float_text(Some(FloatKind::Fp128), FloatValue::Fp128(1)),
            "0xL00000000000000000000000000000001"
        );
    }

    #[test]
    fn flag_order() {
        let flags = WrapFlags {
            nuw: true,
            nsw: true,
            exact: false,
        };

        assert_eq!(wrap_flags_text(flags), " nuw nsw");
        assert_eq!(fast_math_text(FastMathFlags::fast()), " fast");

        let mut fmf = FastMathFlags::default();

        fmf.set_nsz(true);
        fmf.set_nnan(true);

        assert_eq!(fast_math_text(fmf), " nnan nsz");
        assert_eq!(index_list(&[0, 2]), ", 0, 2");
    }

    #[test]
    fn constants_and_attributes_round_trip() {
        let source = r#"%pair = type <{ i8, i32 }>

@a = global [2 x i32] [i32 1, i32 -2]
@b = global <2 x float> <float 5.000000e-01, float 0x3FB99999A0000000>
@c = global %pair <{ i8 1, i32 2 }>
@d = global { i1, double } { i1 true, double 1.500000e+00 }
@e = global i32* getelementptr inbounds ([2 x i32], [2 x i32]* @a, i64 0, i64 1)
@f = global i64 add nsw (i64 ptrtoint ([2 x i32]* @a to i64), i64 8)
@g = global {} zeroinitializer
@h = global half 0xH3C00

declare noalias i8* @malloc(i64) allocsize(0)

declare void @use(i8* byval(i8) align 4, i32 dereferenceable(8)) #0

attributes #0 = { alignstack=16 nounwind "no-frame-pointer-elim"="true" "nop" }
"#;

        let module = crate::parse(source).unwrap();

        assert_eq!(crate::print(&module), source);
    }
}
