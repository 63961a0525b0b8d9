//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{Attribute, Metadata, Type, TypedValue, Value};
use paste::paste;
use smallvec::SmallVec;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

keyword_enum! {
    /// Every keyword that can start an instruction.
    pub enum Opcode {
        FNeg => "fneg",
        Add => "add",
        FAdd => "fadd",
        Sub => "sub",
        FSub => "fsub",
        Mul => "mul",
        FMul => "fmul",
        UDiv => "udiv",
        SDiv => "sdiv",
        FDiv => "fdiv",
        URem => "urem",
        SRem => "srem",
        FRem => "frem",
        Shl => "shl",
        LShr => "lshr",
        AShr => "ashr",
        And => "and",
        Or => "or",
        Xor => "xor",
        ExtractElement => "extractelement",
        InsertElement => "insertelement",
        ShuffleVector => "shufflevector",
        ExtractValue => "extractvalue",
        InsertValue => "insertvalue",
        Alloca => "alloca",
        Load => "load",
        Store => "store",
        Fence => "fence",
        CmpXchg => "cmpxchg",
        AtomicRmw => "atomicrmw",
        GetElementPtr => "getelementptr",
        Trunc => "trunc",
        ZExt => "zext",
        SExt => "sext",
        FPTrunc => "fptrunc",
        FPExt => "fpext",
        FPToUI => "fptoui",
        FPToSI => "fptosi",
        UIToFP => "uitofp",
        SIToFP => "sitofp",
        PtrToInt => "ptrtoint",
        IntToPtr => "inttoptr",
        BitCast => "bitcast",
        AddrSpaceCast => "addrspacecast",
        ICmp => "icmp",
        FCmp => "fcmp",
        Phi => "phi",
        Select => "select",
        Call => "call",
        VaArg => "va_arg",
        LandingPad => "landingpad",
        CatchPad => "catchpad",
        CleanupPad => "cleanuppad",
        Freeze => "freeze",
        Ret => "ret",
        Br => "br",
        Switch => "switch",
        IndirectBr => "indirectbr",
        Invoke => "invoke",
        CallBr => "callbr",
        Resume => "resume",
        CatchSwitch => "catchswitch",
        CatchRet => "catchret",
        CleanupRet => "cleanupret",
        Unreachable => "unreachable",
    }
}

impl Opcode {
    /// Maps the opcode to a binary operator, if it is one.
    pub fn as_binary(self) -> Option<BinaryOp> {
        BinaryOp::from_keyword(self.keyword())
    }

    /// Maps the opcode to a cast, if it is one.
    pub fn as_cast(self) -> Option<CastOp> {
        CastOp::from_keyword(self.keyword())
    }
}

keyword_enum! {
    /// The two-operand arithmetic and bitwise operators.
    pub enum BinaryOp {
        Add => "add",
        FAdd => "fadd",
        Sub => "sub",
        FSub => "fsub",
        Mul => "mul",
        FMul => "fmul",
        UDiv => "udiv",
        SDiv => "sdiv",
        FDiv => "fdiv",
        URem => "urem",
        SRem => "srem",
        FRem => "frem",
        Shl => "shl",
        LShr => "lshr",
        AShr => "ashr",
        And => "and",
        Or => "or",
        Xor => "xor",
    }
}

impl BinaryOp {
    /// Checks if the operator works on floating-point operands.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            BinaryOp::FAdd | BinaryOp::FSub | BinaryOp::FMul | BinaryOp::FDiv | BinaryOp::FRem
        )
    }

    /// Checks if the operator accepts `nuw` and `nsw`.
    pub fn allows_wrap_flags(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Shl
        )
    }

    /// Checks if the operator accepts `exact`.
    pub fn allows_exact(self) -> bool {
        matches!(
            self,
            BinaryOp::UDiv | BinaryOp::SDiv | BinaryOp::LShr | BinaryOp::AShr
        )
    }
}

keyword_enum! {
    /// The conversion operators.
    pub enum CastOp {
        Trunc => "trunc",
        ZExt => "zext",
        SExt => "sext",
        FPTrunc => "fptrunc",
        FPExt => "fpext",
        FPToUI => "fptoui",
        FPToSI => "fptosi",
        UIToFP => "uitofp",
        SIToFP => "sitofp",
        PtrToInt => "ptrtoint",
        IntToPtr => "inttoptr",
        BitCast => "bitcast",
        AddrSpaceCast => "addrspacecast",
    }
}

keyword_enum! {
    /// Integer comparison predicates.
    pub enum ICmpPred {
        Eq => "eq",
        Ne => "ne",
        Ugt => "ugt",
        Uge => "uge",
        Ult => "ult",
        Ule => "ule",
        Sgt => "sgt",
        Sge => "sge",
        Slt => "slt",
        Sle => "sle",
    }
}

keyword_enum! {
    /// Floating-point comparison predicates.
    pub enum FCmpPred {
        False => "false",
        Oeq => "oeq",
        Ogt => "ogt",
        Oge => "oge",
        Olt => "olt",
        Ole => "ole",
        One => "one",
        Ord => "ord",
        Ueq => "ueq",
        Ugt => "ugt",
        Uge => "uge",
        Ult => "ult",
        Ule => "ule",
        Une => "une",
        Uno => "uno",
        True => "true",
    }
}

keyword_enum! {
    /// Memory orderings for atomic operations.
    pub enum AtomicOrdering {
        Unordered => "unordered",
        Monotonic => "monotonic",
        Acquire => "acquire",
        Release => "release",
        AcqRel => "acq_rel",
        SeqCst => "seq_cst",
    }
}

keyword_enum! {
    /// The operations an `atomicrmw` can perform.
    pub enum AtomicRmwOp {
        Xchg => "xchg",
        Add => "add",
        Sub => "sub",
        And => "and",
        Nand => "nand",
        Or => "or",
        Xor => "xor",
        Max => "max",
        Min => "min",
        UMax => "umax",
        UMin => "umin",
        FAdd => "fadd",
        FSub => "fsub",
        FMax => "fmax",
        FMin => "fmin",
    }
}

keyword_enum! {
    /// Tail call markers.
    pub enum TailKind {
        Tail => "tail",
        MustTail => "musttail",
        NoTail => "notail",
    }
}

/// `nuw`, `nsw` and `exact`.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct WrapFlags {
    /// `nuw`
    pub nuw: bool,
    /// `nsw`
    pub nsw: bool,
    /// `exact`
    pub exact: bool,
}

macro_rules! fast_math_flags {
    ($($flag:ident = $bit:literal),+ $(,)?) => {
        /// The fast-math flags that can be put on floating-point operations.
        #[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
        #[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
        pub struct FastMathFlags {
            bits: u8,
        }

        paste! {
            impl FastMathFlags {
                /// The keyword of every flag, in canonical order.
                pub const NAMES: &'static [&'static str] = &[$(stringify!($flag)),+];

                $(
                    #[doc = concat!("Checks if `", stringify!($flag), "` is set.")]
                    pub fn $flag(self) -> bool {
                        self.bits & (1 << $bit) != 0
                    }

                    #[doc = concat!("Sets or clears `", stringify!($flag), "`.")]
                    pub fn [<set_ $flag>](&mut self, value: bool) {
                        if value {
                            self.bits |= 1 << $bit;
                        } else {
                            self.bits &= !(1 << $bit);
                        }
                    }
                )+
            }
        }
    };
}

fast_math_flags! {
    nnan = 0,
    ninf = 1,
    nsz = 2,
    arcp = 3,
    contract = 4,
    afn = 5,
    reassoc = 6,
}

impl FastMathFlags {
    /// Every flag set, which is spelled `fast`.
    pub fn fast() -> Self {
        Self {
            bits: (1u8 << Self::NAMES.len()) - 1,
        }
    }

    /// Checks if no flag is set.
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Checks if every flag is set.
    pub fn is_fast(self) -> bool {
        self == Self::fast()
    }

    /// Sets the flag spelled `word`, returning `false` if `word` isn't a
    /// fast-math flag. `fast` sets every flag.
    pub fn set_keyword(&mut self, word: &str) -> bool {
        if word == "fast" {
            *self = Self::fast();

            return true;
        }

        match Self::NAMES.iter().position(|name| *name == word) {
            Some(i) => {
                self.bits |= 1 << i;

                true
            }
            None => false,
        }
    }

    /// The keywords of every set flag, in canonical order.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.bits & (1 << i) != 0)
            .map(|(_, name)| *name)
    }
}

keyword_enum! {
    /// The named calling conventions.
    pub enum CallingConvKind {
        C => "ccc",
        Fast => "fastcc",
        Cold => "coldcc",
        Tail => "tailcc",
        Swift => "swiftcc",
        SwiftTail => "swifttailcc",
        Ghc => "ghccc",
        WebKitJs => "webkit_jscc",
        AnyReg => "anyregcc",
        PreserveMost => "preserve_mostcc",
        PreserveAll => "preserve_allcc",
        CxxFastTls => "cxx_fast_tlscc",
        X86StdCall => "x86_stdcallcc",
        X86FastCall => "x86_fastcallcc",
        X86ThisCall => "x86_thiscallcc",
        X86VectorCall => "x86_vectorcallcc",
        X86RegCall => "x86_regcallcc",
        X86_64SysV => "x86_64_sysvcc",
        Win64 => "win64cc",
        ArmApcs => "arm_apcscc",
        ArmAapcs => "arm_aapcscc",
        ArmAapcsVfp => "arm_aapcs_vfpcc",
        Aarch64VectorPcs => "aarch64_vector_pcs",
        Msp430Intr => "msp430_intrcc",
        PtxKernel => "ptx_kernel",
        PtxDevice => "ptx_device",
        SpirFunc => "spir_func",
        SpirKernel => "spir_kernel",
        IntelOclBi => "intel_ocl_bicc",
        AmdgpuKernel => "amdgpu_kernel",
    }
}

/// A calling convention, either one of the named ones or `cc N`.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum CallingConv {
    /// A named convention, `fastcc`
    Named(CallingConvKind),
    /// A numbered convention, `cc 10`
    Numbered(u32),
}

/// A metadata attachment, `!dbg !12`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Attachment {
    /// The attachment kind, without the `!`
    pub kind: String,
    /// The attached node
    pub node: Metadata,
}

/// An argument to a call, including any parameter attributes written on it.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Arg {
    /// The argument's type
    pub ty: Type,
    /// Attributes between the type and the value
    pub attrs: Vec<Attribute>,
    /// The argument itself
    pub value: Value,
}

/// An operand bundle on a call, `[ "deopt"(i32 1) ]`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct OperandBundle {
    /// The bundle's tag
    pub tag: Vec<u8>,
    /// The bundle's inputs
    pub inputs: Vec<TypedValue>,
}

/// Everything shared between `call` and `invoke`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct CallSite {
    /// The calling convention, if one was written
    pub cconv: Option<CallingConv>,
    /// Attributes on the return value
    pub ret_attrs: Vec<Attribute>,
    /// `addrspace(N)` on the callee
    pub addrspace: Option<u32>,
    /// The type written after the return attributes. This is either the
    /// return type or the full function type (needed for varargs callees).
    pub written_ty: Type,
    /// The function type of the callee
    pub fn_ty: Type,
    /// The function being called
    pub callee: Value,
    /// The arguments
    pub args: Vec<Arg>,
    /// Function attributes after the argument list
    pub fn_attrs: Vec<Attribute>,
    /// Operand bundles
    pub bundles: Vec<OperandBundle>,
}

/// A landing pad clause.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Clause {
    /// `catch T v`
    Catch(TypedValue),
    /// `filter T v`
    Filter(TypedValue),
}

/// One incoming edge of a `phi`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Incoming {
    /// The value flowing in
    pub value: Value,
    /// The predecessor it flows in from
    pub block: Value,
}

/// The operation an instruction performs, along with its operands.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum InstKind {
    /// `add`, `fadd`, `shl`, `and`, etc.
    Binary {
        /// The operator
        op: BinaryOp,
        /// `nuw`, `nsw`, `exact`
        flags: WrapFlags,
        /// Fast-math flags (floating-point operators only)
        fmf: FastMathFlags,
        /// Left operand
        lhs: TypedValue,
        /// Right operand
        rhs: TypedValue,
    },
    /// `fneg`
    FNeg {
        /// Fast-math flags
        fmf: FastMathFlags,
        /// The operand
        operand: TypedValue,
    },
    /// `extractelement`
    ExtractElement {
        /// The vector
        vector: TypedValue,
        /// The lane
        index: TypedValue,
    },
    /// `insertelement`
    InsertElement {
        /// The vector
        vector: TypedValue,
        /// The new lane value
        elem: TypedValue,
        /// The lane
        index: TypedValue,
    },
    /// `shufflevector`
    ShuffleVector {
        /// First input
        lhs: TypedValue,
        /// Second input
        rhs: TypedValue,
        /// The lane mask
        mask: TypedValue,
    },
    /// `extractvalue`
    ExtractValue {
        /// The aggregate
        aggregate: TypedValue,
        /// The path of member indices
        indices: SmallVec<[u32; 2]>,
    },
    /// `insertvalue`
    InsertValue {
        /// The aggregate
        aggregate: TypedValue,
        /// The new member value
        elem: TypedValue,
        /// The path of member indices
        indices: SmallVec<[u32; 2]>,
    },
    /// `alloca`
    Alloca {
        /// `inalloca`
        inalloca: bool,
        /// The type being allocated
        allocated: Type,
        /// The number of elements, if written
        count: Option<TypedValue>,
        /// `align N`
        align: Option<u64>,
        /// `addrspace(N)`
        addrspace: Option<u32>,
    },
    /// `load`
    Load {
        /// `atomic`
        atomic: bool,
        /// `volatile`
        volatile: bool,
        /// The pointer being loaded from
        ptr: TypedValue,
        /// `syncscope("...")`
        syncscope: Option<Vec<u8>>,
        /// The ordering, for atomic loads
        ordering: Option<AtomicOrdering>,
        /// `align N`
        align: Option<u64>,
    },
    /// `store`
    Store {
        /// `atomic`
        atomic: bool,
        /// `volatile`
        volatile: bool,
        /// The value being stored
        value: TypedValue,
        /// The pointer being stored to
        ptr: TypedValue,
        /// `syncscope("...")`
        syncscope: Option<Vec<u8>>,
        /// The ordering, for atomic stores
        ordering: Option<AtomicOrdering>,
        /// `align N`
        align: Option<u64>,
    },
    /// `fence`
    Fence {
        /// `syncscope("...")`
        syncscope: Option<Vec<u8>>,
        /// The ordering
        ordering: AtomicOrdering,
    },
    /// `cmpxchg`
    CmpXchg {
        /// `weak`
        weak: bool,
        /// `volatile`
        volatile: bool,
        /// The pointer being operated on
        ptr: TypedValue,
        /// The expected value
        cmp: TypedValue,
        /// The replacement value
        new: TypedValue,
        /// `syncscope("...")`
        syncscope: Option<Vec<u8>>,
        /// Ordering on success
        success: AtomicOrdering,
        /// Ordering on failure
        failure: AtomicOrdering,
        /// `align N`
        align: Option<u64>,
    },
    /// `atomicrmw`
    AtomicRmw {
        /// `volatile`
        volatile: bool,
        /// The operation
        op: AtomicRmwOp,
        /// The pointer being operated on
        ptr: TypedValue,
        /// The operand
        value: TypedValue,
        /// `syncscope("...")`
        syncscope: Option<Vec<u8>>,
        /// The ordering
        ordering: AtomicOrdering,
        /// `align N`
        align: Option<u64>,
    },
    /// `getelementptr`
    GetElementPtr {
        /// `inbounds`
        inbounds: bool,
        /// The type being indexed into
        source: Type,
        /// The base pointer
        base: TypedValue,
        /// Every index after the base
        indices: Vec<TypedValue>,
    },
    /// `trunc`, `bitcast`, etc.
    Cast {
        /// The cast
        op: CastOp,
        /// The value being converted, the result type is the instruction's type
        value: TypedValue,
    },
    /// `icmp`
    ICmp {
        /// The predicate
        pred: ICmpPred,
        /// Left operand
        lhs: TypedValue,
        /// Right operand
        rhs: TypedValue,
    },
    /// `fcmp`
    FCmp {
        /// Fast-math flags
        fmf: FastMathFlags,
        /// The predicate
        pred: FCmpPred,
        /// Left operand
        lhs: TypedValue,
        /// Right operand
        rhs: TypedValue,
    },
    /// `phi`
    Phi {
        /// Fast-math flags
        fmf: FastMathFlags,
        /// Incoming edges, the value type is the instruction's type
        incoming: Vec<Incoming>,
    },
    /// `select`
    Select {
        /// Fast-math flags
        fmf: FastMathFlags,
        /// The condition
        cond: TypedValue,
        /// Chosen when `cond` is true
        on_true: TypedValue,
        /// Chosen when `cond` is false
        on_false: TypedValue,
    },
    /// `call`
    Call {
        /// `tail`, `musttail`, `notail`
        tail: Option<TailKind>,
        /// Fast-math flags
        fmf: FastMathFlags,
        /// The callee, arguments and attributes
        site: Box<CallSite>,
    },
    /// `va_arg`
    VaArg {
        /// The `va_list` pointer
        list: TypedValue,
    },
    /// `landingpad`
    LandingPad {
        /// `cleanup`
        cleanup: bool,
        /// The clauses
        clauses: Vec<Clause>,
    },
    /// `catchpad within %cs [...]`
    CatchPad {
        /// The `catchswitch` this pad belongs to
        within: Value,
        /// The pad arguments
        args: Vec<TypedValue>,
    },
    /// `cleanuppad within %p [...]` (`within none` is a `none` constant)
    CleanupPad {
        /// The parent pad
        within: Value,
        /// The pad arguments
        args: Vec<TypedValue>,
    },
    /// `freeze`
    Freeze {
        /// The operand
        value: TypedValue,
    },
    /// `ret`
    Ret {
        /// The returned value, `None` for `ret void`
        value: Option<TypedValue>,
    },
    /// `br label %dest`
    Br {
        /// The destination
        dest: TypedValue,
    },
    /// `br i1 %c, label %t, label %f`
    CondBr {
        /// The condition
        cond: TypedValue,
        /// Taken when `cond` is true
        if_true: TypedValue,
        /// Taken when `cond` is false
        if_false: TypedValue,
    },
    /// `switch`
    Switch {
        /// The value being switched on
        value: TypedValue,
        /// The default destination
        default: TypedValue,
        /// `(case value, destination)` pairs
        cases: Vec<(TypedValue, TypedValue)>,
    },
    /// `indirectbr`
    IndirectBr {
        /// The address being jumped to
        address: TypedValue,
        /// The possible destinations
        dests: Vec<TypedValue>,
    },
    /// `invoke`
    Invoke {
        /// The callee, arguments and attributes
        site: Box<CallSite>,
        /// Where control goes on a normal return
        normal: TypedValue,
        /// Where control goes when unwinding
        unwind: TypedValue,
    },
    /// `callbr`
    CallBr {
        /// The callee, arguments and attributes
        site: Box<CallSite>,
        /// Where control goes when the callee returns normally
        fallthrough: TypedValue,
        /// The other blocks the callee may transfer control to
        indirect: Vec<TypedValue>,
    },
    /// `resume`
    Resume {
        /// The exception value
        value: TypedValue,
    },
    /// `catchswitch`
    CatchSwitch {
        /// The parent pad, `none` constant for `within none`
        within: Value,
        /// The handler blocks
        handlers: Vec<TypedValue>,
        /// `unwind label %x`, `None` for `unwind to caller`
        unwind: Option<TypedValue>,
    },
    /// `catchret`
    CatchRet {
        /// The `catchpad` being returned from
        from: Value,
        /// The destination
        dest: TypedValue,
    },
    /// `cleanupret`
    CleanupRet {
        /// The `cleanuppad` being returned from
        from: Value,
        /// `unwind label %x`, `None` for `unwind to caller`
        unwind: Option<TypedValue>,
    },
    /// `unreachable`
    Unreachable,
}

impl InstKind {
    /// Checks if the instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            InstKind::Ret { .. }
                | InstKind::Br { .. }
                | InstKind::CondBr { .. }
                | InstKind::Switch { .. }
                | InstKind::IndirectBr { .. }
                | InstKind::Invoke { .. }
                | InstKind::CallBr { .. }
                | InstKind::Resume { .. }
                | InstKind::CatchSwitch { .. }
                | InstKind::CatchRet { .. }
                | InstKind::CleanupRet { .. }
                | InstKind::Unreachable
        )
    }

    /// Checks if the instruction is a `phi`.
    pub fn is_phi(&self) -> bool {
        matches!(self, InstKind::Phi { .. })
    }
}

/// A single instruction inside of a function body.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Instruction {
    pub(crate) name: Option<String>,
    pub(crate) ty: Type,
    pub(crate) kind: InstKind,
    pub(crate) attachments: Vec<Attachment>,
}

impl Instruction {
    /// Creates an instruction producing a value of type `ty`.
    pub fn new(name: Option<String>, ty: Type, kind: InstKind) -> Self {
        Self {
            name,
            ty,
            kind,
            attachments: Vec::new(),
        }
    }

    /// The name of the result, `None` for unnamed results and void instructions.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Renames the result.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// The result type (`void` for instructions that produce nothing).
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// The operation and its operands.
    pub fn kind(&self) -> &InstKind {
        &self.kind
    }

    /// Mutable access to the operation and its operands.
    pub fn kind_mut(&mut self) -> &mut InstKind {
        &mut self.kind
    }

    /// Metadata attached after the operands.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Attaches metadata to the instruction.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Checks if the instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        self.kind.is_terminator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_keywords_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_keyword(op.keyword()), Some(*op));
        }
    }

    #[test]
    fn opcodes_classify() {
        assert_eq!(Opcode::FAdd.as_binary(), Some(BinaryOp::FAdd));
        assert_eq!(Opcode::FNeg.as_binary(), None);
        assert_eq!(Opcode::AddrSpaceCast.as_cast(), Some(CastOp::AddrSpaceCast));
        assert_eq!(Opcode::Alloca.as_cast(), None);
    }

    #[test]
    fn fast_math_flags() {
        let mut fmf = FastMathFlags::default();

        assert!(fmf.is_empty());
        assert!(fmf.set_keyword("nnan"));
        assert!(fmf.set_keyword("reassoc"));
        assert!(!fmf.set_keyword("nuw"));
        assert!(fmf.nnan());
        assert!(!fmf.ninf());
        assert_eq!(fmf.keywords().collect::<Vec<_>>(), ["nnan", "reassoc"]);

        fmf.set_nnan(false);

        assert_eq!(fmf.keywords().collect::<Vec<_>>(), ["reassoc"]);

        for name in FastMathFlags::NAMES {
            fmf.set_keyword(name);
        }

        assert!(fmf.is_fast());
    }
}
