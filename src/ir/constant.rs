//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{
    BinaryOp, Block, CastOp, FCmpPred, FloatKind, Global, ICmpPred, Ref, Type, WrapFlags,
};
use num_bigint::{BigInt, Sign};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// The bits of a floating-point literal.
///
/// `float` and `double` values are held as the bits of the equivalent
/// `double`. Every other format keeps the exact bits of its own encoding,
/// however the literal was spelled.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum FloatValue {
    /// A value held as a double, `1.5` or `0x3FF8000000000000`
    Double(u64),
    /// `0xH...`
    Half(u16),
    /// `0xR...`
    BFloat(u16),
    /// `0xK...`, the low 80 bits are used
    X86Fp80(u128),
    /// `0xL...`
    Fp128(u128),
    /// `0xM...`
    PpcFp128(u128),
}

impl FloatValue {
    /// Creates a float value from a double.
    pub fn from_f64(value: f64) -> Self {
        FloatValue::Double(value.to_bits())
    }

    /// Encodes `value` in the format of `kind`. `value` must be exactly
    /// representable in that format.
    ///
    /// ```
    /// # use llasm::ir::{FloatKind, FloatValue};
    /// assert_eq!(FloatValue::encode(FloatKind::Half, 1.0), FloatValue::Half(0x3C00));
    /// assert_eq!(FloatValue::encode(FloatKind::X86Fp80, 1.0), FloatValue::X86Fp80(0x3FFF8000000000000000));
    /// ```
    pub fn encode(kind: FloatKind, value: f64) -> Self {
        match kind {
            FloatKind::Float | FloatKind::Double => FloatValue::from_f64(value),
            FloatKind::Half => FloatValue::Half(half_bits(value)),
            FloatKind::BFloat => FloatValue::BFloat(((value as f32).to_bits() >> 16) as u16),
            FloatKind::X86Fp80 => FloatValue::X86Fp80(x87_bits(value)),
            FloatKind::Fp128 => FloatValue::Fp128(quad_bits(value)),
            FloatKind::PpcFp128 => FloatValue::PpcFp128(u128::from(value.to_bits()) << 64),
        }
    }

    /// Gets the double the value holds, if it is held as one.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            FloatValue::Double(bits) => Some(f64::from_bits(bits)),
            _ => None,
        }
    }
}

const DOUBLE_FRACTION: u64 = (1 << 52) - 1;
const DOUBLE_BIAS: i64 = 1023;
const WIDE_BIAS: i64 = 16383;
const WIDE_MAX_EXP: u128 = 0x7FFF;

// splits the magnitude of a double into (unbiased exponent, significand with
// the leading one at bit 52), or None for zero, infinity and NaN
fn decompose(value: f64) -> Option<(i64, u64)> {
    let bits = value.to_bits();
    let exp = ((bits >> 52) & 0x7FF) as i64;
    let fraction = bits & DOUBLE_FRACTION;

    match exp {
        0x7FF => None,
        0 if fraction == 0 => None,
        0 => {
            // subnormal, shift the leading one up to bit 52
            let shift = fraction.leading_zeros() - 11;

            Some((1 - DOUBLE_BIAS - i64::from(shift), fraction << shift))
        }
        _ => Some((exp - DOUBLE_BIAS, fraction | (1 << 52))),
    }
}

fn half_bits(value: f64) -> u16 {
    let sign = if value.is_sign_negative() { 0x8000 } else { 0 };

    if value.is_nan() {
        let payload = ((value.to_bits() & DOUBLE_FRACTION) >> 42) as u16;

        return sign | 0x7C00 | if payload == 0 { 0x200 } else { payload };
    }

    if value.is_infinite() {
        return sign | 0x7C00;
    }

    match decompose(value) {
        None => sign,
        Some((exp, significand)) if exp < -14 => sign | (significand >> (28 - exp)) as u16,
        Some((exp, significand)) => {
            sign | (((exp + 15) as u16) << 10) | ((significand & DOUBLE_FRACTION) >> 42) as u16
        }
    }
}

// 1 sign bit, 15 exponent bits, an explicit integer bit and 63 fraction bits
fn x87_bits(value: f64) -> u128 {
    let sign = if value.is_sign_negative() { 1u128 << 79 } else { 0 };
    let fraction = u128::from(value.to_bits() & DOUBLE_FRACTION);

    if value.is_nan() {
        return sign | (WIDE_MAX_EXP << 64) | (0b11 << 62) | (fraction << 11);
    }

    if value.is_infinite() {
        return sign | (WIDE_MAX_EXP << 64) | (1 << 63);
    }

    match decompose(value) {
        None => sign,
        Some((exp, significand)) => {
            sign | (((exp + WIDE_BIAS) as u128) << 64) | (u128::from(significand) << 11)
        }
    }
}

// 1 sign bit, 15 exponent bits and 112 fraction bits
fn quad_bits(value: f64) -> u128 {
    let sign = if value.is_sign_negative() { 1u128 << 127 } else { 0 };
    let fraction = u128::from(value.to_bits() & DOUBLE_FRACTION);

    if value.is_nan() || value.is_infinite() {
        return sign | (WIDE_MAX_EXP << 112) | (fraction << 60);
    }

    match decompose(value) {
        None => sign,
        Some((exp, significand)) => {
            sign | (((exp + WIDE_BIAS) as u128) << 112) | (u128::from(significand & DOUBLE_FRACTION) << 60)
        }
    }
}

/// A constant with the type it was written with.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct TypedConst {
    /// The type of the constant
    pub ty: Type,
    /// The constant
    pub value: Constant,
}

impl TypedConst {
    /// Pairs a constant with its type.
    pub fn new(ty: Type, value: Constant) -> Self {
        Self { ty, value }
    }
}

/// A constant value. The type of a constant is always held next to it,
/// see [`TypedConst`].
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Constant {
    /// An integer of any width, normalized to the signed value it has at
    /// its width
    Int(BigInt),
    /// A floating-point literal
    Float(FloatValue),
    /// `null`
    Null,
    /// `none`
    None,
    /// `undef`
    Undef,
    /// `poison`
    Poison,
    /// `zeroinitializer`
    ZeroInitializer,
    /// `c"..."`
    Bytes(Vec<u8>),
    /// `[ T v, ... ]`
    Array(Vec<TypedConst>),
    /// `< T v, ... >`
    Vector(Vec<TypedConst>),
    /// `{ T v, ... }` or `<{ T v, ... }>`, depending on the type
    Struct(Vec<TypedConst>),
    /// `@name`
    Global(Ref<Global>),
    /// `blockaddress(@f, %bb)`
    BlockAddress {
        /// The function containing the block
        func: Ref<Global>,
        /// The block whose address is taken
        block: Ref<Block>,
    },
    /// A constant expression
    Expr(Box<ConstExpr>),
}

/// Truncates `value` to `width` bits and sign-extends it back, so the same
/// bit pattern always gets the same representation.
///
/// ```
/// # use llasm::ir::normalize_int;
/// # use num_bigint::BigInt;
/// assert_eq!(normalize_int(&BigInt::from(255), 8), BigInt::from(-1));
/// assert_eq!(normalize_int(&BigInt::from(127), 8), BigInt::from(127));
/// assert_eq!(normalize_int(&BigInt::from(1), 1), BigInt::from(-1));
/// ```
pub fn normalize_int(value: &BigInt, width: u32) -> BigInt {
    if width == 0 {
        return value.clone();
    }

    let modulus = BigInt::from(1) << width;
    let mut bits = value % &modulus;

    if bits.sign() == Sign::Minus {
        bits += &modulus;
    }

    if bits >= BigInt::from(1) << (width - 1) {
        bits -= modulus;
    }

    bits
}

/// Checks if `value` can be written as an integer literal of `width` bits,
/// either as a signed or as an unsigned number.
pub fn int_fits(value: &BigInt, width: u32) -> bool {
    if width == 0 {
        return value.sign() == Sign::NoSign;
    }

    let min = -(BigInt::from(1) << (width - 1));
    let umax = (BigInt::from(1) << width) - 1;

    *value >= min && *value <= umax
}

/// A constant expression. The result type lives in the enclosing [`TypedConst`].
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum ConstExpr {
    /// `add (T a, T b)` and the other binary operators
    Binary {
        /// The operator
        op: BinaryOp,
        /// `nuw`, `nsw`, `exact`
        flags: WrapFlags,
        /// Left operand
        lhs: TypedConst,
        /// Right operand
        rhs: TypedConst,
    },
    /// `fneg (T a)`
    FNeg(TypedConst),
    /// `bitcast (T v to U)` and the other casts
    Cast {
        /// The cast
        op: CastOp,
        /// The value being converted
        value: TypedConst,
        /// The result type
        to: Type,
    },
    /// `getelementptr [inbounds] (S, T* base, ...)`
    GetElementPtr {
        /// `inbounds`
        inbounds: bool,
        /// The type being indexed into
        source: Type,
        /// The base pointer
        base: TypedConst,
        /// Every index after the base
        indices: Vec<TypedConst>,
    },
    /// `icmp pred (T a, T b)`
    ICmp {
        /// The predicate
        pred: ICmpPred,
        /// Left operand
        lhs: TypedConst,
        /// Right operand
        rhs: TypedConst,
    },
    /// `fcmp pred (T a, T b)`
    FCmp {
        /// The predicate
        pred: FCmpPred,
        /// Left operand
        lhs: TypedConst,
        /// Right operand
        rhs: TypedConst,
    },
    /// `select (i1 c, T a, T b)`
    Select {
        /// The condition
        cond: TypedConst,
        /// Chosen when `cond` is true
        on_true: TypedConst,
        /// Chosen when `cond` is false
        on_false: TypedConst,
    },
    /// `extractelement (<N x T> v, i32 i)`
    ExtractElement {
        /// The vector
        vector: TypedConst,
        /// The lane
        index: TypedConst,
    },
    /// `insertelement (<N x T> v, T e, i32 i)`
    InsertElement {
        /// The vector
        vector: TypedConst,
        /// The new lane value
        elem: TypedConst,
        /// The lane
        index: TypedConst,
    },
    /// `shufflevector (<N x T> a, <N x T> b, <M x i32> mask)`
    ShuffleVector {
        /// First input
        lhs: TypedConst,
        /// Second input
        rhs: TypedConst,
        /// The lane mask
        mask: TypedConst,
    },
    /// `extractvalue (T agg, i, ...)`
    ExtractValue {
        /// The aggregate
        aggregate: TypedConst,
        /// The path of member indices
        indices: Vec<u32>,
    },
    /// `insertvalue (T agg, U v, i, ...)`
    InsertValue {
        /// The aggregate
        aggregate: TypedConst,
        /// The new member value
        elem: TypedConst,
        /// The path of member indices
        indices: Vec<u32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_and_wide_encodings() {
        assert_eq!(FloatValue::encode(FloatKind::Half, 1.0), FloatValue::Half(0x3C00));
        assert_eq!(FloatValue::encode(FloatKind::Half, -2.0), FloatValue::Half(0xC000));
        assert_eq!(FloatValue::encode(FloatKind::Half, 65504.0), FloatValue::Half(0x7BFF));
        assert_eq!(FloatValue::encode(FloatKind::Half, 2f64.powi(-24)), FloatValue::Half(0x0001));
        assert_eq!(FloatValue::encode(FloatKind::Half, 0.0), FloatValue::Half(0));
        assert_eq!(FloatValue::encode(FloatKind::Half, f64::INFINITY), FloatValue::Half(0x7C00));
        assert_eq!(FloatValue::encode(FloatKind::BFloat, 1.0), FloatValue::BFloat(0x3F80));
        assert_eq!(
            FloatValue::encode(FloatKind::X86Fp80, -0.5),
            FloatValue::X86Fp80(0xBFFE8000000000000000)
        );
        assert_eq!(
            FloatValue::encode(FloatKind::Fp128, 1.0),
            FloatValue::Fp128(0x3FFF0000000000000000000000000000)
        );
        assert_eq!(
            FloatValue::encode(FloatKind::Fp128, 1.5),
            FloatValue::Fp128(0x3FFF8000000000000000000000000000)
        );
        assert_eq!(
            FloatValue::encode(FloatKind::PpcFp128, 1.0),
            FloatValue::PpcFp128(0x3FF00000000000000000000000000000)
        );
        assert_eq!(FloatValue::encode(FloatKind::Float, 0.5), FloatValue::from_f64(0.5));
    }

    #[test]
    fn subnormal_doubles_widen_exactly() {
        let smallest = f64::from_bits(1);

        // 2^-1074 is a normal number in both wide formats
        assert_eq!(
            FloatValue::encode(FloatKind::X86Fp80, smallest),
            FloatValue::X86Fp80(((16383u128 - 1074) << 64) | (1 << 63))
        );
        assert_eq!(
            FloatValue::encode(FloatKind::Fp128, smallest),
            FloatValue::Fp128((16383u128 - 1074) << 112)
        );
    }

    fn int(value: i128) -> BigInt {
        BigInt::from(value)
    }

    #[test]
    fn normalization_is_width_aware() {
        assert_eq!(normalize_int(&int(-1), 32), int(-1));
        assert_eq!(normalize_int(&int(0xFFFF_FFFF), 32), int(-1));
        assert_eq!(normalize_int(&int(0x8000_0000), 32), int(i128::from(i32::MIN)));
        assert_eq!(normalize_int(&int(0), 1), int(0));
        assert_eq!(normalize_int(&int(i128::MAX), 128), int(i128::MAX));
        assert_eq!(normalize_int(&int(-1), 128), int(-1));
    }

    #[test]
    fn normalization_past_128_bits() {
        let all_ones = (BigInt::from(1) << 128) - 1;
        let wide = BigInt::from(1) << 200;

        assert_eq!(normalize_int(&all_ones, 128), int(-1));
        assert_eq!(normalize_int(&all_ones, 256), all_ones);
        assert_eq!(normalize_int(&wide, 201), -wide.clone());
        assert_eq!(normalize_int(&wide, 256), wide);
    }

    #[test]
    fn fits_accepts_signed_and_unsigned_spellings() {
        assert!(int_fits(&int(255), 8));
        assert!(int_fits(&int(-128), 8));
        assert!(!int_fits(&int(256), 8));
        assert!(!int_fits(&int(-129), 8));
        assert!(int_fits(&int(1), 1));
        assert!(int_fits(&int(-1), 1));
        assert!(int_fits(&((BigInt::from(1) << 128) - 1), 128));
        assert!(!int_fits(&(BigInt::from(1) << 128), 128));
    }
}
