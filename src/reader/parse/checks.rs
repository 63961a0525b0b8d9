//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Operand type rules shared between instructions and constant expressions.
//!
//! Every check returns the message of the mismatch, the caller attaches the
//! source position.

use crate::ir::{BinaryOp, CastOp, Type, TypeContext, TypeData};
use crate::writer::stringify_ty;

fn shape(types: &TypeContext, ty: Type) -> Option<(u64, bool)> {
    types.vector_info(ty).map(|(len, _, scalable)| (len, scalable))
}

// a type with the same vector shape as `like`, but with `scalar` lanes
fn same_shape(types: &mut TypeContext, like: Type, scalar: Type) -> Type {
    match shape(types, like) {
        Some((len, scalable)) => types.vector(len, scalar, scalable),
        None => scalar,
    }
}

pub(super) fn binary(types: &TypeContext, op: BinaryOp, ty: Type) -> Result<(), String> {
    let valid = if op.is_float() {
        types.is_fp_or_fp_vector(ty)
    } else {
        types.is_int_or_int_vector(ty)
    };

    if !valid {
        return Err(format!(
            "invalid operand type '{}' for '{}'",
            stringify_ty(types, ty),
            op.keyword()
        ));
    }

    Ok(())
}

pub(super) fn cast(types: &TypeContext, op: CastOp, from: Type, to: Type) -> Result<(), String> {
    let invalid = || {
        format!(
            "invalid cast opcode for cast from '{}' to '{}'",
            stringify_ty(types, from),
            stringify_ty(types, to)
        )
    };

    // everything except bitcast keeps the vector shape
    if op != CastOp::BitCast && shape(types, from) != shape(types, to) {
        return Err(invalid());
    }

    let (src, dst) = (types.scalar(from), types.scalar(to));
    let int_bits = |ty| types.int_width(ty);
    let float_bits = |ty| types.float_kind(ty).map(|kind| kind.bits());

    let valid = match op {
        CastOp::Trunc => matches!((int_bits(src), int_bits(dst)), (Some(a), Some(b)) if a > b),
        CastOp::ZExt | CastOp::SExt => {
            matches!((int_bits(src), int_bits(dst)), (Some(a), Some(b)) if a < b)
        }
        CastOp::FPTrunc => matches!((float_bits(src), float_bits(dst)), (Some(a), Some(b)) if a > b),
        CastOp::FPExt => matches!((float_bits(src), float_bits(dst)), (Some(a), Some(b)) if a < b),
        CastOp::FPToUI | CastOp::FPToSI => float_bits(src).is_some() && int_bits(dst).is_some(),
        CastOp::UIToFP | CastOp::SIToFP => int_bits(src).is_some() && float_bits(dst).is_some(),
        CastOp::PtrToInt => types.is_pointer(src) && int_bits(dst).is_some(),
        CastOp::IntToPtr => int_bits(src).is_some() && types.is_pointer(dst),
        CastOp::AddrSpaceCast => {
            types.is_pointer(src) && types.is_pointer(dst) && types.addrspace(src) != types.addrspace(dst)
        }
        CastOp::BitCast => bitcast_valid(types, from, to),
    };

    if !valid {
        return Err(invalid());
    }

    Ok(())
}

fn bitcast_valid(types: &TypeContext, from: Type, to: Type) -> bool {
    let (src, dst) = (types.scalar(from), types.scalar(to));

    // pointers only bitcast to pointers in the same address space, and
    // vectors of pointers keep their length
    if types.is_pointer(src) || types.is_pointer(dst) {
        return types.is_pointer(src)
            && types.is_pointer(dst)
            && types.addrspace(src) == types.addrspace(dst)
            && shape(types, from) == shape(types, to);
    }

    let bits = |ty| -> Option<u64> {
        let size = types.primitive_bits(types.scalar(ty))?;

        match types.vector_info(ty) {
            Some((_, _, true)) if shape(types, from) != shape(types, to) => None,
            Some((len, _, _)) => Some(size * len),
            None => Some(size),
        }
    };

    let first_class = |ty| !types.is_aggregate(ty) && types.function_info(ty).is_none();

    first_class(from) && first_class(to) && matches!((bits(from), bits(to)), (Some(a), Some(b)) if a == b)
}

/// Checks the operands of an `icmp`, and gives the result type.
pub(super) fn icmp(types: &mut TypeContext, lhs: Type, rhs: Type) -> Result<Type, String> {
    if lhs != rhs {
        return Err(mismatched_operands(types, lhs, rhs));
    }

    if !types.is_int_or_int_vector(lhs) && !types.is_ptr_or_ptr_vector(lhs) {
        return Err(format!("invalid operand type '{}' for 'icmp'", stringify_ty(types, lhs)));
    }

    Ok(compare_result(types, lhs))
}

/// Checks the operands of an `fcmp`, and gives the result type.
pub(super) fn fcmp(types: &mut TypeContext, lhs: Type, rhs: Type) -> Result<Type, String> {
    if lhs != rhs {
        return Err(mismatched_operands(types, lhs, rhs));
    }

    if !types.is_fp_or_fp_vector(lhs) {
        return Err(format!("invalid operand type '{}' for 'fcmp'", stringify_ty(types, lhs)));
    }

    Ok(compare_result(types, lhs))
}

fn compare_result(types: &mut TypeContext, operand: Type) -> Type {
    let i1 = types.bool();

    same_shape(types, operand, i1)
}

fn mismatched_operands(types: &TypeContext, lhs: Type, rhs: Type) -> String {
    format!(
        "operands have different types, '{}' and '{}'",
        stringify_ty(types, lhs),
        stringify_ty(types, rhs)
    )
}

pub(super) fn select(types: &TypeContext, cond: Type, on_true: Type, on_false: Type) -> Result<(), String> {
    if on_true != on_false {
        return Err(mismatched_operands(types, on_true, on_false));
    }

    let cond_ok = match types.vector_info(cond) {
        Some((len, elem, scalable)) => {
            types.int_width(elem) == Some(1)
                && types.vector_info(on_true).map(|(l, _, s)| (l, s)) == Some((len, scalable))
        }
        None => types.int_width(cond) == Some(1),
    };

    if !cond_ok {
        return Err("select condition must be 'i1' or a vector of 'i1' matching the operands".into());
    }

    Ok(())
}

/// Checks `extractelement`, giving the element type.
pub(super) fn extract_element(types: &TypeContext, vector: Type, index: Type) -> Result<Type, String> {
    let (_, elem, _) = types
        .vector_info(vector)
        .ok_or_else(|| format!("'{}' is not a vector type", stringify_ty(types, vector)))?;

    if types.int_width(index).is_none() {
        return Err("vector index must be an integer".into());
    }

    Ok(elem)
}

pub(super) fn insert_element(types: &TypeContext, vector: Type, elem: Type, index: Type) -> Result<(), String> {
    let lane = extract_element(types, vector, index)?;

    if lane != elem {
        return Err(format!(
            "inserted element has type '{}' but the vector holds '{}'",
            stringify_ty(types, elem),
            stringify_ty(types, lane)
        ));
    }

    Ok(())
}

/// Checks `shufflevector`, giving the result type.
pub(super) fn shuffle_vector(types: &mut TypeContext, lhs: Type, rhs: Type, mask: Type) -> Result<Type, String> {
    if lhs != rhs {
        return Err(mismatched_operands(types, lhs, rhs));
    }

    let (_, elem, scalable) = types
        .vector_info(lhs)
        .ok_or_else(|| format!("'{}' is not a vector type", stringify_ty(types, lhs)))?;

    let (len, mask_elem, mask_scalable) = types
        .vector_info(mask)
        .ok_or_else(|| "shuffle mask must be a vector of 'i32'".to_owned())?;

    if types.int_width(mask_elem) != Some(32) || mask_scalable != scalable {
        return Err("shuffle mask must be a vector of 'i32'".into());
    }

    Ok(types.vector(len, elem, scalable))
}

/// Follows a path of `extractvalue`/`insertvalue` indices, giving the member type.
pub(super) fn member_path(types: &TypeContext, aggregate: Type, indices: &[u32]) -> Result<Type, String> {
    let mut current = aggregate;

    for &index in indices {
        if !types.is_aggregate(current) {
            return Err(format!("'{}' is not an aggregate type", stringify_ty(types, current)));
        }

        current = types
            .member(current, u64::from(index))
            .ok_or_else(|| format!("index {index} is out of range for '{}'", stringify_ty(types, current)))?;
    }

    Ok(current)
}

/// Checks a `getelementptr` and computes its result type. Every index
/// comes with its constant value, if it has one.
pub(super) fn gep_operands(
    types: &mut TypeContext,
    source: Type,
    base: Type,
    indices: &[(Type, Option<i128>)],
) -> Result<Type, String> {
    let ptr = types.scalar(base);

    if !types.is_pointer(ptr) {
        return Err("base of getelementptr must be a pointer".into());
    }

    if let Some(pointee) = types.pointee(ptr) {
        if pointee != source {
            return Err(format!(
                "explicit pointee type '{}' doesn't match the pointer type '{}'",
                stringify_ty(types, source),
                stringify_ty(types, base)
            ));
        }
    }

    let mut lanes = shape(types, base);
    let mut current = source;

    for (i, (ty, value)) in indices.iter().enumerate() {
        if !types.is_int_or_int_vector(*ty) {
            return Err("getelementptr index must be an integer".into());
        }

        if let Some(index_shape) = shape(types, *ty) {
            if lanes.is_some() && lanes != Some(index_shape) {
                return Err("getelementptr vector index has the wrong number of elements".into());
            }

            lanes = Some(index_shape);
        }

        // the first index steps over the pointer itself
        if i == 0 {
            continue;
        }

        current = match types.data(types.resolve(current)) {
            TypeData::Struct { fields, .. } => {
                let index = match value {
                    Some(v) if types.int_width(*ty) == Some(32) => *v,
                    _ => return Err("struct index must be a constant 'i32'".into()),
                };

                usize::try_from(index)
                    .ok()
                    .and_then(|i| fields.get(i).copied())
                    .ok_or_else(|| format!("struct index {index} is out of range"))?
            }
            TypeData::Array { elem, .. } | TypeData::Vector { elem, .. } => *elem,
            _ => {
                return Err(format!(
                    "invalid getelementptr indices into '{}'",
                    stringify_ty(types, current)
                ))
            }
        };
    }

    let addrspace = types.addrspace(ptr).unwrap_or(0);
    let result = match types.pointee(ptr) {
        Some(_) => types.pointer(Some(current), addrspace),
        None => types.pointer(None, addrspace),
    };

    Ok(match lanes {
        Some((len, scalable)) => types.vector(len, result, scalable),
        None => result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FloatKind;

    #[test]
    fn casts() {
        let mut types = TypeContext::new();
        let (i8_ty, i32_ty) = (types.int(8), types.int(32));
        let (float, double) = (types.float(FloatKind::Float), types.float(FloatKind::Double));
        let ptr = types.pointer(None, 0);
        let ptr1 = types.pointer(None, 1);
        let v4i8 = types.vector(4, i8_ty, false);

        assert!(cast(&types, CastOp::Trunc, i32_ty, i8_ty).is_ok());
        assert!(cast(&types, CastOp::Trunc, i8_ty, i32_ty).is_err());
        assert!(cast(&types, CastOp::FPExt, float, double).is_ok());
        assert!(cast(&types, CastOp::PtrToInt, ptr, i32_ty).is_ok());
        assert!(cast(&types, CastOp::AddrSpaceCast, ptr, ptr1).is_ok());
        assert!(cast(&types, CastOp::BitCast, v4i8, i32_ty).is_ok());
        assert!(cast(&types, CastOp::BitCast, ptr, ptr1).is_err());
        assert!(cast(&types, CastOp::BitCast, i32_ty, float).is_ok());
        assert!(cast(&types, CastOp::ZExt, v4i8, i32_ty).is_err());
    }

    #[test]
    fn comparisons_keep_vector_shape() {
        let mut types = TypeContext::new();
        let i32_ty = types.int(32);
        let v2 = types.vector(2, i32_ty, false);
        let result = icmp(&mut types, v2, v2).unwrap();

        assert_eq!(types.vector_info(result).map(|(len, _, _)| len), Some(2));
        assert!(fcmp(&mut types, i32_ty, i32_ty).is_err());
    }

    #[test]
    fn gep_through_structs_and_arrays() {
        let mut types = TypeContext::new();
        let (i32_ty, i64_ty) = (types.int(32), types.int(64));
        let arr = types.array(4, i64_ty);
        let st = types.structure(&[i32_ty, arr], false);
        let base = types.pointer(Some(st), 0);

        let result = gep_operands(
            &mut types,
            st,
            base,
            &[(i64_ty, Some(0)), (i32_ty, Some(1)), (i64_ty, None)],
        )
        .unwrap();

        assert_eq!(types.pointee(result), Some(i64_ty));

        let bad = gep_operands(&mut types, st, base, &[(i64_ty, Some(0)), (i64_ty, Some(1))]);

        assert!(bad.is_err());
    }

    #[test]
    fn gep_on_opaque_pointers() {
        let mut types = TypeContext::new();
        let i8_ty = types.int(8);
        let ptr = types.pointer(None, 2);
        let result = gep_operands(&mut types, i8_ty, ptr, &[(i8_ty, Some(3))]).unwrap();

        assert_eq!(result, ptr);
    }
}
