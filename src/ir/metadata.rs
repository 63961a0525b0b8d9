//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{MdNode, Ref, TypedValue};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// A metadata operand.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Metadata {
    /// `null`
    Null,
    /// `!"..."`
    String(Vec<u8>),
    /// A reference to a numbered node, `!4`
    Node(Ref<MdNode>),
    /// A node written in place, `!{...}` or `!DILocation(...)`
    Inline(Box<MdNodeData>),
    /// A value wrapped as metadata, `i32 1` inside of a node
    Value(TypedValue),
}

/// The contents of a metadata node.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct MdNodeData {
    /// Whether the node was written `distinct`
    pub distinct: bool,
    /// The node's operands
    pub kind: MdNodeKind,
}

/// The two shapes a node can have.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum MdNodeKind {
    /// A generic tuple, `!{!0, i32 1, null}`
    Tuple(Vec<Metadata>),
    /// A specialized node, `!DILocation(line: 1, scope: !2)`
    Specialized {
        /// The node's class, e.g. `DILocation`
        name: String,
        /// Fields in the order they were written
        fields: Vec<MdField>,
    },
}

/// A field of a specialized node. Some nodes (like `DIExpression`) take
/// positional operands instead of named fields, those have no name.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct MdField {
    /// The field's name, `None` for positional operands
    pub name: Option<String>,
    /// The field's value
    pub value: MdFieldValue,
}

/// The value of a field of a specialized node.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum MdFieldValue {
    /// An integer, `line: 4`
    Int(i128),
    /// A plain string, `name: "foo"`
    Str(Vec<u8>),
    /// `true` or `false`
    Bool(bool),
    /// A metadata operand, `scope: !2` or `type: null`
    Metadata(Metadata),
    /// A bare enumerator, `tag: DW_TAG_pointer_type`
    Word(String),
    /// Flags joined by `|`, `flags: DIFlagPrototyped | DIFlagPublic`
    Flags(Vec<String>),
}

/// A numbered node definition, `!N = [distinct] ...`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct MetadataDef {
    /// The node's number
    pub id: u32,
    /// The node
    pub node: MdNodeData,
}

/// A named metadata definition, `!llvm.module.flags = !{!0, !1}`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct NamedMetadata {
    /// The name, without the `!`
    pub name: String,
    /// The nodes it lists
    pub nodes: Vec<Ref<MdNode>>,
}
