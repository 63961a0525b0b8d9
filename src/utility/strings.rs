//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use std::fmt::Write;

/// The reasons that decoding the body of a quoted string can fail.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EscapeError {
    /// A `\` was followed by something other than `\` or two hex digits.
    /// Holds the byte offset of the `\` inside of the string body.
    InvalidEscape(usize),
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Decodes the body of a quoted string (without the quotes).
///
/// The only escapes are `\\` and `\XX` where `XX` is two hex digits.
///
/// ```
/// # use llasm::utility::unescape;
/// assert_eq!(unescape(r"a\0Ab\\").unwrap(), b"a\nb\\");
/// assert!(unescape(r"\q").is_err());
/// ```
pub fn unescape(body: &str) -> Result<Vec<u8>, EscapeError> {
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;

            continue;
        }

        if bytes.get(i + 1) == Some(&b'\\') {
            out.push(b'\\');
            i += 2;

            continue;
        }

        let hi = bytes.get(i + 1).copied().and_then(hex_value);
        let lo = bytes.get(i + 2).copied().and_then(hex_value);

        match (hi, lo) {
            (Some(hi), Some(lo)) => out.push(hi * 16 + lo),
            _ => return Err(EscapeError::InvalidEscape(i)),
        }

        i += 3;
    }

    Ok(out)
}

/// Writes `bytes` into `out` with the escaping used for every quoted string:
/// printable ASCII is kept as-is, while `"`, `\` and everything else become `\XX`.
pub fn write_escaped(out: &mut String, bytes: &[u8]) {
    for &b in bytes {
        if (0x20..0x7F).contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            let _ = write!(out, "\\{b:02X}");
        }
    }
}

/// Produces `"..."` with the body escaped.
pub fn quoted(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);

    out.push('"');
    write_escaped(&mut out, bytes);
    out.push('"');

    out
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'$' | b'.' | b'_')
}

/// Renders a name that follows a sigil (`%`, `@`, `$`), quoting it only when
/// the bare form would not lex back into the same name.
///
/// ```
/// # use llasm::utility::name_text;
/// assert_eq!(name_text("main"), "main");
/// assert_eq!(name_text("with space"), "\"with space\"");
/// assert_eq!(name_text("1abc"), "\"1abc\"");
/// ```
pub fn name_text(name: &str) -> String {
    let bytes = name.as_bytes();
    let bare = !bytes.is_empty()
        && !bytes[0].is_ascii_digit()
        && bytes.iter().copied().all(is_name_char);

    if bare {
        name.to_owned()
    } else {
        quoted(bytes)
    }
}

/// Renders a metadata name (`!dbg`, `!DILocation`, `!llvm.module.flags`),
/// escaping the bytes a bare name can't hold as `\XX`.
///
/// ```
/// # use llasm::utility::metadata_name_text;
/// assert_eq!(metadata_name_text("llvm.dbg.cu"), "llvm.dbg.cu");
/// assert_eq!(metadata_name_text("a b"), "a\\20b");
/// ```
pub fn metadata_name_text(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for (i, b) in name.bytes().enumerate() {
        if is_name_char(b) && !(i == 0 && b.is_ascii_digit()) {
            out.push(b as char);
        } else {
            let _ = write!(out, "\\{b:02X}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_control_bytes() {
        assert_eq!(quoted(b"hi\n\"x\"\\"), r#""hi\0A\22x\22\5C""#);
    }

    #[test]
    fn unescape_reports_position_of_bad_escape() {
        assert_eq!(unescape(r"ab\zz"), Err(EscapeError::InvalidEscape(2)));
        assert_eq!(unescape(r"ab\4"), Err(EscapeError::InvalidEscape(2)));
    }

    #[test]
    fn escaping_round_trips() {
        let raw: Vec<u8> = (0u8..=255).collect();
        let mut text = String::new();

        write_escaped(&mut text, &raw);

        assert_eq!(unescape(&text).unwrap(), raw);
    }

    #[test]
    fn names_with_dots_and_dashes_stay_bare() {
        assert_eq!(name_text("llvm.memcpy.p0i8.p0i8.i64"), "llvm.memcpy.p0i8.p0i8.i64");
        assert_eq!(name_text("a-b$c"), "a-b$c");
        assert_eq!(name_text(""), "\"\"");
    }
}
