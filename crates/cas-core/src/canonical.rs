//! Canonical JSON encoding for deterministic addressing.
//!
//! Structured input is parsed into a value tree and re-encoded with:
//! - Object keys sorted by byte-wise comparison, duplicates resolved last-wins
//! - No insignificant whitespace
//! - Every number treated as an IEEE-754 double and printed with the shortest
//!   round-tripping digits (plain notation for `1e-6 <= |x| < 1e21`, otherwise
//!   exponent notation with an explicit sign: `1e+21`, `1.5e-7`)
//! - Strings escaped the same way the deployed encoder does it (`<`, `>`, `&`,
//!   U+2028 and U+2029 as `\u` escapes; `\n`, `\r`, `\t` short forms)
//!
//! Anything that does not parse is already canonical: the bytes pass through
//! untouched. Canonicalization therefore never fails.
//!
//! The exact output bytes are what gets hashed, so this encoding is as much a
//! part of the compatibility contract as the digest function itself.

use bytes::Bytes;
use serde::de::IgnoredAny;
use serde_json::{Map, Number, Value};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Canonicalize a blob.
///
/// Returns the re-encoded document for JSON input and `data` itself otherwise.
/// Idempotent: canonicalizing canonical bytes yields the same bytes.
pub fn canonicalize(data: Bytes) -> Bytes {
    match serde_json::from_slice::<Value>(&data) {
        Ok(value) => Bytes::from(canonical_json_bytes(&value)),
        Err(_) => data,
    }
}

/// Whether `data` parses as a structured document.
pub fn is_structured(data: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(data).is_ok()
}

/// Encode a JSON value to canonical bytes.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a JSON value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => encode_number(buf, n),
        Value::String(s) => encode_string(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Object(map) => encode_object(buf, map),
    }
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    buf.push(b'[');
    for (i, item) in arr.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_value_to(buf, item);
    }
    buf.push(b']');
}

/// Encode an object with keys in byte order.
///
/// `serde_json::Map` is only sorted when `preserve_order` is off, and feature
/// unification can switch it on from another crate, so sort explicitly.
fn encode_object(buf: &mut Vec<u8>, map: &Map<String, Value>) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    buf.push(b'{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_string(buf, key);
        buf.push(b':');
        encode_value_to(buf, value);
    }
    buf.push(b'}');
}

fn encode_number(buf: &mut Vec<u8>, n: &Number) {
    match n.as_f64() {
        Some(f) => buf.extend_from_slice(format_double(f).as_bytes()),
        None => buf.extend_from_slice(n.to_string().as_bytes()),
    }
}

/// Shortest round-trip formatting of a double.
fn format_double(f: f64) -> String {
    let abs = f.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let s = format!("{:e}", f);
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        }
    } else {
        format!("{}", f)
    }
}

fn encode_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => encode_unicode_escape(buf, c),
            c if (c as u32) < 0x20 => encode_unicode_escape(buf, c),
            c => {
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

/// Write `\uXXXX` with lowercase hex. Only used for BMP characters.
fn encode_unicode_escape(buf: &mut Vec<u8>, c: char) {
    let code = c as u32;
    buf.extend_from_slice(b"\\u");
    for shift in [12, 8, 4, 0] {
        buf.push(HEX_DIGITS[((code >> shift) & 0xf) as usize]);
    }
}
