//! Golden test vectors for deterministic verification.
//!
//! Pointers are a durable storage contract: previously stored data is only
//! reachable if every build canonicalizes and hashes identically. These
//! vectors pin both steps.

use bytes::Bytes;
use cas_core::{address, canonicalize, digest};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Bytes as a client would send them.
    pub input: &'static [u8],
    /// Expected canonical form (the stored value).
    pub canonical: &'static [u8],
    /// Expected pointer (hex).
    pub pointer: &'static str,
    /// Expected object name in the blob-store backend.
    pub object_key: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty input",
            input: b"",
            canonical: b"",
            pointer: "7f9c2ba4e88f827d",
            object_key: "f5wrpOiPgn0",
        },
        GoldenVector {
            name: "bare words are not json",
            input: b"not json",
            canonical: b"not json",
            pointer: "25c76266888c198e",
            object_key: "JcdiZoiMGY4",
        },
        GoldenVector {
            name: "single key object",
            input: br#"{"x": 1}"#,
            canonical: br#"{"x":1}"#,
            pointer: "b27329cf642a3070",
            object_key: "snMpz2QqMHA",
        },
        GoldenVector {
            name: "keys reordered",
            input: br#"{"b": 2, "a": 1}"#,
            canonical: br#"{"a":1,"b":2}"#,
            pointer: "ed824b0b85e70bb8",
            object_key: "7YJLC4XnC7g",
        },
        GoldenVector {
            name: "mixed array",
            input: br#"[1, 2.50, "three", null, true]"#,
            canonical: br#"[1,2.5,"three",null,true]"#,
            pointer: "798abcecbd525cf8",
            object_key: "eYq87L1SXPg",
        },
        GoldenVector {
            name: "nested with html escaping",
            input: br#"{"nested": {"z": [], "y": {}}, "a": "<b>"}"#,
            canonical: br#"{"a":"\u003cb\u003e","nested":{"y":{},"z":[]}}"#,
            pointer: "c5eee57c4d5903ec",
            object_key: "xe7lfE1ZA-w",
        },
        GoldenVector {
            name: "padded string scalar",
            input: br#"  "hello"  "#,
            canonical: br#""hello""#,
            pointer: "21f81a17b8bc9955",
            object_key: "IfgaF7i8mVU",
        },
        GoldenVector {
            name: "exponent number",
            input: b"1e2",
            canonical: b"100",
            pointer: "dc56de8f45ab1807",
            object_key: "3Fbej0WrGAc",
        },
        GoldenVector {
            name: "raw binary",
            input: &[0xde, 0xad, 0xbe, 0xef],
            canonical: &[0xde, 0xad, 0xbe, 0xef],
            pointer: "637619342d4cb764",
            object_key: "Y3YZNC1Mt2Q",
        },
    ]
}

/// Check one vector, describing the first mismatch.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let canonical = canonicalize(Bytes::from_static(vector.input));
    if &canonical[..] != vector.canonical {
        return Err(format!(
            "canonical mismatch: expected {:?}, got {:?}",
            String::from_utf8_lossy(vector.canonical),
            String::from_utf8_lossy(&canonical)
        ));
    }

    let (pointer, stored) = address(Bytes::from_static(vector.input));
    if stored != canonical {
        return Err("address() disagrees with canonicalize()".into());
    }
    if pointer != digest(vector.canonical) {
        return Err("address() disagrees with digest()".into());
    }
    if pointer.to_hex() != vector.pointer {
        return Err(format!(
            "pointer mismatch: expected {}, got {}",
            vector.pointer,
            pointer.to_hex()
        ));
    }
    if pointer.to_base64() != vector.object_key {
        return Err(format!(
            "object key mismatch: expected {}, got {}",
            vector.object_key,
            pointer.to_base64()
        ));
    }
    Ok(())
}

/// Verify all vectors, returning `(name, passed, pointer hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = digest(&canonicalize(Bytes::from_static(v.input))).to_hex();
            (v.name.to_string(), verify_vector(v).is_ok(), hex)
        })
        .collect()
}
