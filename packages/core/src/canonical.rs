//! Canonical JSON encoding and the signing messages built from it.
//!
//! The canonical form is what gets signed: object keys sorted ascending by
//! the bytes of the key at every nesting level, arrays in source order, no
//! insignificant whitespace. Scalars use the `JSON.stringify` encoding
//! (ECMAScript number formatting, minimal string escaping) via `serde_jcs`,
//! so producers written against the reference JavaScript tooling agree on
//! the bytes.
//!
//! Key order deliberately does **not** follow RFC 8785: JCS sorts by UTF-16
//! code units, which differs from byte order for keys outside the BMP.

use serde_json::Value;
use thiserror::Error;

use crate::types::Document;

/// Fields excluded from the signing payload. Both hold signatures computed
/// over that payload.
pub const UNSIGNED_FIELDS: [&str; 2] = ["signature", "agents"];

/// Errors returned while producing a canonical encoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CanonicalError {
    #[error("invalid number at {path}: {reason}")]
    InvalidNumber { path: String, reason: String },

    #[error("malformed JSON: {0}")]
    Syntax(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Canonical bytes of a whole document, signature fields included.
pub fn canonicalize(doc: &Document) -> Result<Vec<u8>, CanonicalError> {
    let value = doc
        .to_value()
        .map_err(|e| CanonicalError::Serialization(e.to_string()))?;
    canonicalize_value(&value)
}

/// Canonical bytes of an arbitrary JSON value.
pub fn canonicalize_value(value: &Value) -> Result<Vec<u8>, CanonicalError> {
    encode(value).map(String::into_bytes)
}

/// Parse raw JSON and return its canonical bytes.
pub fn canonicalize_slice(raw: &[u8]) -> Result<Vec<u8>, CanonicalError> {
    canonicalize_value(&parse_json(raw)?)
}

/// The canonical JSON of `doc` with [`UNSIGNED_FIELDS`] removed.
pub fn signing_payload(doc: &Document) -> Result<String, CanonicalError> {
    let mut value = doc
        .to_value()
        .map_err(|e| CanonicalError::Serialization(e.to_string()))?;
    if let Value::Object(map) = &mut value {
        for field in UNSIGNED_FIELDS {
            map.remove(field);
        }
    }
    encode(&value)
}

/// The message an instance (or its agent) signs for `doc`:
///
/// ```text
/// [RSS3] I am confirming the results of changes to my file <identifier>: <payload>
/// ```
pub fn signing_message(doc: &Document) -> Result<String, CanonicalError> {
    let payload = signing_payload(doc)?;
    Ok(format!(
        "[RSS3] I am confirming the results of changes to my file {}: {}",
        doc.identifier(),
        payload
    ))
}

/// The message an instance signs to authorise an agent key for an app.
pub fn authorization_message(app: &str, instance_uri: &str, pubkey: &str) -> String {
    format!(
        "[RSS3] I am well aware that this APP (name: {app}) can use the following agent \
         instead of me ({instance_uri}) to modify my files and I would like to authorize \
         this agent ({pubkey})"
    )
}

/// The message a secondary account signs to bind itself to an instance.
pub fn account_binding_message(account_identifier: &str, instance_uri: &str) -> String {
    format!("[RSS3] I am adding {account_identifier} to my RSS3 instance {instance_uri}")
}

/// Parse raw JSON, mapping out-of-range numbers to
/// [`CanonicalError::InvalidNumber`].
pub(crate) fn parse_json(raw: &[u8]) -> Result<Value, CanonicalError> {
    serde_json::from_slice(raw).map_err(|e| {
        let message = e.to_string();
        if message.starts_with("number out of range") {
            CanonicalError::InvalidNumber {
                path: format!("line {} column {}", e.line(), e.column()),
                reason: "number is not representable as a finite double".into(),
            }
        } else {
            CanonicalError::Syntax(message)
        }
    })
}

// --- encoder -----------------------------------------------------------------

fn encode(value: &Value) -> Result<String, CanonicalError> {
    let mut out = String::new();
    let mut path = String::from("$");
    write_value(&mut out, value, &mut path)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, path: &mut String) -> Result<(), CanonicalError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            if n.as_f64().is_some_and(|f| !f.is_finite()) {
                return Err(CanonicalError::InvalidNumber {
                    path: path.clone(),
                    reason: "NaN and Infinity have no JSON encoding".into(),
                });
            }
            let encoded = serde_jcs::to_string(n).map_err(|e| CanonicalError::InvalidNumber {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            out.push_str(&encoded);
        }
        Value::String(s) => write_string(out, s, path)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let len = path.len();
                path.push_str(&format!("[{i}]"));
                write_value(out, item, path)?;
                path.truncate(len);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key, path)?;
                out.push(':');
                let len = path.len();
                path.push('.');
                path.push_str(key);
                write_value(out, &map[key.as_str()], path)?;
                path.truncate(len);
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str, path: &str) -> Result<(), CanonicalError> {
    let encoded = serde_jcs::to_string(s)
        .map_err(|e| CanonicalError::Serialization(format!("{path}: {e}")))?;
    out.push_str(&encoded);
    Ok(())
}

// --- tests -------------------------------------------------------------------
