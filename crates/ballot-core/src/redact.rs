use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const REDACTED: &str = "[REDACTED]";

const SECRET_KEY_FRAGMENTS: &[&str] = &["private_key", "secret", "password"];
const SECRET_KEYS: &[&str] = &["mnemonic", "seed", "signature", "raw_tx", "signed_tx"];
const RPC_PAYLOAD_KEY: &str = "rpc_payload";
const AUDIT_KEEP_CHARS: usize = 24;
const AUDIT_HEAD_CHARS: usize = 12;

/// How much of a trace record survives before it is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactMode {
    /// Secrets and raw RPC payloads are replaced wholesale.
    #[default]
    Default,
    /// Secrets are replaced, RPC params are shortened to a head and a length.
    Audit,
    Off,
}

pub fn redact_value(value: &Value, mode: RedactMode) -> Value {
    if mode == RedactMode::Off {
        return value.clone();
    }
    walk(value, mode, &mut Vec::new(), false)
}

fn walk(value: &Value, mode: RedactMode, path: &mut Vec<String>, in_params: bool) -> Value {
    match value {
        Value::Object(object) => {
            if mode == RedactMode::Default && is_rpc_payload(path, object) {
                return Value::String(REDACTED.to_string());
            }
            let rpc_shaped = is_rpc_shaped(object);
            let mut out = Map::with_capacity(object.len());
            for (key, child) in object {
                let lower = key.to_lowercase();
                if is_secret_key(&lower) {
                    out.insert(key.clone(), Value::String(REDACTED.to_string()));
                    continue;
                }
                let child_in_params = in_params
                    || lower == RPC_PAYLOAD_KEY
                    || (rpc_shaped && lower == "params");
                path.push(lower);
                out.insert(key.clone(), walk(child, mode, path, child_in_params));
                path.pop();
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    path.push(index.to_string());
                    let redacted = walk(item, mode, path, in_params);
                    path.pop();
                    redacted
                })
                .collect(),
        ),
        Value::String(text) if mentions_secret(text) => Value::String(REDACTED.to_string()),
        Value::String(text) if in_params => match mode {
            RedactMode::Audit => Value::String(shorten(text)),
            _ => Value::String(REDACTED.to_string()),
        },
        _ => value.clone(),
    }
}

/// A JSON-RPC request or response body, or anything stored under `rpc_payload`.
fn is_rpc_payload(path: &[String], object: &Map<String, Value>) -> bool {
    is_rpc_shaped(object)
        || path
            .last()
            .is_some_and(|segment| segment.as_str() == RPC_PAYLOAD_KEY)
}

fn is_rpc_shaped(object: &Map<String, Value>) -> bool {
    object.contains_key("method") && (object.contains_key("params") || object.contains_key("result"))
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= AUDIT_KEEP_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(AUDIT_HEAD_CHARS).collect();
    format!("{head}…(len={})", text.len())
}

fn is_secret_key(key: &str) -> bool {
    SECRET_KEY_FRAGMENTS
        .iter()
        .any(|fragment| key.contains(fragment))
        || SECRET_KEYS.contains(&key)
}

fn mentions_secret(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("private key") || lower.contains("seed phrase")
}

#[cfg(test)]
#[path = "redact_test.rs"]
mod tests;
