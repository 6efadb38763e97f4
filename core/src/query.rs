//! Form-urlencoded query strings from request data.
//!
//! Nested values use the bracket convention (`user[name]=x`, `tags[0]=a`),
//! booleans become `1`/`0` and `null` entries are dropped.

use serde_json::Value;
use url::Url;

use crate::http::RequestData;

/// Append `data` to the query of `url`, after any existing parameters.
pub fn append(url: &mut Url, data: &RequestData) {
    let pairs = flatten(data);
    if pairs.is_empty() {
        return;
    }
    url.query_pairs_mut().extend_pairs(pairs);
}

/// Encode `data` as a standalone query string (no leading `?`).
pub fn encode(data: &RequestData) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(flatten(data))
        .finish()
}

fn flatten(data: &RequestData) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in data {
        flatten_value(key.clone(), value, &mut pairs);
    }
    pairs
}

fn flatten_value(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
        Value::String(s) => out.push((key, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(format!("{key}[{i}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten_value(format!("{key}[{sub}]"), item, out);
            }
        }
    }
}
