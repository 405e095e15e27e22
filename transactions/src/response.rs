//! The structured result of running one transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::code::{Code, ErrorCategory};

/// One `tx.*` key/value tag attached to a successful response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: Code,
    pub log: String,
    /// Machine-readable details; `null` on success.
    pub info: Value,
    pub gas_used: u64,
    pub gas_wanted: u64,
    pub tags: Vec<Tag>,
}

impl Response {
    pub fn ok(gas: u64, tags: Vec<Tag>) -> Self {
        Self {
            code: Code::Ok,
            log: String::new(),
            info: Value::Null,
            gas_used: gas,
            gas_wanted: gas,
            tags,
        }
    }

    /// A rejection. `info` always carries the numeric code next to the
    /// fields passed in.
    pub fn reject(code: Code, log: impl Into<String>, info: Value) -> Self {
        let mut info = match info {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("details".to_string(), other);
                map
            }
        };
        info.insert("code".to_string(), Value::from(code.as_u32()));
        Self {
            code,
            log: log.into(),
            info: Value::Object(info),
            gas_used: 0,
            gas_wanted: 0,
            tags: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        self.code.category()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }
}
