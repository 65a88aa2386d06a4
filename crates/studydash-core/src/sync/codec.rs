use std::marker::PhantomData;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Converts a field value to and from its cache and remote representations.
///
/// By default the remote representation is the cache string wrapped in a
/// JSON string; structured codecs override both remote methods.
pub trait Codec<T>: Send + Sync {
    /// Cache string for `value`, or `None` when the key should be removed.
    fn encode(&self, value: &T) -> Result<Option<String>>;

    /// Decode a cache string. `None` means the entry is unusable.
    fn decode(&self, raw: &str) -> Option<T>;

    fn to_remote(&self, value: &T) -> Result<Value> {
        Ok(match self.encode(value)? {
            Some(raw) => Value::String(raw),
            None => Value::Null,
        })
    }

    fn from_remote(&self, value: Value) -> Option<T> {
        match value {
            Value::String(raw) => self.decode(&raw),
            _ => None,
        }
    }
}

/// Plain text stored verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl Codec<String> for Text {
    fn encode(&self, value: &String) -> Result<Option<String>> {
        Ok(Some(value.clone()))
    }

    fn decode(&self, raw: &str) -> Option<String> {
        Some(raw.to_string())
    }
}

/// Text that may be absent. An empty string counts as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalText;

impl Codec<Option<String>> for OptionalText {
    fn encode(&self, value: &Option<String>) -> Result<Option<String>> {
        Ok(value.clone().filter(|v| !v.is_empty()))
    }

    fn decode(&self, raw: &str) -> Option<Option<String>> {
        Some(Some(raw.to_string()).filter(|v| !v.is_empty()))
    }
}

/// Boolean stored as an "on"/"off" string flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flag;

impl Codec<bool> for Flag {
    fn encode(&self, value: &bool) -> Result<Option<String>> {
        Ok(Some(if *value { "on" } else { "off" }.to_string()))
    }

    fn decode(&self, raw: &str) -> Option<bool> {
        match raw.trim() {
            "on" | "true" | "1" => Some(true),
            "off" | "false" | "0" => Some(false),
            _ => None,
        }
    }

    fn from_remote(&self, value: Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(b),
            Value::String(raw) => self.decode(&raw),
            _ => None,
        }
    }
}

/// Optional pixel size stored as a decimal integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pixels;

impl Codec<Option<u32>> for Pixels {
    fn encode(&self, value: &Option<u32>) -> Result<Option<String>> {
        Ok(value.map(|px| px.to_string()))
    }

    fn decode(&self, raw: &str) -> Option<Option<u32>> {
        let trimmed = raw.trim().trim_end_matches("px");
        trimmed.parse::<u32>().ok().map(Some)
    }

    fn to_remote(&self, value: &Option<u32>) -> Result<Value> {
        Ok(match value {
            Some(px) => Value::from(*px),
            None => Value::Null,
        })
    }

    fn from_remote(&self, value: Value) -> Option<Option<u32>> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).map(Some),
            Value::String(raw) => self.decode(&raw),
            _ => None,
        }
    }
}

/// Structured value stored as a JSON document.
///
/// Remotely it is stored as structured JSON; a JSON-encoded string (as
/// written by older clients) is accepted as well.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for Json<T> {
    fn encode(&self, value: &T) -> Result<Option<String>> {
        Ok(Some(serde_json::to_string(value)?))
    }

    fn decode(&self, raw: &str) -> Option<T> {
        serde_json::from_str(raw).ok()
    }

    fn to_remote(&self, value: &T) -> Result<Value> {
        Ok(serde_json::to_value(value)?)
    }

    fn from_remote(&self, value: Value) -> Option<T> {
        match value {
            Value::String(raw) => self.decode(&raw),
            other => serde_json::from_value(other).ok(),
        }
    }
}
