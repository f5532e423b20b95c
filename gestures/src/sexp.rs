//! S-expression plist helpers for config input and status output.
//!
//! Configs and status reports use the same keyword plist shape as the
//! compositor IPC: `(:threshold 0.05 :mode :wait-until-timeout)`.

use lexpr::Value;

use crate::error::{GestureError, Result};

/// Borrowed view over a parsed keyword plist.
#[derive(Debug, Clone, Copy)]
pub struct Plist<'a> {
    value: &'a Value,
}

impl<'a> Plist<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Raw value following `:key`, if the key is present.
    ///
    /// Accepts both `Value::Keyword("key")` (elisp parser) and
    /// `Value::Symbol(":key")` (default parser) spellings.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        let prefixed = format!(":{}", key);
        let mut current = self.value;
        while let Value::Cons(pair) = current {
            let is_key = match pair.car() {
                Value::Keyword(k) => k.as_ref() == key,
                Value::Symbol(s) => s.as_ref() == prefixed,
                _ => false,
            };
            if is_key {
                return match pair.cdr() {
                    Value::Cons(next) => Some(next.car()),
                    _ => None,
                };
            }
            current = pair.cdr();
        }
        None
    }

    /// Value following `:key` rendered as a bare token.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(|val| match val {
            Value::Keyword(v) => v.to_string(),
            Value::Symbol(v) => v.strip_prefix(':').unwrap_or(v).to_string(),
            Value::String(v) => v.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => if *b { "t" } else { "nil" }.to_string(),
            Value::Null | Value::Nil => "nil".to_string(),
            other => other.to_string(),
        })
    }

    pub fn float(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| GestureError::parse(format!(":{key} is not a finite number"))),
            Some(other) => Err(GestureError::parse(format!(
                ":{key} expects a number, got {other}"
            ))),
        }
    }

    pub fn count(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| GestureError::parse(format!(":{key} expects a count, got {n}"))),
            Some(other) => Err(GestureError::parse(format!(
                ":{key} expects a count, got {other}"
            ))),
        }
    }

    /// Treats `nil`, `()` and `#f` as false, anything else as true.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.text(key).map(|s| s != "nil" && s != "#f")
    }
}

/// Parse a config string into an s-expression value.
pub fn parse(raw: &str) -> Result<Value> {
    lexpr::from_str(raw).map_err(|e| GestureError::parse(format!("malformed s-expression: {e}")))
}

pub fn bool_str(value: bool) -> &'static str {
    if value {
        "t"
    } else {
        "nil"
    }
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Format an event s-expression.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}
