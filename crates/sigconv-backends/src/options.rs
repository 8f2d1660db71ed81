//! Runtime options passed to a backend by the caller.

use std::collections::HashMap;

/// Value of a single backend option: a string, or `true` for a bare
/// presence-only flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Flag,
}

/// Options handed to a backend from the command line or another caller.
///
/// Built from a list of `key=value` or bare `key` tokens. Backends read
/// well-known keys and must tolerate any key being absent by falling back
/// to a documented default.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    values: HashMap<String, OptionValue>,
}

impl BackendOptions {
    pub fn new() -> Self {
        BackendOptions::default()
    }

    /// Parse option tokens. `key=value` stores the value string (split on
    /// the first `=` only); a bare `key` stores a presence flag.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        for token in tokens {
            let token = token.as_ref();
            match token.split_once('=') {
                Some((key, value)) => {
                    values.insert(key.to_string(), OptionValue::Str(value.to_string()));
                }
                None => {
                    values.insert(token.to_string(), OptionValue::Flag);
                }
            }
        }
        BackendOptions { values }
    }

    /// String value of an option, if present and set to a string.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptionValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// String value of an option, falling back to a default.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether an option is present at all (string or flag).
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
