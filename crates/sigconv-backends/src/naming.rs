//! Collision-free output names for multi-rule backends.

use std::collections::HashSet;

/// Registry of output names assigned during one backend instance's
/// lifetime. Grows monotonically; never shrinks.
#[derive(Debug, Default)]
pub struct RuleNameRegistry {
    names: HashSet<String>,
}

impl RuleNameRegistry {
    pub fn new() -> Self {
        RuleNameRegistry::default()
    }

    /// Derive a unique output name from a rule title.
    ///
    /// Spaces are replaced with `-`; if the candidate collides with an
    /// already-assigned name, `-2`, `-3`, ... is appended until unique.
    /// The chosen name is registered before returning.
    pub fn assign(&mut self, title: &str) -> String {
        let candidate = title.replace(' ', "-");
        let name = if self.names.contains(&candidate) {
            let mut cnt = 2;
            while self.names.contains(&format!("{candidate}-{cnt}")) {
                cnt += 1;
            }
            format!("{candidate}-{cnt}")
        } else {
            candidate
        };
        self.names.insert(name.clone());
        name
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
