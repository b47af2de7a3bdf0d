//! Kind pluralization for REST path construction
//!
//! The API server addresses resources by their lower-cased plural form.
//! Most kinds pluralize by appending "s"; the handful that do not are kept
//! in an exception table that callers can extend without touching traversal
//! logic.

use std::collections::HashMap;

/// Injectable pluralization rules
#[derive(Debug, Clone)]
pub struct PluralRules {
    exceptions: HashMap<String, String>,
}

impl PluralRules {
    /// Rules with the built-in exception table
    pub fn new() -> Self {
        let mut exceptions = HashMap::new();
        for (singular, plural) in [
            ("ingress", "ingresses"),
            ("proxy", "proxies"),
            ("index", "indices"),
            ("matrix", "matrices"),
            ("vertex", "vertices"),
        ] {
            exceptions.insert(singular.to_string(), plural.to_string());
        }
        Self { exceptions }
    }

    /// Register an additional exception (lower-cased singular form)
    pub fn with_exception(mut self, singular: &str, plural: &str) -> Self {
        self.exceptions
            .insert(singular.to_lowercase(), plural.to_string());
        self
    }

    /// Pluralize a kind into its REST resource name
    pub fn pluralize(&self, kind: &str) -> String {
        let lower = kind.to_lowercase();
        match self.exceptions.get(&lower) {
            Some(plural) => plural.clone(),
            None => format!("{}s", lower),
        }
    }
}

impl Default for PluralRules {
    fn default() -> Self {
        Self::new()
    }
}
