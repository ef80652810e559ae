//! Validation traces
//!
//! A trace mirrors the nesting of the validated shape: issues found at a
//! level are kept there, issues found through a field are nested under the
//! field alias. An empty trace means success.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, Trace>,
}

impl Trace {
    /// The empty (successful) trace
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace holding a single issue
    pub fn issue(message: impl Into<String>) -> Self {
        Self::issues([message.into()])
    }

    /// A trace holding the given issues (duplicates merged)
    pub fn issues(messages: impl IntoIterator<Item = String>) -> Self {
        let mut trace = Self::new();
        for message in messages {
            trace.add_issue(message);
        }
        trace
    }

    /// A trace nesting `child` under `label`; empty children are dropped
    pub fn field(label: impl Into<String>, child: Trace) -> Self {
        let mut trace = Self::new();
        if !child.is_empty() {
            trace.fields.insert(label.into(), child);
        }
        trace
    }

    fn add_issue(&mut self, message: String) {
        if !self.issues.contains(&message) {
            self.issues.push(message);
        }
    }

    /// Merge another trace into this one, label by label
    pub fn merge(mut self, other: Trace) -> Trace {
        for message in other.issues {
            self.add_issue(message);
        }

        for (label, child) in other.fields {
            let merged = match self.fields.remove(&label) {
                Some(existing) => existing.merge(child),
                None => child,
            };

            if !merged.is_empty() {
                self.fields.insert(label, merged);
            }
        }

        self
    }

    /// Check if no issue was reported anywhere in the tree
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.fields.values().all(Trace::is_empty)
    }

    /// Issues at this level
    pub fn messages(&self) -> &[String] {
        &self.issues
    }

    /// Nested traces by field alias
    pub fn fields(&self) -> &BTreeMap<String, Trace> {
        &self.fields
    }

    /// Nested trace for a field alias
    pub fn get(&self, label: &str) -> Option<&Trace> {
        self.fields.get(label)
    }
}

impl FromIterator<Trace> for Trace {
    fn from_iter<T: IntoIterator<Item = Trace>>(iter: T) -> Self {
        iter.into_iter().fold(Trace::new(), Trace::merge)
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}
