//! Per-agent key/value memory with contextual retrieval.
//!
//! A `MemoryStore` is owned by exactly one agent and changed only by that
//! agent's `store`/`remove` actions. Each cycle the agent asks its backend
//! which keys matter for the conversation and narrows the store to a
//! `ContextualMemory` holding just those entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value entries remembered by one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.
    pub fn store(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the entries named in `keys` into a fresh contextual subset.
    ///
    /// Names that are not in the store are skipped, so the subset's key set
    /// is always contained in the store's.
    pub fn contextual_subset<K: AsRef<str>>(&self, keys: &[K]) -> ContextualMemory {
        let entries = keys
            .iter()
            .filter_map(|k| {
                let k = k.as_ref();
                match self.entries.get(k) {
                    Some(v) => Some((k.to_string(), v.clone())),
                    None => {
                        tracing::debug!(key = k, "Selected memory key not in store, skipping");
                        None
                    }
                }
            })
            .collect();
        ContextualMemory { entries }
    }
}

/// The slice of an agent's memory judged relevant to the current cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualMemory {
    entries: BTreeMap<String, String>,
}

impl ContextualMemory {
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a prompt block.
    pub fn render(&self) -> String {
        let mut block = String::from("## CONTEXTUAL MEMORY");
        for (k, v) in &self.entries {
            block.push('\n');
            block.push_str(&format!("{k}: {v}"));
        }
        block
    }
}

/// Shape of a structured key-selection answer: `{"key_list": [...]}`.
#[derive(Debug, Deserialize)]
struct KeySelection {
    key_list: Vec<String>,
}

/// Error parsing a key-selection answer from the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unparseable memory key selection: {0}")]
pub struct KeySelectionError(pub String);

/// Parse the backend's answer to "which memory keys are relevant?".
///
/// Accepts `{"key_list": ["a", "b"]}` or a bare `["a", "b"]`, optionally
/// wrapped in a Markdown code fence.
pub fn parse_key_selection(raw: &str) -> Result<Vec<String>, KeySelectionError> {
    let trimmed = strip_code_fence(raw.trim());
    if let Ok(selection) = serde_json::from_str::<KeySelection>(trimmed) {
        return Ok(selection.key_list);
    }
    serde_json::from_str::<Vec<String>>(trimmed).map_err(|e| KeySelectionError(e.to_string()))
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop an optional language tag on the opening fence.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.store("color", "blue");
        store.store("pet", "cat");
        store.store("city", "Lisbon");
        store
    }

    #[test]
    fn store_then_remove_leaves_no_entry() {
        let mut store = MemoryStore::new();
        store.store("color", "blue");
        assert_eq!(store.get("color"), Some("blue"));
        assert_eq!(store.remove("color"), Some("blue".into()));
        assert!(!store.contains("color"));
        assert!(store.is_empty());
    }

    #[test]
    fn store_overwrites() {
        let mut store = MemoryStore::new();
        store.store("color", "blue");
        store.store("color", "red");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("color"), Some("red"));
    }

    #[test]
    fn subset_copies_selected_keys() {
        let store = sample();
        let ctx = store.contextual_subset(&["pet", "color"]);
        assert_eq!(ctx.keys(), vec!["color", "pet"]);
        assert_eq!(ctx.get("pet"), Some("cat"));
    }

    #[test]
    fn subset_is_always_contained_in_store() {
        let store = sample();
        let selections: Vec<Vec<&str>> = vec![
            vec![],
            vec!["nope"],
            vec!["color", "color", "ghost", ""],
            vec!["city", "pet", "color", "weather"],
        ];
        for keys in selections {
            let ctx = store.contextual_subset(&keys);
            assert!(ctx.keys().iter().all(|k| store.contains(k)), "{keys:?}");
        }
    }

    #[test]
    fn subset_of_empty_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.contextual_subset(&["anything"]).is_empty());
    }

    #[test]
    fn parse_structured_selection() {
        let keys = parse_key_selection(r#"{"key_list": ["color", "pet"]}"#).unwrap();
        assert_eq!(keys, vec!["color", "pet"]);
    }

    #[test]
    fn parse_bare_array_and_fenced() {
        assert_eq!(parse_key_selection(r#"["a"]"#).unwrap(), vec!["a"]);
        let fenced = "```json\n{\"key_list\": [\"b\"]}\n```";
        assert_eq!(parse_key_selection(fenced).unwrap(), vec!["b"]);
    }

    #[test]
    fn parse_garbage_fails() {
        assert!(parse_key_selection("color and pet, I think").is_err());
        assert!(parse_key_selection("").is_err());
        assert!(parse_key_selection(r#"{"keys": ["a"]}"#).is_err());
    }

    #[test]
    fn render_block() {
        let store = sample();
        let ctx = store.contextual_subset(&["color"]);
        assert_eq!(ctx.render(), "## CONTEXTUAL MEMORY\ncolor: blue");
        assert_eq!(ContextualMemory::default().render(), "## CONTEXTUAL MEMORY");
    }
}
