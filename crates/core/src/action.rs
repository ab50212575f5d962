//! Action registry — an agent's fixed table of named behaviours.
//!
//! Each agent builds its registry once, in its constructor, from an explicit
//! list of `(ActionSpec, handler)` pairs. The registry is generic over the
//! agent's private state `S`: handlers get `&mut S` and the staged payload,
//! mutate what they own and return a result string.
//!
//! Every registry contains [`NOOP`], so a decision step always has at least
//! one valid option.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::error::ActionError;
use crate::provider::ToolDefinition;

/// Name of the always-present do-nothing action.
pub const NOOP: &str = "noop";

/// One named parameter of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// JSON Schema type ("string", "integer", ...)
    #[serde(rename = "type")]
    pub kind: String,

    pub description: String,

    pub required: bool,
}

/// Declarative description of an action: what the model sees when it has to
/// choose among several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,
}

impl ActionSpec {
    /// An action with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    pub fn param(
        mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameters.insert(
            name.into(),
            ParameterSpec {
                kind: kind.into(),
                description: description.into(),
                required,
            },
        );
        self
    }

    /// Names of the required parameters, in name order.
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Render as a tool definition. Pure.
    pub fn to_definition(&self) -> ToolDefinition {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|(name, p)| {
                (
                    name.clone(),
                    serde_json::json!({ "type": p.kind, "description": p.description }),
                )
            })
            .collect();

        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": self.required(),
            }),
        }
    }

    /// Check that every required parameter is present in `payload`.
    fn check_payload(&self, payload: &serde_json::Value) -> Result<(), ActionError> {
        if self.parameters.is_empty() {
            return Ok(());
        }
        let Some(obj) = payload.as_object() else {
            if self.required().is_empty() && payload.is_null() {
                return Ok(());
            }
            return Err(ActionError::InvalidArguments {
                action: self.name.clone(),
                reason: "payload must be a JSON object".into(),
            });
        };
        if let Some(missing) = self.required().into_iter().find(|k| !obj.contains_key(*k)) {
            return Err(ActionError::InvalidArguments {
                action: self.name.clone(),
                reason: format!("missing required parameter '{missing}'"),
            });
        }
        Ok(())
    }
}

/// A handler bound to one registry entry.
#[async_trait]
pub trait Action<S>: Send + Sync
where
    S: Send + 'static,
{
    /// Run the action against the agent's state with the staged payload.
    ///
    /// Returns the action's result text; empty means no observable output.
    async fn invoke(&self, state: &mut S, payload: &serde_json::Value) -> Result<String, ActionError>;
}

/// Adapter turning a synchronous closure into an [`Action`].
pub struct FnAction<F>(pub F);

#[async_trait]
impl<S, F> Action<S> for FnAction<F>
where
    S: Send + 'static,
    F: Fn(&mut S, &serde_json::Value) -> Result<String, ActionError> + Send + Sync,
{
    async fn invoke(&self, state: &mut S, payload: &serde_json::Value) -> Result<String, ActionError> {
        (self.0)(state, payload)
    }
}

struct NoopAction;

#[async_trait]
impl<S: Send + 'static> Action<S> for NoopAction {
    async fn invoke(&self, _state: &mut S, _payload: &serde_json::Value) -> Result<String, ActionError> {
        Ok(String::new())
    }
}

struct Entry<S> {
    spec: ActionSpec,
    handler: Box<dyn Action<S>>,
}

/// Maps action names to handlers and their specs.
pub struct ActionRegistry<S> {
    entries: BTreeMap<String, Entry<S>>,
}

impl<S: Send + 'static> ActionRegistry<S> {
    /// A registry holding only [`NOOP`].
    pub fn new() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
        };
        registry.register(ActionSpec::new(NOOP, "Do nothing"), NoopAction);
        registry
    }

    /// Register an action. Replaces any existing entry with the same name.
    pub fn register(&mut self, spec: ActionSpec, handler: impl Action<S> + 'static) {
        self.entries.insert(
            spec.name.clone(),
            Entry {
                spec,
                handler: Box::new(handler),
            },
        );
    }

    /// Register a synchronous closure.
    pub fn register_fn<F>(&mut self, spec: ActionSpec, f: F)
    where
        F: Fn(&mut S, &serde_json::Value) -> Result<String, ActionError> + Send + Sync + 'static,
    {
        self.register(spec, FnAction(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn spec(&self, name: &str) -> Option<&ActionSpec> {
        self.entries.get(name).map(|e| &e.spec)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tool definitions for every action (for a tool-style decision call).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.values().map(|e| e.spec.to_definition()).collect()
    }

    /// Look up `name` and run it.
    pub async fn invoke(
        &self,
        name: &str,
        state: &mut S,
        payload: &serde_json::Value,
    ) -> Result<String, ActionError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;
        entry.spec.check_payload(payload)?;
        entry.handler.invoke(state, payload).await
    }
}

impl<S: Send + 'static> Default for ActionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for ActionRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        value: i64,
    }

    fn counter_registry() -> ActionRegistry<Counter> {
        let mut registry = ActionRegistry::new();
        registry.register_fn(
            ActionSpec::new("add", "Add to the counter")
                .param("amount", "integer", "How much to add", true)
                .param("note", "string", "Why", false),
            |state: &mut Counter, payload: &serde_json::Value| {
                state.value += payload["amount"].as_i64().unwrap_or(0);
                Ok(format!("now {}", state.value))
            },
        );
        registry
    }

    #[test]
    fn noop_is_always_registered() {
        let registry: ActionRegistry<Counter> = ActionRegistry::new();
        assert!(registry.contains(NOOP));
        assert_eq!(registry.len(), 1);
        assert!(registry.spec(NOOP).unwrap().parameters.is_empty());
    }

    #[tokio::test]
    async fn invoke_mutates_state() {
        let registry = counter_registry();
        let mut state = Counter::default();
        let out = registry
            .invoke("add", &mut state, &serde_json::json!({"amount": 3}))
            .await
            .unwrap();
        assert_eq!(out, "now 3");
        assert_eq!(state.value, 3);
    }

    #[tokio::test]
    async fn invoke_unknown_action() {
        let registry = counter_registry();
        let mut state = Counter::default();
        let err = registry
            .invoke("subtract", &mut state, &serde_json::Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::UnknownAction("subtract".into()));
    }

    #[tokio::test]
    async fn invoke_rejects_missing_required_parameter() {
        let registry = counter_registry();
        let mut state = Counter::default();
        let err = registry
            .invoke("add", &mut state, &serde_json::json!({"note": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidArguments { .. }));
        assert_eq!(state.value, 0);
    }

    #[tokio::test]
    async fn noop_returns_empty() {
        let registry = counter_registry();
        let mut state = Counter::default();
        let out = registry
            .invoke(NOOP, &mut state, &serde_json::Value::Null)
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn reregistration_overwrites() {
        let mut registry = counter_registry();
        registry.register_fn(ActionSpec::new("add", "Replaced"), |_: &mut Counter, _: &serde_json::Value| {
            Ok(String::new())
        });
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.spec("add").unwrap().description, "Replaced");
    }

    #[test]
    fn definition_renders_required_and_optional() {
        let registry = counter_registry();
        let def = registry.spec("add").unwrap().to_definition();
        assert_eq!(def.name, "add");
        assert_eq!(def.parameters["type"], "object");
        assert_eq!(def.parameters["properties"]["amount"]["type"], "integer");
        assert_eq!(def.parameters["properties"]["note"]["description"], "Why");
        assert_eq!(def.parameters["required"], serde_json::json!(["amount"]));
    }

    #[test]
    fn definitions_cover_every_action() {
        let registry = counter_registry();
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["add", "noop"]);
        let noop = registry.spec(NOOP).unwrap().to_definition();
        assert_eq!(noop.parameters["required"], serde_json::json!([]));
    }
}
