//! Deterministic capability backed by closures
//!
//! Lets the whole pipeline run without a network: each [`PromptPurpose`] gets
//! a handler, and every prompt received is recorded for later inspection.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{CapabilityError, GenerativeCapability, PromptPurpose, PromptSpec};

type Handler =
    Box<dyn Fn(&PromptSpec) -> Result<Map<String, Value>, CapabilityError> + Send + Sync>;

pub struct ScriptedCapability {
    model: String,
    handlers: HashMap<PromptPurpose, Handler>,
    calls: Mutex<Vec<PromptSpec>>,
}

impl ScriptedCapability {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            handlers: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register a handler for one purpose, replacing any previous one.
    #[must_use]
    pub fn on<F>(mut self, purpose: PromptPurpose, handler: F) -> Self
    where
        F: Fn(&PromptSpec) -> Result<Map<String, Value>, CapabilityError> + Send + Sync + 'static,
    {
        self.handlers.insert(purpose, Box::new(handler));
        self
    }

    /// Always answer `purpose` with the same JSON value.
    ///
    /// Non-object values are answered with [`CapabilityError::NotAnObject`],
    /// which mirrors what the real client does with such output.
    #[must_use]
    pub fn answer(self, purpose: PromptPurpose, value: Value) -> Self {
        self.on(purpose, move |_| match &value {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(CapabilityError::NotAnObject),
        })
    }

    /// Prompts received so far, in call order
    pub fn calls(&self) -> Vec<PromptSpec> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self, purpose: PromptPurpose) -> usize {
        self.calls()
            .iter()
            .filter(|spec| spec.purpose == purpose)
            .count()
    }
}

#[async_trait]
impl GenerativeCapability for ScriptedCapability {
    async fn generate(&self, spec: &PromptSpec) -> Result<Map<String, Value>, CapabilityError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(spec.clone());

        match self.handlers.get(&spec.purpose) {
            Some(handler) => handler(spec),
            None => Err(CapabilityError::Unscripted(spec.purpose)),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
