//! Test doubles shared across modules

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::agents::AgentKind;
use crate::error::LlmError;
use crate::llm::{Completion, LanguageModel};
use crate::types::DataMap;

#[derive(Clone)]
enum Script {
    Respond(String),
    Fail(String),
}

/// A [`LanguageModel`] that answers by the `Agent ID` line in the prompt
#[derive(Clone, Default)]
pub struct ScriptedModel {
    scripts: HashMap<String, Script>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    invoked: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every listed agent with an object holding its full schema
    pub fn complete(kinds: &[AgentKind]) -> Self {
        kinds
            .iter()
            .fold(Self::new(), |model, kind| {
                model.respond(kind.id(), &full_output(*kind).to_string())
            })
    }

    pub fn respond(self, agent_id: &str, text: &str) -> Self {
        self.script(agent_id, Script::Respond(text.to_string()))
    }

    pub fn fail(self, agent_id: &str, message: &str) -> Self {
        self.script(agent_id, Script::Fail(message.to_string()))
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn script(mut self, agent_id: &str, script: Script) -> Self {
        self.scripts.insert(agent_id.to_string(), script);
        self
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Agent ids in the order they called the model
    pub fn invocations(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.invoked)
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn invoke(&self, prompt: &str) -> Result<Completion, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let agent_id = agent_id_of(prompt);
        self.invoked.lock().push(agent_id.clone());
        self.prompts.lock().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.scripts.get(&agent_id) {
            Some(Script::Respond(text)) => Ok(Completion::new(text.clone())),
            Some(Script::Fail(message)) => Err(LlmError::Api {
                status: 503,
                message: message.clone(),
            }),
            None => Err(LlmError::Unavailable(format!(
                "no scripted response for {agent_id}"
            ))),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn agent_id_of(prompt: &str) -> String {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix("- Agent ID: "))
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Output containing every schema key of `kind`
pub fn full_output(kind: AgentKind) -> Value {
    let map: DataMap = kind
        .profile()
        .output_schema
        .iter()
        .map(|key| (key.to_string(), json!({"summary": format!("{key} for {kind}")})))
        .collect();
    Value::Object(map)
}

/// Unwrap a `json!` object literal
pub fn object(value: Value) -> DataMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
