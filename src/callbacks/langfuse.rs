use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::LLMError;

use super::handler::{CallbackHandler, LLMStart};
use super::result::LLMResult;

pub const DEFAULT_LANGFUSE_BASE_URL: &str = "https://cloud.langfuse.com";

const HANDLER_NAME: &str = "LangfuseHandler";
const DEFAULT_GENERATION_NAME: &str = "ChatOpenAI";

/// Connection and attribution settings for the Langfuse backend.
#[derive(Debug)]
pub struct LangfuseConfig {
    pub base_url: String,
    pub public_key: String,
    pub secret_key: SecretString,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl LangfuseConfig {
    pub fn new(
        base_url: impl Into<String>,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            public_key: public_key.into(),
            secret_key: SecretString::new(secret_key.into()),
            session_id: None,
            user_id: None,
            tags: Vec::new(),
            metadata: Map::new(),
        }
    }
}

struct PendingGeneration {
    start_time: DateTime<Utc>,
    model: String,
    input: Value,
    model_parameters: Value,
    metadata: Map<String, Value>,
}

/// Sends one trace and one generation per completed run to the Langfuse
/// ingestion API.
///
/// Usage is read from `tokenUsage` only; wrap the handler in
/// [`TokenUsageNormalizer`](super::TokenUsageNormalizer) to also pick up
/// estimated usage.
pub struct LangfuseHandler {
    client: reqwest::Client,
    config: LangfuseConfig,
    pending: Mutex<HashMap<Uuid, PendingGeneration>>,
}

#[derive(Serialize)]
struct IngestionEvent {
    id: String,
    timestamp: String,
    #[serde(rename = "type")]
    event_type: &'static str,
    body: Value,
}

#[derive(Deserialize, Default)]
struct IngestionResponse {
    #[serde(default)]
    errors: Vec<IngestionError>,
}

#[derive(Deserialize)]
struct IngestionError {
    id: String,
    status: u16,
    #[serde(default)]
    message: Option<String>,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl LangfuseHandler {
    pub fn new(config: LangfuseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: LangfuseConfig) -> Self {
        Self {
            client,
            config,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LangfuseConfig {
        &self.config
    }

    fn ingestion_url(&self) -> String {
        format!(
            "{}/api/public/ingestion",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn take_pending(&self, run_id: Uuid) -> Option<PendingGeneration> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&run_id)
    }

    fn trace_event(
        &self,
        trace_id: Uuid,
        now: DateTime<Utc>,
        input: &Value,
        output: &Value,
    ) -> IngestionEvent {
        let mut body = json!({
            "id": trace_id.to_string(),
            "timestamp": timestamp(now),
            "name": DEFAULT_GENERATION_NAME,
            "input": input,
            "output": output,
        });
        if let Some(session_id) = &self.config.session_id {
            body["sessionId"] = json!(session_id);
        }
        if let Some(user_id) = &self.config.user_id {
            body["userId"] = json!(user_id);
        }
        if !self.config.tags.is_empty() {
            body["tags"] = json!(self.config.tags);
        }
        if !self.config.metadata.is_empty() {
            body["metadata"] = Value::Object(self.config.metadata.clone());
        }
        IngestionEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: timestamp(now),
            event_type: "trace-create",
            body,
        }
    }

    fn generation_event(
        &self,
        run_id: Uuid,
        trace_id: Uuid,
        pending: Option<PendingGeneration>,
        now: DateTime<Utc>,
        completion: GenerationCompletion,
    ) -> IngestionEvent {
        let (start_time, model, input, model_parameters, mut metadata) = match pending {
            Some(p) => (p.start_time, Some(p.model), p.input, p.model_parameters, p.metadata),
            None => (now, None, Value::Null, Value::Null, Map::new()),
        };
        for (key, value) in &self.config.metadata {
            metadata.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut body = json!({
            "id": run_id.to_string(),
            "traceId": trace_id.to_string(),
            "name": DEFAULT_GENERATION_NAME,
            "startTime": timestamp(start_time),
            "endTime": timestamp(now),
            "input": input,
        });
        if let Some(model) = model {
            body["model"] = json!(model);
        }
        if model_parameters.is_object() {
            body["modelParameters"] = model_parameters;
        }
        if !metadata.is_empty() {
            body["metadata"] = Value::Object(metadata);
        }
        match completion {
            GenerationCompletion::Output { output, usage } => {
                body["output"] = output;
                if let Some(usage) = usage {
                    body["usage"] = usage;
                }
            }
            GenerationCompletion::Error(message) => {
                body["level"] = json!("ERROR");
                body["statusMessage"] = json!(message);
            }
        }
        IngestionEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: timestamp(now),
            event_type: "generation-create",
            body,
        }
    }

    async fn send_batch(&self, batch: Vec<IngestionEvent>) -> Result<(), LLMError> {
        let url = self.ingestion_url();
        log::debug!("Langfuse ingestion: {} events to {url}", batch.len());
        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.public_key,
                Some(self.config.secret_key.expose_secret()),
            )
            .json(&json!({ "batch": batch }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LLMError::ProviderError(format!(
                "Langfuse ingestion returned {status}: {text}"
            )));
        }
        let parsed: IngestionResponse = serde_json::from_str(&text).unwrap_or_default();
        if let Some(first) = parsed.errors.first() {
            return Err(LLMError::ProviderError(format!(
                "Langfuse rejected event {} ({}): {}",
                first.id,
                first.status,
                first.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(())
    }
}

enum GenerationCompletion {
    Output { output: Value, usage: Option<Value> },
    Error(String),
}

fn usage_body(output: &LLMResult) -> Option<Value> {
    let usage = output.token_usage()?;
    Some(json!({
        "input": usage.prompt_tokens,
        "output": usage.completion_tokens,
        "total": usage.total_tokens,
        "unit": "TOKENS",
    }))
}

#[async_trait]
impl CallbackHandler for LangfuseHandler {
    fn name(&self) -> &str {
        HANDLER_NAME
    }

    async fn handle_llm_start(&self, start: &LLMStart) -> Result<(), LLMError> {
        let pending = PendingGeneration {
            start_time: Utc::now(),
            model: start.model.clone(),
            input: serde_json::to_value(&start.messages)?,
            model_parameters: start.invocation_params.clone(),
            metadata: start.metadata.clone(),
        };
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(start.run_id, pending);
        Ok(())
    }

    async fn handle_llm_end(
        &self,
        output: &mut LLMResult,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        let now = Utc::now();
        let trace_id = parent_run_id.unwrap_or(run_id);
        let pending = self.take_pending(run_id);
        let input = pending
            .as_ref()
            .map(|p| p.input.clone())
            .unwrap_or(Value::Null);
        let text = json!(output.text());

        let trace = self.trace_event(trace_id, now, &input, &text);
        let generation = self.generation_event(
            run_id,
            trace_id,
            pending,
            now,
            GenerationCompletion::Output {
                output: text,
                usage: usage_body(output),
            },
        );
        self.send_batch(vec![trace, generation]).await
    }

    async fn handle_llm_error(
        &self,
        error: &LLMError,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        let now = Utc::now();
        let trace_id = parent_run_id.unwrap_or(run_id);
        let pending = self.take_pending(run_id);
        let input = pending
            .as_ref()
            .map(|p| p.input.clone())
            .unwrap_or(Value::Null);

        let trace = self.trace_event(trace_id, now, &input, &Value::Null);
        let generation = self.generation_event(
            run_id,
            trace_id,
            pending,
            now,
            GenerationCompletion::Error(error.to_string()),
        );
        self.send_batch(vec![trace, generation]).await
    }
}
