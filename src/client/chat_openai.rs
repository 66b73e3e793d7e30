use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::callbacks::{Callbacks, LLMResult, LLMStart};
use crate::chat::ChatMessage;
use crate::error::LLMError;
use crate::mapper::{DirectFields, ExtraParameters, HostedTool};

use super::config::{ChatOpenAIFields, DEFAULT_BASE_URL};
use super::request::{build_chat_completions_request, build_responses_request};
use super::response::{ChatCompletionResponse, Completion, ResponsesResponse};
use super::retry::RetryPolicy;

/// Metadata key under which hosted tool descriptors are attached.
pub const TOOLS_METADATA_KEY: &str = "tools";

/// Chat model client for OpenAI-compatible endpoints.
#[derive(Debug)]
pub struct ChatOpenAI {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: Url,
    direct: DirectFields,
    timeout_ms: u64,
    retry: RetryPolicy,
    callbacks: Callbacks,
    metadata: Map<String, Value>,
    model_kwargs: ExtraParameters,
    use_responses_api: bool,
}

impl ChatOpenAI {
    /// Builds the client and its HTTP transport.
    ///
    /// The base URL carried in the direct fields wins over the network one,
    /// which in turn wins over the public OpenAI endpoint.
    pub fn new(fields: ChatOpenAIFields) -> Result<Self, LLMError> {
        if fields.api_key.expose_secret().trim().is_empty() {
            return Err(LLMError::AuthError("Missing OpenAI API key".to_string()));
        }
        if fields.model.trim().is_empty() {
            return Err(LLMError::InvalidRequest("No model selected".to_string()));
        }

        let base_url = fields
            .direct
            .base_url
            .as_deref()
            .or(fields.network.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);
        let base_url = parse_base_url(base_url)?;

        let mut builder = reqwest::Client::builder();
        if fields.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(fields.timeout_ms));
        }
        if let Some(proxy) = fields.network.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| LLMError::InvalidRequest(format!("Invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if !fields.network.default_headers.is_empty() {
            let mut headers = HeaderMap::new();
            for (name, value) in &fields.network.default_headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| LLMError::InvalidRequest(format!("Invalid header name {name}: {e}")))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| LLMError::InvalidRequest(format!("Invalid header value: {e}")))?;
                headers.insert(name, value);
            }
            builder = builder.default_headers(headers);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            api_key: fields.api_key,
            model: fields.model,
            base_url,
            direct: fields.direct,
            timeout_ms: fields.timeout_ms,
            retry: RetryPolicy::new(fields.max_retries),
            callbacks: fields.callbacks,
            metadata: fields.metadata,
            model_kwargs: fields.model_kwargs,
            use_responses_api: fields.use_responses_api,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn direct_fields(&self) -> &DirectFields {
        &self.direct
    }

    pub fn model_kwargs(&self) -> &ExtraParameters {
        &self.model_kwargs
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn uses_responses_api(&self) -> bool {
        self.use_responses_api
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Stores hosted tool descriptors on the instance metadata.
    ///
    /// Only the Responses API sends them; an empty list removes the key.
    pub fn attach_builtin_tools(&mut self, tools: Vec<HostedTool>) -> Result<(), LLMError> {
        if tools.is_empty() {
            self.metadata.remove(TOOLS_METADATA_KEY);
            return Ok(());
        }
        let value = serde_json::to_value(tools)?;
        self.metadata.insert(TOOLS_METADATA_KEY.to_string(), value);
        Ok(())
    }

    pub fn builtin_tools(&self) -> Option<&Value> {
        self.metadata.get(TOOLS_METADATA_KEY)
    }

    /// Request parameters as they will be sent, minus the conversation.
    pub fn invocation_params(&self) -> Result<Value, LLMError> {
        let mut body = self.request_body(&[])?;
        if let Some(object) = body.as_object_mut() {
            object.remove("messages");
            object.remove("input");
            object.remove("instructions");
        }
        Ok(body)
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Result<Value, LLMError> {
        let extra = self.model_kwargs.as_map();
        let body = if self.use_responses_api {
            serde_json::to_value(build_responses_request(
                &self.model,
                messages,
                &self.direct,
                self.builtin_tools(),
                extra,
            ))?
        } else {
            serde_json::to_value(build_chat_completions_request(
                &self.model,
                messages,
                &self.direct,
                extra,
            ))?
        };
        Ok(body)
    }

    fn endpoint(&self) -> Result<Url, LLMError> {
        let path = if self.use_responses_api {
            "responses"
        } else {
            "chat/completions"
        };
        self.base_url
            .join(path)
            .map_err(|e| LLMError::HttpError(e.to_string()))
    }

    /// Sends the conversation and reports the run to every callback handler.
    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<LLMResult, LLMError> {
        self.invoke_with_parent(messages, None).await
    }

    pub async fn invoke_with_parent(
        &self,
        messages: &[ChatMessage],
        parent_run_id: Option<Uuid>,
    ) -> Result<LLMResult, LLMError> {
        if messages.is_empty() {
            return Err(LLMError::InvalidRequest(
                "At least one message is required".to_string(),
            ));
        }
        let run_id = Uuid::new_v4();
        let body = self.request_body(messages)?;
        let start = LLMStart {
            run_id,
            parent_run_id,
            model: self.model.clone(),
            messages: messages.to_vec(),
            invocation_params: self.invocation_params()?,
            metadata: self.metadata.clone(),
        };
        if let Err(err) = self.callbacks.on_start(&start).await {
            // Handlers that already started must still close the run.
            if let Err(close_err) = self.callbacks.on_error(&err, run_id, parent_run_id).await {
                log::warn!("callback error while closing failed start: {close_err}");
            }
            return Err(err);
        }

        match self.retry.run(|| self.complete(&body)).await {
            Ok(completion) => {
                let mut result = completion.into_result(messages);
                self.callbacks
                    .on_end(&mut result, run_id, parent_run_id)
                    .await?;
                Ok(result)
            }
            Err(err) => {
                self.callbacks
                    .on_error(&err, run_id, parent_run_id)
                    .await?;
                Err(err)
            }
        }
    }

    async fn complete(&self, body: &Value) -> Result<Completion, LLMError> {
        if self.use_responses_api {
            let response: ResponsesResponse = self.send_and_parse(body, "OpenAI responses").await?;
            Ok(response.into())
        } else {
            let response: ChatCompletionResponse =
                self.send_and_parse(body, "OpenAI chat completions").await?;
            Ok(response.into())
        }
    }

    fn log_request_payload<T: Serialize>(&self, label: &str, body: &T) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        if let Ok(json) = serde_json::to_string(body) {
            log::trace!("{label}: {json}");
        }
    }

    async fn send_request<T: Serialize>(
        &self,
        body: &T,
        label: &str,
    ) -> Result<reqwest::Response, LLMError> {
        let url = self.endpoint()?;
        let request = self
            .client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body);
        self.log_request_payload(label, body);
        request.send().await.map_err(LLMError::from)
    }

    async fn ensure_success_response(
        &self,
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, LLMError> {
        log::debug!("{context} HTTP status: {}", response.status());
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await?;
        Err(match status.as_u16() {
            401 | 403 => LLMError::AuthError(format!("{context} returned {status}: {error_text}")),
            429 | 500..=599 => {
                LLMError::ProviderError(format!("{context} returned {status}: {error_text}"))
            }
            _ => LLMError::ResponseFormatError {
                message: format!("{context} returned error status: {status}"),
                raw_response: error_text,
            },
        })
    }

    async fn send_and_parse<T: DeserializeOwned, B: Serialize>(
        &self,
        body: &B,
        context: &str,
    ) -> Result<T, LLMError> {
        let response = self.send_request(body, context).await?;
        let response = self.ensure_success_response(response, context).await?;
        let resp_text = response.text().await?;
        serde_json::from_str(&resp_text).map_err(|e| LLMError::ResponseFormatError {
            message: format!("Failed to decode {context} response: {e}"),
            raw_response: resp_text,
        })
    }
}

/// Parses a base URL and makes sure relative joins keep its last segment.
fn parse_base_url(raw: &str) -> Result<Url, LLMError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| LLMError::InvalidRequest(format!("Invalid base URL {raw}: {e}")))
}
