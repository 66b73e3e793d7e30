use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockito::Matcher;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::response::{estimate_tokens, Completion};
use super::*;
use crate::callbacks::{
    CallbackHandler, Callbacks, LLMResult, LLMStart, TokenUsage, TokenUsageNormalizer,
};
use crate::chat::ChatMessage;
use crate::error::LLMError;
use crate::mapper::{DirectFields, ExtraParameters, HostedTool};
use crate::options::SearchContextSize;

#[derive(Default)]
struct Recorder {
    starts: Mutex<Vec<LLMStart>>,
    ends: Mutex<Vec<Option<Map<String, Value>>>>,
    errors: Mutex<Vec<String>>,
}

#[async_trait]
impl CallbackHandler for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn handle_llm_start(&self, start: &LLMStart) -> Result<(), LLMError> {
        self.starts.lock().unwrap().push(start.clone());
        Ok(())
    }

    async fn handle_llm_end(
        &self,
        output: &mut LLMResult,
        _run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        self.ends.lock().unwrap().push(output.llm_output.clone());
        Ok(())
    }

    async fn handle_llm_error(
        &self,
        error: &LLMError,
        _run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        self.errors.lock().unwrap().push(error.to_string());
        Ok(())
    }
}

fn fields(base_url: &str) -> ChatOpenAIFields {
    let mut fields = ChatOpenAIFields::new("sk-test", "gpt-4o-mini");
    fields.network.base_url = Some(base_url.to_string());
    fields.direct = DirectFields {
        temperature: Some(0.7),
        ..DirectFields::default()
    };
    fields
}

fn fast_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        base_delay_ms: 1,
        max_delay_ms: 2,
        ..RetryPolicy::new(max_retries)
    }
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system().content("Be brief").build(),
        ChatMessage::user().content("Hi there").build(),
    ]
}

const COMPLETION_WITH_USAGE: &str = r#"{
    "id": "chatcmpl-1",
    "model": "gpt-4o-mini-2024-07-18",
    "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Hello!" }, "finish_reason": "stop" }],
    "usage": { "prompt_tokens": 11, "completion_tokens": 3, "total_tokens": 14 }
}"#;

const COMPLETION_WITHOUT_USAGE: &str = r#"{
    "choices": [{ "message": { "role": "assistant", "content": "Hello!" }, "finish_reason": "stop" }]
}"#;

#[tokio::test]
async fn invoke_posts_chat_completion_and_reports_usage() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.7,
            "stream": false,
            "messages": [
                { "role": "system", "content": "Be brief" },
                { "role": "user", "content": "Hi there" }
            ]
        })))
        .with_status(200)
        .with_body(COMPLETION_WITH_USAGE)
        .expect(1)
        .create_async()
        .await;

    let model = ChatOpenAI::new(fields(&server.url())).unwrap();
    let result = model.invoke(&conversation()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.text(), Some("Hello!"));
    assert_eq!(
        result.token_usage(),
        Some(TokenUsage {
            prompt_tokens: 11,
            completion_tokens: 3,
            total_tokens: 14,
        })
    );
    assert!(result.estimated_token_usage().is_none());
    let info = result.generations[0][0].generation_info.as_ref().unwrap();
    assert_eq!(info["finishReason"], json!("stop"));
}

#[tokio::test]
async fn invoke_estimates_usage_when_provider_omits_it() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(COMPLETION_WITHOUT_USAGE)
        .create_async()
        .await;

    let model = ChatOpenAI::new(fields(&server.url())).unwrap();
    let result = model.invoke(&conversation()).await.unwrap();

    assert!(result.token_usage().is_none());
    assert_eq!(
        result.estimated_token_usage(),
        Some(TokenUsage {
            prompt_tokens: 4,
            completion_tokens: 2,
            total_tokens: 6,
        })
    );
}

#[tokio::test]
async fn normalizer_turns_estimate_into_reported_usage_for_later_handlers() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(COMPLETION_WITHOUT_USAGE)
        .create_async()
        .await;

    let recorder = Arc::new(Recorder::default());
    let mut fields = fields(&server.url());
    let handlers: Vec<Arc<dyn CallbackHandler>> =
        vec![Arc::new(TokenUsageNormalizer::new(recorder.clone()))];
    fields.callbacks = Callbacks::new(handlers);
    fields.metadata.insert("sessionId".to_string(), json!("s-1"));
    let model = ChatOpenAI::new(fields).unwrap();

    let result = model.invoke(&conversation()).await.unwrap();

    assert!(result.token_usage().is_some());
    let starts = recorder.starts.lock().unwrap();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].model, "gpt-4o-mini");
    assert_eq!(starts[0].messages.len(), 2);
    assert_eq!(starts[0].metadata["sessionId"], json!("s-1"));
    assert!(starts[0].invocation_params.get("messages").is_none());
    let ends = recorder.ends.lock().unwrap();
    assert!(ends[0].as_ref().unwrap().contains_key("tokenUsage"));
}

#[tokio::test]
async fn transient_failures_are_retried_then_reported() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .expect(3)
        .create_async()
        .await;

    let recorder = Arc::new(Recorder::default());
    let mut fields = fields(&server.url());
    let handlers: Vec<Arc<dyn CallbackHandler>> = vec![recorder.clone()];
    fields.callbacks = Callbacks::new(handlers);
    let model = ChatOpenAI::new(fields)
        .unwrap()
        .with_retry_policy(fast_retries(2));

    let err = model.invoke(&conversation()).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, LLMError::ProviderError(ref msg) if msg.contains("503")));
    assert_eq!(recorder.errors.lock().unwrap().len(), 1);
    assert!(recorder.ends.lock().unwrap().is_empty());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let bad_request = server
        .mock("POST", "/chat/completions")
        .with_status(400)
        .with_body(r#"{"error":{"message":"bad temperature"}}"#)
        .expect(1)
        .create_async()
        .await;

    let model = ChatOpenAI::new(fields(&server.url()))
        .unwrap()
        .with_retry_policy(fast_retries(2));
    let err = model.invoke(&conversation()).await.unwrap_err();

    bad_request.assert_async().await;
    assert!(
        matches!(err, LLMError::ResponseFormatError { ref raw_response, .. } if raw_response.contains("bad temperature"))
    );
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body("invalid key")
        .create_async()
        .await;

    let model = ChatOpenAI::new(fields(&server.url())).unwrap();
    let err = model.invoke(&conversation()).await.unwrap_err();

    assert!(matches!(err, LLMError::AuthError(_)));
}

#[tokio::test]
async fn responses_mode_sends_tools_and_instructions() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/responses")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "instructions": "Be brief",
            "input": [{ "role": "user", "content": "Hi there" }],
            "max_output_tokens": 256,
            "reasoning": { "effort": "low" },
            "tools": [{ "type": "web_search", "search_context_size": "medium" }]
        })))
        .with_status(200)
        .with_body(
            r#"{
                "model": "gpt-4o-mini",
                "status": "completed",
                "output": [
                    { "type": "web_search_call", "id": "ws_1" },
                    { "type": "message", "content": [
                        { "type": "output_text", "text": "Hello" },
                        { "type": "output_text", "text": " world" }
                    ] }
                ],
                "usage": { "input_tokens": 9, "output_tokens": 2, "total_tokens": 11 }
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let mut fields = fields(&server.url());
    fields.use_responses_api = true;
    fields.direct.max_tokens = Some(256);
    let mut kwargs = Map::new();
    kwargs.insert("reasoning".to_string(), json!({ "effort": "low" }));
    fields.model_kwargs = ExtraParameters::from(kwargs);
    let mut model = ChatOpenAI::new(fields).unwrap();
    model
        .attach_builtin_tools(vec![HostedTool::WebSearch {
            search_context_size: SearchContextSize::Medium,
            user_location: None,
            filters: None,
        }])
        .unwrap();

    let result = model.invoke(&conversation()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.text(), Some("Hello world"));
    assert_eq!(result.token_usage().map(|u| u.total_tokens), Some(11));
}

#[test]
fn invocation_params_flatten_extras_and_skip_unset_token_limit() {
    let mut fields = fields("https://api.openai.com/v1");
    fields.direct.max_tokens = Some(-1);
    fields.direct.top_p = Some(0.9);
    let mut kwargs = Map::new();
    kwargs.insert("response_format".to_string(), json!({ "type": "json_object" }));
    fields.model_kwargs = ExtraParameters::from(kwargs);
    let model = ChatOpenAI::new(fields).unwrap();

    let params = model.invocation_params().unwrap();

    assert_eq!(
        params,
        json!({
            "model": "gpt-4o-mini",
            "temperature": 0.7,
            "top_p": 0.9,
            "stream": false,
            "response_format": { "type": "json_object" }
        })
    );
}

#[test]
fn tools_are_not_sent_to_chat_completions() {
    let mut model = ChatOpenAI::new(fields("https://api.openai.com/v1")).unwrap();
    model
        .attach_builtin_tools(vec![HostedTool::CodeInterpreter])
        .unwrap();

    assert_eq!(
        model.builtin_tools(),
        Some(&json!([{ "type": "code_interpreter" }]))
    );
    assert!(model.invocation_params().unwrap().get("tools").is_none());

    model.attach_builtin_tools(Vec::new()).unwrap();
    assert!(model.builtin_tools().is_none());
}

#[test]
fn base_url_precedence_and_normalization() {
    let mut with_direct = ChatOpenAIFields::new("sk-test", "gpt-4o");
    with_direct.direct.base_url = Some("https://proxy.example.com/v1".to_string());
    let model = ChatOpenAI::new(with_direct).unwrap();
    assert_eq!(model.base_url().as_str(), "https://proxy.example.com/v1/");

    let mut both = ChatOpenAIFields::new("sk-test", "gpt-4o");
    both.direct.base_url = Some("https://proxy.example.com/v1".to_string());
    both.network.base_url = Some("https://gateway.example.com/openai/".to_string());
    let model = ChatOpenAI::new(both).unwrap();
    assert_eq!(model.base_url().as_str(), "https://proxy.example.com/v1/");

    let mut network_only = ChatOpenAIFields::new("sk-test", "gpt-4o");
    network_only.network.base_url = Some("https://gateway.example.com/openai".to_string());
    let model = ChatOpenAI::new(network_only).unwrap();
    assert_eq!(model.base_url().as_str(), "https://gateway.example.com/openai/");

    let model = ChatOpenAI::new(ChatOpenAIFields::new("sk-test", "gpt-4o")).unwrap();
    assert_eq!(model.base_url().as_str(), DEFAULT_BASE_URL);
}

#[test]
fn construction_rejects_missing_key_and_bad_urls() {
    let err = ChatOpenAI::new(ChatOpenAIFields::new("  ", "gpt-4o")).unwrap_err();
    assert!(matches!(err, LLMError::AuthError(_)));

    let mut bad_url = ChatOpenAIFields::new("sk-test", "gpt-4o");
    bad_url.network.base_url = Some("not a url".to_string());
    assert!(matches!(
        ChatOpenAI::new(bad_url).unwrap_err(),
        LLMError::InvalidRequest(_)
    ));

    let mut bad_header = ChatOpenAIFields::new("sk-test", "gpt-4o");
    bad_header
        .network
        .default_headers
        .insert("bad header".to_string(), "x".to_string());
    assert!(matches!(
        ChatOpenAI::new(bad_header).unwrap_err(),
        LLMError::InvalidRequest(_)
    ));
}

#[tokio::test]
async fn empty_conversation_is_rejected_before_any_request() {
    let model = ChatOpenAI::new(fields("http://127.0.0.1:9")).unwrap();
    let err = model.invoke(&[]).await.unwrap_err();
    assert!(matches!(err, LLMError::InvalidRequest(_)));
}

#[test]
fn backoff_grows_and_caps() {
    let policy = RetryPolicy::new(5);
    let delays = (0..6).map(|idx| policy.delay_for(idx)).collect::<Vec<_>>();
    assert_eq!(delays, vec![199, 394, 789, 1400, 1595, 1590]);

    let steady = RetryPolicy {
        jitter: false,
        ..RetryPolicy::new(5)
    };
    assert_eq!(steady.delay_for(0), 200);
    assert_eq!(steady.delay_for(10), 2_000);
    assert_eq!(policy.max_attempts(), 6);
}

#[test]
fn only_transient_errors_are_retryable() {
    assert!(RetryPolicy::is_retryable(&LLMError::HttpError("reset".into())));
    assert!(RetryPolicy::is_retryable(&LLMError::ProviderError("503".into())));
    assert!(!RetryPolicy::is_retryable(&LLMError::AuthError("401".into())));
    assert!(!RetryPolicy::is_retryable(&LLMError::InvalidRequest("x".into())));
}

#[test]
fn token_estimate_rounds_up_per_four_chars() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abc"), 1);
    assert_eq!(estimate_tokens("abcd"), 1);
    assert_eq!(estimate_tokens("abcde"), 2);
    assert_eq!(estimate_tokens("héllo"), 2);
}

struct RejectingStart;

#[async_trait]
impl CallbackHandler for RejectingStart {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn handle_llm_start(&self, _start: &LLMStart) -> Result<(), LLMError> {
        Err(LLMError::Generic("start rejected".to_string()))
    }

    async fn handle_llm_end(
        &self,
        _output: &mut LLMResult,
        _run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        Ok(())
    }

    async fn handle_llm_error(
        &self,
        _error: &LLMError,
        _run_id: Uuid,
        _parent_run_id: Option<Uuid>,
    ) -> Result<(), LLMError> {
        Ok(())
    }
}

#[tokio::test]
async fn failed_start_closes_runs_already_opened() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let recorder = Arc::new(Recorder::default());
    let handlers: Vec<Arc<dyn CallbackHandler>> = vec![recorder.clone(), Arc::new(RejectingStart)];
    let mut fields = fields(&server.url());
    fields.callbacks = Callbacks::new(handlers);
    let model = ChatOpenAI::new(fields).unwrap();

    let err = model.invoke(&conversation()).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, LLMError::Generic(ref msg) if msg == "start rejected"));
    assert_eq!(recorder.starts.lock().unwrap().len(), 1);
    assert_eq!(
        recorder.errors.lock().unwrap().as_slice(),
        ["Generic error: start rejected".to_string()]
    );
}

#[test]
fn estimated_usage_sums_prompt_messages() {
    let messages = vec![ChatMessage::user().content("abcd").build(); 3];
    let result = Completion {
        text: "ok".to_string(),
        model: None,
        finish_reason: None,
        usage: None,
    }
    .into_result(&messages);

    assert_eq!(
        result.estimated_token_usage(),
        Some(TokenUsage {
            prompt_tokens: 3,
            completion_tokens: 1,
            total_tokens: 4,
        })
    );
}
