use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::builder::ChatModelBuilder;
use crate::client::ChatOpenAI;
use crate::error::LLMError;
use crate::options::{BuiltInTools, ChatOptions, LangfuseContext};

use super::context::{params, ExecutionContext};
use super::model::resolve_model;

/// The node's single output slot.
#[derive(Debug)]
pub struct SupplyData {
    pub response: ChatOpenAI,
}

/// Reads a structured parameter, treating unset and `null` as the default.
fn parameter<T, C>(ctx: &C, name: &str, item_index: usize) -> Result<T, LLMError>
where
    T: DeserializeOwned + Default,
    C: ExecutionContext + ?Sized,
{
    match ctx.node_parameter(name, item_index) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| LLMError::InvalidRequest(format!("Invalid parameter {name}: {e}"))),
    }
}

/// Builds the traced chat client for one workflow item.
///
/// Credentials are fetched first; any malformed parameter or embedded JSON
/// aborts the invocation.
pub async fn supply_data<C>(ctx: &C, item_index: usize) -> Result<SupplyData, LLMError>
where
    C: ExecutionContext + ?Sized,
{
    crate::telemetry::init();

    let credentials = ctx.credentials().await?;
    credentials.validate()?;

    let options = ChatOptions::from_value(ctx.node_parameter(params::OPTIONS, item_index))?;
    let langfuse =
        LangfuseContext::from_value(ctx.node_parameter(params::LANGFUSE_METADATA, item_index))?;
    let responses_api: bool = parameter(ctx, params::RESPONSES_API_ENABLED, item_index)?;
    let builtin_tools: BuiltInTools = parameter(ctx, params::BUILT_IN_TOOLS, item_index)?;
    let model = resolve_model(
        ctx.node_version(),
        ctx.node_parameter(params::MODEL, item_index),
    )?;

    log::debug!(
        "supplying chat model node={} item={item_index} model={model} responses_api={responses_api}",
        ctx.node_name()
    );

    let mut builder = ChatModelBuilder::new()
        .api_key(credentials.api_key.expose_secret().as_str())
        .model(model)
        .options(options)
        .responses_api(responses_api)
        .builtin_tools(builtin_tools)
        .node_name(ctx.node_name())
        .langfuse_base_url(credentials.langfuse_base_url.as_str())
        .langfuse_keys(
            credentials.langfuse_public_key.as_str(),
            credentials.langfuse_secret_key.expose_secret().as_str(),
        )
        .langfuse_context(langfuse);
    if let Some(url) = credentials.base_url() {
        builder = builder.base_url(url);
    }
    if let Some(organization) = credentials.organization_id() {
        builder = builder.organization(organization);
    }
    if let Some((name, value)) = credentials.custom_header() {
        builder = builder.header(name, value);
    }

    Ok(SupplyData {
        response: builder.build()?,
    })
}
