use serde_json::json;

use llm_langfuse::chat::ChatMessage;
use llm_langfuse::config::load_node_config;
use llm_langfuse::node::{supply_data, StaticContext};
use llm_langfuse::secret_store::SecretStore;
use llm_langfuse::ChatOpenAI;

use crate::args::{CliArgs, Command, NodeArgs, SecretsCommand};

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    match args.command {
        Command::Inspect(node) => inspect(&node).await,
        Command::Chat {
            node,
            system,
            prompt,
        } => chat(&node, system, prompt.join(" ")).await,
        Command::Secrets(command) => secrets(command),
    }
}

async fn build_model(node: &NodeArgs) -> anyhow::Result<ChatOpenAI> {
    let config = load_node_config(&node.config)?;
    let mut ctx = StaticContext::new(config);
    if let Ok(store) = SecretStore::new() {
        ctx = ctx.with_secret_store(store);
    }
    Ok(supply_data(&ctx, node.item).await?.response)
}

async fn inspect(node: &NodeArgs) -> anyhow::Result<()> {
    let model = build_model(node).await?;
    let report = json!({
        "model": model.model(),
        "baseUrl": model.base_url().as_str(),
        "responsesApi": model.uses_responses_api(),
        "timeoutMs": model.timeout_ms(),
        "maxRetries": model.retry_policy().max_retries,
        "callbacks": model.callbacks().names(),
        "metadata": model.metadata(),
        "invocationParams": model.invocation_params()?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn chat(node: &NodeArgs, system: Option<String>, prompt: String) -> anyhow::Result<()> {
    let model = build_model(node).await?;
    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(ChatMessage::system().content(system).build());
    }
    messages.push(ChatMessage::user().content(prompt).build());

    let result = model.invoke(&messages).await?;
    println!("{}", result.text().unwrap_or_default());
    match (result.token_usage(), result.estimated_token_usage()) {
        (Some(usage), _) => eprintln!(
            "tokens: prompt={} completion={} total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        ),
        (None, Some(usage)) => eprintln!(
            "tokens (estimated): prompt={} completion={} total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        ),
        (None, None) => {}
    }
    Ok(())
}

fn secrets(command: SecretsCommand) -> anyhow::Result<()> {
    let mut store = SecretStore::new()?;
    match command {
        SecretsCommand::Set { key, value } => {
            store.set(&key, &value)?;
            println!("Secret '{key}' has been set.");
        }
        SecretsCommand::Get { key } => match store.get(&key) {
            Some(value) => println!("{key}: {value}"),
            None => println!("Secret '{key}' not found"),
        },
        SecretsCommand::Delete { key } => {
            if store.delete(&key)? {
                println!("Secret '{key}' deleted.");
            } else {
                println!("Secret '{key}' not found");
            }
        }
        SecretsCommand::List => {
            for key in store.keys() {
                println!("{key}");
            }
        }
    }
    Ok(())
}
