#[path = "llm-langfuse/args.rs"]
mod args;
#[path = "llm-langfuse/commands.rs"]
mod commands;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    llm_langfuse::telemetry::init();
    let args = args::CliArgs::parse();
    commands::run(args).await
}
