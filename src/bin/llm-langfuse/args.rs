use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "llm-langfuse",
    about = "Run the OpenAI chat model node with Langfuse tracing outside a workflow engine"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the client and print the resolved request parameters
    Inspect(NodeArgs),
    /// Send one prompt and print the reply with its token usage
    Chat {
        #[command(flatten)]
        node: NodeArgs,
        #[arg(long)]
        system: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Manage credentials in the local secret store
    #[command(subcommand)]
    Secrets(SecretsCommand),
}

#[derive(Args, Debug)]
pub struct NodeArgs {
    /// Node configuration file (.yaml, .yml, .toml or .json)
    #[arg(long, short = 'c')]
    pub config: PathBuf,
    /// Workflow item whose parameter overrides apply
    #[arg(long, default_value_t = 0)]
    pub item: usize,
}

#[derive(Subcommand, Debug)]
pub enum SecretsCommand {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    List,
}
