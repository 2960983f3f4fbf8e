use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "gateway", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Produce a verified price quote for a swap intent
    Quote {
        /// JSON request body; read from stdin when omitted
        body: Option<String>,
    },
    /// Run a protected swap execution
    Execute {
        /// JSON request body; read from stdin when omitted
        body: Option<String>,
    },
    /// Point-in-time counters from the three defense layers
    Stats,
}

pub fn read_body(arg: Option<String>) -> anyhow::Result<serde_json::Value> {
    let text = match arg {
        Some(text) => text,
        None => std::io::read_to_string(std::io::stdin())?,
    };

    serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("request body is not valid JSON: {e}"))
}
