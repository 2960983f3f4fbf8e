pub mod cli;

use clap::Parser;

use cli::{Cli, Command, read_body};
use gateway::{AppConfig, Gateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::logger::init_logger("gateway");

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let gateway = Gateway::new(&config).await?;

    let reply = match cli.command {
        Command::Quote { body } => gateway.handle_quote(read_body(body)?).await,
        Command::Execute { body } => gateway.handle_execute(read_body(body)?).await,
        Command::Stats => gateway.handle_security_stats(),
    };

    println!("{}", serde_json::to_string_pretty(&reply.body)?);

    if reply.status >= 400 {
        std::process::exit(1);
    }
    Ok(())
}
