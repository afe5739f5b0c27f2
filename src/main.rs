mod cli;
mod handlers;

use anyhow::Result;
use clap::Parser;

use bosque_kernel::config::{Config, KernelSettings};
use bosque_kernel::observability;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();
    let args = cli::Cli::parse();

    let cfg = Config::load();
    let mut settings = KernelSettings::from_config(&cfg);
    if let Some(cmd) = args.bosque_command {
        settings.bosque_command = cmd;
    }
    if let Some(cmd) = args.node_command {
        settings.node_command = cmd;
    }
    if let Some(secs) = args.timeout {
        settings.timeout = std::time::Duration::from_secs(secs);
    }

    match args.command {
        cli::Command::Run { file } => {
            let code = handlers::run::run(&file, settings).await?;
            std::process::exit(code);
        }
        cli::Command::Serve { connection_file } => {
            handlers::serve::run(settings, connection_file.as_deref()).await
        }
        cli::Command::Install { user } => handlers::install::run(user),
        cli::Command::Highlight { file } => handlers::highlight::run(&file),
    }
}
