use clap::Parser;
use deploy_scripts::{cli::Cli, config::DeployConfig, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        config,
        network_args,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let config = DeployConfig::load(config.as_deref())?;

    command.run(&network_args, &config).await
}
