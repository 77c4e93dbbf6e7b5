use std::process::ExitCode;

use clap::Parser;
use log::error;

use enshrouded_config::{Cli, EditorConfig, SettingsError, ops};

fn run(cli: Cli) -> Result<String, SettingsError> {
    let replace_corrupt = cli.replace_corrupt;
    let explicit_config = cli.config.clone();
    let (action, overrides) = cli.into_parts();

    let mut config = EditorConfig::load(explicit_config.as_deref())?;
    config.apply(overrides);

    Ok(ops::handle(action, &config, replace_corrupt)?.to_string())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
