mod cli;
mod commands;
mod config;
mod error;
mod log;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use cli::{Cli, Context};
use commands::{run, settime};
use env_logger::{self, Env};

use crate::config::{ConfigError, MessengerConfig};
use crate::error::ErrorLog;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // setup env_logger
    let default_filter = if cli.verbose {
        "votecap=debug,votecap_client=debug,votecap_messenger=debug"
    } else {
        "votecap=info,votecap_client=info,votecap_messenger=info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = match MessengerConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            match &e {
                ConfigError::ConfigFileNotFound(_) | ConfigError::CustomConfigFileNotFound(_) => {
                    log::print_info("Create a votecap.toml or pass one with --config.");
                }
                ConfigError::ParseError(_) => {
                    log::print_info("Please check your votecap.toml file syntax.");
                }
                ConfigError::InvalidUrl(_) | ConfigError::InvalidValue(..) => {
                    log::print_info("Please fix the value in your votecap.toml file and try again.");
                }
                ConfigError::HomeDirectoryNotFound | ConfigError::FileReadError(_) => {}
            }
            ErrorLog::default().fatal(&e.into(), "Invalid configuration");
        }
    };

    let errors = ErrorLog::new(config.error_log_path());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if let Err(e) = rt.block_on(run_votecap_cli(cli, config)) {
        errors.handle(Some(&e), "Top level failure", false);
        return Err(e);
    }

    Ok(())
}

async fn run_votecap_cli(cli: Cli, config: MessengerConfig) -> Result<()> {
    if cli.verbose {
        log::print_title(&format!("VOTECAP {}", env!("CARGO_PKG_VERSION")));
    }

    let mut context = Context::try_build(&cli, config, Local::now().timestamp())?;

    ::log::debug!("Connected to: {}", context.client.url());
    ::log::debug!(
        "Using state file {} ({:?})",
        context.config.data_path().display(),
        context.store.persistence()
    );
    ::log::debug!("Logging errors to {}", context.errors.path().display());

    if let Some(time) = cli.settime {
        return settime::handle_settime(&mut context, time);
    }

    run::handle_run(&mut context).await
}
