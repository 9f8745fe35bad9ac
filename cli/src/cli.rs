use anyhow::{Context as _, Result};
use chrono::NaiveTime;
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use votecap_api::TIME_FORMAT;
use votecap_client::{NodeClient, SenderWallet, Session};
use votecap_messenger::{ActivationClock, EligibilityRules, Persistence, StateStore};

use crate::config::MessengerConfig;
use crate::error::ErrorLog;

#[derive(Parser, Debug)]
#[command(
    name = "votecap",
    about = "Send a message to voters over your vote cap",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(short = 't', long = "test", help = "Run in test mode, no transactions will be made")]
    pub test: bool,

    #[arg(short = 'd', long = "dev", help = "Run in development mode, state is stored even in test mode")]
    pub dev: bool,

    #[arg(
        short = 's',
        long = "settime",
        value_name = "HH:MM",
        value_parser = parse_set_time,
        help = "Change the time of the interval in format 'HH:MM'"
    )]
    pub settime: Option<NaiveTime>,

    #[arg(short = 'c', long = "config", help = "Path to config file (overrides default)")]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", help = "Print verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// State is written to disk unless this is a test run without `--dev`.
    pub fn persistence(&self) -> Persistence {
        if self.test && !self.dev {
            Persistence::Ephemeral
        } else {
            Persistence::Durable
        }
    }
}

pub fn parse_set_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| format!("Invalid time format '{value}'. Use format 'HH:MM'."))
}

pub struct Context {
    pub config: Arc<MessengerConfig>,
    pub client: NodeClient,
    pub session: Session,
    pub sender: SenderWallet,
    pub store: StateStore,
    pub clock: ActivationClock,
    pub rules: EligibilityRules,
    pub errors: ErrorLog,
    pub now: i64,
    pub test: bool,
}

impl Context {
    pub fn try_build(cli: &Cli, config: MessengerConfig, now: i64) -> Result<Self> {
        let config = Arc::new(config);

        let client = NodeClient::new(config.node.api_base_url.clone()).with_timeouts(
            Duration::from_secs(config.node.request_timeout_secs),
            Duration::from_secs(config.node.voters_timeout_secs),
        );

        let sender = SenderWallet::new(
            config.wallet.address.clone(),
            config.wallet.network_version,
            &config.wallet.mnemonic,
            config.wallet.second_mnemonic.as_deref(),
        );

        let data_path = config.data_path();
        let store = StateStore::open(&data_path, cli.persistence())
            .with_context(|| format!("Failed to load state from {}", data_path.display()))?;

        let rules = EligibilityRules {
            limit: config.message_limit(),
            exclude: config.messenger.exclude_voters.iter().cloned().collect::<HashSet<_>>(),
        };

        Ok(Self {
            clock: ActivationClock::new(config.messenger.interval_secs),
            errors: ErrorLog::new(config.error_log_path()),
            session: Session::new(),
            config,
            client,
            sender,
            store,
            rules,
            now,
            test: cli.test,
        })
    }

    pub fn producer(&self) -> &str {
        &self.config.messenger.block_producer
    }

    pub fn symbol(&self) -> &str {
        &self.config.messenger.token_symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_time() {
        assert_eq!(parse_set_time("06:30"), Ok(NaiveTime::from_hms_opt(6, 30, 0).unwrap()));
        assert_eq!(parse_set_time("23:59"), Ok(NaiveTime::from_hms_opt(23, 59, 0).unwrap()));
        assert_eq!(
            parse_set_time("25:00"),
            Err("Invalid time format '25:00'. Use format 'HH:MM'.".to_string())
        );
        assert!(parse_set_time("noon").is_err());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["votecap", "--test", "--settime", "08:15"]).unwrap();
        assert!(cli.test);
        assert!(!cli.dev);
        assert_eq!(cli.settime, NaiveTime::from_hms_opt(8, 15, 0));
        assert_eq!(cli.persistence(), Persistence::Ephemeral);

        let cli = Cli::try_parse_from(["votecap", "-t", "-d"]).unwrap();
        assert_eq!(cli.persistence(), Persistence::Durable);

        let cli = Cli::try_parse_from(["votecap"]).unwrap();
        assert_eq!(cli.persistence(), Persistence::Durable);
        assert!(cli.settime.is_none());

        assert!(Cli::try_parse_from(["votecap", "--settime", "8"]).is_err());
    }
}
