pub mod run;
pub mod settime;

#[cfg(test)]
pub(crate) fn test_context(api_base_url: &str, dir: &std::path::Path, args: &[&str], now: i64) -> crate::cli::Context {
    use clap::Parser;

    let config = crate::config::MessengerConfig::from_toml(&format!(
        r#"
        [node]
        api_base_url = '{}'
        sync_check_block_threshold = 3

        [wallet]
        address = "SXPsender"
        mnemonic = "first passphrase"
        network_version = 63

        [messenger]
        block_producer = "producer"
        vote_cap = 10000000000000
        message = "You are over the vote cap"
        interval_secs = 86400
        limit_per_voter = -1

        [storage]
        data_path = '{}'

        [logging]
        error_log_path = '{}'
        "#,
        api_base_url,
        dir.join("data.json").display(),
        dir.join("error.log").display()
    ))
    .unwrap();

    let cli = crate::cli::Cli::try_parse_from(args).unwrap();
    crate::cli::Context::try_build(&cli, config, now).unwrap()
}
