use anyhow::{Context as _, Result};
use chrono::{Local, TimeZone};
use votecap_api::{
    from_atomic_formatted, time_delta_formatted, Payment, Wallet, MESSAGE_AMOUNT, TIME_FORMAT,
};
use votecap_client::transfer;
use votecap_messenger::{select_voters_to_message, verify_node_sync, voters_over_cap};

use crate::cli::Context;
use crate::log;

/// One messaging pass: sync check, activation check, eligibility, delivery.
pub async fn handle_run(context: &mut Context) -> Result<()> {
    let threshold = context.config.node.sync_check_block_threshold;
    if let Err(e) = verify_node_sync(&context.client, threshold).await {
        context.errors.fatal(&anyhow::Error::new(e), "Failed to verify node status");
    }

    let now = context.now;
    let activation = context
        .clock
        .check(&mut context.store, now)
        .context("Failed to record activation")?;
    let new_active = context.clock.is_new_active(activation.seconds_till_activation);
    let next_time = format_local_time(activation.next_activation_at(now));

    ::log::debug!(
        "active: {}, new active: {}, seconds till activation: {}",
        activation.active,
        new_active,
        activation.seconds_till_activation
    );

    if !activation.active && !new_active {
        log::print_message(&next_activation_line(activation.seconds_till_activation, &next_time));
        return Ok(());
    }

    let voters = match fetch_voters_over_cap(context).await {
        Ok(voters) => voters,
        Err(e) => context.errors.fatal(
            &e,
            &format!("Failed to get voters over cap for username {}", context.producer()),
        ),
    };

    let to_message = select_voters_to_message(
        &mut context.store,
        &context.rules,
        voters,
        activation.active,
        new_active,
    )
    .context("Failed to record voter activations")?;

    if activation.active {
        context
            .store
            .set_last_activation_timestamp(now)
            .context("Failed to record activation")?;
    }

    let vote_cap = context.config.messenger.vote_cap;
    let symbol = context.symbol().to_string();

    if to_message.is_empty() {
        if activation.active {
            log::print_message(&no_voters_line(vote_cap, &symbol, context.producer()));
        } else {
            log::print_message(&next_activation_line(activation.seconds_till_activation, &next_time));
        }
        return Ok(());
    }

    if context.test {
        log::print_message(&dry_run_header(to_message.len(), vote_cap, &symbol));
        for voter in &to_message {
            log::print_message(&voter_line(voter, context.producer(), &symbol));
        }
        log::print_divider();
        return Ok(());
    }

    if let Err(e) = send_messages(context, &to_message).await {
        context.errors.fatal(&e, "Failed to send messages");
    }

    log::print_message(&format!(
        "Sent message to {} voter(s) over the {} {} vote cap",
        to_message.len(),
        from_atomic_formatted(vote_cap, 0),
        symbol
    ));
    Ok(())
}

async fn fetch_voters_over_cap(context: &Context) -> Result<Vec<Wallet>> {
    let voters = context
        .client
        .get_voters(context.producer())
        .await
        .with_context(|| format!("Failed to fetch voters of {}", context.producer()))?;
    ::log::debug!("Fetched {} voter(s) of {}", voters.len(), context.producer());

    Ok(voters_over_cap(voters, context.producer(), context.config.messenger.vote_cap))
}

async fn send_messages(context: &Context, voters: &[Wallet]) -> Result<()> {
    let payments: Vec<Payment> = voters
        .iter()
        .map(|voter| Payment::new(voter.address.clone(), MESSAGE_AMOUNT))
        .collect();

    let id = transfer(
        &context.client,
        &context.session,
        &context.sender,
        &payments,
        Some(context.config.messenger.message.as_str()),
        None,
        None,
    )
    .await?;

    ::log::info!("Messages sent in transaction {id}");
    Ok(())
}

fn format_local_time(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .earliest()
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

fn next_activation_line(seconds_till_activation: i64, next_time: &str) -> String {
    format!(
        "Next activation in {} at {}",
        time_delta_formatted(seconds_till_activation),
        next_time
    )
}

fn no_voters_line(vote_cap: u64, symbol: &str, producer: &str) -> String {
    format!(
        "No voters over the {} {} vote cap for block producer {}",
        from_atomic_formatted(vote_cap, 0),
        symbol,
        producer
    )
}

fn dry_run_header(count: usize, vote_cap: u64, symbol: &str) -> String {
    format!(
        "Test message to {} voter(s) over the {} {} vote cap:",
        count,
        from_atomic_formatted(vote_cap, 0),
        symbol
    )
}

fn voter_line(voter: &Wallet, producer: &str, symbol: &str) -> String {
    let votes = voter
        .voting_for(producer)
        .map(|vote| from_atomic_formatted(vote.vote_count, 0))
        .unwrap_or_default();
    format!("- {} {} {}", voter.address, votes, symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;
    use tempdir::TempDir;
    use votecap_api::{VotingRecord, ATOMIC};

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 86_400;

    async fn mock_synced_node(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/node/status");
                then.status(200).json_body(json!({
                    "data": { "synced": true, "now": 100, "blocksCount": 0, "timestamp": 0 }
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/peers");
                then.status(200).json_body(json!({
                    "data": [{ "ip": "10.0.0.2", "port": 6002, "version": "4.1.0", "height": 100, "latency": 1 }],
                    "meta": { "next": null }
                }));
            })
            .await;
    }

    async fn mock_voters(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/delegates/producer/voters");
                then.status(200).json_body(json!({
                    "data": [
                        {
                            "address": "A",
                            "balance": "0",
                            "nonce": "0",
                            "votingFor": { "producer": { "percent": 100.0, "votes": "25000000000000" } }
                        },
                        {
                            "address": "B",
                            "balance": "0",
                            "nonce": "0",
                            "votingFor": { "producer": { "percent": 100.0, "votes": "100" } }
                        }
                    ],
                    "meta": { "next": null }
                }));
            })
            .await
    }

    fn read_state(dir: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(dir.join("data.json")).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_dry_run_leaves_state_file_untouched() {
        let temp_dir = TempDir::new("votecap_run").unwrap();
        let server = MockServer::start_async().await;
        mock_synced_node(&server).await;
        let voters = mock_voters(&server).await;

        let mut context = test_context(&server.url("/api"), temp_dir.path(), &["votecap", "--test"], NOW);
        handle_run(&mut context).await.unwrap();

        voters.assert_hits_async(1).await;
        assert!(!temp_dir.path().join("data.json").exists());
        assert_eq!(context.store.last_activation_timestamp(), NOW);
        assert_eq!(context.store.activation_count("A"), Some(1));
        assert_eq!(context.store.activation_count("B"), None);
    }

    #[tokio::test]
    async fn test_dev_dry_run_persists_activation_and_ledger() {
        let temp_dir = TempDir::new("votecap_run").unwrap();
        let server = MockServer::start_async().await;
        mock_synced_node(&server).await;
        let voters = mock_voters(&server).await;

        let mut context =
            test_context(&server.url("/api"), temp_dir.path(), &["votecap", "--test", "--dev"], NOW);
        handle_run(&mut context).await.unwrap();

        assert_eq!(
            read_state(temp_dir.path()),
            json!({ "last_activation_timestamp": NOW, "activations": { "A": 1 } })
        );
        let written = fs::read_to_string(temp_dir.path().join("data.json")).unwrap();

        // inside the window the known voter is not messaged again
        let mut context =
            test_context(&server.url("/api"), temp_dir.path(), &["votecap", "--test", "--dev"], NOW + 100);
        handle_run(&mut context).await.unwrap();

        voters.assert_hits_async(2).await;
        assert_eq!(fs::read_to_string(temp_dir.path().join("data.json")).unwrap(), written);

        // close to the next activation the voter listing is not fetched at all
        let mut context = test_context(
            &server.url("/api"),
            temp_dir.path(),
            &["votecap", "--test", "--dev"],
            NOW + DAY - 60,
        );
        handle_run(&mut context).await.unwrap();

        voters.assert_hits_async(2).await;
        assert_eq!(fs::read_to_string(temp_dir.path().join("data.json")).unwrap(), written);
    }

    #[tokio::test]
    async fn test_run_sends_one_transfer_to_voters_over_cap() {
        let temp_dir = TempDir::new("votecap_run").unwrap();
        let server = MockServer::start_async().await;
        mock_synced_node(&server).await;
        mock_voters(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/wallets/SXPsender");
                then.status(200).json_body(json!({ "data": { "nonce": "3" } }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/node/configuration");
                then.status(200).json_body(json!({
                    "data": { "pool": { "dynamicFees": {
                        "minFeePool": 3000,
                        "addonBytes": { "transfer": 137 }
                    } } }
                }));
            })
            .await;
        let broadcast = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/transactions")
                    .body_contains("\"recipientId\":\"A\"")
                    .body_contains("\"nonce\":\"4\"");
                then.status(200).json_body(json!({ "data": { "accept": ["tx"] } }));
            })
            .await;

        let mut context = test_context(&server.url("/api"), temp_dir.path(), &["votecap"], NOW);
        handle_run(&mut context).await.unwrap();

        broadcast.assert_hits_async(1).await;
        assert_eq!(
            read_state(temp_dir.path()),
            json!({ "last_activation_timestamp": NOW, "activations": { "A": 1 } })
        );
    }

    #[test]
    fn test_next_activation_line() {
        assert_eq!(
            next_activation_line(90_061, "14:05"),
            "Next activation in 1d 1h 1m 1s at 14:05"
        );
    }

    #[test]
    fn test_no_voters_line() {
        assert_eq!(
            no_voters_line(100_000 * ATOMIC, "SXP", "producer"),
            "No voters over the 100,000 SXP vote cap for block producer producer"
        );
    }

    #[test]
    fn test_dry_run_header() {
        assert_eq!(
            dry_run_header(2, 100_000 * ATOMIC, "SXP"),
            "Test message to 2 voter(s) over the 100,000 SXP vote cap:"
        );
    }

    #[test]
    fn test_voter_line() {
        let voter = Wallet {
            address: "SXPvoter".to_string(),
            public_key: None,
            delegate_username: None,
            balance: 0,
            nonce: 0,
            voting_for: vec![VotingRecord {
                username: "producer".to_string(),
                vote_percent: 100.0,
                vote_count: 250_000 * ATOMIC,
            }],
        };

        assert_eq!(voter_line(&voter, "producer", "SXP"), "- SXPvoter 250,000 SXP");
        assert_eq!(voter_line(&voter, "other", "SXP"), "- SXPvoter  SXP");
    }
}
