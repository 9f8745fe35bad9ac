use anyhow::{Context as _, Result};
use chrono::{Local, NaiveTime, TimeZone};
use votecap_api::TIME_FORMAT;

use crate::cli::Context;
use crate::log;

pub fn handle_settime(context: &mut Context, time: NaiveTime) -> Result<()> {
    let time_str = time.format(TIME_FORMAT).to_string();

    if context.test {
        let timestamp = context
            .clock
            .override_timestamp(&Local, context.now, context.store.last_activation_timestamp(), time)
            .context("Failed to compute new activation time")?;
        log::print_message(&format!("Test changed activation time to {time_str}"));
        log::print_info(&format!("Last activation would become {}", format_timestamp(timestamp)));
        return Ok(());
    }

    let timestamp = context
        .clock
        .set_activation_time(&mut context.store, &Local, context.now, time)
        .context("Failed to change activation time")?;
    ::log::info!("Last activation timestamp set to {timestamp}");
    log::print_message(&format!("Changed activation time to {time_str}"));
    Ok(())
}

fn format_timestamp(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .earliest()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use std::fs;
    use tempdir::TempDir;

    const NODE: &str = "http://127.0.0.1:6003/api";
    const NOW: i64 = 1_700_000_000;

    fn six_thirty() -> NaiveTime {
        NaiveTime::from_hms_opt(6, 30, 0).unwrap()
    }

    #[test]
    fn test_settime_in_test_mode_never_writes() {
        let temp_dir = TempDir::new("votecap_settime").unwrap();

        for args in [
            &["votecap", "--test", "--settime", "06:30"][..],
            &["votecap", "--test", "--dev", "--settime", "06:30"][..],
        ] {
            let mut context = test_context(NODE, temp_dir.path(), args, NOW);
            handle_settime(&mut context, six_thirty()).unwrap();

            assert!(!temp_dir.path().join("data.json").exists());
            assert_eq!(context.store.last_activation_timestamp(), 0);
        }
    }

    #[test]
    fn test_settime_writes_activation_timestamp() {
        let temp_dir = TempDir::new("votecap_settime").unwrap();
        let mut context = test_context(NODE, temp_dir.path(), &["votecap", "--settime", "06:30"], NOW);

        let expected = context
            .clock
            .override_timestamp(&Local, NOW, 0, six_thirty())
            .unwrap();
        handle_settime(&mut context, six_thirty()).unwrap();

        let state: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(temp_dir.path().join("data.json")).unwrap()).unwrap();
        assert_eq!(state["last_activation_timestamp"], expected);
        assert_eq!(context.store.last_activation_timestamp(), expected);
    }
}
