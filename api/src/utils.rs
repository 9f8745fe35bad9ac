use crate::consts::ATOMIC;

pub fn from_atomic(value: u64) -> f64 {
    value as f64 / ATOMIC as f64
}

/// Renders an atomic amount in whole tokens, e.g. `1,234.50`.
pub fn from_atomic_formatted(value: u64, precision: usize) -> String {
    let rendered = format!("{:.*}", precision, from_atomic(value));
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{grouped}.{fraction}"),
        None => grouped,
    }
}

/// Renders a duration as `{d}d {h}h {m}m {s}s`.
pub fn time_delta_formatted(seconds: i64) -> String {
    let days = seconds.div_euclid(86_400);
    let remainder = seconds.rem_euclid(86_400);
    let hours = remainder / 3_600;
    let minutes = (remainder % 3_600) / 60;
    let seconds = remainder % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_atomic_formatted() {
        assert_eq!(from_atomic_formatted(0, 0), "0");
        assert_eq!(from_atomic_formatted(100 * ATOMIC, 0), "100");
        assert_eq!(from_atomic_formatted(1_000 * ATOMIC, 0), "1,000");
        assert_eq!(from_atomic_formatted(1_234_567 * ATOMIC, 0), "1,234,567");
        assert_eq!(from_atomic_formatted(123_456_789, 8), "1.23456789");
        assert_eq!(from_atomic_formatted(2_500_050_000_000, 2), "25,000.50");
    }

    #[test]
    fn test_from_atomic() {
        assert_eq!(from_atomic(150_000_000), 1.5);
        assert_eq!(from_atomic(0), 0.0);
    }

    #[test]
    fn test_time_delta_formatted() {
        assert_eq!(time_delta_formatted(0), "0d 0h 0m 0s");
        assert_eq!(time_delta_formatted(59), "0d 0h 0m 59s");
        assert_eq!(time_delta_formatted(3_661), "0d 1h 1m 1s");
        assert_eq!(time_delta_formatted(2 * 86_400 + 5 * 3_600 + 30), "2d 5h 0m 30s");
    }
}
