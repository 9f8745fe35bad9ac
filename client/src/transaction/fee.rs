use votecap_api::{FeePolicy, SECOND_SIGNATURE_BYTES, TRANSFER_BASE_BYTES, TRANSFER_PAYMENT_BYTES};

/// Serialized size of a transfer used for fee purposes.
pub fn transfer_size(payment_count: usize, memo: Option<&str>, second_signature: bool) -> u64 {
    let memo_bytes = memo.map_or(0, |m| m.len() as u64);
    let second_signature_bytes = if second_signature { SECOND_SIGNATURE_BYTES } else { 0 };

    TRANSFER_BASE_BYTES
        + TRANSFER_PAYMENT_BYTES * payment_count as u64
        + memo_bytes
        + second_signature_bytes
}

/// `(addon + round(size / 2) + 1) * minFeePool`, halves rounded to even.
pub fn dynamic_fee(
    policy: &FeePolicy,
    payment_count: usize,
    memo: Option<&str>,
    second_signature: bool,
) -> u64 {
    let size = transfer_size(payment_count, memo, second_signature);
    (policy.addon_bytes.transfer + half_to_even(size) + 1) * policy.min_fee_pool
}

fn half_to_even(value: u64) -> u64 {
    let half = value / 2;
    if value % 2 == 1 && half % 2 == 1 {
        half + 1
    } else {
        half
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votecap_api::AddonBytes;

    fn policy() -> FeePolicy {
        FeePolicy {
            addon_bytes: AddonBytes { transfer: 137 },
            min_fee_pool: 3000,
        }
    }

    #[test]
    fn test_single_payment_no_memo() {
        assert_eq!(transfer_size(1, None, false), 154);
        assert_eq!(dynamic_fee(&policy(), 1, None, false), 645_000);
    }

    #[test]
    fn test_memo_and_second_signature_add_bytes() {
        assert_eq!(transfer_size(2, Some("héllo"), true), 125 + 58 + 6 + 64);
        // 253 bytes -> 126.5 rounds to 126
        assert_eq!(dynamic_fee(&policy(), 2, Some("héllo"), true), (137 + 126 + 1) * 3000);
    }

    #[test]
    fn test_half_to_even() {
        assert_eq!(half_to_even(154), 77);
        assert_eq!(half_to_even(155), 78);
        assert_eq!(half_to_even(157), 78);
        assert_eq!(half_to_even(159), 80);
    }
}
