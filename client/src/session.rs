use tokio::sync::OnceCell;
use votecap_api::{ApiError, FeePolicy};

use crate::node::NodeClient;

/// Per-process context shared by transaction calls.
///
/// The node's dynamic fee policy is fetched on first use and reused for the
/// rest of the run.
#[derive(Debug, Default)]
pub struct Session {
    fee_policy: OnceCell<FeePolicy>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with a fee policy already known, skipping the node lookup.
    pub fn with_fee_policy(policy: FeePolicy) -> Self {
        Self {
            fee_policy: OnceCell::new_with(Some(policy)),
        }
    }

    pub async fn fee_policy(&self, client: &NodeClient) -> Result<&FeePolicy, ApiError> {
        self.fee_policy
            .get_or_try_init(|| async {
                log::debug!("Fetching dynamic fee policy from {}", client.url());
                client.get_fee_policy().await
            })
            .await
    }
}
