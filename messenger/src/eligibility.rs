use std::collections::HashSet;

use votecap_api::Wallet;

use crate::error::StoreError;
use crate::store::StateStore;

/// How many times one voter may be messaged in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLimit {
    Unlimited,
    PerVoter(u32),
}

impl MessageLimit {
    /// `-1` means unlimited; zero and other negatives are invalid.
    pub fn from_config(value: i64) -> Option<Self> {
        match value {
            -1 => Some(MessageLimit::Unlimited),
            n if n >= 1 => u32::try_from(n).ok().map(MessageLimit::PerVoter),
            _ => None,
        }
    }

    pub fn allows(&self, count: u32) -> bool {
        match self {
            MessageLimit::Unlimited => true,
            MessageLimit::PerVoter(limit) => count < *limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EligibilityRules {
    pub limit: MessageLimit,
    pub exclude: HashSet<String>,
}

/// Voters whose vote for `producer` is strictly above `vote_cap`.
pub fn voters_over_cap(voters: Vec<Wallet>, producer: &str, vote_cap: u64) -> Vec<Wallet> {
    voters
        .into_iter()
        .filter(|voter| {
            voter
                .voting_for(producer)
                .is_some_and(|vote| vote.vote_count > vote_cap)
        })
        .collect()
}

/// Picks the voters to message in this run and records them in the ledger.
///
/// Known voters are only messaged while the window is `active` and below the
/// limit. Unknown voters are messaged when `active` or `new_active` and enter
/// the ledger with a count of one. Excluded addresses are skipped entirely.
/// The updated ledger is written back once, after every voter is considered.
pub fn select_voters_to_message(
    store: &mut StateStore,
    rules: &EligibilityRules,
    voters: Vec<Wallet>,
    active: bool,
    new_active: bool,
) -> Result<Vec<Wallet>, StoreError> {
    let mut activations = store.activations().clone();
    let mut to_message = Vec::new();

    for voter in voters {
        if rules.exclude.contains(&voter.address) {
            continue;
        }

        match activations.get_mut(&voter.address) {
            Some(count) => {
                if active && rules.limit.allows(*count) {
                    *count += 1;
                    to_message.push(voter);
                }
            }
            None => {
                if active || new_active {
                    activations.insert(voter.address.clone(), 1);
                    to_message.push(voter);
                }
            }
        }
    }

    log::debug!("{} voter(s) eligible for a message", to_message.len());
    store.set_activations(activations)?;
    Ok(to_message)
}
