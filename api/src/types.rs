use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope used by every node endpoint: `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// One page of a paginated listing: `{ "data": [...], "meta": { "next": ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub synced: bool,
    /// Current block height of the node.
    pub now: u64,
    pub blocks_count: i64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Peer {
    pub ip: String,
    pub port: u16,
    pub version: String,
    pub height: u64,
    #[serde(rename = "latency")]
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VotingRecord {
    pub username: String,
    pub vote_percent: f64,
    pub vote_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    pub address: String,
    pub public_key: Option<String>,
    pub delegate_username: Option<String>,
    pub balance: u64,
    pub nonce: u64,
    pub voting_for: Vec<VotingRecord>,
}

impl Wallet {
    /// Vote this wallet casts for `username`, if any.
    pub fn voting_for(&self, username: &str) -> Option<&VotingRecord> {
        self.voting_for.iter().find(|vf| vf.username == username)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWallet {
    address: String,
    #[serde(default)]
    public_key: Option<String>,
    #[serde(default)]
    attributes: Option<RawAttributes>,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    balance: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    nonce: u64,
    #[serde(default)]
    voting_for: VotingFor,
}

/// `votingFor` entries in the order the node lists them.
#[derive(Default)]
struct VotingFor(Vec<(String, RawVote)>);

impl<'de> Deserialize<'de> for VotingFor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VotingForVisitor;

        impl<'de> Visitor<'de> for VotingForVisitor {
            type Value = VotingFor;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of username to vote")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((username, vote)) = map.next_entry::<String, RawVote>()? {
                    entries.push((username, vote));
                }
                Ok(VotingFor(entries))
            }
        }

        deserializer.deserialize_map(VotingForVisitor)
    }
}

#[derive(Deserialize)]
struct RawAttributes {
    #[serde(default)]
    delegate: Option<RawDelegate>,
}

#[derive(Deserialize)]
struct RawDelegate {
    username: String,
}

#[derive(Deserialize)]
struct RawVote {
    percent: f64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    votes: u64,
}

impl<'de> Deserialize<'de> for Wallet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawWallet::deserialize(deserializer)?;
        let delegate_username = raw
            .attributes
            .and_then(|a| a.delegate)
            .map(|d| d.username);
        let voting_for = raw
            .voting_for
            .0
            .into_iter()
            .map(|(username, vote)| VotingRecord {
                username,
                vote_percent: vote.percent,
                vote_count: vote.votes,
            })
            .collect();

        Ok(Wallet {
            address: raw.address,
            public_key: raw.public_key,
            delegate_username,
            balance: raw.balance,
            nonce: raw.nonce,
            voting_for,
        })
    }
}

/// Nonce-only view of `GET /wallets/{address}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletNonce {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub nonce: u64,
}

/// Dynamic fee policy published under `pool.dynamicFees` of the node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePolicy {
    pub addon_bytes: AddonBytes,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub min_fee_pool: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddonBytes {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub transfer: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfiguration {
    pub pool: PoolConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfiguration {
    pub dynamic_fees: FeePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub recipient: String,
    pub amount: u64,
}

impl Payment {
    pub fn new(recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            recipient: recipient.into(),
            amount,
        }
    }
}

/// Response of `POST /transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastResponse {
    pub data: BroadcastData,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, BroadcastError>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastData {
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default)]
    pub broadcast: Vec<String>,
    #[serde(default)]
    pub invalid: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastError {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub message: String,
}

impl BroadcastResponse {
    pub fn is_accepted(&self) -> bool {
        !self.data.accept.is_empty()
    }

    /// Message of the first reported error, empty when none was reported.
    pub fn error_message(&self) -> String {
        self.errors
            .as_ref()
            .and_then(|errors| errors.values().next())
            .map(|e| e.message.clone())
            .unwrap_or_default()
    }
}

/// Node amounts are serialized either as numbers or as decimal strings.
pub fn u64_from_str_or_num<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
        Float(f64),
    }

    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
        StrOrNum::Num(n) => Ok(n),
        StrOrNum::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        StrOrNum::Float(f) => Err(serde::de::Error::custom(format!("not an unsigned integer: {f}"))),
    }
}
