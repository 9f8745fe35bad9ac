use thiserror::Error;
use votecap_api::ApiError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid state file {0}: {1}")]
    InvalidStateFile(String, serde_json::Error),
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Node unavailable or out of sync [status] height:{height} blocks_count:{blocks_count}")]
    StatusUnsynced { height: u64, blocks_count: i64 },
    #[error("Node unavailable or out of sync [peers] height:{height} blocks_count:{blocks_count} peers_heights:{peers_heights:?}")]
    PeersUnsynced {
        height: u64,
        blocks_count: i64,
        peers_heights: Vec<(u64, usize)>,
    },
    #[error("Node unavailable or out of sync [peers] height:{height} blocks_count:{blocks_count} no peers reported")]
    NoPeers { height: u64, blocks_count: i64 },
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Activation time {0} does not exist on {1} in the local time zone")]
    UnresolvableTime(String, String),
    #[error("Timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}
