// ====================================================================
// Token Units
// ====================================================================
/// Number of decimal places for the network token
pub const TOKEN_DECIMALS: u8 = 8;
/// Smallest on-chain unit = 10^TOKEN_DECIMALS
pub const ATOMIC: u64 = 10u64.pow(TOKEN_DECIMALS as u32);
/// Amount carried by every marker payment, in atomic units
pub const MESSAGE_AMOUNT: u64 = 1;

// ====================================================================
// Scheduling
// ====================================================================
/// Smallest messaging interval the messenger accepts (1h)
pub const MIN_MESSAGE_INTERVAL_SECONDS: u64 = 60 * 60;
/// New voters are held back once less than this share of the interval remains
pub const ALLOW_NEW_ACTIVE_PERCENTAGE: f64 = 0.05;
/// New voters are held back once less than this many seconds remain
pub const ALLOW_NEW_ACTIVE_SECONDS: i64 = 2 * 60 * 60;
/// Format of the `--settime` argument and of printed activation times
pub const TIME_FORMAT: &str = "%H:%M";

// ====================================================================
// Transaction Sizing
// ====================================================================
/// Serialized size of a transfer without payments, memo or second signature
pub const TRANSFER_BASE_BYTES: u64 = 125;
/// Serialized size added by every payment in a transfer
pub const TRANSFER_PAYMENT_BYTES: u64 = 29;
/// Serialized size of a second signature
pub const SECOND_SIGNATURE_BYTES: u64 = 64;
/// Transaction type group for core transactions
pub const TRANSFER_TYPE_GROUP: u16 = 1;
/// Transaction type of a (multi-)transfer
pub const TRANSFER_TYPE: u16 = 6;
/// Transaction format version
pub const TRANSACTION_VERSION: u8 = 3;

// ====================================================================
// Node API
// ====================================================================
/// Timeout applied to node requests unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
/// Timeout applied to the voter listing unless configured otherwise
pub const DEFAULT_VOTERS_TIMEOUT_SECONDS: u64 = 30;
/// Required suffix of the node API base URL
pub const API_PATH_SUFFIX: &str = "/api";
