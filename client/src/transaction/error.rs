use thiserror::Error;
use votecap_api::ApiError;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("fee is too low")]
    FeeTooLow,
    #[error("transfer amount to {0} is too low")]
    AmountTooLow(String),
    #[error("transfer has no payments")]
    NoPayments,
    #[error("memo is {0} bytes, at most 255 are allowed")]
    MemoTooLong(usize),
    #[error("transfer has {0} payments, at most 65535 are allowed")]
    TooManyPayments(usize),
    #[error("recipient is {0} bytes, at most 255 are allowed")]
    RecipientTooLong(usize),
    #[error("failure while getting nonce: {0}")]
    Nonce(#[source] ApiError),
    #[error("failure while getting dynamic fees config: {0}")]
    FeePolicy(#[source] ApiError),
    #[error("failure while broadcasting transaction: {0}")]
    Broadcast(#[source] ApiError),
    #[error("transaction rejected: {0}")]
    Rejected(String),
}
