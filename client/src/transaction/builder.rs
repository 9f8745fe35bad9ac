use serde::Serialize;
use votecap_api::{Payment, TRANSACTION_VERSION, TRANSFER_TYPE, TRANSFER_TYPE_GROUP};

use super::error::TransactionError;
use super::signer::{sha256, Signer};

const MAX_MEMO_BYTES: usize = u8::MAX as usize;
const MAX_PAYMENTS: usize = u16::MAX as usize;
const MAX_RECIPIENT_BYTES: usize = u8::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEntry {
    pub amount: String,
    pub recipient_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferAsset {
    pub transfers: Vec<TransferEntry>,
}

/// Signed transfer in the JSON shape accepted by `POST /transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTransaction {
    pub version: u8,
    pub network: u8,
    pub type_group: u16,
    #[serde(rename = "type")]
    pub kind: u16,
    pub nonce: String,
    pub sender_public_key: String,
    pub fee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub asset: TransferAsset,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_signature: Option<String>,
    pub id: String,
}

struct Unsigned<'a> {
    network: u8,
    nonce: u64,
    sender_public_key: String,
    fee: u64,
    memo: Option<&'a str>,
    payments: &'a [Payment],
}

impl Unsigned<'_> {
    /// Canonical little-endian layout the signatures and id are computed over.
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(128 + self.payments.len() * 48);
        bytes.push(0xff);
        bytes.push(TRANSACTION_VERSION);
        bytes.push(self.network);
        bytes.extend_from_slice(&(TRANSFER_TYPE_GROUP as u32).to_le_bytes());
        bytes.extend_from_slice(&TRANSFER_TYPE.to_le_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.extend_from_slice(
            &hex::decode(&self.sender_public_key)
                .unwrap_or_else(|_| self.sender_public_key.as_bytes().to_vec()),
        );
        bytes.extend_from_slice(&self.fee.to_le_bytes());

        let memo = self.memo.unwrap_or_default().as_bytes();
        bytes.push(memo.len() as u8);
        bytes.extend_from_slice(memo);

        bytes.extend_from_slice(&(self.payments.len() as u16).to_le_bytes());
        for payment in self.payments {
            bytes.extend_from_slice(&payment.amount.to_le_bytes());
            bytes.push(payment.recipient.len() as u8);
            bytes.extend_from_slice(payment.recipient.as_bytes());
        }
        bytes
    }
}

/// Validates, signs and (optionally) second-signs a transfer.
pub fn build_transfer_transaction(
    network: u8,
    payments: &[Payment],
    memo: Option<&str>,
    fee: u64,
    signer: &dyn Signer,
    second_signer: Option<&dyn Signer>,
    nonce: u64,
) -> Result<TransferTransaction, TransactionError> {
    if fee == 0 {
        return Err(TransactionError::FeeTooLow);
    }
    if payments.is_empty() {
        return Err(TransactionError::NoPayments);
    }
    if payments.len() > MAX_PAYMENTS {
        return Err(TransactionError::TooManyPayments(payments.len()));
    }
    if let Some(payment) = payments.iter().find(|p| p.recipient.len() > MAX_RECIPIENT_BYTES) {
        return Err(TransactionError::RecipientTooLong(payment.recipient.len()));
    }
    if let Some(payment) = payments.iter().find(|p| p.amount == 0) {
        return Err(TransactionError::AmountTooLow(payment.recipient.clone()));
    }
    if let Some(memo) = memo {
        if memo.len() > MAX_MEMO_BYTES {
            return Err(TransactionError::MemoTooLong(memo.len()));
        }
    }

    let unsigned = Unsigned {
        network,
        nonce,
        sender_public_key: signer.public_key_hex(),
        fee,
        memo,
        payments,
    };

    let mut bytes = unsigned.to_bytes();
    let signature = signer.sign_digest(&sha256(&bytes));
    bytes.extend_from_slice(&signature);

    let second_signature = second_signer.map(|second| {
        let second_signature = second.sign_digest(&sha256(&bytes));
        bytes.extend_from_slice(&second_signature);
        hex::encode(second_signature)
    });

    let id = hex::encode(sha256(&bytes));

    Ok(TransferTransaction {
        version: TRANSACTION_VERSION,
        network,
        type_group: TRANSFER_TYPE_GROUP,
        kind: TRANSFER_TYPE,
        nonce: nonce.to_string(),
        sender_public_key: unsigned.sender_public_key,
        fee: fee.to_string(),
        memo: memo.map(str::to_string),
        asset: TransferAsset {
            transfers: payments
                .iter()
                .map(|p| TransferEntry {
                    amount: p.amount.to_string(),
                    recipient_id: p.recipient.clone(),
                })
                .collect(),
        },
        signature: hex::encode(signature),
        second_signature,
        id,
    })
}
