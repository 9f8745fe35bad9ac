use log::{debug, info};
use votecap_api::Payment;

use crate::node::NodeClient;
use crate::session::Session;
use super::builder::{build_transfer_transaction, TransferTransaction};
use super::error::TransactionError;
use super::fee::dynamic_fee;
use super::signer::{PassphraseSigner, Signer};

/// Wallet the marker payments are sent from.
#[derive(Debug)]
pub struct SenderWallet {
    pub address: String,
    pub network: u8,
    pub signer: PassphraseSigner,
    pub second_signer: Option<PassphraseSigner>,
}

impl SenderWallet {
    pub fn new(
        address: impl Into<String>,
        network: u8,
        passphrase: &str,
        second_passphrase: Option<&str>,
    ) -> Self {
        Self {
            address: address.into(),
            network,
            signer: PassphraseSigner::from_passphrase(passphrase),
            second_signer: second_passphrase.map(PassphraseSigner::from_passphrase),
        }
    }

    fn second(&self) -> Option<&dyn Signer> {
        self.second_signer.as_ref().map(|s| s as &dyn Signer)
    }
}

/// Builds, signs and broadcasts one transfer carrying all `payments`.
///
/// Without an explicit `fee` the dynamic fee is derived from the session's
/// fee policy; without an explicit `nonce` the sender's next nonce is looked
/// up on the node. Returns the id of the accepted transaction.
pub async fn transfer(
    client: &NodeClient,
    session: &Session,
    sender: &SenderWallet,
    payments: &[Payment],
    memo: Option<&str>,
    fee: Option<u64>,
    nonce: Option<u64>,
) -> Result<String, TransactionError> {
    let fee = match fee {
        Some(fee) => fee,
        None => {
            let policy = session
                .fee_policy(client)
                .await
                .map_err(TransactionError::FeePolicy)?;
            dynamic_fee(policy, payments.len(), memo, sender.second_signer.is_some())
        }
    };

    let nonce = match nonce {
        Some(nonce) => nonce,
        None => {
            client
                .get_nonce(&sender.address)
                .await
                .map_err(TransactionError::Nonce)?
                + 1
        }
    };

    debug!("Building transfer of {} payment(s), fee {}, nonce {}", payments.len(), fee, nonce);

    let tx = build_transfer_transaction(
        sender.network,
        payments,
        memo,
        fee,
        &sender.signer,
        sender.second(),
        nonce,
    )?;

    broadcast(client, &tx).await?;
    info!("Transaction {} accepted", tx.id);
    Ok(tx.id)
}

pub async fn broadcast(client: &NodeClient, tx: &TransferTransaction) -> Result<(), TransactionError> {
    let response = client
        .post_transactions(std::slice::from_ref(tx))
        .await
        .map_err(TransactionError::Broadcast)?;

    debug!(
        "Transaction {}: accepted {}, broadcast {}, invalid {}",
        tx.id,
        response.data.accept.len(),
        response.data.broadcast.len(),
        response.data.invalid.len()
    );

    if response.is_accepted() {
        Ok(())
    } else {
        Err(TransactionError::Rejected(response.error_message()))
    }
}
