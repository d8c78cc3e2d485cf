//! Single-instruction value-transfer transactions.
//!
//! The transfer is a system-program `transfer` instruction signed by the
//! controlling account, which also pays the fee. The first signature is the
//! transaction id.

use std::str::FromStr;

use fanout_crypto::to_ledger_keypair;
use fanout_types::{Address, KeyPair, Lamports};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use solana_sdk::transaction::Transaction;
use solana_system_interface::instruction as system_instruction;

use crate::ClientError;

/// Parse an account address into the SDK's public key type.
pub fn parse_pubkey(address: &Address) -> Result<Pubkey, ClientError> {
    Pubkey::from_str(address.as_str()).map_err(|_| ClientError::InvalidAddress(address.to_string()))
}

/// Build and sign a transfer of `amount` from `from` to `to`.
pub fn build_transfer(
    from: &KeyPair,
    to: &Address,
    amount: Lamports,
    recent_blockhash: Hash,
) -> Result<Transaction, ClientError> {
    let payer = to_ledger_keypair(from);
    let destination = parse_pubkey(to)?;
    if destination == payer.pubkey() {
        return Err(ClientError::InvalidTransfer(
            "source and destination are the same account".into(),
        ));
    }
    if amount.is_zero() {
        return Err(ClientError::InvalidTransfer("amount must be positive".into()));
    }

    let instruction = system_instruction::transfer(&payer.pubkey(), &destination, amount.raw());
    Ok(Transaction::new_signed_with_payer(
        &[instruction],
        Some(&payer.pubkey()),
        &[&payer],
        recent_blockhash,
    ))
}

/// The transaction id: its first signature in base58.
pub fn transaction_id(transaction: &Transaction) -> Option<String> {
    transaction.signatures.first().map(ToString::to_string)
}

/// Serialize a transaction to its wire bytes.
pub fn encode_transaction(transaction: &Transaction) -> Result<Vec<u8>, ClientError> {
    bincode::serialize(transaction)
        .map_err(|e| ClientError::InvalidTransfer(format!("cannot serialize transaction: {e}")))
}
