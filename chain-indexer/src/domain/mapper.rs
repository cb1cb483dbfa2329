// This file is part of codechain-indexer.
// Copyright (C) 2025 Kodebox, Inc.
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pure functions mapping the node representation of chain entities to their store
//! representation. Heights and indexes are range-checked, arbitrary-precision integers are
//! rendered as [Decimal]s and nested data as JSON payloads.

use crate::domain::{
    Account, AccountRow, Action, ActionRow, Address, AddressLogRow, AssetMintOutputRow,
    AssetSchemeRow, Block, BlockRow, BlockRows, MintAsset, OutPoint, Parcel, ParcelRow,
    Transaction, TransactionRow, TransferInput,
};
use alloy_primitives::U256;
use indexer_common::domain::{BlockHash, Decimal, ParcelHash};
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("{field} {value} exceeds the storable range")]
    OutOfRange { field: &'static str, value: u64 },

    #[error(
        "parcel {parcel} claims to be at index {claimed_index} of block {claimed_hash} at height \
         {claimed_number}, but is at index {index} of block {hash} at height {number}"
    )]
    MisplacedParcel {
        parcel: ParcelHash,
        claimed_hash: BlockHash,
        claimed_number: u64,
        claimed_index: u64,
        hash: BlockHash,
        number: u64,
        index: u64,
    },

    #[error("duplicate parcel {0}")]
    DuplicateParcel(ParcelHash),

    #[error("invalid address {0:?}")]
    InvalidAddress(Address),
}

/// Map the given [Block] including all its parcels to the rows to be saved for it.
pub fn map_block(block: &Block, mining_reward: U256) -> Result<BlockRows, MappingError> {
    let mut parcel_hashes = HashSet::with_capacity(block.parcels.len());
    if let Some(parcel) = block
        .parcels
        .iter()
        .find(|parcel| !parcel_hashes.insert(parcel.hash))
    {
        return Err(MappingError::DuplicateParcel(parcel.hash));
    }

    let block_row = block_row(block, mining_reward)?;

    let parcels = block
        .parcels
        .iter()
        .enumerate()
        .map(|(index, parcel)| parcel_row(block, index as u64, parcel))
        .collect::<Result<Vec<_>, _>>()?;

    let actions = block.parcels.iter().map(action_row).collect::<Vec<_>>();

    let asset_transactions = block
        .parcels
        .iter()
        .filter_map(|parcel| match &parcel.action {
            Action::AssetTransaction { transaction } => Some((parcel, transaction)),
            _ => None,
        })
        .collect::<Vec<_>>();

    let transactions = asset_transactions
        .iter()
        .map(|(parcel, transaction)| transaction_row(parcel, transaction))
        .collect::<Result<Vec<_>, _>>()?;

    let mints = asset_transactions
        .iter()
        .filter_map(|(_, transaction)| match transaction {
            Transaction::MintAsset(mint) => Some(mint),
            Transaction::TransferAsset(_) => None,
        })
        .collect::<Vec<_>>();

    let asset_mint_outputs = mints
        .iter()
        .map(|mint| asset_mint_output_row(mint))
        .collect::<Result<Vec<_>, _>>()?;

    let asset_schemes = mints
        .iter()
        .map(|mint| asset_scheme_row(mint))
        .collect::<Result<Vec<_>, _>>()?;

    let address_logs = address_log_rows(block)?;

    Ok(BlockRows {
        block: block_row,
        parcels,
        actions,
        transactions,
        asset_mint_outputs,
        asset_schemes,
        address_logs,
    })
}

pub fn block_row(block: &Block, mining_reward: U256) -> Result<BlockRow, MappingError> {
    let seal = block
        .seal
        .iter()
        .map(|field| Value::String(field.to_string()))
        .collect();

    Ok(BlockRow {
        hash: block.hash,
        parent_hash: block.parent_hash,
        number: to_i64("block number", block.number)?,
        author: valid(&block.author)?,
        timestamp: to_i64("timestamp", block.timestamp)?,
        extra_data: Value::String(block.extra_data.to_string()),
        parcels_root: block.parcels_root,
        state_root: block.state_root,
        invoices_root: block.invoices_root,
        score: block.score.into(),
        seal: Value::Array(seal),
        mining_reward: mining_reward.into(),
    })
}

/// Map the given [Parcel] which is expected at the given index of the given [Block].
pub fn parcel_row(block: &Block, index: u64, parcel: &Parcel) -> Result<ParcelRow, MappingError> {
    if parcel.block_hash != block.hash
        || parcel.block_number != block.number
        || parcel.parcel_index != index
    {
        return Err(MappingError::MisplacedParcel {
            parcel: parcel.hash,
            claimed_hash: parcel.block_hash,
            claimed_number: parcel.block_number,
            claimed_index: parcel.parcel_index,
            hash: block.hash,
            number: block.number,
            index,
        });
    }

    Ok(ParcelRow {
        hash: parcel.hash,
        block_hash: parcel.block_hash,
        block_number: to_i64("block number", parcel.block_number)?,
        parcel_index: to_i64("parcel index", parcel.parcel_index)?,
        seq: to_i64("seq", parcel.seq)?,
        fee: parcel.fee.into(),
        network_id: parcel.network_id.clone(),
        signer: valid(&parcel.signer)?,
        sig: parcel.sig.clone(),
    })
}

pub fn action_row(parcel: &Parcel) -> ActionRow {
    let attributes = match &parcel.action {
        Action::AssetTransaction { transaction } => json!({
            "transactionHash": transaction.hash().to_string(),
        }),

        Action::Payment { receiver, amount } => json!({
            "receiver": receiver,
            "amount": Decimal::from(*amount),
        }),

        Action::SetRegularKey { key } => json!({
            "key": key.to_string(),
        }),

        Action::CreateShard => json!({}),
    };

    ActionRow {
        parcel_hash: parcel.hash,
        variant: parcel.action.variant(),
        attributes,
    }
}

pub fn transaction_row(
    parcel: &Parcel,
    transaction: &Transaction,
) -> Result<TransactionRow, MappingError> {
    let attributes = match transaction {
        Transaction::MintAsset(mint) => json!({
            "shardId": mint.shard_id,
            "metadata": mint.metadata,
            "approver": mint.approver,
            "administrator": mint.administrator,
            "allowedScriptHashes": hex_strings(&mint.allowed_script_hashes),
            "output": {
                "lockScriptHash": mint.output.lock_script_hash.to_string(),
                "parameters": hex_strings(&mint.output.parameters),
                "supply": Decimal::from(mint.output.supply),
                "recipient": mint.output.recipient,
            },
            "assetType": mint.asset_type.to_string(),
        }),

        Transaction::TransferAsset(transfer) => json!({
            "burns": transfer.burns.iter().map(input_payload).collect::<Vec<_>>(),
            "inputs": transfer.inputs.iter().map(input_payload).collect::<Vec<_>>(),
            "outputs": transfer
                .outputs
                .iter()
                .map(|output| json!({
                    "lockScriptHash": output.lock_script_hash.to_string(),
                    "parameters": hex_strings(&output.parameters),
                    "assetType": output.asset_type.to_string(),
                    "quantity": Decimal::from(output.quantity),
                    "recipient": output.recipient,
                }))
                .collect::<Vec<_>>(),
        }),
    };

    Ok(TransactionRow {
        hash: transaction.hash(),
        parcel_hash: parcel.hash,
        block_hash: parcel.block_hash,
        block_number: to_i64("block number", parcel.block_number)?,
        parcel_index: to_i64("parcel index", parcel.parcel_index)?,
        variant: transaction.variant(),
        network_id: transaction.network_id().to_owned(),
        attributes,
    })
}

pub fn asset_mint_output_row(mint: &MintAsset) -> Result<AssetMintOutputRow, MappingError> {
    Ok(AssetMintOutputRow {
        transaction_hash: mint.hash,
        lock_script_hash: mint.output.lock_script_hash,
        parameters: hex_strings(&mint.output.parameters),
        supply: mint.output.supply.into(),
        approver: mint.approver.as_ref().map(valid).transpose()?,
        administrator: mint.administrator.as_ref().map(valid).transpose()?,
        allowed_script_hashes: hex_strings(&mint.allowed_script_hashes),
        recipient: valid(&mint.output.recipient)?,
        asset_type: mint.asset_type,
    })
}

pub fn asset_scheme_row(mint: &MintAsset) -> Result<AssetSchemeRow, MappingError> {
    Ok(AssetSchemeRow {
        asset_type: mint.asset_type,
        transaction_hash: mint.hash,
        network_id: mint.network_id.clone(),
        shard_id: mint.shard_id.into(),
        metadata: mint.metadata.clone(),
        approver: mint.approver.as_ref().map(valid).transpose()?,
        administrator: mint.administrator.as_ref().map(valid).transpose()?,
        allowed_script_hashes: hex_strings(&mint.allowed_script_hashes),
        supply: mint.output.supply.into(),
    })
}

/// One row per distinct address touched by any parcel of the given [Block].
pub fn address_log_rows(block: &Block) -> Result<Vec<AddressLogRow>, MappingError> {
    let block_number = to_i64("block number", block.number)?;

    block
        .parcels
        .iter()
        .flat_map(Parcel::touched_addresses)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|address| {
            Ok(AddressLogRow {
                address: valid(address)?,
                block_number,
                block_hash: block.hash,
            })
        })
        .collect()
}

pub fn account_row(account: Account) -> Result<AccountRow, MappingError> {
    let Account {
        address,
        balance,
        seq,
        block_number,
    } = account;

    Ok(AccountRow {
        address: valid(&address)?,
        balance: balance.into(),
        seq: to_i64("seq", seq)?,
        block_number: to_i64("block number", block_number)?,
    })
}

fn input_payload(input: &TransferInput) -> Value {
    let OutPoint {
        transaction_hash,
        index,
        asset_type,
        quantity,
        owner,
    } = &input.prev_out;

    json!({
        "prevOut": {
            "transactionHash": transaction_hash.to_string(),
            "index": index,
            "assetType": asset_type.to_string(),
            "quantity": Decimal::from(*quantity),
            "owner": owner,
        },
        "lockScript": input.lock_script.to_string(),
        "unlockScript": input.unlock_script.to_string(),
    })
}

fn hex_strings<T>(values: &[T]) -> Value
where
    T: ToString,
{
    values
        .iter()
        .map(|value| Value::String(value.to_string()))
        .collect()
}

fn to_i64(field: &'static str, value: u64) -> Result<i64, MappingError> {
    i64::try_from(value).map_err(|_| MappingError::OutOfRange { field, value })
}

fn valid(address: &Address) -> Result<Address, MappingError> {
    if address.is_valid() {
        Ok(address.to_owned())
    } else {
        Err(MappingError::InvalidAddress(address.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        Account, ActionVariant, Address, TransactionVariant,
        mapper::{MappingError, account_row, map_block},
        testing::{
            asset_address, block, hash, mint, payment, platform_address, push_parcel, transfer,
        },
    };
    use alloy_primitives::U256;
    use assert_matches::assert_matches;
    use indexer_common::domain::BlockHash;
    use serde_json::json;

    #[test]
    fn test_map_block() {
        let a = platform_address(1);
        let b = platform_address(2);
        let mut block = block(5, hash(), platform_address(0));
        push_parcel(&mut block, a.clone(), mint(a.clone(), U256::MAX));
        push_parcel(&mut block, a.clone(), transfer(a.clone(), vec![b.clone()]));

        let rows = map_block(&block, U256::from(50)).expect("block can be mapped");

        assert_eq!(rows.block.number, 5);
        assert_eq!(rows.block.hash, block.hash);
        assert_eq!(rows.block.score.as_ref(), "500");
        assert_eq!(rows.block.mining_reward.as_ref(), "50");
        assert_eq!(rows.block.seal, json!(["0x00", "0x0102"]));

        assert_eq!(rows.parcels.len(), 2);
        assert_eq!(rows.parcels[1].parcel_index, 1);
        assert_eq!(
            rows.actions
                .iter()
                .map(|action| action.variant)
                .collect::<Vec<_>>(),
            vec![ActionVariant::AssetTransaction; 2]
        );
        assert_eq!(
            rows.transactions
                .iter()
                .map(|transaction| transaction.variant)
                .collect::<Vec<_>>(),
            vec![TransactionVariant::MintAsset, TransactionVariant::TransferAsset]
        );

        assert_eq!(rows.asset_mint_outputs.len(), 1);
        assert_eq!(rows.asset_mint_outputs[0].supply.to_u256(), U256::MAX);
        assert_eq!(rows.asset_schemes.len(), 1);
        assert_eq!(
            rows.asset_schemes[0].asset_type,
            rows.asset_mint_outputs[0].asset_type
        );

        let logged = rows
            .address_logs
            .iter()
            .map(|log| log.address.clone())
            .collect::<Vec<_>>();
        assert_eq!(logged, vec![a, b]);
        assert!(rows.address_logs.iter().all(|log| log.block_number == 5));
    }

    #[test]
    fn test_map_block_payment() {
        let mut block = block(1, hash(), platform_address(0));
        push_parcel(
            &mut block,
            platform_address(1),
            payment(platform_address(2), 1_000),
        );
        push_parcel(
            &mut block,
            platform_address(1),
            transfer(asset_address(1), vec![asset_address(2)]),
        );

        let rows = map_block(&block, U256::ZERO).expect("block can be mapped");

        assert_eq!(
            rows.actions[0].attributes,
            json!({ "receiver": platform_address(2), "amount": "1000" })
        );
        assert_eq!(rows.transactions.len(), 1);
        assert!(rows.asset_mint_outputs.is_empty());
        // Asset addresses are logged, too.
        assert_eq!(rows.address_logs.len(), 4);
    }

    #[test]
    fn test_map_block_errors() {
        let too_high = block(u64::MAX, BlockHash::default(), platform_address(0));
        assert_matches!(
            map_block(&too_high, U256::ZERO),
            Err(MappingError::OutOfRange {
                field: "block number",
                ..
            })
        );

        let mut misplaced = block(1, hash(), platform_address(0));
        push_parcel(&mut misplaced, platform_address(1), payment(platform_address(2), 1));
        misplaced.parcels[0].block_hash = hash();
        assert_matches!(
            map_block(&misplaced, U256::ZERO),
            Err(MappingError::MisplacedParcel { index: 0, .. })
        );

        let mut duplicate = block(1, hash(), platform_address(0));
        push_parcel(&mut duplicate, platform_address(1), payment(platform_address(2), 1));
        let mut parcel = duplicate.parcels[0].clone();
        parcel.parcel_index = 1;
        duplicate.parcels.push(parcel);
        assert_matches!(
            map_block(&duplicate, U256::ZERO),
            Err(MappingError::DuplicateParcel(_))
        );

        let invalid_author = block(1, hash(), Address::from("not an address"));
        assert_matches!(
            map_block(&invalid_author, U256::ZERO),
            Err(MappingError::InvalidAddress(_))
        );
    }

    #[test]
    fn test_account_row() {
        let account = Account {
            address: platform_address(1),
            balance: U256::from(10).pow(U256::from(30)),
            seq: 3,
            block_number: 7,
        };
        let row = account_row(account).expect("account can be mapped");
        assert_eq!(row.balance.as_ref(), "1000000000000000000000000000000");
        assert_eq!(row.seq, 3);
        assert_eq!(row.block_number, 7);

        let account = Account {
            address: platform_address(1),
            balance: U256::ZERO,
            seq: u64::MAX,
            block_number: 7,
        };
        assert_matches!(
            account_row(account),
            Err(MappingError::OutOfRange { field: "seq", .. })
        );
    }
}
