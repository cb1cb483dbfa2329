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

//! Store representations of the chain entities, created from the node representations by
//! [mapper](crate::domain::mapper). Heights and indexes are `i64`, arbitrary-precision integers
//! [Decimal]s and nested data opaque JSON payloads.

use crate::domain::{ActionVariant, Address, TransactionVariant};
use indexer_common::domain::{
    AssetType, BlockHash, ByteArray, ByteVec, Decimal, ParcelHash, ScriptHash, TransactionHash,
};
use serde_json::Value;
use sqlx::FromRow;

/// All rows for a single block, saved atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRows {
    pub block: BlockRow,
    pub parcels: Vec<ParcelRow>,
    pub actions: Vec<ActionRow>,
    pub transactions: Vec<TransactionRow>,
    pub asset_mint_outputs: Vec<AssetMintOutputRow>,
    pub asset_schemes: Vec<AssetSchemeRow>,
    pub address_logs: Vec<AddressLogRow>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BlockRow {
    #[sqlx(try_from = "Vec<u8>")]
    pub hash: BlockHash,
    #[sqlx(try_from = "Vec<u8>")]
    pub parent_hash: BlockHash,
    pub number: i64,
    pub author: Address,
    pub timestamp: i64,
    #[sqlx(json)]
    pub extra_data: Value,
    #[sqlx(try_from = "Vec<u8>")]
    pub parcels_root: ByteArray<32>,
    #[sqlx(try_from = "Vec<u8>")]
    pub state_root: ByteArray<32>,
    #[sqlx(try_from = "Vec<u8>")]
    pub invoices_root: ByteArray<32>,
    pub score: Decimal,
    #[sqlx(json)]
    pub seal: Value,
    pub mining_reward: Decimal,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ParcelRow {
    #[sqlx(try_from = "Vec<u8>")]
    pub hash: ParcelHash,
    #[sqlx(try_from = "Vec<u8>")]
    pub block_hash: BlockHash,
    pub block_number: i64,
    pub parcel_index: i64,
    pub seq: i64,
    pub fee: Decimal,
    pub network_id: String,
    pub signer: Address,
    pub sig: ByteVec,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ActionRow {
    #[sqlx(try_from = "Vec<u8>")]
    pub parcel_hash: ParcelHash,
    pub variant: ActionVariant,
    #[sqlx(json)]
    pub attributes: Value,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TransactionRow {
    #[sqlx(try_from = "Vec<u8>")]
    pub hash: TransactionHash,
    #[sqlx(try_from = "Vec<u8>")]
    pub parcel_hash: ParcelHash,
    #[sqlx(try_from = "Vec<u8>")]
    pub block_hash: BlockHash,
    pub block_number: i64,
    pub parcel_index: i64,
    pub variant: TransactionVariant,
    pub network_id: String,
    #[sqlx(json)]
    pub attributes: Value,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AssetMintOutputRow {
    #[sqlx(try_from = "Vec<u8>")]
    pub transaction_hash: TransactionHash,
    #[sqlx(try_from = "Vec<u8>")]
    pub lock_script_hash: ScriptHash,
    #[sqlx(json)]
    pub parameters: Value,
    pub supply: Decimal,
    pub approver: Option<Address>,
    pub administrator: Option<Address>,
    #[sqlx(json)]
    pub allowed_script_hashes: Value,
    pub recipient: Address,
    #[sqlx(try_from = "Vec<u8>")]
    pub asset_type: AssetType,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AssetSchemeRow {
    #[sqlx(try_from = "Vec<u8>")]
    pub asset_type: AssetType,
    #[sqlx(try_from = "Vec<u8>")]
    pub transaction_hash: TransactionHash,
    pub network_id: String,
    pub shard_id: i32,
    pub metadata: String,
    pub approver: Option<Address>,
    pub administrator: Option<Address>,
    #[sqlx(json)]
    pub allowed_script_hashes: Value,
    pub supply: Decimal,
}

/// Records that an address was touched by some parcel of a block.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, FromRow)]
pub struct AddressLogRow {
    pub address: Address,
    pub block_number: i64,
    #[sqlx(try_from = "Vec<u8>")]
    pub block_hash: BlockHash,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AccountRow {
    pub address: Address,
    pub balance: Decimal,
    pub seq: i64,
    pub block_number: i64,
}
