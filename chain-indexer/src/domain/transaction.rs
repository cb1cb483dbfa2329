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

use crate::domain::Address;
use alloy_primitives::U256;
use indexer_common::domain::{AssetType, ByteVec, ScriptHash, TransactionHash};
use serde::{Deserialize, Serialize};

/// The closed set of asset transactions carried by
/// [Action::AssetTransaction](crate::domain::Action::AssetTransaction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transaction {
    MintAsset(MintAsset),
    TransferAsset(TransferAsset),
}

impl Transaction {
    pub fn hash(&self) -> TransactionHash {
        match self {
            Transaction::MintAsset(mint) => mint.hash,
            Transaction::TransferAsset(transfer) => transfer.hash,
        }
    }

    pub fn network_id(&self) -> &str {
        match self {
            Transaction::MintAsset(mint) => &mint.network_id,
            Transaction::TransferAsset(transfer) => &transfer.network_id,
        }
    }

    pub fn variant(&self) -> TransactionVariant {
        match self {
            Transaction::MintAsset(_) => TransactionVariant::MintAsset,
            Transaction::TransferAsset(_) => TransactionVariant::TransferAsset,
        }
    }

    /// All addresses this transaction touches, possibly with duplicates.
    pub fn touched_addresses(&self) -> Vec<&Address> {
        match self {
            Transaction::MintAsset(mint) => [
                Some(&mint.output.recipient),
                mint.approver.as_ref(),
                mint.administrator.as_ref(),
            ]
            .into_iter()
            .flatten()
            .collect(),

            Transaction::TransferAsset(transfer) => transfer
                .burns
                .iter()
                .chain(transfer.inputs.iter())
                .filter_map(|input| input.prev_out.owner.as_ref())
                .chain(transfer.outputs.iter().map(|output| &output.recipient))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[cfg_attr(feature = "cloud", sqlx(type_name = "TRANSACTION_VARIANT"))]
pub enum TransactionVariant {
    MintAsset,
    TransferAsset,
}

/// Mints a new asset, creating its scheme and a single output holding the whole supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintAsset {
    pub hash: TransactionHash,
    pub network_id: String,
    pub shard_id: u16,
    pub metadata: String,
    pub approver: Option<Address>,
    pub administrator: Option<Address>,
    pub allowed_script_hashes: Vec<ScriptHash>,
    pub output: MintOutput,
    pub asset_type: AssetType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintOutput {
    pub lock_script_hash: ScriptHash,
    pub parameters: Vec<ByteVec>,
    pub supply: U256,
    pub recipient: Address,
}

/// Transfers assets from previous outputs to new outputs, optionally burning some.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAsset {
    pub hash: TransactionHash,
    pub network_id: String,
    pub burns: Vec<TransferInput>,
    pub inputs: Vec<TransferInput>,
    pub outputs: Vec<TransferOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInput {
    pub prev_out: OutPoint,
    pub lock_script: ByteVec,
    pub unlock_script: ByteVec,
}

/// Reference to a previous asset output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutPoint {
    pub transaction_hash: TransactionHash,
    pub index: u64,
    pub asset_type: AssetType,
    pub quantity: U256,
    pub owner: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutput {
    pub lock_script_hash: ScriptHash,
    pub parameters: Vec<ByteVec>,
    pub asset_type: AssetType,
    pub quantity: U256,
    pub recipient: Address,
}
