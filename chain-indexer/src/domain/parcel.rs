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

use crate::domain::{Address, Transaction};
use alloy_primitives::U256;
use indexer_common::domain::{BlockHash, ByteVec, ParcelHash};
use serde::{Deserialize, Serialize};

/// A signed parcel, the unit of inclusion in a [Block](crate::domain::Block), carrying exactly
/// one [Action].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub hash: ParcelHash,
    pub block_hash: BlockHash,
    pub block_number: u64,
    pub parcel_index: u64,
    pub seq: u64,
    pub fee: U256,
    pub network_id: String,
    pub signer: Address,
    pub sig: ByteVec,
    pub action: Action,
}

impl Parcel {
    /// All addresses this parcel touches: the signer and those referenced by its action, possibly
    /// with duplicates.
    pub fn touched_addresses(&self) -> Vec<&Address> {
        let mut addresses = vec![&self.signer];

        match &self.action {
            Action::AssetTransaction { transaction } => {
                addresses.extend(transaction.touched_addresses())
            }
            Action::Payment { receiver, .. } => addresses.push(receiver),
            Action::SetRegularKey { .. } | Action::CreateShard => {}
        }

        addresses
    }
}

/// The closed set of parcel actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    AssetTransaction { transaction: Transaction },
    Payment { receiver: Address, amount: U256 },
    SetRegularKey { key: ByteVec },
    CreateShard,
}

impl Action {
    pub fn variant(&self) -> ActionVariant {
        match self {
            Action::AssetTransaction { .. } => ActionVariant::AssetTransaction,
            Action::Payment { .. } => ActionVariant::Payment,
            Action::SetRegularKey { .. } => ActionVariant::SetRegularKey,
            Action::CreateShard => ActionVariant::CreateShard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[cfg_attr(feature = "cloud", sqlx(type_name = "ACTION_VARIANT"))]
pub enum ActionVariant {
    AssetTransaction,
    Payment,
    SetRegularKey,
    CreateShard,
}
