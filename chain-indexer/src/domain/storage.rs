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

use crate::domain::{AccountRow, Address, BlockInfo, BlockRows};
use indexer_common::domain::BlockHash;
use thiserror::Error;

/// Storage abstraction for the write side of the Chain Indexer.
#[trait_variant::make(Send)]
pub trait Storage
where
    Self: Clone + Send + Sync + 'static,
{
    /// Get the hash and number of the highest stored block.
    async fn get_highest_block(&self) -> Result<Option<BlockInfo>, sqlx::Error>;

    /// Get the hash of the stored block at the given number.
    async fn get_block_hash(&self, number: u64) -> Result<Option<BlockHash>, sqlx::Error>;

    /// Get the number of stored parcels.
    async fn get_parcel_count(&self) -> Result<u64, sqlx::Error>;

    /// Get the number of stored asset transactions.
    async fn get_transaction_count(&self) -> Result<u64, sqlx::Error>;

    /// Save the given rows of a single block together with the given refreshed accounts, all or
    /// nothing. A stored block at the same number with a different hash is replaced.
    async fn save_block(
        &self,
        rows: &BlockRows,
        accounts: &[AccountRow],
    ) -> Result<(), SaveBlockError>;

    /// Get the distinct addresses logged for or authoring blocks above the given number, or any
    /// stored block if `None`.
    async fn get_addresses_touched_after(
        &self,
        number: Option<u64>,
    ) -> Result<Vec<Address>, sqlx::Error>;

    /// Delete all blocks above the given fork point, or all blocks if `None`, together with all
    /// their dependent rows, and save the given refreshed accounts, all or nothing. Returns the
    /// number of deleted blocks.
    async fn roll_back(
        &self,
        fork_point: Option<u64>,
        accounts: &[AccountRow],
    ) -> Result<u64, sqlx::Error>;
}

#[derive(Debug, Error)]
pub enum SaveBlockError {
    #[error("block {0} already exists")]
    AlreadyExists(BlockHash),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}
