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

use crate::domain::{
    AccountRow, Address, AssetMintOutputRow, AssetSchemeRow, BlockRow, ParcelRow, TransactionRow,
};
use indexer_common::domain::{AssetType, BlockHash, ParcelHash};
use thiserror::Error;

/// Read side over the indexed data, backing an HTTP query surface.
#[trait_variant::make(Send)]
pub trait Query
where
    Self: Clone + Send + Sync + 'static,
{
    /// Get the block with the given hash.
    async fn get_block_by_hash(&self, hash: BlockHash) -> Result<Option<BlockRow>, QueryError>;

    /// Get the block at the given number.
    async fn get_block_by_number(&self, number: u64) -> Result<Option<BlockRow>, QueryError>;

    /// Get the parcels of the block with the given hash, ordered by index.
    async fn get_parcels_by_block_hash(
        &self,
        block_hash: BlockHash,
    ) -> Result<Vec<ParcelRow>, QueryError>;

    /// Get the asset transactions of the block with the given hash, ordered by parcel index.
    async fn get_transactions_by_block_hash(
        &self,
        block_hash: BlockHash,
    ) -> Result<Vec<TransactionRow>, QueryError>;

    /// Get the account for the given address.
    async fn get_account(&self, address: &Address) -> Result<Option<AccountRow>, QueryError>;

    /// Get the mint outputs of the given asset type.
    async fn get_asset_mint_outputs(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<AssetMintOutputRow>, QueryError>;

    /// Get the scheme of the given asset type.
    async fn get_asset_scheme(
        &self,
        asset_type: AssetType,
    ) -> Result<Option<AssetSchemeRow>, QueryError>;

    /// Get the addresses logged for the block at the given number.
    async fn get_logged_addresses(&self, number: u64) -> Result<Vec<Address>, QueryError>;

    /// Get the parcel with the given hash. Not served yet.
    async fn get_parcel(&self, hash: ParcelHash) -> Result<Option<ParcelRow>, QueryError>;

    /// Get the pending parcels. Not served yet.
    async fn get_pending_parcels(&self) -> Result<Vec<ParcelRow>, QueryError>;
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0} not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}
