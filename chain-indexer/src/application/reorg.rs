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

use crate::{
    application::{SyncError, account},
    domain::{AccountRow, BlockInfo, Node, storage::Storage},
};
use fastrace::trace;
use log::{info, warn};
use std::num::NonZeroUsize;

/// Outcome of resolving a reorganization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reorg {
    /// Highest stored block still canonical, `None` if even the stored genesis block is not.
    pub fork_point: Option<BlockInfo>,
    pub rolled_back_block_count: u64,
    pub refreshed_account_count: usize,
}

/// Find the fork point below the given stored tip by walking back until stored and canonical
/// hashes agree, then roll back all blocks above it and refresh the accounts touched by them as of
/// the fork point. Without a fork point all blocks are rolled back and the accounts touched by any
/// of them are refreshed as of the canonical genesis block. All node calls happen before the
/// storage is modified, hence a node failure leaves the storage untouched.
#[trace]
pub async fn resolve(
    node: &impl Node,
    storage: &impl Storage,
    tip: BlockInfo,
    concurrency: NonZeroUsize,
) -> Result<Reorg, SyncError> {
    let fork_point = find_fork_point(node, storage, tip).await?;
    let fork_point_number = fork_point.map(|BlockInfo { number, .. }| number);
    warn!(
        tip_hash:% = tip.hash,
        tip_number = tip.number,
        fork_point_number:?;
        "rolling back reorganized blocks"
    );

    let accounts = refetch_accounts(node, storage, fork_point_number, concurrency).await?;

    let rolled_back_block_count = storage.roll_back(fork_point_number, &accounts).await?;

    info!(
        fork_point_number:?,
        rolled_back_block_count,
        refreshed_account_count = accounts.len();
        "reorganization resolved"
    );

    Ok(Reorg {
        fork_point,
        rolled_back_block_count,
        refreshed_account_count: accounts.len(),
    })
}

async fn find_fork_point(
    node: &impl Node,
    storage: &impl Storage,
    tip: BlockInfo,
) -> Result<Option<BlockInfo>, SyncError> {
    let mut number = tip.number;

    loop {
        let stored_hash = storage.get_block_hash(number).await?;
        let canonical_hash = node.block_hash(number).await.map_err(SyncError::node)?;

        match stored_hash {
            Some(hash) if canonical_hash == Some(hash) => {
                return Ok(Some(BlockInfo { hash, number }));
            }

            _ if number == 0 => return Ok(None),

            _ => number -= 1,
        }
    }
}

async fn refetch_accounts(
    node: &impl Node,
    storage: &impl Storage,
    fork_point_number: Option<u64>,
    concurrency: NonZeroUsize,
) -> Result<Vec<AccountRow>, SyncError> {
    let addresses = storage
        .get_addresses_touched_after(fork_point_number)
        .await?
        .into_iter()
        .filter(|address| address.is_platform())
        .collect();

    account::fetch_accounts(
        node,
        addresses,
        fork_point_number.unwrap_or_default(),
        concurrency,
    )
    .await
}
