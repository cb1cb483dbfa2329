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

use crate::domain::{Address, Block};
use alloy_primitives::U256;
use indexer_common::domain::BlockHash;
use std::error::Error as StdError;

/// Node abstraction: the read-only chain queries the Chain Indexer depends on.
#[trait_variant::make(Send)]
pub trait Node
where
    Self: Clone + Send + Sync + 'static,
{
    /// Error type for all node calls.
    type Error: StdError + Send + Sync + 'static;

    /// Get the number of the best block.
    async fn best_block_number(&self) -> Result<u64, Self::Error>;

    /// Get the canonical [Block] at the given number including its parcels, if any.
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>, Self::Error>;

    /// Get the hash of the canonical block at the given number, if any.
    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, Self::Error>;

    /// Get the balance of the given address as of the given block number.
    async fn balance(&self, address: &Address, number: u64) -> Result<U256, Self::Error>;

    /// Get the sequence number of the given address as of the given block number.
    async fn seq(&self, address: &Address, number: u64) -> Result<u64, Self::Error>;

    /// Get the addresses of the accounts created at genesis.
    async fn genesis_accounts(&self) -> Result<Vec<Address>, Self::Error>;

    /// Get the mining reward for the block at the given number.
    async fn mining_reward(&self, number: u64) -> Result<U256, Self::Error>;
}
