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

mod account;
mod metrics;
mod reorg;

pub use reorg::Reorg;

use crate::{
    application::metrics::Metrics,
    domain::{
        Block, BlockInfo, Node,
        mapper::{self, MappingError},
        storage::{SaveBlockError, Storage},
    },
};
use anyhow::Context;
use fastrace::{Span, future::FutureExt, prelude::SpanContext, trace};
use indexer_common::error::{BoxError, StdErrorExt};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::{error::Error as StdError, num::NonZeroUsize, time::Duration};
use thiserror::Error;
use tokio::time::{MissedTickBehavior, interval, timeout};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Config {
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(with = "humantime_serde")]
    pub sync_timeout: Duration,

    pub account_refresh_concurrency: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            sync_timeout: Duration::from_secs(60),
            account_refresh_concurrency: NonZeroUsize::new(16).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Brings the storage in line with the canonical chain of the node, one sync cycle at a time.
pub struct SyncWorker<N, S> {
    config: Config,
    node: N,
    storage: S,
    metrics: Metrics,
}

impl<N, S> SyncWorker<N, S>
where
    N: Node,
    S: Storage,
{
    pub async fn new(config: Config, node: N, storage: S) -> Result<Self, sqlx::Error> {
        let highest_block = storage.get_highest_block().await?;
        let parcel_count = storage.get_parcel_count().await?;
        let transaction_count = storage.get_transaction_count().await?;

        let metrics = Metrics::new(
            highest_block.map(|BlockInfo { number, .. }| number),
            parcel_count,
            transaction_count,
        );

        Ok(Self {
            config,
            node,
            storage,
            metrics,
        })
    }

    /// Run a single sync cycle: resolve a reorganization of the stored tip, if any, then index all
    /// blocks up to the best block of the node. Stops early, without error, if a block does not
    /// extend the stored chain, e.g. because the node reorganized meanwhile; the next cycle
    /// resolves that.
    #[trace]
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let mut outcome = SyncOutcome::default();

        let best_block_number = self
            .node
            .best_block_number()
            .await
            .map_err(SyncError::node)?;
        self.metrics.update_node_block_number(best_block_number);

        let mut highest_block = self.storage.get_highest_block().await?;

        if let Some(tip) = highest_block {
            let canonical_hash = self
                .node
                .block_hash(tip.number)
                .await
                .map_err(SyncError::node)?;

            if canonical_hash != Some(tip.hash) {
                let reorg = reorg::resolve(
                    &self.node,
                    &self.storage,
                    tip,
                    self.config.account_refresh_concurrency,
                )
                .await?;

                self.metrics.rolled_back(
                    reorg.fork_point.map(|BlockInfo { number, .. }| number),
                    reorg.rolled_back_block_count,
                    reorg.refreshed_account_count,
                );
                let parcel_count = self.storage.get_parcel_count().await?;
                let transaction_count = self.storage.get_transaction_count().await?;
                self.metrics.update_counts(parcel_count, transaction_count);

                highest_block = reorg.fork_point;
                outcome.reorg = Some(reorg);
            }
        }

        let next_number = highest_block
            .map(|BlockInfo { number, .. }| number + 1)
            .unwrap_or_default();

        for number in next_number..=best_block_number {
            let block = self
                .node
                .block_by_number(number)
                .await
                .map_err(SyncError::node)?
                .ok_or(SyncError::MissingBlock(number))?;

            if block.number != number {
                return Err(SyncError::UnexpectedBlock {
                    requested: number,
                    received: block.number,
                });
            }

            let highest_hash = highest_block.map(|BlockInfo { hash, .. }| hash);
            if number > 0 && Some(block.parent_hash) != highest_hash {
                warn!(
                    hash:% = block.hash,
                    number,
                    parent_hash:% = block.parent_hash,
                    highest_hash:?;
                    "unexpected block"
                );
                break;
            }

            let block_info = BlockInfo::from(&block);
            if self.index_block(block).await? {
                outcome.indexed_block_count += 1;
            } else {
                outcome.duplicate_block_count += 1;
            }
            highest_block = Some(block_info);
        }

        outcome.highest_block = highest_block;

        Ok(outcome)
    }

    /// Get the sync status: the highest indexed block and the best block of the node.
    pub async fn status(&self) -> Result<SyncStatus, SyncError> {
        let highest_block = self.storage.get_highest_block().await?;
        let best_block_number = self
            .node
            .best_block_number()
            .await
            .map_err(SyncError::node)?;

        Ok(SyncStatus {
            highest_block,
            best_block_number,
        })
    }

    /// Map the given block, refresh the affected accounts and save everything atomically. Returns
    /// `false` if the block had already been indexed.
    #[trace]
    async fn index_block(&self, block: Block) -> Result<bool, SyncError> {
        let number = block.number;

        let mining_reward = self
            .node
            .mining_reward(number)
            .await
            .map_err(SyncError::node)?;

        let rows = mapper::map_block(&block, mining_reward)
            .map_err(|source| SyncError::Mapping { number, source })?;

        let genesis_accounts = if number == 0 {
            let genesis_accounts = self
                .node
                .genesis_accounts()
                .await
                .map_err(SyncError::node)?;
            Some(genesis_accounts)
        } else {
            None
        };

        let addresses = account::affected_addresses(
            &block.author,
            &rows.address_logs,
            genesis_accounts.as_deref(),
        );
        let accounts = account::fetch_accounts(
            &self.node,
            addresses,
            number,
            self.config.account_refresh_concurrency,
        )
        .await?;

        match self.storage.save_block(&rows, &accounts).await {
            Ok(()) => {
                info!(
                    hash:% = block.hash,
                    number,
                    parent_hash:% = block.parent_hash,
                    parcel_count = rows.parcels.len(),
                    transaction_count = rows.transactions.len(),
                    account_count = accounts.len();
                    "block indexed"
                );

                self.metrics.update(&rows, accounts.len());

                Ok(true)
            }

            Err(SaveBlockError::AlreadyExists(hash)) => {
                info!(hash:%, number; "block already indexed");
                Ok(false)
            }

            Err(SaveBlockError::Storage(error)) => Err(error.into()),
        }
    }
}

/// Outcome of a single sync cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub reorg: Option<Reorg>,
    pub indexed_block_count: u64,
    pub duplicate_block_count: u64,
    pub highest_block: Option<BlockInfo>,
}

impl SyncOutcome {
    /// Whether this cycle neither rolled back nor indexed any block.
    pub fn is_noop(&self) -> bool {
        self.reorg.is_none() && self.indexed_block_count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub highest_block: Option<BlockInfo>,
    pub best_block_number: u64,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cannot call node")]
    Node(#[source] BoxError),

    #[error("node cannot provide block at number {0}")]
    MissingBlock(u64),

    #[error("node returned block at number {received} when requested at number {requested}")]
    UnexpectedBlock { requested: u64, received: u64 },

    #[error("cannot map block at number {number}")]
    Mapping {
        number: u64,
        #[source]
        source: MappingError,
    },

    #[error("cannot access storage")]
    Storage(#[from] sqlx::Error),
}

impl SyncError {
    fn node<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Node(error.into())
    }

    /// Whether the next cycle may succeed without changes to the node or the code, i.e. not a
    /// protocol mismatch.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::UnexpectedBlock { .. } | Self::Mapping { .. })
    }
}

/// Run sync cycles forever, one per poll interval, each bounded by the sync timeout. Failed or
/// timed out cycles are logged and retried in the next one.
pub async fn run(config: Config, node: impl Node, storage: impl Storage) -> anyhow::Result<()> {
    let worker = SyncWorker::new(config, node, storage)
        .await
        .context("create sync worker")?;

    let status = worker.status().await;
    match status {
        Ok(SyncStatus {
            highest_block,
            best_block_number,
        }) => {
            let highest_number = highest_block.map(|BlockInfo { number, .. }| number);
            info!(highest_number:?, best_block_number; "starting indexing");
        }

        Err(error) => warn!(error:% = error.as_chain(); "cannot get sync status"),
    }

    let mut interval = interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let sync = worker
            .sync()
            .in_span(Span::root("sync", SpanContext::random()));

        match timeout(config.sync_timeout, sync).await {
            Ok(Ok(outcome)) if outcome.is_noop() => debug!("already in sync"),

            Ok(Ok(outcome)) => {
                let highest_number = outcome
                    .highest_block
                    .map(|BlockInfo { number, .. }| number);
                info!(
                    indexed_block_count = outcome.indexed_block_count,
                    duplicate_block_count = outcome.duplicate_block_count,
                    reorg = outcome.reorg.is_some(),
                    highest_number:?;
                    "sync cycle completed"
                );
            }

            Ok(Err(error)) if error.is_transient() => {
                warn!(error:% = error.as_chain(); "sync cycle failed, retrying")
            }

            Ok(Err(error)) => {
                error!(
                    error:% = error.as_chain();
                    "sync cycle failed, node and indexer disagree"
                )
            }

            Err(_) => warn!(sync_timeout:? = config.sync_timeout; "sync cycle timed out, retrying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        application::{Config, SyncError, SyncWorker},
        domain::{
            AccountRow, Address, BlockInfo, BlockRows,
            mapper::map_block,
            storage::{SaveBlockError, Storage},
            testing::{
                MockNode, NodeMethod, chain, fork, hash, mint, payment, platform_address,
                push_parcel, transfer,
            },
        },
    };
    use alloy_primitives::U256;
    use assert_matches::assert_matches;
    use futures::executor::block_on;
    use indexer_common::{domain::BlockHash, error::BoxError};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use parking_lot::Mutex;
    use std::{
        collections::{BTreeMap, BTreeSet},
        sync::Arc,
    };

    #[tokio::test]
    async fn test_sync_genesis() -> Result<(), BoxError> {
        let mut blocks = chain(1);
        blocks[0].author = platform_address(9);
        let node = MockNode::new(blocks);
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node, storage.clone()).await?;

        let outcome = worker.sync().await?;
        assert_eq!(outcome.indexed_block_count, 1);
        assert_eq!(outcome.highest_block.map(|b| b.number), Some(0));

        let accounts = storage.accounts();
        assert_eq!(
            accounts.keys().cloned().collect::<Vec<_>>(),
            vec![
                platform_address(1),
                platform_address(2),
                platform_address(3),
                platform_address(9),
            ]
        );
        assert!(accounts.values().all(|account| account.block_number == 0));

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_address_logs() -> Result<(), BoxError> {
        let a = platform_address(10);
        let b = platform_address(11);
        let mut blocks = chain(6);
        push_parcel(&mut blocks[5], a.clone(), mint(a.clone(), U256::from(100)));
        push_parcel(&mut blocks[5], a.clone(), transfer(a.clone(), vec![b.clone()]));
        let node = MockNode::new(blocks);
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node, storage.clone()).await?;

        let outcome = worker.sync().await?;
        assert_eq!(outcome.indexed_block_count, 6);

        let logged = storage
            .rows(5)
            .map(|rows| {
                rows.address_logs
                    .into_iter()
                    .map(|log| log.address)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        assert_eq!(logged, vec![a.clone(), b.clone()]);

        let accounts = storage.accounts();
        assert_eq!(accounts.get(&a).map(|a| a.block_number), Some(5));
        assert_eq!(accounts.get(&b).map(|b| b.block_number), Some(5));
        assert_eq!(
            accounts.get(&b).map(|b| b.balance.to_u256()),
            Some(MockNode::balance_at(5))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_noop() -> Result<(), BoxError> {
        let node = MockNode::new(chain(4));
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node, storage.clone()).await?;

        let outcome = worker.sync().await?;
        assert_eq!(outcome.indexed_block_count, 4);
        let hashes = storage.hashes();
        let accounts = storage.accounts();

        let outcome = worker.sync().await?;
        assert!(outcome.is_noop());
        assert_eq!(outcome.highest_block.map(|b| b.number), Some(3));
        assert_eq!(storage.hashes(), hashes);
        assert_eq!(storage.accounts(), accounts);

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_reorg() -> Result<(), BoxError> {
        let a = platform_address(10);
        let mut blocks = chain(8);
        let node = MockNode::new(blocks.clone());
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node.clone(), storage.clone()).await?;
        worker.sync().await?;

        // Fork after block 4, touching `a` in the orphaned block 6, with a longer canonical chain.
        push_parcel(&mut blocks[6], a.clone(), transfer(a.clone(), vec![]));
        storage.replace(map_block(&blocks[6], U256::ZERO)?);
        let fork = fork(&blocks[..=4], 10);
        node.set_blocks(fork.clone());

        let outcome = worker.sync().await?;
        let reorg = outcome.reorg.as_ref().expect("reorg resolved");
        assert_eq!(reorg.fork_point, Some(BlockInfo::from(&blocks[4])));
        assert_eq!(reorg.rolled_back_block_count, 3);
        assert_eq!(outcome.indexed_block_count, 5);
        assert_eq!(storage.hashes(), fork.iter().map(|b| b.hash).collect::<Vec<_>>());

        // Accounts touched by orphaned blocks are refreshed as of the fork point.
        assert_eq!(storage.accounts().get(&a).map(|a| a.block_number), Some(4));

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_reorg_node_failure() -> Result<(), BoxError> {
        let a = platform_address(10);
        let mut blocks = chain(8);
        push_parcel(&mut blocks[6], a.clone(), transfer(a.clone(), vec![]));
        let node = MockNode::new(blocks.clone());
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node.clone(), storage.clone()).await?;
        worker.sync().await?;
        let hashes = storage.hashes();
        let accounts = storage.accounts();

        node.set_blocks(fork(&blocks[..=4], 10));
        node.set_failing(true);

        let result = worker.sync().await;
        assert_matches!(result, Err(SyncError::Node(_)));
        assert_eq!(storage.hashes(), hashes);
        assert_eq!(storage.accounts(), accounts);

        node.set_failing(false);
        let outcome = worker.sync().await?;
        assert!(outcome.reorg.is_some());
        assert_eq!(storage.hashes().len(), 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_reorg_walk_failure() -> Result<(), BoxError> {
        let a = platform_address(10);
        let mut blocks = chain(8);
        push_parcel(&mut blocks[6], a.clone(), transfer(a.clone(), vec![]));
        let node = MockNode::new(blocks.clone());
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node.clone(), storage.clone()).await?;
        worker.sync().await?;
        let hashes = storage.hashes();
        let accounts = storage.accounts();

        // The tip check and the first step back succeed, the node fails at block 6.
        let fork = fork(&blocks[..=4], 10);
        node.set_blocks(fork.clone());
        node.fail_after(NodeMethod::BlockHash, 2);

        let result = worker.sync().await;
        assert_matches!(result, Err(SyncError::Node(_)));
        assert_eq!(storage.hashes(), hashes);
        assert_eq!(storage.accounts(), accounts);

        node.set_failing(false);
        let outcome = worker.sync().await?;
        let reorg = outcome.reorg.as_ref().expect("reorg resolved");
        assert_eq!(reorg.fork_point, Some(BlockInfo::from(&blocks[4])));
        assert_eq!(storage.hashes(), fork.iter().map(|b| b.hash).collect::<Vec<_>>());
        assert_eq!(storage.accounts().get(&a).map(|a| a.block_number), Some(4));

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_node_failure() -> Result<(), BoxError> {
        let blocks = chain(5);
        let node = MockNode::new(blocks.clone());
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node.clone(), storage.clone()).await?;

        node.fail_after(NodeMethod::BestBlockNumber, 0);
        let result = worker.sync().await;
        assert_matches!(result, Err(SyncError::Node(_)));
        assert!(storage.hashes().is_empty());

        // Blocks before the failing one are kept.
        node.set_failing(false);
        node.fail_after(NodeMethod::BlockByNumber, 2);
        let result = worker.sync().await;
        assert_matches!(result, Err(SyncError::Node(_)));
        assert_eq!(storage.hashes().len(), 2);

        node.set_failing(false);
        let outcome = worker.sync().await?;
        assert_eq!(outcome.indexed_block_count, 3);
        assert_eq!(storage.hashes(), blocks.iter().map(|b| b.hash).collect::<Vec<_>>());

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_reorg_metrics() -> Result<(), BoxError> {
        let a = platform_address(10);
        let mut blocks = chain(4);
        push_parcel(&mut blocks[3], a.clone(), transfer(a.clone(), vec![]));
        let node = MockNode::new(blocks.clone());
        let storage = MockStorage::default();

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let worker = ::metrics::with_local_recorder(&recorder, || {
            block_on(SyncWorker::new(
                Config::default(),
                node.clone(),
                storage.clone(),
            ))
        })?;

        worker.sync().await?;
        let rendered = handle.render();
        assert!(rendered.contains("indexer_parcel_count 1\n"));
        assert!(rendered.contains("indexer_transaction_count 1\n"));

        // Counts follow the storage when the block with the parcel is rolled back.
        node.set_blocks(fork(&blocks[..=2], 5));
        worker.sync().await?;
        let rendered = handle.render();
        assert!(rendered.contains("indexer_parcel_count 0\n"));
        assert!(rendered.contains("indexer_transaction_count 0\n"));
        assert!(rendered.contains("indexer_reorg_count 1\n"));
        assert!(rendered.contains("indexer_block_number 4\n"));

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_reorg_genesis() -> Result<(), BoxError> {
        let a = platform_address(10);
        let b = platform_address(11);
        let mut blocks = chain(3);
        push_parcel(&mut blocks[1], a.clone(), payment(b.clone(), 1));
        let node = MockNode::new(blocks);
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node.clone(), storage.clone()).await?;
        worker.sync().await?;
        assert_eq!(storage.accounts().get(&a).map(|a| a.block_number), Some(1));

        let other = chain(2);
        node.set_blocks(other.clone());

        let outcome = worker.sync().await?;
        let reorg = outcome.reorg.as_ref().expect("reorg resolved");
        assert_eq!(reorg.fork_point, None);
        assert_eq!(reorg.rolled_back_block_count, 3);
        // The author of the orphaned blocks, `a` and `b`.
        assert_eq!(reorg.refreshed_account_count, 3);
        assert_eq!(storage.hashes(), other.iter().map(|b| b.hash).collect::<Vec<_>>());

        // Accounts touched by the orphaned chain only are refreshed as of the new genesis block.
        let accounts = storage.accounts();
        for address in [&a, &b] {
            let account = accounts.get(address);
            assert_eq!(account.map(|a| a.block_number), Some(0));
            assert_eq!(
                account.map(|a| a.balance.to_u256()),
                Some(MockNode::balance_at(0))
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_unexpected_parent() -> Result<(), BoxError> {
        let mut blocks = chain(4);
        blocks[2].parent_hash = hash();
        let node = MockNode::new(blocks);
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node, storage.clone()).await?;

        let outcome = worker.sync().await?;
        assert_eq!(outcome.indexed_block_count, 2);
        assert_eq!(outcome.highest_block.map(|b| b.number), Some(1));
        assert_eq!(storage.hashes().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_missing_block() -> Result<(), BoxError> {
        let node = MockNode::new(chain(3));
        node.set_best_block_number(5);
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node, storage.clone()).await?;

        let result = worker.sync().await;
        assert_matches!(result, Err(SyncError::MissingBlock(3)));
        // Blocks before the missing one are kept.
        assert_eq!(storage.hashes().len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_status() -> Result<(), BoxError> {
        let blocks = chain(3);
        let node = MockNode::new(blocks.clone());
        let storage = MockStorage::default();
        let worker = SyncWorker::new(Config::default(), node, storage).await?;

        let status = worker.status().await?;
        assert_eq!(status.highest_block, None);
        assert_eq!(status.best_block_number, 2);

        worker.sync().await?;
        let status = worker.status().await?;
        assert_eq!(status.highest_block, Some(BlockInfo::from(&blocks[2])));

        Ok(())
    }

    #[derive(Default)]
    struct MockStorageState {
        blocks: BTreeMap<u64, BlockRows>,
        accounts: BTreeMap<Address, AccountRow>,
    }

    #[derive(Clone, Default)]
    struct MockStorage(Arc<Mutex<MockStorageState>>);

    impl MockStorage {
        fn hashes(&self) -> Vec<BlockHash> {
            self.0.lock().blocks.values().map(|rows| rows.block.hash).collect()
        }

        fn rows(&self, number: u64) -> Option<BlockRows> {
            self.0.lock().blocks.get(&number).cloned()
        }

        fn accounts(&self) -> BTreeMap<Address, AccountRow> {
            self.0.lock().accounts.clone()
        }

        fn replace(&self, rows: BlockRows) {
            self.0.lock().blocks.insert(rows.block.number as u64, rows);
        }

        fn save_accounts(state: &mut MockStorageState, accounts: &[AccountRow]) {
            for account in accounts {
                state
                    .accounts
                    .insert(account.address.clone(), account.to_owned());
            }
        }
    }

    impl Storage for MockStorage {
        async fn get_highest_block(&self) -> Result<Option<BlockInfo>, sqlx::Error> {
            let highest_block = self.0.lock().blocks.values().last().map(|rows| BlockInfo {
                hash: rows.block.hash,
                number: rows.block.number as u64,
            });
            Ok(highest_block)
        }

        async fn get_block_hash(&self, number: u64) -> Result<Option<BlockHash>, sqlx::Error> {
            Ok(self.0.lock().blocks.get(&number).map(|rows| rows.block.hash))
        }

        async fn get_parcel_count(&self) -> Result<u64, sqlx::Error> {
            let count = self
                .0
                .lock()
                .blocks
                .values()
                .map(|rows| rows.parcels.len())
                .sum::<usize>();
            Ok(count as u64)
        }

        async fn get_transaction_count(&self) -> Result<u64, sqlx::Error> {
            let count = self
                .0
                .lock()
                .blocks
                .values()
                .map(|rows| rows.transactions.len())
                .sum::<usize>();
            Ok(count as u64)
        }

        async fn save_block(
            &self,
            rows: &BlockRows,
            accounts: &[AccountRow],
        ) -> Result<(), SaveBlockError> {
            let mut state = self.0.lock();

            if state.blocks.values().any(|r| r.block.hash == rows.block.hash) {
                return Err(SaveBlockError::AlreadyExists(rows.block.hash));
            }

            state
                .blocks
                .insert(rows.block.number as u64, rows.to_owned());
            Self::save_accounts(&mut state, accounts);

            Ok(())
        }

        async fn get_addresses_touched_after(
            &self,
            number: Option<u64>,
        ) -> Result<Vec<Address>, sqlx::Error> {
            let addresses = self
                .0
                .lock()
                .blocks
                .range(number.map(|n| n + 1).unwrap_or_default()..)
                .flat_map(|(_, rows)| {
                    rows.address_logs
                        .iter()
                        .map(|log| log.address.clone())
                        .chain([rows.block.author.clone()])
                        .collect::<Vec<_>>()
                })
                .collect::<BTreeSet<_>>();

            Ok(addresses.into_iter().collect())
        }

        async fn roll_back(
            &self,
            fork_point: Option<u64>,
            accounts: &[AccountRow],
        ) -> Result<u64, sqlx::Error> {
            let mut state = self.0.lock();

            let rolled_back = match fork_point {
                Some(fork_point) => state.blocks.split_off(&(fork_point + 1)),
                None => std::mem::take(&mut state.blocks),
            };
            Self::save_accounts(&mut state, accounts);

            Ok(rolled_back.len() as u64)
        }
    }
}
