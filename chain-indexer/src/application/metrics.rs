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

use crate::domain::BlockRows;
use metrics::{Counter, Gauge, counter, gauge};

pub struct Metrics {
    block_number: Gauge,
    node_block_number: Gauge,
    parcel_count: Gauge,
    transaction_count: Gauge,
    reorg_count: Counter,
    rolled_back_block_count: Counter,
    refreshed_account_count: Counter,
}

impl Metrics {
    pub fn new(block_number: Option<u64>, parcel_count: u64, transaction_count: u64) -> Self {
        let metrics = Self {
            block_number: gauge!("indexer_block_number"),
            node_block_number: gauge!("indexer_node_block_number"),
            parcel_count: gauge!("indexer_parcel_count"),
            transaction_count: gauge!("indexer_transaction_count"),
            reorg_count: counter!("indexer_reorg_count"),
            rolled_back_block_count: counter!("indexer_rolled_back_block_count"),
            refreshed_account_count: counter!("indexer_refreshed_account_count"),
        };

        if let Some(block_number) = block_number {
            metrics.block_number.set(block_number as f64);
        }
        metrics.update_counts(parcel_count, transaction_count);

        metrics
    }

    /// Set the stored parcel and transaction counts, e.g. after rolling back.
    pub fn update_counts(&self, parcel_count: u64, transaction_count: u64) {
        self.parcel_count.set(parcel_count as f64);
        self.transaction_count.set(transaction_count as f64);
    }

    pub fn update_node_block_number(&self, node_block_number: u64) {
        self.node_block_number.set(node_block_number as f64);
    }

    pub fn update(&self, rows: &BlockRows, refreshed_account_count: usize) {
        self.block_number.set(rows.block.number as f64);
        self.parcel_count.increment(rows.parcels.len() as f64);
        self.transaction_count
            .increment(rows.transactions.len() as f64);
        self.refreshed_account_count
            .increment(refreshed_account_count as u64);
    }

    pub fn rolled_back(
        &self,
        fork_point: Option<u64>,
        rolled_back_block_count: u64,
        refreshed_account_count: usize,
    ) {
        match fork_point {
            Some(fork_point) => self.block_number.set(fork_point as f64),
            None => self.block_number.set(-1.0),
        }
        self.reorg_count.increment(1);
        self.rolled_back_block_count
            .increment(rolled_back_block_count);
        self.refreshed_account_count
            .increment(refreshed_account_count as u64);
    }
}
