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

//! Fixtures for tests: chains of blocks with parcels and a [Node] serving them.

use crate::domain::{
    Action, Address, Block, MintAsset, MintOutput, Node, OutPoint, Parcel, Transaction,
    TransferAsset, TransferInput, TransferOutput,
};
use alloy_primitives::U256;
use fake::{Fake, Faker};
use indexer_common::domain::{BlockHash, ByteArray, ByteVec};
use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;

pub fn hash() -> ByteArray<32> {
    ByteArray(Faker.fake())
}

pub fn platform_address(n: u32) -> Address {
    Address::from(format!("tccqaccount{n:06}"))
}

pub fn asset_address(n: u32) -> Address {
    Address::from(format!("tcaqasset{n:06}"))
}

/// A block without parcels.
pub fn block(number: u64, parent_hash: BlockHash, author: Address) -> Block {
    Block {
        hash: hash(),
        parent_hash,
        number,
        author,
        timestamp: 1_600_000_000u64.saturating_add(number.saturating_mul(5)),
        extra_data: ByteVec::default(),
        parcels_root: ByteArray::default(),
        state_root: hash(),
        invoices_root: ByteArray::default(),
        score: U256::from(number) * U256::from(100),
        seal: vec![ByteVec::from(vec![0x00]), ByteVec::from(vec![0x01, 0x02])],
        parcels: vec![],
    }
}

/// A chain of blocks starting at genesis, each authored by `platform_address(0)`.
pub fn chain(len: u64) -> Vec<Block> {
    let mut blocks = Vec::<Block>::new();

    for number in 0..len {
        let parent_hash = blocks.last().map(|b| b.hash).unwrap_or_default();
        blocks.push(block(number, parent_hash, platform_address(0)));
    }

    blocks
}

/// A chain sharing the given prefix, continued by new blocks up to the given length.
pub fn fork(prefix: &[Block], len: u64) -> Vec<Block> {
    let mut blocks = prefix.to_vec();

    for number in prefix.len() as u64..len {
        let parent_hash = blocks.last().map(|b| b.hash).unwrap_or_default();
        blocks.push(block(number, parent_hash, platform_address(0)));
    }

    blocks
}

/// Append a parcel with the given signer and action to the given block.
pub fn push_parcel(block: &mut Block, signer: Address, action: Action) {
    let parcel = Parcel {
        hash: hash(),
        block_hash: block.hash,
        block_number: block.number,
        parcel_index: block.parcels.len() as u64,
        seq: block.parcels.len() as u64,
        fee: U256::from(10),
        network_id: "tc".to_owned(),
        signer,
        sig: ByteVec::from(vec![0x42; 65]),
        action,
    };

    block.parcels.push(parcel);
}

pub fn payment(receiver: Address, amount: u64) -> Action {
    Action::Payment {
        receiver,
        amount: U256::from(amount),
    }
}

pub fn mint(recipient: Address, supply: U256) -> Action {
    Action::AssetTransaction {
        transaction: Transaction::MintAsset(MintAsset {
            hash: hash(),
            network_id: "tc".to_owned(),
            shard_id: 0,
            metadata: "{\"name\":\"Gold\"}".to_owned(),
            approver: None,
            administrator: None,
            allowed_script_hashes: vec![],
            output: MintOutput {
                lock_script_hash: ByteArray([0x5f; 20]),
                parameters: vec![ByteVec::from(vec![0x01; 20])],
                supply,
                recipient,
            },
            asset_type: hash(),
        }),
    }
}

pub fn transfer(owner: Address, recipients: Vec<Address>) -> Action {
    let asset_type = hash();

    let outputs = recipients
        .into_iter()
        .map(|recipient| TransferOutput {
            lock_script_hash: ByteArray([0x5f; 20]),
            parameters: vec![],
            asset_type,
            quantity: U256::from(1),
            recipient,
        })
        .collect();

    Action::AssetTransaction {
        transaction: Transaction::TransferAsset(TransferAsset {
            hash: hash(),
            network_id: "tc".to_owned(),
            burns: vec![],
            inputs: vec![TransferInput {
                prev_out: OutPoint {
                    transaction_hash: hash(),
                    index: 0,
                    asset_type,
                    quantity: U256::from(1),
                    owner: Some(owner),
                },
                lock_script: ByteVec::default(),
                unlock_script: ByteVec::default(),
            }],
            outputs,
        }),
    }
}

#[derive(Debug, Error)]
#[error("node unavailable")]
pub struct MockNodeError;

/// The methods of [Node], to make individual ones of [MockNode] fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeMethod {
    BestBlockNumber,
    BlockByNumber,
    BlockHash,
    Balance,
    Seq,
    GenesisAccounts,
    MiningReward,
}

#[derive(Default)]
struct MockNodeState {
    blocks: Vec<Block>,
    best_block_number: Option<u64>,
    /// Remaining successful calls per failing method.
    fail_after: BTreeMap<NodeMethod, usize>,
}

/// A [Node] serving the given blocks, optionally failing individual methods.
#[derive(Clone, Default)]
pub struct MockNode(Arc<Mutex<MockNodeState>>);

impl MockNode {
    pub fn new(blocks: Vec<Block>) -> Self {
        let node = Self::default();
        node.set_blocks(blocks);
        node
    }

    pub fn set_blocks(&self, blocks: Vec<Block>) {
        self.0.lock().blocks = blocks;
    }

    pub fn set_best_block_number(&self, number: u64) {
        self.0.lock().best_block_number = Some(number);
    }

    /// Make account lookups fail, or recover all methods.
    pub fn set_failing(&self, failing: bool) {
        let mut state = self.0.lock();

        if failing {
            state.fail_after.insert(NodeMethod::Balance, 0);
            state.fail_after.insert(NodeMethod::Seq, 0);
        } else {
            state.fail_after.clear();
        }
    }

    /// Make the given method fail after the given number of successful calls.
    pub fn fail_after(&self, method: NodeMethod, calls: usize) {
        self.0.lock().fail_after.insert(method, calls);
    }

    /// The balance every address has as of the given block number.
    pub fn balance_at(number: u64) -> U256 {
        U256::from(number) * U256::from(1_000)
    }

    fn check(&self, method: NodeMethod) -> Result<(), MockNodeError> {
        match self.0.lock().fail_after.get_mut(&method) {
            Some(0) => Err(MockNodeError),

            Some(calls) => {
                *calls -= 1;
                Ok(())
            }

            None => Ok(()),
        }
    }
}

impl Node for MockNode {
    type Error = MockNodeError;

    async fn best_block_number(&self) -> Result<u64, Self::Error> {
        self.check(NodeMethod::BestBlockNumber)?;
        let state = self.0.lock();
        let number = state
            .best_block_number
            .unwrap_or((state.blocks.len() as u64).saturating_sub(1));
        Ok(number)
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<Block>, Self::Error> {
        self.check(NodeMethod::BlockByNumber)?;
        Ok(self.0.lock().blocks.get(number as usize).cloned())
    }

    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, Self::Error> {
        self.check(NodeMethod::BlockHash)?;
        Ok(self.0.lock().blocks.get(number as usize).map(|b| b.hash))
    }

    async fn balance(&self, _address: &Address, number: u64) -> Result<U256, Self::Error> {
        self.check(NodeMethod::Balance)?;
        Ok(Self::balance_at(number))
    }

    async fn seq(&self, _address: &Address, number: u64) -> Result<u64, Self::Error> {
        self.check(NodeMethod::Seq)?;
        Ok(number)
    }

    async fn genesis_accounts(&self) -> Result<Vec<Address>, Self::Error> {
        self.check(NodeMethod::GenesisAccounts)?;
        Ok(vec![platform_address(1), platform_address(2), platform_address(3)])
    }

    async fn mining_reward(&self, _number: u64) -> Result<U256, Self::Error> {
        self.check(NodeMethod::MiningReward)?;
        Ok(U256::from(50))
    }
}
