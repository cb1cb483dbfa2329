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

use crate::domain::{Address, Parcel};
use alloy_primitives::U256;
use indexer_common::domain::{BlockHash, ByteArray, ByteVec};
use serde::{Deserialize, Serialize};

/// Relevant block data from the perspective of the Chain Indexer, as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub hash: BlockHash,
    pub parent_hash: BlockHash,
    pub number: u64,
    pub author: Address,
    pub timestamp: u64,
    pub extra_data: ByteVec,
    pub parcels_root: ByteArray<32>,
    pub state_root: ByteArray<32>,
    pub invoices_root: ByteArray<32>,
    pub score: U256,
    pub seal: Vec<ByteVec>,
    pub parcels: Vec<Parcel>,
}

/// Hash and number of a [Block].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub hash: BlockHash,
    pub number: u64,
}

impl From<&Block> for BlockInfo {
    fn from(block: &Block) -> Self {
        Self {
            hash: block.hash,
            number: block.number,
        }
    }
}
