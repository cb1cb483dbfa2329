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

mod bytes;
mod decimal;

pub use bytes::*;
pub use decimal::*;

/// Hash of a block.
pub type BlockHash = ByteArray<32>;

/// Hash of a parcel.
pub type ParcelHash = ByteArray<32>;

/// Hash of an asset transaction.
pub type TransactionHash = ByteArray<32>;

/// Type of an asset, i.e. the identifier of its scheme.
pub type AssetType = ByteArray<32>;

/// Hash of a lock script.
pub type ScriptHash = ByteArray<20>;
