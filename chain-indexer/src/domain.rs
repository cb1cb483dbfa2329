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

pub mod mapper;
pub mod node;
pub mod query;
pub mod storage;

mod account;
mod address;
mod block;
mod parcel;
mod rows;
mod transaction;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use account::*;
pub use address::*;
pub use block::*;
pub use node::Node;
pub use parcel::*;
pub use rows::*;
pub use transaction::*;
