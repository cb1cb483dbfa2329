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

use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};

/// A CodeChain address in its textual form, e.g. `tccq9h7vnl68frvqapzv3tujrxtxtwqdnxw6yamrrgd`.
///
/// The first two characters are the network prefix, the third one the address kind: `c` for
/// platform addresses holding balances, `a` for asset addresses.
#[derive(
    Debug,
    Display,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRef,
    From,
    Into,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[as_ref(str)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Address(String);

impl Address {
    /// Whether this is a platform address, i.e. one that owns a balance and a sequence number.
    pub fn is_platform(&self) -> bool {
        self.0.as_bytes().get(2) == Some(&b'c')
    }

    /// Whether this address is well-formed enough to be stored: a network prefix, a kind and at
    /// least one further character, all ASCII alphanumeric.
    pub fn is_valid(&self) -> bool {
        self.0.len() > 3 && self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self(address.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::Address;

    #[test]
    fn test_is_platform() {
        assert!(Address::from("tccq9h7vnl68frvqapzv3tujrxtxtwqdnxw6yamrrgd").is_platform());
        assert!(!Address::from("tcaqyqckq0zgdxgpck6tjdg4qmp52p2vx3qaexqnegylk").is_platform());
        assert!(!Address::from("tc").is_platform());
    }

    #[test]
    fn test_is_valid() {
        assert!(Address::from("tccq9h7vnl68frvqapzv3tujrxtxtwqdnxw6yamrrgd").is_valid());
        assert!(!Address::from("").is_valid());
        assert!(!Address::from("tcc").is_valid());
        assert!(!Address::from("tcc q9h7").is_valid());
    }
}
