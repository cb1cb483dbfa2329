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

use derive_more::{AsRef, From, Into};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt::{self, Debug, Display};
use thiserror::Error;

/// A newtype for a byte vector implementing various traits, amongst others `Debug` and `Display`
/// returning a `0x`-prefixed hex-encoded string, the former abbreviated after four bytes.
#[derive(Default, Clone, PartialEq, Eq, Hash, AsRef, From, Into, Serialize, Deserialize, Type)]
#[as_ref([u8])]
#[from(Vec<u8>, &[u8])]
#[sqlx(transparent)]
pub struct ByteVec(#[serde(with = "const_hex")] pub Vec<u8>);

impl Debug for ByteVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug(self, f)
    }
}

impl Display for ByteVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f)
    }
}

/// A newtype for a byte array implementing various traits, amongst others `Debug` and `Display`
/// returning a `0x`-prefixed hex-encoded string, the former abbreviated after four bytes.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRef, From, Into, Serialize, Deserialize,
    Type,
)]
#[as_ref([u8])]
#[sqlx(transparent)]
pub struct ByteArray<const N: usize>(#[serde(with = "const_hex")] pub [u8; N]);

impl<const N: usize> Default for ByteArray<N> {
    /// A byte array of length N filled with `0`s.
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> TryFrom<&[u8]> for ByteArray<N> {
    type Error = TryFromForByteArrayError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        bytes
            .try_into()
            .map_err(|_| TryFromForByteArrayError(N, bytes.len()))
            .map(Self)
    }
}

impl<const N: usize> TryFrom<Vec<u8>> for ByteArray<N> {
    type Error = TryFromForByteArrayError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        bytes.as_slice().try_into()
    }
}

impl<const N: usize> Debug for ByteArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug(self, f)
    }
}

impl<const N: usize> Display for ByteArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f)
    }
}

#[derive(Debug, Error)]
#[error("cannot create array of len {0} from slice of len {1}")]
pub struct TryFromForByteArrayError(usize, usize);

fn debug<T>(bytes: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: AsRef<[u8]>,
{
    let hex_encoded = const_hex::encode(bytes);

    if hex_encoded.len() <= 8 {
        write!(f, "0x{hex_encoded}")
    } else {
        write!(f, "0x{}…", &hex_encoded[0..8])
    }
}

fn display<T>(bytes: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: AsRef<[u8]>,
{
    let hex_encoded = const_hex::encode(bytes);
    write!(f, "0x{hex_encoded}")
}
