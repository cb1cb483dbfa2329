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
    application::SyncError,
    domain::{Account, AccountRow, Address, AddressLogRow, Node, mapper},
};
use fastrace::trace;
use futures::{StreamExt, TryStreamExt, stream, try_join};
use std::{collections::BTreeSet, num::NonZeroUsize};

/// The addresses whose accounts are to be refreshed when indexing a block: the author and either
/// the genesis accounts, given for the genesis block only, or all logged platform addresses.
pub fn affected_addresses(
    author: &Address,
    address_logs: &[AddressLogRow],
    genesis_accounts: Option<&[Address]>,
) -> BTreeSet<Address> {
    let mut addresses = BTreeSet::from([author.to_owned()]);

    match genesis_accounts {
        Some(genesis_accounts) => addresses.extend(genesis_accounts.iter().cloned()),

        None => addresses.extend(
            address_logs
                .iter()
                .map(|log| &log.address)
                .filter(|address| address.is_platform())
                .cloned(),
        ),
    }

    addresses
}

/// Fetch balance and sequence number of the given addresses as of the given block number from the
/// node, with at most `concurrency` addresses in flight. The result is ordered by address.
#[trace]
pub async fn fetch_accounts(
    node: &impl Node,
    addresses: BTreeSet<Address>,
    number: u64,
    concurrency: NonZeroUsize,
) -> Result<Vec<AccountRow>, SyncError> {
    let mut accounts = stream::iter(addresses)
        .map(|address| fetch_account(node, address, number))
        .buffer_unordered(concurrency.get())
        .try_collect::<Vec<_>>()
        .await?;

    accounts.sort_unstable_by(|a, b| a.address.cmp(&b.address));

    Ok(accounts)
}

async fn fetch_account(
    node: &impl Node,
    address: Address,
    number: u64,
) -> Result<AccountRow, SyncError> {
    let (balance, seq) = try_join!(node.balance(&address, number), node.seq(&address, number))
        .map_err(SyncError::node)?;

    let account = Account {
        address,
        balance,
        seq,
        block_number: number,
    };

    mapper::account_row(account).map_err(|source| SyncError::Mapping { number, source })
}
