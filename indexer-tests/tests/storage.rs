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

#![cfg(any(feature = "cloud", feature = "standalone"))]

use alloy_primitives::U256;
use anyhow::Context;
use assert_matches::assert_matches;
use chain_indexer::domain::{
    AccountRow, Action, Address, Block, BlockInfo, Transaction,
    mapper::map_block,
    query::{Query, QueryError},
    storage::{SaveBlockError, Storage},
    testing::{asset_address, chain, hash, mint, payment, platform_address, push_parcel, transfer},
};
use indexer_common::domain::{AssetType, Decimal};
use std::collections::BTreeSet;

#[tokio::test]
#[cfg(feature = "cloud")]
async fn test_postgres_storage() -> anyhow::Result<()> {
    let (storage, _container) = indexer_tests::postgres_storage().await?;
    run_tests(storage).await
}

#[tokio::test]
#[cfg(feature = "standalone")]
async fn test_sqlite_storage() -> anyhow::Result<()> {
    let storage = indexer_tests::sqlite_storage().await?;
    run_tests(storage).await
}

async fn run_tests(storage: impl Storage + Query) -> anyhow::Result<()> {
    let a = platform_address(10);
    let b = platform_address(11);

    let mut blocks = chain(4);
    push_parcel(&mut blocks[1], a.clone(), mint(a.clone(), U256::MAX));
    push_parcel(
        &mut blocks[1],
        a.clone(),
        transfer(a.clone(), vec![b.clone(), asset_address(1)]),
    );
    push_parcel(&mut blocks[2], b.clone(), payment(a.clone(), 1_000));
    let rows = blocks
        .iter()
        .map(|block| map_block(block, U256::from(50)))
        .collect::<Result<Vec<_>, _>>()
        .context("map blocks")?;

    // Empty storage ===============================================================================

    let highest_block = storage
        .get_highest_block()
        .await
        .context("get highest block")?;
    assert!(highest_block.is_none());
    assert_eq!(storage.get_parcel_count().await?, 0);
    assert_eq!(storage.get_transaction_count().await?, 0);

    // Save blocks =================================================================================

    for (number, rows) in rows.iter().take(3).enumerate() {
        let accounts = [account(&a, number as i64), account(&b, number as i64)];
        storage
            .save_block(rows, &accounts)
            .await
            .with_context(|| format!("save block {number}"))?;
    }

    let highest_block = storage
        .get_highest_block()
        .await
        .context("get highest block")?;
    assert_eq!(highest_block, Some(BlockInfo::from(&blocks[2])));
    assert_eq!(storage.get_parcel_count().await?, 3);
    assert_eq!(storage.get_transaction_count().await?, 2);

    // Every stored block references its predecessor.
    for number in 1..3 {
        let block = storage
            .get_block_by_number(number)
            .await?
            .context("get block")?;
        let parent_hash = storage.get_block_hash(number - 1).await?;
        assert_eq!(Some(block.parent_hash), parent_hash);
    }

    let block = storage
        .get_block_by_hash(blocks[1].hash)
        .await?
        .context("get block by hash")?;
    assert_eq!(block, rows[1].block);
    assert_eq!(block.score.as_ref(), "100");
    assert_eq!(block.mining_reward.as_ref(), "50");
    let block = storage.get_block_by_hash(hash()).await?;
    assert!(block.is_none());

    let parcels = storage.get_parcels_by_block_hash(blocks[1].hash).await?;
    assert_eq!(parcels, rows[1].parcels);

    let transactions = storage
        .get_transactions_by_block_hash(blocks[1].hash)
        .await?;
    assert_eq!(transactions, rows[1].transactions);

    let asset_type = asset_type(&blocks[1]).context("get asset type")?;
    let outputs = storage.get_asset_mint_outputs(asset_type).await?;
    assert_eq!(outputs, rows[1].asset_mint_outputs);
    assert_eq!(outputs[0].supply, Decimal::from(U256::MAX));
    let scheme = storage.get_asset_scheme(asset_type).await?;
    assert_eq!(scheme.as_ref(), rows[1].asset_schemes.first());

    let logged_addresses = storage.get_logged_addresses(1).await?;
    assert_eq!(
        logged_addresses,
        vec![asset_address(1), a.clone(), b.clone()]
    );

    let account_a = storage.get_account(&a).await?;
    assert_eq!(account_a, Some(account(&a, 2)));

    assert_matches!(
        storage.get_parcel(parcels[0].hash).await,
        Err(QueryError::NotImplemented(_))
    );
    assert_matches!(
        storage.get_pending_parcels().await,
        Err(QueryError::NotImplemented(_))
    );

    // Duplicate block =============================================================================

    let result = storage.save_block(&rows[1], &[account(&a, 99)]).await;
    assert_matches!(result, Err(SaveBlockError::AlreadyExists(hash)) if hash == blocks[1].hash);
    assert_eq!(storage.get_parcel_count().await?, 3);
    assert_eq!(storage.get_account(&a).await?, Some(account(&a, 2)));

    // Failing save is all or nothing ==============================================================

    let mut broken_rows = rows[3].clone();
    let mut broken_transaction = rows[1].transactions[0].clone();
    broken_transaction.parcel_hash = hash();
    broken_transaction.hash = hash();
    broken_rows.transactions.push(broken_transaction);

    let result = storage.save_block(&broken_rows, &[account(&a, 3)]).await;
    assert_matches!(result, Err(SaveBlockError::Storage(_)));
    assert!(storage.get_block_by_number(3).await?.is_none());
    assert_eq!(storage.get_block_hash(3).await?, None);
    assert_eq!(storage.get_transaction_count().await?, 2);
    assert_eq!(storage.get_account(&a).await?, Some(account(&a, 2)));

    // Replace stale block =========================================================================

    let mut stale_rows = rows[3].clone();
    stale_rows.block.hash = hash();
    storage.save_block(&stale_rows, &[]).await?;
    storage.save_block(&rows[3], &[]).await?;
    assert_eq!(storage.get_block_hash(3).await?, Some(blocks[3].hash));

    // Roll back ===================================================================================

    let touched_addresses = storage.get_addresses_touched_after(Some(0)).await?;
    assert_eq!(
        touched_addresses.into_iter().collect::<BTreeSet<_>>(),
        [platform_address(0), a.clone(), b.clone(), asset_address(1)].into()
    );

    let accounts = [account(&a, 0), account(&b, 0)];
    let rolled_back = storage.roll_back(Some(0), &accounts).await?;
    assert_eq!(rolled_back, 3);
    assert_eq!(
        storage.get_highest_block().await?,
        Some(BlockInfo::from(&blocks[0]))
    );
    assert_eq!(storage.get_parcel_count().await?, 0);
    assert_eq!(storage.get_transaction_count().await?, 0);
    assert!(storage.get_asset_mint_outputs(asset_type).await?.is_empty());
    assert!(storage.get_asset_scheme(asset_type).await?.is_none());
    assert!(storage.get_logged_addresses(1).await?.is_empty());
    assert!(storage.get_addresses_touched_after(Some(0)).await?.is_empty());
    assert_eq!(storage.get_account(&a).await?, Some(account(&a, 0)));

    // Rolling back again with the same accounts changes nothing.
    let rolled_back = storage.roll_back(Some(0), &accounts).await?;
    assert_eq!(rolled_back, 0);
    assert_eq!(storage.get_account(&a).await?, Some(account(&a, 0)));

    // The orphaned blocks can be saved again.
    storage.save_block(&rows[1], &[]).await?;
    assert_eq!(storage.get_transaction_count().await?, 2);

    let touched_addresses = storage.get_addresses_touched_after(None).await?;
    assert_eq!(
        touched_addresses.into_iter().collect::<BTreeSet<_>>(),
        [platform_address(0), a.clone(), b.clone(), asset_address(1)].into()
    );

    let rolled_back = storage.roll_back(None, &[account(&b, 0)]).await?;
    assert_eq!(rolled_back, 2);
    assert!(storage.get_highest_block().await?.is_none());
    assert!(storage.get_addresses_touched_after(None).await?.is_empty());
    assert_eq!(storage.get_account(&b).await?, Some(account(&b, 0)));
    // Accounts are not deleted by rolling back.
    assert!(storage.get_account(&a).await?.is_some());

    Ok(())
}

fn account(address: &Address, block_number: i64) -> AccountRow {
    AccountRow {
        address: address.to_owned(),
        balance: Decimal::from(block_number as u64 * 1_000),
        seq: block_number,
        block_number,
    }
}

fn asset_type(block: &Block) -> Option<AssetType> {
    block.parcels.iter().find_map(|parcel| match &parcel.action {
        Action::AssetTransaction {
            transaction: Transaction::MintAsset(mint),
        } => Some(mint.asset_type),
        _ => None,
    })
}
