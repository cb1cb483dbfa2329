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

use crate::domain::{
    AccountRow, ActionRow, Address, AddressLogRow, AssetMintOutputRow, AssetSchemeRow, BlockInfo,
    BlockRow, BlockRows, ParcelRow, TransactionRow,
    query::{Query, QueryError},
    storage::{SaveBlockError, Storage},
};
use indexer_common::{
    domain::{AssetType, BlockHash, ByteArray, ParcelHash},
    error::SqlxErrorExt,
    infra::pool::sqlite::SqlitePool,
};
use indoc::indoc;
use sqlx::{QueryBuilder, Sqlite, types::Json};
use std::iter;

type Tx = sqlx::Transaction<'static, Sqlite>;

const BLOCK_COLUMNS: &str = indoc! {"
    hash,
    parent_hash,
    number,
    author,
    timestamp,
    extra_data,
    parcels_root,
    state_root,
    invoices_root,
    score,
    seal,
    mining_reward
"};

const PARCEL_COLUMNS: &str = indoc! {"
    hash,
    block_hash,
    block_number,
    parcel_index,
    seq,
    fee,
    network_id,
    signer,
    sig
"};

const TRANSACTION_COLUMNS: &str = indoc! {"
    hash,
    parcel_hash,
    block_hash,
    block_number,
    parcel_index,
    variant,
    network_id,
    attributes
"};

/// Sqlite based implementation of [Storage] and [Query].
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new [SqliteStorage].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl Storage for SqliteStorage {
    async fn get_highest_block(&self) -> Result<Option<BlockInfo>, sqlx::Error> {
        let query = indoc! {"
            SELECT hash, number
            FROM blocks
            ORDER BY number DESC
            LIMIT 1
        "};

        sqlx::query_as::<_, (Vec<u8>, i64)>(query)
            .fetch_optional(&*self.pool)
            .await?
            .map(|(hash, number)| {
                let hash = ByteArray::try_from(hash)
                    .map_err(|error| sqlx::Error::Decode(error.into()))?;

                Ok(BlockInfo {
                    hash,
                    number: number as u64,
                })
            })
            .transpose()
    }

    async fn get_block_hash(&self, number: u64) -> Result<Option<BlockHash>, sqlx::Error> {
        let query = indoc! {"
            SELECT hash
            FROM blocks
            WHERE number = $1
        "};

        sqlx::query_as::<_, (Vec<u8>,)>(query)
            .bind(number as i64)
            .fetch_optional(&*self.pool)
            .await?
            .map(|(hash,)| {
                ByteArray::try_from(hash).map_err(|error| sqlx::Error::Decode(error.into()))
            })
            .transpose()
    }

    async fn get_parcel_count(&self) -> Result<u64, sqlx::Error> {
        let query = indoc! {"
            SELECT count(*)
            FROM parcels
        "};

        let (count,) = sqlx::query_as::<_, (i64,)>(query)
            .fetch_one(&*self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn get_transaction_count(&self) -> Result<u64, sqlx::Error> {
        let query = indoc! {"
            SELECT count(*)
            FROM transactions
        "};

        let (count,) = sqlx::query_as::<_, (i64,)>(query)
            .fetch_one(&*self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn save_block(
        &self,
        rows: &BlockRows,
        accounts: &[AccountRow],
    ) -> Result<(), SaveBlockError> {
        let mut tx = self.pool.begin().await?;
        save_block(rows, &mut tx).await?;
        save_accounts(accounts, &mut tx).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn get_addresses_touched_after(
        &self,
        number: Option<u64>,
    ) -> Result<Vec<Address>, sqlx::Error> {
        let query = indoc! {"
            SELECT address
            FROM address_logs
            WHERE block_number > $1
            UNION
            SELECT author
            FROM blocks
            WHERE number > $1
        "};

        let addresses = sqlx::query_as::<_, (Address,)>(query)
            .bind(number.map(|n| n as i64).unwrap_or(-1))
            .fetch_all(&*self.pool)
            .await?
            .into_iter()
            .map(|(address,)| address)
            .collect();

        Ok(addresses)
    }

    async fn roll_back(
        &self,
        fork_point: Option<u64>,
        accounts: &[AccountRow],
    ) -> Result<u64, sqlx::Error> {
        let query = indoc! {"
            DELETE FROM blocks
            WHERE number > $1
        "};

        let mut tx = self.pool.begin().await?;

        let rolled_back = sqlx::query(query)
            .bind(fork_point.map(|n| n as i64).unwrap_or(-1))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        save_accounts(accounts, &mut tx).await?;

        tx.commit().await?;

        Ok(rolled_back)
    }
}

impl Query for SqliteStorage {
    async fn get_block_by_hash(&self, hash: BlockHash) -> Result<Option<BlockRow>, QueryError> {
        let query = format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE hash = $1");

        let block = sqlx::query_as::<_, BlockRow>(&query)
            .bind(hash.as_ref())
            .fetch_optional(&*self.pool)
            .await?;

        Ok(block)
    }

    async fn get_block_by_number(&self, number: u64) -> Result<Option<BlockRow>, QueryError> {
        let query = format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE number = $1");

        let block = sqlx::query_as::<_, BlockRow>(&query)
            .bind(number as i64)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(block)
    }

    async fn get_parcels_by_block_hash(
        &self,
        block_hash: BlockHash,
    ) -> Result<Vec<ParcelRow>, QueryError> {
        let query = format!(
            "SELECT {PARCEL_COLUMNS} FROM parcels WHERE block_hash = $1 ORDER BY parcel_index"
        );

        let parcels = sqlx::query_as::<_, ParcelRow>(&query)
            .bind(block_hash.as_ref())
            .fetch_all(&*self.pool)
            .await?;

        Ok(parcels)
    }

    async fn get_transactions_by_block_hash(
        &self,
        block_hash: BlockHash,
    ) -> Result<Vec<TransactionRow>, QueryError> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE block_hash = $1 \
             ORDER BY parcel_index"
        );

        let transactions = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(block_hash.as_ref())
            .fetch_all(&*self.pool)
            .await?;

        Ok(transactions)
    }

    async fn get_account(&self, address: &Address) -> Result<Option<AccountRow>, QueryError> {
        let query = indoc! {"
            SELECT address, balance, seq, block_number
            FROM accounts
            WHERE address = $1
        "};

        let account = sqlx::query_as::<_, AccountRow>(query)
            .bind(address)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(account)
    }

    async fn get_asset_mint_outputs(
        &self,
        asset_type: AssetType,
    ) -> Result<Vec<AssetMintOutputRow>, QueryError> {
        let query = indoc! {"
            SELECT
                transaction_hash,
                lock_script_hash,
                parameters,
                supply,
                approver,
                administrator,
                allowed_script_hashes,
                recipient,
                asset_type
            FROM asset_mint_outputs
            WHERE asset_type = $1
            ORDER BY id
        "};

        let outputs = sqlx::query_as::<_, AssetMintOutputRow>(query)
            .bind(asset_type.as_ref())
            .fetch_all(&*self.pool)
            .await?;

        Ok(outputs)
    }

    async fn get_asset_scheme(
        &self,
        asset_type: AssetType,
    ) -> Result<Option<AssetSchemeRow>, QueryError> {
        let query = indoc! {"
            SELECT
                asset_type,
                transaction_hash,
                network_id,
                shard_id,
                metadata,
                approver,
                administrator,
                allowed_script_hashes,
                supply
            FROM asset_schemes
            WHERE asset_type = $1
        "};

        let scheme = sqlx::query_as::<_, AssetSchemeRow>(query)
            .bind(asset_type.as_ref())
            .fetch_optional(&*self.pool)
            .await?;

        Ok(scheme)
    }

    async fn get_logged_addresses(&self, number: u64) -> Result<Vec<Address>, QueryError> {
        let query = indoc! {"
            SELECT address
            FROM address_logs
            WHERE block_number = $1
            ORDER BY address
        "};

        let addresses = sqlx::query_as::<_, (Address,)>(query)
            .bind(number as i64)
            .fetch_all(&*self.pool)
            .await?
            .into_iter()
            .map(|(address,)| address)
            .collect();

        Ok(addresses)
    }

    async fn get_parcel(&self, _hash: ParcelHash) -> Result<Option<ParcelRow>, QueryError> {
        Err(QueryError::NotImplemented("parcel by hash"))
    }

    async fn get_pending_parcels(&self) -> Result<Vec<ParcelRow>, QueryError> {
        Err(QueryError::NotImplemented("pending parcels"))
    }
}

async fn save_block(rows: &BlockRows, tx: &mut Tx) -> Result<(), SaveBlockError> {
    let BlockRows {
        block,
        parcels,
        actions,
        transactions,
        asset_mint_outputs,
        asset_schemes,
        address_logs,
    } = rows;

    // Replace a stale block at the same number together with all its dependent rows.
    let query = indoc! {"
        DELETE FROM blocks
        WHERE number = $1 AND hash <> $2
    "};
    sqlx::query(query)
        .bind(block.number)
        .bind(block.hash.as_ref())
        .execute(&mut **tx)
        .await?;

    let query = format!("INSERT INTO blocks ({BLOCK_COLUMNS})");
    QueryBuilder::new(query)
        .push_values(iter::once(block), |mut q, block| {
            q.push_bind(block.hash.as_ref())
                .push_bind(block.parent_hash.as_ref())
                .push_bind(block.number)
                .push_bind(&block.author)
                .push_bind(block.timestamp)
                .push_bind(Json(&block.extra_data))
                .push_bind(block.parcels_root.as_ref())
                .push_bind(block.state_root.as_ref())
                .push_bind(block.invoices_root.as_ref())
                .push_bind(&block.score)
                .push_bind(Json(&block.seal))
                .push_bind(&block.mining_reward);
        })
        .build()
        .execute(&mut **tx)
        .await
        .map_err(|error| {
            if error.is_unique_violation() {
                SaveBlockError::AlreadyExists(block.hash)
            } else {
                error.into()
            }
        })?;

    save_parcels(parcels, tx).await?;
    save_actions(actions, tx).await?;
    save_transactions(transactions, tx).await?;
    save_asset_schemes(asset_schemes, tx).await?;
    save_asset_mint_outputs(asset_mint_outputs, tx).await?;
    save_address_logs(address_logs, tx).await?;

    Ok(())
}

async fn save_parcels(parcels: &[ParcelRow], tx: &mut Tx) -> Result<(), sqlx::Error> {
    if parcels.is_empty() {
        return Ok(());
    }

    let query = format!("INSERT INTO parcels ({PARCEL_COLUMNS})");
    QueryBuilder::new(query)
        .push_values(parcels.iter(), |mut q, parcel| {
            q.push_bind(parcel.hash.as_ref())
                .push_bind(parcel.block_hash.as_ref())
                .push_bind(parcel.block_number)
                .push_bind(parcel.parcel_index)
                .push_bind(parcel.seq)
                .push_bind(&parcel.fee)
                .push_bind(&parcel.network_id)
                .push_bind(&parcel.signer)
                .push_bind(&parcel.sig);
        })
        .build()
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn save_actions(actions: &[ActionRow], tx: &mut Tx) -> Result<(), sqlx::Error> {
    if actions.is_empty() {
        return Ok(());
    }

    let query = indoc! {"
        INSERT INTO actions (
            parcel_hash,
            variant,
            attributes
        )
    "};

    QueryBuilder::new(query)
        .push_values(actions.iter(), |mut q, action| {
            q.push_bind(action.parcel_hash.as_ref())
                .push_bind(action.variant)
                .push_bind(Json(&action.attributes));
        })
        .build()
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn save_transactions(
    transactions: &[TransactionRow],
    tx: &mut Tx,
) -> Result<(), sqlx::Error> {
    if transactions.is_empty() {
        return Ok(());
    }

    let query = format!("INSERT INTO transactions ({TRANSACTION_COLUMNS})");
    QueryBuilder::new(query)
        .push_values(transactions.iter(), |mut q, transaction| {
            q.push_bind(transaction.hash.as_ref())
                .push_bind(transaction.parcel_hash.as_ref())
                .push_bind(transaction.block_hash.as_ref())
                .push_bind(transaction.block_number)
                .push_bind(transaction.parcel_index)
                .push_bind(transaction.variant)
                .push_bind(&transaction.network_id)
                .push_bind(Json(&transaction.attributes));
        })
        .build()
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn save_asset_schemes(schemes: &[AssetSchemeRow], tx: &mut Tx) -> Result<(), sqlx::Error> {
    if schemes.is_empty() {
        return Ok(());
    }

    let query = indoc! {"
        INSERT INTO asset_schemes (
            asset_type,
            transaction_hash,
            network_id,
            shard_id,
            metadata,
            approver,
            administrator,
            allowed_script_hashes,
            supply
        )
    "};

    QueryBuilder::new(query)
        .push_values(schemes.iter(), |mut q, scheme| {
            q.push_bind(scheme.asset_type.as_ref())
                .push_bind(scheme.transaction_hash.as_ref())
                .push_bind(&scheme.network_id)
                .push_bind(scheme.shard_id)
                .push_bind(&scheme.metadata)
                .push_bind(&scheme.approver)
                .push_bind(&scheme.administrator)
                .push_bind(Json(&scheme.allowed_script_hashes))
                .push_bind(&scheme.supply);
        })
        .build()
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn save_asset_mint_outputs(
    outputs: &[AssetMintOutputRow],
    tx: &mut Tx,
) -> Result<(), sqlx::Error> {
    if outputs.is_empty() {
        return Ok(());
    }

    let query = indoc! {"
        INSERT INTO asset_mint_outputs (
            transaction_hash,
            lock_script_hash,
            parameters,
            supply,
            approver,
            administrator,
            allowed_script_hashes,
            recipient,
            asset_type
        )
    "};

    QueryBuilder::new(query)
        .push_values(outputs.iter(), |mut q, output| {
            q.push_bind(output.transaction_hash.as_ref())
                .push_bind(output.lock_script_hash.as_ref())
                .push_bind(Json(&output.parameters))
                .push_bind(&output.supply)
                .push_bind(&output.approver)
                .push_bind(&output.administrator)
                .push_bind(Json(&output.allowed_script_hashes))
                .push_bind(&output.recipient)
                .push_bind(output.asset_type.as_ref());
        })
        .build()
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn save_address_logs(
    address_logs: &[AddressLogRow],
    tx: &mut Tx,
) -> Result<(), sqlx::Error> {
    if address_logs.is_empty() {
        return Ok(());
    }

    let query = indoc! {"
        INSERT INTO address_logs (
            address,
            block_number,
            block_hash
        )
    "};

    QueryBuilder::new(query)
        .push_values(address_logs.iter(), |mut q, log| {
            q.push_bind(&log.address)
                .push_bind(log.block_number)
                .push_bind(log.block_hash.as_ref());
        })
        .build()
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn save_accounts(accounts: &[AccountRow], tx: &mut Tx) -> Result<(), sqlx::Error> {
    if accounts.is_empty() {
        return Ok(());
    }

    let query = indoc! {"
        INSERT INTO accounts (
            address,
            balance,
            seq,
            block_number
        )
    "};

    QueryBuilder::new(query)
        .push_values(accounts.iter(), |mut q, account| {
            q.push_bind(&account.address)
                .push_bind(&account.balance)
                .push_bind(account.seq)
                .push_bind(account.block_number);
        })
        .push(
            " ON CONFLICT (address) DO UPDATE SET \
             balance = excluded.balance, \
             seq = excluded.seq, \
             block_number = excluded.block_number",
        )
        .build()
        .execute(&mut **tx)
        .await?;

    Ok(())
}
