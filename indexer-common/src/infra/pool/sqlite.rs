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

use log::debug;
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::ops::Deref;
use thiserror::Error;

/// New type for `sqlx::SqlitePool`, allowing for some custom extensions.
///
/// To use as `&sqlx::SqlitePool` in `Query::execute`, use its `Deref` implementation: `&*pool` or
/// `pool.deref()`.
#[derive(Debug, Clone)]
pub struct SqlitePool(sqlx::SqlitePool);

impl SqlitePool {
    /// Try to create a new [SqlitePool] with the given config.
    ///
    /// SQLite only allows a single writer, hence the pool is limited to one connection, which also
    /// keeps an in-memory database alive and shared.
    pub async fn new(config: Config) -> Result<Self, Error> {
        let connect_options = config.try_into().map_err(Error::ConvertConfig)?;
        let inner = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;
        let pool = SqlitePool(inner);
        debug!(pool:?; "created SQLite pool");

        Ok(pool)
    }
}

impl Deref for SqlitePool {
    type Target = sqlx::SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error possibly returned by [SqlitePool::new].
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot convert config into SQLite connect options")]
    ConvertConfig(#[source] sqlx::Error),

    #[error("cannot create SQLite connection pool")]
    CreatePool(#[from] sqlx::Error),
}

/// Configuration for [SqlitePool].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub cnn_url: String,
}

impl TryFrom<Config> for SqliteConnectOptions {
    type Error = sqlx::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        // Cascading deletes of blocks rely on enforced foreign keys.
        let options = config
            .cnn_url
            .parse::<SqliteConnectOptions>()?
            .create_if_missing(true)
            .foreign_keys(true);
        Ok(options)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cnn_url: "sqlite::memory:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::infra::pool::sqlite::{Config, SqlitePool};
    use std::ops::Deref;

    #[tokio::test]
    async fn test_pool() {
        let pool = SqlitePool::new(Config::default()).await;
        assert!(pool.is_ok());
        let pool = pool.unwrap();

        let result = sqlx::query("CREATE TABLE test (id INTEGER PRIMARY KEY)")
            .execute(pool.deref())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys() {
        let pool = SqlitePool::new(Config::default())
            .await
            .expect("pool can be created");

        let (foreign_keys,) = sqlx::query_as::<_, (i64,)>("PRAGMA foreign_keys")
            .fetch_one(&*pool)
            .await
            .expect("pragma can be queried");
        assert_eq!(foreign_keys, 1);
    }
}
