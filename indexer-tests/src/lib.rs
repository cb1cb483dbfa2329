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

//! Setup shared by the integration tests: migrated storage for each enabled backend.

#[cfg(feature = "cloud")]
use chain_indexer::infra::storage::postgres::PostgresStorage;
#[cfg(feature = "standalone")]
use chain_indexer::infra::storage::sqlite::SqliteStorage;
#[cfg(feature = "cloud")]
use testcontainers::ContainerAsync;
#[cfg(feature = "cloud")]
use testcontainers_modules::postgres::Postgres;

/// Start a Postgres container and create a migrated [PostgresStorage] for it. The container is
/// stopped when the returned handle is dropped.
#[cfg(feature = "cloud")]
pub async fn postgres_storage() -> anyhow::Result<(PostgresStorage, ContainerAsync<Postgres>)> {
    use anyhow::Context;
    use indexer_common::infra::{migrations, pool};
    use sqlx::postgres::PgSslMode;
    use std::time::Duration;
    use testcontainers::{ImageExt, runners::AsyncRunner};

    let postgres_container = Postgres::default()
        .with_db_name("indexer")
        .with_user("indexer")
        .with_password("indexer")
        .with_tag("17.1-alpine")
        .start()
        .await
        .context("start Postgres container")?;
    let postgres_port = postgres_container
        .get_host_port_ipv4(5432)
        .await
        .context("get Postgres port")?;

    let config = pool::postgres::Config {
        host: "localhost".to_string(),
        port: postgres_port,
        dbname: "indexer".to_string(),
        user: "indexer".to_string(),
        password: "indexer".into(),
        sslmode: PgSslMode::Prefer,
        max_connections: 10,
        acquire_timeout: Duration::from_secs(30),
        idle_timeout: Duration::from_secs(60),
        max_lifetime: Duration::from_secs(300),
    };
    let pool = pool::postgres::PostgresPool::new(config)
        .await
        .context("create PostgresPool")?;

    migrations::postgres::run(&pool)
        .await
        .context("run Postgres migrations")?;

    Ok((PostgresStorage::new(pool), postgres_container))
}

/// Create a migrated [SqliteStorage] for a fresh in-memory database.
#[cfg(feature = "standalone")]
pub async fn sqlite_storage() -> anyhow::Result<SqliteStorage> {
    use anyhow::Context;
    use indexer_common::infra::{migrations, pool};

    let pool = pool::sqlite::SqlitePool::new(pool::sqlite::Config::default())
        .await
        .context("create SqlitePool")?;

    migrations::sqlite::run(&pool)
        .await
        .context("run Sqlite migrations")?;

    Ok(SqliteStorage::new(pool))
}
