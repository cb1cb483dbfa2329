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

#[cfg(any(feature = "cloud", feature = "standalone"))]
#[tokio::main]
async fn main() {
    use indexer_common::telemetry;
    use log::error;
    use std::panic;

    // Initialize logging.
    telemetry::init_logging();

    // Replace the default panic hook with one that uses structured logging at ERROR level.
    panic::set_hook(Box::new(|panic| error!(panic:%; "process panicked")));

    // Run and log any error.
    if let Err(error) = run().await {
        let backtrace = error.backtrace();
        let error = format!("{error:#}");
        error!(error, backtrace:%; "process exited with ERROR")
    }
}

#[cfg(any(feature = "cloud", feature = "standalone"))]
async fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use chain_indexer::{
        application,
        config::Config,
        infra::{self, node::JsonRpcNode},
    };
    use indexer_common::{config::ConfigExt, telemetry};
    use log::{error, info};

    // Load configuration.
    let Config {
        run_migrations,
        application_config,
        infra_config,
        telemetry_config:
            telemetry::Config {
                tracing_config,
                metrics_config,
            },
    } = Config::load().context("load configuration")?;

    // Initialize tracing and metrics.
    telemetry::init_tracing(tracing_config);
    telemetry::init_metrics(metrics_config);

    info!(
        run_migrations,
        application_config:?,
        infra_config:?;
        "starting"
    );

    let infra::Config {
        storage_config,
        node_config,
    } = infra_config;

    let node = JsonRpcNode::new(node_config).context("create JsonRpcNode")?;

    let storage = storage(storage_config, run_migrations).await?;

    application::run(application_config, node, storage)
        .await
        .context("run application")?;

    error!("chain-indexer terminated");

    Ok(())
}

#[cfg(feature = "cloud")]
async fn storage(
    storage_config: indexer_common::infra::pool::postgres::Config,
    run_migrations: bool,
) -> anyhow::Result<chain_indexer::infra::storage::postgres::PostgresStorage> {
    use anyhow::Context;
    use chain_indexer::infra::storage::postgres::PostgresStorage;
    use indexer_common::infra::{migrations, pool::postgres::PostgresPool};

    let pool = PostgresPool::new(storage_config)
        .await
        .context("create DB pool for Postgres")?;
    if run_migrations {
        migrations::postgres::run(&pool)
            .await
            .context("run Postgres migrations")?;
    }

    Ok(PostgresStorage::new(pool))
}

#[cfg(all(feature = "standalone", not(feature = "cloud")))]
async fn storage(
    storage_config: indexer_common::infra::pool::sqlite::Config,
    run_migrations: bool,
) -> anyhow::Result<chain_indexer::infra::storage::sqlite::SqliteStorage> {
    use anyhow::Context;
    use chain_indexer::infra::storage::sqlite::SqliteStorage;
    use indexer_common::infra::{migrations, pool::sqlite::SqlitePool};

    let pool = SqlitePool::new(storage_config)
        .await
        .context("create DB pool for Sqlite")?;
    if run_migrations {
        migrations::sqlite::run(&pool)
            .await
            .context("run Sqlite migrations")?;
    }

    Ok(SqliteStorage::new(pool))
}

#[cfg(not(any(feature = "cloud", feature = "standalone")))]
fn main() {
    unimplemented!()
}
