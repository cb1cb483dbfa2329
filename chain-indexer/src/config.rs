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

use crate::{application, infra};

/// Configuration of the Chain Indexer, loaded via [ConfigExt](indexer_common::config::ConfigExt).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Whether to run the embedded storage migrations before syncing.
    pub run_migrations: bool,

    /// Sync loop: poll interval, cycle timeout and account refresh concurrency.
    #[serde(rename = "application")]
    pub application_config: application::Config,

    /// Storage and node connections.
    #[serde(rename = "infra")]
    pub infra_config: infra::Config,

    #[serde(rename = "telemetry")]
    pub telemetry_config: indexer_common::telemetry::Config,
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use anyhow::Context;
    use figment::{
        Figment,
        providers::{Format, Serialized, Yaml},
    };
    use std::time::Duration;

    #[test]
    fn test_config_file() -> anyhow::Result<()> {
        // Secrets and the SQLite URL are not part of the file.
        let config = Figment::new()
            .merge(Yaml::string(include_str!("../config.yaml")))
            .merge(Serialized::default("infra.storage.password", "indexer"))
            .merge(Serialized::default("infra.storage.cnn_url", "sqlite::memory:"))
            .extract::<Config>()
            .context("extract config")?;

        assert!(config.run_migrations);
        assert_eq!(
            config.application_config.poll_interval,
            Duration::from_secs(1)
        );
        assert_eq!(
            config.application_config.sync_timeout,
            Duration::from_secs(60)
        );
        assert_eq!(config.application_config.account_refresh_concurrency.get(), 16);
        assert_eq!(config.infra_config.node_config.url, "http://localhost:8080");
        assert_eq!(
            config.infra_config.node_config.request_timeout,
            Duration::from_secs(10)
        );
        assert!(!config.telemetry_config.tracing_config.enabled);

        Ok(())
    }
}
