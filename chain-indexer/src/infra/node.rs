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

use crate::domain::{Address, Block, Node};
use alloy_primitives::U256;
use fastrace::trace;
use indexer_common::domain::BlockHash;
use jsonrpsee::{
    core::{ClientError, client::ClientT, params::ArrayParams},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use thiserror::Error;

/// A [Node] implementation based on the JSON-RPC interface of a CodeChain node.
#[derive(Clone)]
pub struct JsonRpcNode {
    client: HttpClient,
}

impl JsonRpcNode {
    /// Create a new [JsonRpcNode] with the given [Config].
    pub fn new(config: Config) -> Result<Self, Error> {
        let Config {
            url,
            request_timeout,
        } = config;

        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(&url)
            .map_err(|error| Error(url, error))?;

        Ok(Self { client })
    }

    async fn request<T>(
        &self,
        method: &'static str,
        params: ArrayParams,
    ) -> Result<T, JsonRpcNodeError>
    where
        T: DeserializeOwned,
    {
        self.client
            .request(method, params)
            .await
            .map_err(|source| JsonRpcNodeError { method, source })
    }
}

impl Node for JsonRpcNode {
    type Error = JsonRpcNodeError;

    #[trace]
    async fn best_block_number(&self) -> Result<u64, Self::Error> {
        self.request("chain_getBestBlockNumber", rpc_params![]).await
    }

    #[trace(properties = { "number": "{number}" })]
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>, Self::Error> {
        self.request("chain_getBlockByNumber", rpc_params![number]).await
    }

    #[trace(properties = { "number": "{number}" })]
    async fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, Self::Error> {
        self.request("chain_getBlockHash", rpc_params![number]).await
    }

    #[trace]
    async fn balance(&self, address: &Address, number: u64) -> Result<U256, Self::Error> {
        self.request("chain_getBalance", rpc_params![address, number]).await
    }

    #[trace]
    async fn seq(&self, address: &Address, number: u64) -> Result<u64, Self::Error> {
        self.request("chain_getSeq", rpc_params![address, number]).await
    }

    #[trace]
    async fn genesis_accounts(&self) -> Result<Vec<Address>, Self::Error> {
        self.request("chain_getGenesisAccounts", rpc_params![]).await
    }

    #[trace(properties = { "number": "{number}" })]
    async fn mining_reward(&self, number: u64) -> Result<U256, Self::Error> {
        self.request("chain_getMiningReward", rpc_params![number]).await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub url: String,

    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Error possibly returned by [JsonRpcNode::new].
#[derive(Debug, Error)]
#[error("cannot create JSON-RPC client for {0}")]
pub struct Error(String, #[source] ClientError);

/// Error possibly returned by each [Node] call of [JsonRpcNode].
#[derive(Debug, Error)]
#[error("cannot call {method}")]
pub struct JsonRpcNodeError {
    method: &'static str,
    #[source]
    source: ClientError,
}
