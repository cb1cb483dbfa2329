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

use alloy_primitives::{U256, ruint::ParseError};
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    encode::IsNull,
    error::BoxDynError,
};
use std::str::FromStr;

/// An arbitrary-precision unsigned integer, e.g. a balance, a supply or a score, represented as
/// its canonical base-10 string. Never goes through floating point. Stored as text and validated
/// when decoded.
#[derive(Debug, Display, Default, Clone, PartialEq, Eq, Hash, AsRef, Serialize, Deserialize)]
#[as_ref(str)]
#[serde(try_from = "String", into = "String")]
pub struct Decimal(String);

impl Decimal {
    /// The numeric value of this [Decimal].
    pub fn to_u256(&self) -> U256 {
        // Construction guarantees a valid base-10 representation.
        U256::from_str_radix(&self.0, 10).unwrap_or_default()
    }
}

impl From<U256> for Decimal {
    fn from(value: U256) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<Decimal> for String {
    fn from(decimal: Decimal) -> Self {
        decimal.0
    }
}

impl TryFrom<String> for Decimal {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Decimal {
    type Err = ParseError;

    /// Parse and normalize a base-10 string, e.g. `"007"` becomes `"7"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str_radix(s, 10).map(Self::from)
    }
}

impl<DB> Type<DB> for Decimal
where
    DB: Database,
    String: Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <String as Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <String as Type<DB>>::compatible(ty)
    }
}

impl<'r, DB> Decode<'r, DB> for Decimal
where
    DB: Database,
    String: Decode<'r, DB>,
{
    fn decode(value: DB::ValueRef<'r>) -> Result<Self, BoxDynError> {
        let decimal = <String as Decode<DB>>::decode(value)?.parse()?;
        Ok(decimal)
    }
}

impl<'q, DB> Encode<'q, DB> for Decimal
where
    DB: Database,
    String: Encode<'q, DB>,
{
    fn encode_by_ref(&self, buf: &mut DB::ArgumentBuffer<'q>) -> Result<IsNull, BoxDynError> {
        <String as Encode<DB>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::Decimal;
    use alloy_primitives::U256;

    #[test]
    fn test_decimal() {
        let decimal = Decimal::from(U256::MAX);
        assert_eq!(
            decimal.as_ref(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(decimal.to_u256(), U256::MAX);

        let decimal = "007".parse::<Decimal>();
        assert_eq!(decimal.unwrap().as_ref(), "7");

        assert!("1.5".parse::<Decimal>().is_err());
        assert!("-1".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_decimal_json() {
        let decimal = serde_json::from_str::<Decimal>("\"10000\"");
        assert_eq!(decimal.unwrap(), Decimal::from(10_000));

        let decimal = serde_json::from_str::<Decimal>("\"ten\"");
        assert!(decimal.is_err());
    }

    #[cfg(feature = "standalone")]
    #[tokio::test]
    async fn test_decimal_decode() -> anyhow::Result<()> {
        use crate::infra::pool::sqlite::{Config, SqlitePool};
        use anyhow::Context;

        let pool = SqlitePool::new(Config::default())
            .await
            .context("create pool")?;

        let decimal = sqlx::query_scalar::<_, Decimal>("SELECT '007'")
            .fetch_one(&*pool)
            .await
            .context("decode decimal")?;
        assert_eq!(decimal, Decimal::from(7));

        let decimal = sqlx::query_scalar::<_, Decimal>("SELECT 'ten'")
            .fetch_one(&*pool)
            .await;
        assert!(decimal.is_err());

        Ok(())
    }
}
