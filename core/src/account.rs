//! Account identifiers and the operator identity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A ledger account id in `shard.realm.num` form, e.g. `0.0.1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// Account number within the realm.
    pub num: u64,
}

impl AccountId {
    /// Create an account id from its three components.
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }
}

impl FromStr for AccountId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidAccount {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split('.');
        let (shard, realm, num) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c), None) => (a, b, c),
            _ => return Err(invalid("expected shard.realm.num")),
        };

        Ok(Self {
            shard: shard.parse().map_err(|_| invalid("shard is not a number"))?,
            realm: realm.parse().map_err(|_| invalid("realm is not a number"))?,
            num: num.parse().map_err(|_| invalid("num is not a number"))?,
        })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl TryFrom<String> for AccountId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

/// The identity every transfer is debited from.
///
/// Built once from config before the pool is spawned and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct Operator {
    /// Operator account id.
    pub account: AccountId,
    /// Operator key material, passed through to the ledger client.
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_account_id() {
        let id: AccountId = "0.0.1001".parse().unwrap();
        assert_eq!(id, AccountId::new(0, 0, 1001));
    }

    #[test]
    fn display_round_trips() {
        let id = AccountId::new(1, 2, 3);
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["", "0.0", "0.0.0.0", "a.b.c", "0..1"] {
            assert!(bad.parse::<AccountId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn serde_uses_dotted_string_form() {
        let id = AccountId::new(0, 0, 42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0.0.42\"");

        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
