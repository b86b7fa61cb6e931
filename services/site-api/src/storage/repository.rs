use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Customers,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Customers, Collection::Users];

    pub fn table(self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Users => "users",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Collection::Customers => "Customer",
            Collection::Users => "User",
        }
    }

    pub fn exhaustion_message(self) -> &'static str {
        match self {
            Collection::Customers => "Limit exceeded. Access denied.",
            Collection::Users => "Limit exceeded. Access denied",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub identity: String,
    pub is_privileged: bool,
    pub remaining: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuotaRecord {
    pub fn new(identity: &str, allowance: u32) -> Self {
        let now = Utc::now();
        Self {
            identity: identity.to_string(),
            is_privileged: false,
            remaining: allowance,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    // created with the default allowance, nothing deducted
    Created(QuotaRecord),
    Privileged(QuotaRecord),
    Consumed(QuotaRecord),
    Exhausted(QuotaRecord),
}

impl ConsumeOutcome {
    pub fn record(&self) -> &QuotaRecord {
        match self {
            ConsumeOutcome::Created(record)
            | ConsumeOutcome::Privileged(record)
            | ConsumeOutcome::Consumed(record)
            | ConsumeOutcome::Exhausted(record) => record,
        }
    }
}

/// Implementations must make `consume` atomic per identity: find-or-create and
/// the conditional decrement happen as one unit.
pub trait QuotaRepository: Send + Sync {
    fn connect(&self) -> Result<(), StorageError>;

    fn find(
        &self,
        collection: Collection,
        identity: &str,
    ) -> Result<Option<QuotaRecord>, StorageError>;

    fn consume(
        &self,
        collection: Collection,
        identity: &str,
        default_allowance: u32,
    ) -> Result<ConsumeOutcome, StorageError>;

    fn set_privileged(
        &self,
        collection: Collection,
        identity: &str,
        privileged: bool,
        default_allowance: u32,
    ) -> Result<QuotaRecord, StorageError>;
}
