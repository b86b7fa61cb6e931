use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SiteConfig;
use crate::storage::{Collection, ConsumeOutcome, QuotaRepository};

use super::error::GateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub default_allowance: u32,
    pub privileged_allowance: u32,
}

impl From<&SiteConfig> for QuotaPolicy {
    fn from(config: &SiteConfig) -> Self {
        Self {
            default_allowance: config.default_allowance,
            privileged_allowance: config.privileged_allowance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub message: String,
}

impl QuotaDecision {
    fn granted(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            message: format!("Remaining chances: {remaining}"),
        }
    }
}

#[derive(Clone)]
pub struct QuotaGate {
    repository: Arc<dyn QuotaRepository>,
    collection: Collection,
    policy: QuotaPolicy,
}

impl QuotaGate {
    pub fn new(
        repository: Arc<dyn QuotaRepository>,
        collection: Collection,
        policy: QuotaPolicy,
    ) -> Self {
        Self {
            repository,
            collection,
            policy,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn status(&self) -> Result<(), GateError> {
        self.repository.connect()?;
        Ok(())
    }

    /// A first-time identity gets a fresh record and is not charged. Privileged
    /// identities are never charged and report `privileged_allowance`.
    pub fn check_and_consume(&self, identity: Option<&str>) -> Result<QuotaDecision, GateError> {
        let identity = identity
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(GateError::MissingIdentity)?;

        let outcome =
            self.repository
                .consume(self.collection, identity, self.policy.default_allowance)?;

        match outcome {
            ConsumeOutcome::Created(record) => {
                info!(
                    collection = %self.collection,
                    identity,
                    remaining = record.remaining,
                    "created quota record"
                );
                Ok(QuotaDecision::granted(record.remaining))
            }
            ConsumeOutcome::Privileged(_) => {
                debug!(collection = %self.collection, identity, "privileged identity bypassed quota");
                Ok(QuotaDecision {
                    allowed: true,
                    remaining: self.policy.privileged_allowance,
                    message: "Admin access granted".to_string(),
                })
            }
            ConsumeOutcome::Consumed(record) => {
                debug!(
                    collection = %self.collection,
                    identity,
                    remaining = record.remaining,
                    "consumed quota unit"
                );
                Ok(QuotaDecision::granted(record.remaining))
            }
            ConsumeOutcome::Exhausted(_) => {
                warn!(collection = %self.collection, identity, "quota exhausted");
                Err(GateError::QuotaExhausted {
                    collection: self.collection,
                    identity: identity.to_string(),
                })
            }
        }
    }

    pub fn grant_privileges<I, S>(&self, identities: I) -> Result<usize, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut granted = 0usize;
        for identity in identities {
            self.repository.set_privileged(
                self.collection,
                identity.as_ref(),
                true,
                self.policy.default_allowance,
            )?;
            granted += 1;
        }
        Ok(granted)
    }
}
