use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;

pub mod extract;
pub mod handlers;
pub mod identity;
pub mod router;
pub mod types;

pub use extract::ApiJson;
pub use handlers::*;
pub use identity::client_identity;
pub use router::create_router;
pub use types::*;

use crate::config::SiteConfig;
use crate::gate::{GateError, QuotaGate, QuotaPolicy};
use crate::notify::{MailTransport, Notifier};
use crate::predictor::InferenceClient;
use crate::storage::{Collection, QuotaRepository};

/// A quota gate plus the status code its route answers with on exhaustion.
#[derive(Clone)]
pub struct GateEndpoint {
    pub gate: QuotaGate,
    pub exhausted_status: StatusCode,
}

pub struct ApiState {
    pub customers: GateEndpoint,
    pub users: GateEndpoint,
    pub notifier: Notifier,
    pub inference: InferenceClient,
    pub config: Arc<SiteConfig>,
}

impl ApiState {
    pub fn new(
        config: SiteConfig,
        repository: Arc<dyn QuotaRepository>,
        mail_transport: Arc<dyn MailTransport>,
    ) -> Result<Self> {
        let policy = QuotaPolicy::from(&config);
        let customers = GateEndpoint {
            gate: QuotaGate::new(Arc::clone(&repository), Collection::Customers, policy),
            exhausted_status: config.customer_exhausted_status,
        };
        let users = GateEndpoint {
            gate: QuotaGate::new(repository, Collection::Users, policy),
            exhausted_status: config.user_exhausted_status,
        };
        let notifier = Notifier::new(mail_transport, &config);
        let inference = InferenceClient::new(
            &config.inference_url,
            Duration::from_secs(config.outbound_timeout_secs),
        )?;

        Ok(Self {
            customers,
            users,
            notifier,
            inference,
            config: Arc::new(config),
        })
    }

    pub fn seed_privileged_identities(&self) -> Result<usize, GateError> {
        let identities = &self.config.privileged_identities;
        let mut seeded = 0usize;
        for endpoint in [&self.customers, &self.users] {
            seeded += endpoint.gate.grant_privileges(identities)?;
        }
        Ok(seeded)
    }
}
