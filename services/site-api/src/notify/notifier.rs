use std::sync::Arc;

use tracing::{error, info};

use crate::config::SiteConfig;

use super::error::NotifyError;
use super::transport::{MailMessage, MailTransport};

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    from: String,
    admin_address: String,
    public_base_url: String,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>, config: &SiteConfig) -> Self {
        Self {
            transport,
            from: config.mail.from.clone(),
            admin_address: config.mail.admin_address.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    pub fn admin_address(&self) -> &str {
        &self.admin_address
    }

    // first failure fails the call
    pub async fn notify(&self, name: &str, email: &str, message: &str) -> Result<(), NotifyError> {
        let to_admin = self.admin_message(name, email, message);
        let to_submitter = self.acknowledgement(name, email);

        let result = tokio::try_join!(self.dispatch(&to_admin), self.dispatch(&to_submitter));

        match result {
            Ok(_) => {
                info!(submitter = email, "contact notification sent");
                Ok(())
            }
            Err(err) => {
                error!(submitter = email, error = %err, "failed to send contact notification");
                Err(err)
            }
        }
    }

    async fn dispatch(&self, message: &MailMessage) -> Result<(), NotifyError> {
        self.transport
            .send(message)
            .await
            .map_err(|source| NotifyError::MailDispatch {
                recipient: message.to.clone(),
                source,
            })
    }

    fn admin_message(&self, name: &str, email: &str, message: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: self.admin_address.clone(),
            subject: format!("New message from {name}"),
            text: format!("Name: {name}\nEmail: {email}\n\n{message}"),
        }
    }

    fn acknowledgement(&self, name: &str, email: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: "Thanks for reaching out to CropSense".to_string(),
            text: format!(
                "Hi {name},\n\nWe received your message and will get back to you soon.\n\n{}",
                self.public_base_url
            ),
        }
    }
}
