pub mod error;
pub mod notifier;
pub mod transport;

pub use error::{NotifyError, TransportError};
pub use notifier::Notifier;
pub use transport::{HttpMailTransport, MailMessage, MailTransport};
