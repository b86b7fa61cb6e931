use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("mail transport request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("mail transport responded with {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to dispatch mail to {recipient}: {source}")]
    MailDispatch {
        recipient: String,
        #[source]
        source: TransportError,
    },
}
