pub mod error;
pub mod quota;

pub use error::GateError;
pub use quota::{QuotaDecision, QuotaGate, QuotaPolicy};
