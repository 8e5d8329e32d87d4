//! Domain module
//!
//! Core domain types and business logic.

pub mod amount;
pub mod context;
pub mod error;
pub mod mobile;
pub mod model;

pub use amount::{Amount, AmountError};
pub use context::{Principal, Role};
pub use error::DomainError;
pub use mobile::{MobileNumber, MobileProvider};
pub use model::{
    Campaign, CampaignRow, CampaignStatus, Payment, PaymentRow, PaymentStatus, ReviewDecision,
    Submission, SubmissionRow, SubmissionStatus, Withdrawal, WithdrawalDecision, WithdrawalRow,
    WithdrawalStatus,
};
