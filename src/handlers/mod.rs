//! Command Handlers module
//!
//! Command handlers that orchestrate business operations. Each handler
//! validates its command, runs the guarded writes against the database, and
//! returns the affected entities.

mod campaign_handler;
mod commands;
mod review_handler;
mod submission_handler;
mod withdrawal_handler;

#[cfg(test)]
mod tests;

pub use campaign_handler::{CreateCampaignHandler, UpdateCampaignHandler};
pub use commands::*;
pub use review_handler::ReviewSubmissionHandler;
pub use submission_handler::CreateSubmissionHandler;
pub use withdrawal_handler::{ProcessWithdrawalHandler, RequestWithdrawalHandler};
