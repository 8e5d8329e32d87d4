//! Command definitions
//!
//! Commands represent intentions to change the system state. Monetary
//! amounts travel as strings and are parsed into validated `Amount`s by the
//! handlers.

use uuid::Uuid;

use crate::domain::{Payment, Submission};

/// Command to create a new campaign (admin)
#[derive(Debug, Clone)]
pub struct CreateCampaignCommand {
    pub brand: String,
    pub name: String,
    pub budget_per_creator: String,
}

impl CreateCampaignCommand {
    pub fn new(brand: String, name: String, budget_per_creator: String) -> Self {
        Self {
            brand,
            name,
            budget_per_creator,
        }
    }
}

/// Command to update an existing campaign (admin)
#[derive(Debug, Clone, Default)]
pub struct UpdateCampaignCommand {
    pub brand: Option<String>,
    pub name: Option<String>,
    pub budget_per_creator: Option<String>,
    pub status: Option<String>,
}

impl UpdateCampaignCommand {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.name.is_none()
            && self.budget_per_creator.is_none()
            && self.status.is_none()
    }
}

/// Command to submit content against a campaign (creator)
#[derive(Debug, Clone)]
pub struct CreateSubmissionCommand {
    pub campaign_id: Uuid,
    pub content_url: String,
}

impl CreateSubmissionCommand {
    pub fn new(campaign_id: Uuid, content_url: String) -> Self {
        Self {
            campaign_id,
            content_url,
        }
    }
}

/// Command to review a pending submission (admin)
#[derive(Debug, Clone)]
pub struct ReviewSubmissionCommand {
    pub submission_id: Uuid,
    /// Raw decision string; parsed as a [`crate::domain::ReviewDecision`]
    pub decision: String,
    pub feedback: Option<String>,
}

impl ReviewSubmissionCommand {
    pub fn new(submission_id: Uuid, decision: String) -> Self {
        Self {
            submission_id,
            decision,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: String) -> Self {
        self.feedback = Some(feedback);
        self
    }
}

/// Outcome of a review: the terminal submission plus the payment that an
/// approval issued, if any.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub submission: Submission,
    pub payment: Option<Payment>,
}

/// Command to request a withdrawal to a mobile-money account (creator)
#[derive(Debug, Clone)]
pub struct RequestWithdrawalCommand {
    pub amount: String,
    pub mobile_provider: String,
    pub mobile_number: String,
}

impl RequestWithdrawalCommand {
    pub fn new(amount: String, mobile_provider: String, mobile_number: String) -> Self {
        Self {
            amount,
            mobile_provider,
            mobile_number,
        }
    }
}

/// Command to settle a pending withdrawal (admin)
#[derive(Debug, Clone)]
pub struct ProcessWithdrawalCommand {
    pub withdrawal_id: Uuid,
    /// Raw decision string; parsed as a [`crate::domain::WithdrawalDecision`]
    pub decision: String,
    pub transaction_id: Option<String>,
}

impl ProcessWithdrawalCommand {
    pub fn new(withdrawal_id: Uuid, decision: String) -> Self {
        Self {
            withdrawal_id,
            decision,
            transaction_id: None,
        }
    }

    pub fn with_transaction_id(mut self, transaction_id: String) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }
}
