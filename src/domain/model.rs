//! Domain entities and state machines
//!
//! Campaigns, submissions, payments and withdrawals, plus their status
//! enums. Each status is a one-way state machine: `pending` moves to exactly
//! one terminal state and never back. Statuses are stored as lowercase TEXT;
//! a row whose status does not parse is treated as corrupted storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{DomainError, MobileNumber, MobileProvider};

// =========================================================================
// Statuses
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalStatus {
    Pending,
    Processed,
    Rejected,
}

macro_rules! status_str_impls {
    ($ty:ident, $entity:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(DomainError::UnknownStatus {
                        entity: $entity,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

status_str_impls!(CampaignStatus, "campaign", {
    Active => "active",
    Closed => "closed",
});

status_str_impls!(SubmissionStatus, "submission", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

status_str_impls!(PaymentStatus, "payment", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

status_str_impls!(WithdrawalStatus, "withdrawal", {
    Pending => "pending",
    Processed => "processed",
    Rejected => "rejected",
});

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl PaymentStatus {
    /// The only legal transitions are pending -> completed and
    /// pending -> failed, driven by the external settlement collaborator.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl WithdrawalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

// =========================================================================
// Decisions
// =========================================================================

/// An administrator's verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn as_submission_status(&self) -> SubmissionStatus {
        match self {
            Self::Approved => SubmissionStatus::Approved,
            Self::Rejected => SubmissionStatus::Rejected,
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(DomainError::UnknownStatus {
                entity: "review decision",
                value: other.to_string(),
            }),
        }
    }
}

/// An administrator's verdict on a pending withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalDecision {
    Processed,
    Rejected,
}

impl WithdrawalDecision {
    pub fn as_withdrawal_status(&self) -> WithdrawalStatus {
        match self {
            Self::Processed => WithdrawalStatus::Processed,
            Self::Rejected => WithdrawalStatus::Rejected,
        }
    }
}

impl FromStr for WithdrawalDecision {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Self::Processed),
            "rejected" => Ok(Self::Rejected),
            other => Err(DomainError::UnknownStatus {
                entity: "withdrawal decision",
                value: other.to_string(),
            }),
        }
    }
}

// =========================================================================
// Entities
// =========================================================================

/// A sponsor-funded opportunity with a fixed per-creator payout.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: Uuid,
    pub brand: String,
    pub name: String,
    pub budget_per_creator: Decimal,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A creator's content entry tied to one campaign, subject to review.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub creator_id: Uuid,
    pub content_url: String,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub feedback: Option<String>,
}

/// Money owed to a creator for one approved submission.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub submission_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// A creator-initiated request to move ledger balance to a mobile-money
/// account.
#[derive(Debug, Clone)]
pub struct Withdrawal {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub amount: Decimal,
    pub mobile_provider: MobileProvider,
    pub mobile_number: MobileNumber,
    pub status: WithdrawalStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
}

// =========================================================================
// Row mapping
// =========================================================================

/// Column tuples as selected from the database, in canonical order.
pub type CampaignRow = (
    Uuid,
    String,
    String,
    Decimal,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

pub type SubmissionRow = (
    Uuid,
    Uuid,
    Uuid,
    String,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<String>,
);

pub type PaymentRow = (Uuid, Uuid, Uuid, Decimal, String, DateTime<Utc>);

pub type WithdrawalRow = (
    Uuid,
    Uuid,
    Decimal,
    String,
    String,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<String>,
);

impl Campaign {
    pub fn try_from_row(row: CampaignRow) -> Result<Self, DomainError> {
        let (id, brand, name, budget_per_creator, status, created_at, updated_at) = row;
        Ok(Self {
            id,
            brand,
            name,
            budget_per_creator,
            status: status.parse()?,
            created_at,
            updated_at,
        })
    }
}

impl Submission {
    pub fn try_from_row(row: SubmissionRow) -> Result<Self, DomainError> {
        let (id, campaign_id, creator_id, content_url, status, submitted_at, reviewed_at, feedback) =
            row;
        Ok(Self {
            id,
            campaign_id,
            creator_id,
            content_url,
            status: status.parse()?,
            submitted_at,
            reviewed_at,
            feedback,
        })
    }
}

impl Payment {
    pub fn try_from_row(row: PaymentRow) -> Result<Self, DomainError> {
        let (id, creator_id, submission_id, amount, status, created_at) = row;
        Ok(Self {
            id,
            creator_id,
            submission_id,
            amount,
            status: status.parse()?,
            created_at,
        })
    }
}

impl Withdrawal {
    pub fn try_from_row(row: WithdrawalRow) -> Result<Self, DomainError> {
        let (
            id,
            creator_id,
            amount,
            mobile_provider,
            mobile_number,
            status,
            requested_at,
            processed_at,
            transaction_id,
        ) = row;
        Ok(Self {
            id,
            creator_id,
            amount,
            mobile_provider: mobile_provider.parse()?,
            // Stored numbers were validated on the way in; re-validate on read
            // so a corrupt row surfaces instead of leaking.
            mobile_number: MobileNumber::new(mobile_number)?,
            status: status.parse()?,
            requested_at,
            processed_at,
            transaction_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<SubmissionStatus>().unwrap(), status);
        }
        for status in [
            WithdrawalStatus::Pending,
            WithdrawalStatus::Processed,
            WithdrawalStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<WithdrawalStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = "settled".parse::<PaymentStatus>();
        assert!(matches!(
            result,
            Err(DomainError::UnknownStatus { entity: "payment", .. })
        ));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(SubmissionStatus::Approved.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(WithdrawalStatus::Processed.is_terminal());
    }

    #[test]
    fn test_review_decision_parse() {
        assert_eq!(
            "approved".parse::<ReviewDecision>().unwrap(),
            ReviewDecision::Approved
        );
        assert!("maybe".parse::<ReviewDecision>().is_err());
        assert_eq!(
            ReviewDecision::Rejected.as_submission_status(),
            SubmissionStatus::Rejected
        );
    }

    #[test]
    fn test_withdrawal_decision_parse() {
        assert_eq!(
            "processed".parse::<WithdrawalDecision>().unwrap(),
            WithdrawalDecision::Processed
        );
        assert!("approved".parse::<WithdrawalDecision>().is_err());
    }

    #[test]
    fn test_withdrawal_from_row_rejects_bad_provider() {
        let row: WithdrawalRow = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Decimal::new(1000, 0),
            "vodafone".to_string(),
            "+256772000000".to_string(),
            "pending".to_string(),
            Utc::now(),
            None,
            None,
        );
        assert!(Withdrawal::try_from_row(row).is_err());
    }
}
