//! Submission review handler
//!
//! Drives the single status transition a submission ever sees and, on
//! approval, issues the payout. The status update and the payment insert
//! commit as one transaction: a gateway failure anywhere in between rolls
//! both back and the submission stays pending.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Payment, PaymentRow, Principal, ReviewDecision, Submission, SubmissionRow,
};
use crate::error::AppError;

use super::{ReviewOutcome, ReviewSubmissionCommand};

/// Handler for submission reviews
pub struct ReviewSubmissionHandler {
    pool: PgPool,
}

impl ReviewSubmissionHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the review command
    pub async fn execute(
        &self,
        command: ReviewSubmissionCommand,
        principal: &Principal,
    ) -> Result<ReviewOutcome, AppError> {
        if !principal.is_admin() {
            return Err(AppError::PermissionDenied(
                "only administrators can review submissions".to_string(),
            ));
        }

        let decision: ReviewDecision = command
            .decision
            .parse()
            .map_err(|_| AppError::InvalidRequest(format!(
                "decision must be 'approved' or 'rejected', got '{}'",
                command.decision
            )))?;

        let mut tx = self.pool.begin().await?;

        // Conditional update: only a still-pending submission transitions.
        // A losing concurrent reviewer matches zero rows and gets
        // InvalidState, never a silent overwrite.
        let updated: Option<SubmissionRow> = sqlx::query_as(
            r#"
            UPDATE submissions
            SET status = $2, reviewed_at = NOW(), feedback = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING id, campaign_id, creator_id, content_url, status,
                      submitted_at, reviewed_at, feedback
            "#,
        )
        .bind(command.submission_id)
        .bind(decision.as_submission_status().as_str())
        .bind(&command.feedback)
        .fetch_optional(&mut *tx)
        .await?;

        let submission = match updated {
            Some(row) => Submission::try_from_row(row)?,
            None => {
                return Err(self
                    .classify_missed_update(&mut tx, command.submission_id)
                    .await?);
            }
        };

        let payment = match decision {
            ReviewDecision::Approved => Some(
                self.issue_payment(&mut tx, &submission).await?,
            ),
            ReviewDecision::Rejected => None,
        };

        tx.commit().await?;

        tracing::info!(
            submission_id = %submission.id,
            decision = %submission.status,
            payment_id = ?payment.as_ref().map(|p| p.id),
            reviewer = %principal.id,
            "Submission reviewed"
        );

        Ok(ReviewOutcome {
            submission,
            payment,
        })
    }

    /// Insert the payout for an approved submission. The amount always comes
    /// from the campaign's budget_per_creator, never a constant.
    async fn issue_payment(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        submission: &Submission,
    ) -> Result<Payment, AppError> {
        // FOR SHARE holds off a concurrent budget update until this payout
        // commits; the budget the payment is issued at is the one the
        // campaign still carries.
        let budget: Option<rust_decimal::Decimal> =
            sqlx::query_scalar("SELECT budget_per_creator FROM campaigns WHERE id = $1 FOR SHARE")
                .bind(submission.campaign_id)
                .fetch_optional(&mut **tx)
                .await?;

        let budget = budget
            .ok_or_else(|| AppError::CampaignNotFound(submission.campaign_id.to_string()))?;

        let row: PaymentRow = sqlx::query_as(
            r#"
            INSERT INTO payments (creator_id, submission_id, amount, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, creator_id, submission_id, amount, status, created_at
            "#,
        )
        .bind(submission.creator_id)
        .bind(submission.id)
        .bind(budget)
        .fetch_one(&mut **tx)
        .await?;

        Ok(Payment::try_from_row(row)?)
    }

    /// The conditional update matched nothing: distinguish a missing
    /// submission from one already reviewed.
    async fn classify_missed_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        submission_id: Uuid,
    ) -> Result<AppError, AppError> {
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM submissions WHERE id = $1")
                .bind(submission_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(match current {
            None => AppError::SubmissionNotFound(submission_id.to_string()),
            Some(status) => AppError::InvalidState(format!(
                "submission is already {}, only pending submissions can be reviewed",
                status
            )),
        })
    }
}
