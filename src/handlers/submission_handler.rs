//! Submission handler
//!
//! Creators submit one content entry per campaign item. The content itself
//! lives with the upload collaborator; only its opaque reference is stored.

use sqlx::PgPool;

use crate::domain::{Principal, Submission, SubmissionRow};
use crate::error::AppError;

use super::CreateSubmissionCommand;

/// Handler for content submissions
pub struct CreateSubmissionHandler {
    pool: PgPool,
}

impl CreateSubmissionHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the submit command. The acting principal is the creator.
    pub async fn execute(
        &self,
        command: CreateSubmissionCommand,
        principal: &Principal,
    ) -> Result<Submission, AppError> {
        if command.content_url.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "content_url must not be empty".to_string(),
            ));
        }

        let campaign_status: Option<String> =
            sqlx::query_scalar("SELECT status FROM campaigns WHERE id = $1")
                .bind(command.campaign_id)
                .fetch_optional(&self.pool)
                .await?;

        match campaign_status.as_deref() {
            None => {
                return Err(AppError::CampaignNotFound(command.campaign_id.to_string()));
            }
            Some("active") => {}
            Some(status) => {
                return Err(AppError::InvalidState(format!(
                    "campaign is {}, submissions are only accepted for active campaigns",
                    status
                )));
            }
        }

        let row: SubmissionRow = sqlx::query_as(
            r#"
            INSERT INTO submissions (campaign_id, creator_id, content_url, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, campaign_id, creator_id, content_url, status,
                      submitted_at, reviewed_at, feedback
            "#,
        )
        .bind(command.campaign_id)
        .bind(principal.id)
        .bind(command.content_url.trim())
        .fetch_one(&self.pool)
        .await?;

        let submission = Submission::try_from_row(row)?;

        tracing::info!(
            submission_id = %submission.id,
            campaign_id = %submission.campaign_id,
            creator_id = %submission.creator_id,
            "Content submitted"
        );

        Ok(submission)
    }
}
