//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Campaign, CampaignRow, Payment, PaymentStatus, Principal, Submission, SubmissionRow,
    Withdrawal,
};
use crate::error::AppError;
use crate::handlers::{
    CreateCampaignCommand, CreateCampaignHandler, CreateSubmissionCommand,
    CreateSubmissionHandler, ProcessWithdrawalCommand, ProcessWithdrawalHandler,
    RequestWithdrawalCommand, RequestWithdrawalHandler, ReviewSubmissionCommand,
    ReviewSubmissionHandler, UpdateCampaignCommand, UpdateCampaignHandler,
};
use crate::ledger::LedgerService;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub brand: String,
    pub name: String,
    pub budget_per_creator: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignRequest {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub budget_per_creator: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub brand: String,
    pub name: String,
    pub budget_per_creator: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id,
            brand: campaign.brand,
            name: campaign.name,
            budget_per_creator: campaign.budget_per_creator,
            status: campaign.status.as_str().to_string(),
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub campaign_id: Uuid,
    pub content_url: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub creator_id: Uuid,
    pub content_url: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            campaign_id: submission.campaign_id,
            creator_id: submission.creator_id,
            content_url: submission.content_url,
            status: submission.status.as_str().to_string(),
            submitted_at: submission.submitted_at,
            reviewed_at: submission.reviewed_at,
            feedback: submission.feedback,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewSubmissionRequest {
    pub decision: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub submission_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            creator_id: payment.creator_id,
            submission_id: payment.submission_id,
            amount: payment.amount,
            status: payment.status.as_str().to_string(),
            created_at: payment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub submission: SubmissionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentResponse>,
}

#[derive(Debug, Deserialize)]
pub struct SettlePaymentRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub creator_id: Uuid,
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RequestWithdrawalRequest {
    pub amount: String,
    pub mobile_provider: String,
    pub mobile_number: String,
}

#[derive(Debug, Deserialize)]
pub struct ProcessWithdrawalRequest {
    pub decision: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub amount: Decimal,
    pub mobile_provider: String,
    pub mobile_number: String,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            id: withdrawal.id,
            creator_id: withdrawal.creator_id,
            amount: withdrawal.amount,
            mobile_provider: withdrawal.mobile_provider.as_str().to_string(),
            mobile_number: withdrawal.mobile_number.as_str().to_string(),
            status: withdrawal.status.as_str().to_string(),
            requested_at: withdrawal.requested_at,
            processed_at: withdrawal.processed_at,
            transaction_id: withdrawal.transaction_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default = "default_status_pending")]
    pub status: String,
}

fn default_status_pending() -> String {
    "pending".to_string()
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Campaigns
        .route("/campaigns", post(create_campaign).get(list_active_campaigns))
        .route("/campaigns/:campaign_id", get(get_campaign))
        .route("/campaigns/:campaign_id", patch(update_campaign))
        // Submissions
        .route("/submissions", post(create_submission).get(list_submissions_for_review))
        .route("/submissions/:submission_id/review", post(review_submission))
        // Payments
        .route("/payments/:payment_id/settle", post(settle_payment))
        // Creator views
        .route("/creators/:creator_id/balance", get(get_creator_balance))
        .route("/creators/:creator_id/submissions", get(get_creator_submissions))
        .route("/creators/:creator_id/payments", get(get_creator_payments))
        .route("/creators/:creator_id/withdrawals", get(get_creator_withdrawals))
        // Withdrawals
        .route("/withdrawals", post(request_withdrawal).get(list_pending_withdrawals))
        .route("/withdrawals/:withdrawal_id/process", post(process_withdrawal))
}

/// Creator records are visible to the creator themselves and to admins.
fn ensure_can_view_creator(principal: &Principal, creator_id: Uuid) -> Result<(), AppError> {
    if principal.id == creator_id || principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "cannot view another creator's records".to_string(),
        ))
    }
}

// =========================================================================
// Campaign endpoints
// =========================================================================

/// Create a new campaign (admin)
async fn create_campaign(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), AppError> {
    let handler = CreateCampaignHandler::new(pool);
    let command =
        CreateCampaignCommand::new(request.brand, request.name, request.budget_per_creator);
    let campaign = handler.execute(command, &principal).await?;

    Ok((StatusCode::CREATED, Json(campaign.into())))
}

/// Update a campaign (admin)
async fn update_campaign(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<UpdateCampaignRequest>,
) -> Result<Json<CampaignResponse>, AppError> {
    let handler = UpdateCampaignHandler::new(pool);
    let command = UpdateCampaignCommand {
        brand: request.brand,
        name: request.name,
        budget_per_creator: request.budget_per_creator,
        status: request.status,
    };
    let campaign = handler.execute(campaign_id, command, &principal).await?;

    Ok(Json(campaign.into()))
}

/// List active campaigns, newest first
async fn list_active_campaigns(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<CampaignResponse>>, AppError> {
    let rows: Vec<CampaignRow> = sqlx::query_as(
        r#"
        SELECT id, brand, name, budget_per_creator, status, created_at, updated_at
        FROM campaigns
        WHERE status = 'active'
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let campaigns = rows
        .into_iter()
        .map(|row| Campaign::try_from_row(row).map(CampaignResponse::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(campaigns))
}

/// Get campaign by ID
async fn get_campaign(
    State(pool): State<PgPool>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignResponse>, AppError> {
    let row: Option<CampaignRow> = sqlx::query_as(
        r#"
        SELECT id, brand, name, budget_per_creator, status, created_at, updated_at
        FROM campaigns
        WHERE id = $1
        "#,
    )
    .bind(campaign_id)
    .fetch_optional(&pool)
    .await?;

    let row = row.ok_or_else(|| AppError::CampaignNotFound(campaign_id.to_string()))?;

    Ok(Json(Campaign::try_from_row(row)?.into()))
}

// =========================================================================
// Submission endpoints
// =========================================================================

/// Submit content for a campaign (creator)
async fn create_submission(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    let handler = CreateSubmissionHandler::new(pool);
    let command = CreateSubmissionCommand::new(request.campaign_id, request.content_url);
    let submission = handler.execute(command, &principal).await?;

    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Review queue: pending submissions, oldest first (admin)
async fn list_submissions_for_review(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    if !principal.is_admin() {
        return Err(AppError::PermissionDenied(
            "only administrators can list the review queue".to_string(),
        ));
    }
    if query.status != "pending" {
        return Err(AppError::InvalidRequest(
            "only status=pending is supported".to_string(),
        ));
    }

    let rows: Vec<SubmissionRow> = sqlx::query_as(
        r#"
        SELECT id, campaign_id, creator_id, content_url, status,
               submitted_at, reviewed_at, feedback
        FROM submissions
        WHERE status = 'pending'
        ORDER BY submitted_at ASC, id ASC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let submissions = rows
        .into_iter()
        .map(|row| Submission::try_from_row(row).map(SubmissionResponse::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(submissions))
}

/// Review a pending submission (admin). Approval issues the payout
/// atomically with the status change.
async fn review_submission(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(submission_id): Path<Uuid>,
    Json(request): Json<ReviewSubmissionRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let handler = ReviewSubmissionHandler::new(pool);

    let command = ReviewSubmissionCommand::new(submission_id, request.decision);
    let command = if let Some(feedback) = request.feedback {
        command.with_feedback(feedback)
    } else {
        command
    };

    let outcome = handler.execute(command, &principal).await?;

    Ok(Json(ReviewResponse {
        submission: outcome.submission.into(),
        payment: outcome.payment.map(PaymentResponse::from),
    }))
}

// =========================================================================
// Payment endpoints
// =========================================================================

/// Settle a pending payment (external settlement collaborator).
/// Legal target statuses are 'completed' and 'failed'.
async fn settle_payment(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(payment_id): Path<Uuid>,
    Json(request): Json<SettlePaymentRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    if !principal.is_admin() {
        return Err(AppError::PermissionDenied(
            "only the settlement integration can settle payments".to_string(),
        ));
    }

    let new_status: PaymentStatus = request
        .status
        .parse()
        .map_err(|_| AppError::InvalidRequest(format!(
            "status must be 'completed' or 'failed', got '{}'",
            request.status
        )))?;

    let ledger = LedgerService::new(pool);
    let payment = ledger.transition_payment_status(payment_id, new_status).await?;

    Ok(Json(payment.into()))
}

// =========================================================================
// Creator view endpoints
// =========================================================================

/// Get a creator's spendable balance
async fn get_creator_balance(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, AppError> {
    ensure_can_view_creator(&principal, creator_id)?;
    ensure_creator_exists(&pool, creator_id).await?;

    let ledger = LedgerService::new(pool);
    let balance = ledger.creator_balance(creator_id).await?;

    Ok(Json(BalanceResponse {
        creator_id,
        balance,
    }))
}

/// Get a creator's submissions, newest first
async fn get_creator_submissions(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    ensure_can_view_creator(&principal, creator_id)?;

    let rows: Vec<SubmissionRow> = sqlx::query_as(
        r#"
        SELECT id, campaign_id, creator_id, content_url, status,
               submitted_at, reviewed_at, feedback
        FROM submissions
        WHERE creator_id = $1
        ORDER BY submitted_at DESC
        "#,
    )
    .bind(creator_id)
    .fetch_all(&pool)
    .await?;

    let submissions = rows
        .into_iter()
        .map(|row| Submission::try_from_row(row).map(SubmissionResponse::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(submissions))
}

/// Get a creator's payments, newest first
async fn get_creator_payments(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    ensure_can_view_creator(&principal, creator_id)?;

    let ledger = LedgerService::new(pool);
    let payments = ledger.creator_payments(creator_id).await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Get a creator's withdrawals, newest first
async fn get_creator_withdrawals(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(creator_id): Path<Uuid>,
) -> Result<Json<Vec<WithdrawalResponse>>, AppError> {
    ensure_can_view_creator(&principal, creator_id)?;

    let ledger = LedgerService::new(pool);
    let withdrawals = ledger.creator_withdrawals(creator_id).await?;

    Ok(Json(
        withdrawals.into_iter().map(WithdrawalResponse::from).collect(),
    ))
}

async fn ensure_creator_exists(pool: &PgPool, creator_id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
        .bind(creator_id)
        .fetch_one(pool)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::CreatorNotFound(creator_id.to_string()))
    }
}

// =========================================================================
// Withdrawal endpoints
// =========================================================================

/// Request a withdrawal to a mobile-money account (creator)
async fn request_withdrawal(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<RequestWithdrawalRequest>,
) -> Result<(StatusCode, Json<WithdrawalResponse>), AppError> {
    let handler = RequestWithdrawalHandler::new(pool);
    let command = RequestWithdrawalCommand::new(
        request.amount,
        request.mobile_provider,
        request.mobile_number,
    );
    let withdrawal = handler.execute(command, &principal).await?;

    Ok((StatusCode::CREATED, Json(withdrawal.into())))
}

/// Pending withdrawals in FIFO order (admin)
async fn list_pending_withdrawals(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<WithdrawalResponse>>, AppError> {
    if !principal.is_admin() {
        return Err(AppError::PermissionDenied(
            "only administrators can list pending withdrawals".to_string(),
        ));
    }
    if query.status != "pending" {
        return Err(AppError::InvalidRequest(
            "only status=pending is supported".to_string(),
        ));
    }

    let ledger = LedgerService::new(pool);
    let withdrawals = ledger.pending_withdrawals().await?;

    Ok(Json(
        withdrawals.into_iter().map(WithdrawalResponse::from).collect(),
    ))
}

/// Settle a pending withdrawal (admin)
async fn process_withdrawal(
    State(pool): State<PgPool>,
    Extension(principal): Extension<Principal>,
    Path(withdrawal_id): Path<Uuid>,
    Json(request): Json<ProcessWithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, AppError> {
    let handler = ProcessWithdrawalHandler::new(pool);

    let command = ProcessWithdrawalCommand::new(withdrawal_id, request.decision);
    let command = if let Some(transaction_id) = request.transaction_id {
        command.with_transaction_id(transaction_id)
    } else {
        command
    };

    let withdrawal = handler.execute(command, &principal).await?;

    Ok(Json(withdrawal.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_request_deserialize() {
        let json = r#"{"decision": "approved", "feedback": "Well shot"}"#;
        let request: ReviewSubmissionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.decision, "approved");
        assert_eq!(request.feedback, Some("Well shot".to_string()));
    }

    #[test]
    fn test_review_request_feedback_optional() {
        let request: ReviewSubmissionRequest =
            serde_json::from_str(r#"{"decision": "rejected"}"#).unwrap();
        assert!(request.feedback.is_none());
    }

    #[test]
    fn test_withdrawal_request_deserialize() {
        let json = r#"{
            "amount": "200000",
            "mobile_provider": "mtn",
            "mobile_number": "+256772000000"
        }"#;

        let request: RequestWithdrawalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.amount, "200000");
        assert_eq!(request.mobile_provider, "mtn");
    }

    #[test]
    fn test_status_query_defaults_to_pending() {
        let query: StatusQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.status, "pending");
    }

    #[test]
    fn test_creator_view_access() {
        let creator_id = Uuid::new_v4();
        let owner = Principal::creator(creator_id);
        let admin = Principal::admin(Uuid::new_v4());
        let stranger = Principal::creator(Uuid::new_v4());

        assert!(ensure_can_view_creator(&owner, creator_id).is_ok());
        assert!(ensure_can_view_creator(&admin, creator_id).is_ok());
        assert!(ensure_can_view_creator(&stranger, creator_id).is_err());
    }
}
