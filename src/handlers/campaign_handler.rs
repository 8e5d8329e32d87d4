//! Campaign handlers
//!
//! Admin-side campaign creation and updates. A campaign's payout amount
//! becomes immutable once any payment was issued against it, since issued
//! payments were calculated from that figure.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Amount, Campaign, CampaignRow, CampaignStatus, Principal};
use crate::error::AppError;

use super::{CreateCampaignCommand, UpdateCampaignCommand};

/// Handler for campaign creation
pub struct CreateCampaignHandler {
    pool: PgPool,
}

impl CreateCampaignHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the create command
    pub async fn execute(
        &self,
        command: CreateCampaignCommand,
        principal: &Principal,
    ) -> Result<Campaign, AppError> {
        if !principal.is_admin() {
            return Err(AppError::PermissionDenied(
                "only administrators can create campaigns".to_string(),
            ));
        }

        if command.brand.trim().is_empty() || command.name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "brand and name must not be empty".to_string(),
            ));
        }

        let budget: Amount = command
            .budget_per_creator
            .parse()
            .map_err(crate::domain::DomainError::from)?;

        let row: CampaignRow = sqlx::query_as(
            r#"
            INSERT INTO campaigns (brand, name, budget_per_creator, status)
            VALUES ($1, $2, $3, 'active')
            RETURNING id, brand, name, budget_per_creator, status, created_at, updated_at
            "#,
        )
        .bind(command.brand.trim())
        .bind(command.name.trim())
        .bind(budget.value())
        .fetch_one(&self.pool)
        .await?;

        let campaign = Campaign::try_from_row(row)?;

        tracing::info!(
            campaign_id = %campaign.id,
            brand = %campaign.brand,
            budget_per_creator = %campaign.budget_per_creator,
            "Campaign created"
        );

        Ok(campaign)
    }
}

/// Handler for campaign updates
pub struct UpdateCampaignHandler {
    pool: PgPool,
}

impl UpdateCampaignHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the update command
    pub async fn execute(
        &self,
        campaign_id: Uuid,
        command: UpdateCampaignCommand,
        principal: &Principal,
    ) -> Result<Campaign, AppError> {
        if !principal.is_admin() {
            return Err(AppError::PermissionDenied(
                "only administrators can update campaigns".to_string(),
            ));
        }

        if command.is_empty() {
            return Err(AppError::InvalidRequest(
                "no fields to update".to_string(),
            ));
        }

        let budget: Option<Decimal> = command
            .budget_per_creator
            .as_deref()
            .map(str::parse::<Amount>)
            .transpose()
            .map_err(crate::domain::DomainError::from)?
            .map(|amount| amount.value());

        let status: Option<&'static str> = command
            .status
            .as_deref()
            .map(str::parse::<CampaignStatus>)
            .transpose()
            .map_err(|_| AppError::InvalidRequest(
                "status must be 'active' or 'closed'".to_string(),
            ))?
            .map(|s| s.as_str());

        let mut tx = self.pool.begin().await?;

        // Lock the campaign row for the duration of the update. Payout
        // issuance reads the budget FOR SHARE inside its own transaction, so
        // a budget change and an in-flight payout serialize instead of
        // interleaving around the reference check below.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM campaigns WHERE id = $1 FOR UPDATE")
                .bind(campaign_id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Err(AppError::CampaignNotFound(campaign_id.to_string()));
        }

        // budget_per_creator is the authoritative amount behind every payment
        // issued for this campaign's submissions; once one exists the figure
        // is frozen.
        if budget.is_some() {
            let referenced: bool = sqlx::query_scalar(
                r#"
                SELECT EXISTS (
                    SELECT 1
                    FROM payments p
                    JOIN submissions s ON p.submission_id = s.id
                    WHERE s.campaign_id = $1
                )
                "#,
            )
            .bind(campaign_id)
            .fetch_one(&mut *tx)
            .await?;

            if referenced {
                return Err(AppError::InvalidState(
                    "campaign budget is referenced by issued payments and cannot change"
                        .to_string(),
                ));
            }
        }

        let row: CampaignRow = sqlx::query_as(
            r#"
            UPDATE campaigns
            SET brand = COALESCE($2, brand),
                name = COALESCE($3, name),
                budget_per_creator = COALESCE($4, budget_per_creator),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, brand, name, budget_per_creator, status, created_at, updated_at
            "#,
        )
        .bind(campaign_id)
        .bind(command.brand.as_deref().map(str::trim))
        .bind(command.name.as_deref().map(str::trim))
        .bind(budget)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Campaign::try_from_row(row)?)
    }
}
