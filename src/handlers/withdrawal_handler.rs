//! Withdrawal handlers
//!
//! Creator-side withdrawal requests and admin-side processing.
//!
//! The request path is the classic check-then-act hazard: two concurrent
//! requests must not both pass a balance check they read before either
//! inserted. The check and the insert run in one transaction under a
//! per-creator advisory lock, so requests for the same creator serialize
//! while different creators never contend.

use std::time::Duration;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{
    Amount, MobileNumber, MobileProvider, Principal, Withdrawal, WithdrawalDecision,
    WithdrawalRow, WithdrawalStatus,
};
use crate::error::AppError;
use crate::ledger::LedgerService;

use super::{ProcessWithdrawalCommand, RequestWithdrawalCommand};

/// Lock key for a creator's withdrawal serialization scope. Both uuid halves
/// fold into the key; a cross-creator collision only costs spurious
/// serialization, never correctness.
fn creator_lock_key(creator_id: Uuid) -> i64 {
    let bytes = creator_id.as_bytes();
    let hi = i64::from_be_bytes(bytes[..8].try_into().expect("uuid has 16 bytes"));
    let lo = i64::from_be_bytes(bytes[8..].try_into().expect("uuid has 16 bytes"));
    hi ^ lo
}

// =========================================================================
// RequestWithdrawalHandler
// =========================================================================

/// Handler for creator withdrawal requests
pub struct RequestWithdrawalHandler {
    pool: PgPool,
}

impl RequestWithdrawalHandler {
    /// A lost race (serialization failure or deadlock) is retried once;
    /// persistent contention surfaces as Conflict instead of being masked.
    const MAX_ATTEMPTS: u32 = 2;

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the withdrawal request command
    pub async fn execute(
        &self,
        command: RequestWithdrawalCommand,
        principal: &Principal,
    ) -> Result<Withdrawal, AppError> {
        let amount: Amount = command
            .amount
            .parse()
            .map_err(crate::domain::DomainError::from)?;
        let provider: MobileProvider = command.mobile_provider.parse()?;
        let number = MobileNumber::new(command.mobile_number)?;

        for attempt in 1..=Self::MAX_ATTEMPTS {
            match self
                .try_request(principal.id, &amount, provider, &number)
                .await
            {
                Err(AppError::Database(e)) if AppError::is_concurrency_conflict(&e) => {
                    if attempt == Self::MAX_ATTEMPTS {
                        return Err(AppError::Conflict);
                    }
                    tracing::warn!(
                        creator_id = %principal.id,
                        attempt,
                        "Withdrawal request lost a concurrency race, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(50 * attempt as u64)).await;
                }
                other => return other,
            }
        }

        Err(AppError::Conflict)
    }

    /// Single attempt: lock, read available funds, insert if covered.
    async fn try_request(
        &self,
        creator_id: Uuid,
        amount: &Amount,
        provider: MobileProvider,
        number: &MobileNumber,
    ) -> Result<Withdrawal, AppError> {
        let mut tx: Transaction<'_, Postgres> = self.pool.begin().await?;

        // Held until commit/rollback; serializes withdrawal requests for this
        // creator without touching any other creator's records.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(creator_lock_key(creator_id))
            .execute(&mut *tx)
            .await?;

        let available = LedgerService::available_in_tx(&mut tx, creator_id).await?;

        if amount.value() > available {
            // Nothing written; dropping the transaction releases the lock.
            return Err(AppError::InsufficientFunds {
                requested: amount.value(),
                available,
            });
        }

        let row: WithdrawalRow = sqlx::query_as(
            r#"
            INSERT INTO withdrawals (creator_id, amount, mobile_provider, mobile_number, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, creator_id, amount, mobile_provider, mobile_number,
                      status, requested_at, processed_at, transaction_id
            "#,
        )
        .bind(creator_id)
        .bind(amount.value())
        .bind(provider.as_str())
        .bind(number.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let withdrawal = Withdrawal::try_from_row(row)?;

        tracing::info!(
            withdrawal_id = %withdrawal.id,
            creator_id = %creator_id,
            amount = %withdrawal.amount,
            provider = %withdrawal.mobile_provider,
            "Withdrawal requested"
        );

        Ok(withdrawal)
    }
}

// =========================================================================
// ProcessWithdrawalHandler
// =========================================================================

/// Handler for admin withdrawal processing
pub struct ProcessWithdrawalHandler {
    pool: PgPool,
}

impl ProcessWithdrawalHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the process command
    pub async fn execute(
        &self,
        command: ProcessWithdrawalCommand,
        principal: &Principal,
    ) -> Result<Withdrawal, AppError> {
        if !principal.is_admin() {
            return Err(AppError::PermissionDenied(
                "only administrators can process withdrawals".to_string(),
            ));
        }

        let decision: WithdrawalDecision = command
            .decision
            .parse()
            .map_err(|_| AppError::InvalidRequest(format!(
                "decision must be 'processed' or 'rejected', got '{}'",
                command.decision
            )))?;

        // A processed withdrawal must carry the mobile-money transaction id;
        // a rejected one never stores it.
        let transaction_id = match decision {
            WithdrawalDecision::Processed => {
                let id = command
                    .transaction_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(crate::domain::DomainError::MissingTransactionId)?;
                Some(id.to_string())
            }
            WithdrawalDecision::Rejected => None,
        };

        let updated: Option<WithdrawalRow> = sqlx::query_as(
            r#"
            UPDATE withdrawals
            SET status = $2, processed_at = NOW(), transaction_id = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING id, creator_id, amount, mobile_provider, mobile_number,
                      status, requested_at, processed_at, transaction_id
            "#,
        )
        .bind(command.withdrawal_id)
        .bind(decision.as_withdrawal_status().as_str())
        .bind(&transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        let withdrawal = match updated {
            Some(row) => Withdrawal::try_from_row(row)?,
            None => {
                let current: Option<String> =
                    sqlx::query_scalar("SELECT status FROM withdrawals WHERE id = $1")
                        .bind(command.withdrawal_id)
                        .fetch_optional(&self.pool)
                        .await?;

                return Err(match current {
                    None => AppError::WithdrawalNotFound(command.withdrawal_id.to_string()),
                    Some(status) => AppError::InvalidState(format!(
                        "withdrawal is already {}, only pending withdrawals can be processed",
                        status
                    )),
                });
            }
        };

        // Rejecting needs no balance compensation: funds leave the ledger
        // only when a withdrawal reaches `processed`.
        debug_assert!(withdrawal.status != WithdrawalStatus::Pending);

        tracing::info!(
            withdrawal_id = %withdrawal.id,
            status = %withdrawal.status,
            admin = %principal.id,
            "Withdrawal processed"
        );

        Ok(withdrawal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_is_stable() {
        let id = Uuid::new_v4();
        assert_eq!(creator_lock_key(id), creator_lock_key(id));
    }

    #[test]
    fn test_lock_key_differs_across_creators() {
        let a = creator_lock_key(Uuid::new_v4());
        let b = creator_lock_key(Uuid::new_v4());
        assert_ne!(a, b);
    }

    #[test]
    fn test_lock_key_uses_both_uuid_halves() {
        let a = Uuid::from_bytes([
            1, 2, 3, 4, 5, 6, 7, 8, //
            9, 10, 11, 12, 13, 14, 15, 16,
        ]);
        let b = Uuid::from_bytes([
            1, 2, 3, 4, 5, 6, 7, 8, //
            16, 15, 14, 13, 12, 11, 10, 9,
        ]);
        assert_ne!(creator_lock_key(a), creator_lock_key(b));
    }
}
