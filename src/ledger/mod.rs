//! Ledger Service
//!
//! The read model for creator balances. Balance is derived, never stored:
//!
//!   balance = sum of completed payments - sum of processed withdrawals
//!
//! Note the subtraction: an earlier revision of the platform computed balance
//! from completed payments alone, which let a creator withdraw the same
//! settled funds repeatedly. Processed withdrawals are always subtracted
//! here, and the withdrawal guard additionally reserves pending withdrawals
//! so two requests cannot both spend the same funds.
//!
//! Also owns the payment settlement transition, the only mutation a Payment
//! sees after creation.

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Payment, PaymentRow, PaymentStatus, Withdrawal, WithdrawalRow, WithdrawalStatus};
use crate::error::{AppError, AppResult};

// =========================================================================
// Balance arithmetic
// =========================================================================

/// Spendable balance: completed payments minus processed withdrawals.
pub fn spendable_balance(
    payments: &[(Decimal, PaymentStatus)],
    withdrawals: &[(Decimal, WithdrawalStatus)],
) -> Decimal {
    let earned: Decimal = payments
        .iter()
        .filter(|(_, status)| *status == PaymentStatus::Completed)
        .map(|(amount, _)| *amount)
        .sum();

    let withdrawn: Decimal = withdrawals
        .iter()
        .filter(|(_, status)| *status == WithdrawalStatus::Processed)
        .map(|(amount, _)| *amount)
        .sum();

    earned - withdrawn
}

/// Funds available to a new withdrawal request: spendable balance minus
/// withdrawals that are still pending. Pending requests reserve their amount
/// until an administrator settles them, otherwise two requests validated
/// against the same balance could jointly overdraw it.
pub fn available_for_withdrawal(
    payments: &[(Decimal, PaymentStatus)],
    withdrawals: &[(Decimal, WithdrawalStatus)],
) -> Decimal {
    let reserved: Decimal = withdrawals
        .iter()
        .filter(|(_, status)| *status == WithdrawalStatus::Pending)
        .map(|(amount, _)| *amount)
        .sum();

    spendable_balance(payments, withdrawals) - reserved
}

// =========================================================================
// LedgerService
// =========================================================================

/// Financial read model plus the settlement-driven payment transition.
#[derive(Debug, Clone)]
pub struct LedgerService {
    pool: PgPool,
}

impl LedgerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Spendable balance for a creator.
    pub async fn creator_balance(&self, creator_id: Uuid) -> AppResult<Decimal> {
        let payments = payment_amounts(&self.pool, creator_id).await?;
        let withdrawals = withdrawal_amounts(&self.pool, creator_id).await?;
        Ok(spendable_balance(&payments, &withdrawals))
    }

    /// Funds a new withdrawal may claim, read inside the caller's
    /// transaction. The caller must hold the creator's withdrawal lock, which
    /// serializes this read against other withdrawal requests.
    pub async fn available_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        creator_id: Uuid,
    ) -> AppResult<Decimal> {
        let payments = payment_amounts(&mut **tx, creator_id).await?;
        let withdrawals = withdrawal_amounts(&mut **tx, creator_id).await?;
        Ok(available_for_withdrawal(&payments, &withdrawals))
    }

    /// Settlement-driven payment transition. Legal only from `pending` to
    /// `completed` or `failed`; the conditional update makes a losing
    /// concurrent settlement attempt fail rather than silently overwrite.
    pub async fn transition_payment_status(
        &self,
        payment_id: Uuid,
        new_status: PaymentStatus,
    ) -> AppResult<Payment> {
        // `pending` is a legal status but never a legal transition target;
        // it gets the illegal-transition treatment, not a validation error.
        if new_status == PaymentStatus::Pending {
            return Err(AppError::InvalidState(
                "payments only transition from pending to completed or failed".to_string(),
            ));
        }

        let updated: Option<PaymentRow> = sqlx::query_as(
            r#"
            UPDATE payments
            SET status = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING id, creator_id, submission_id, amount, status, created_at
            "#,
        )
        .bind(payment_id)
        .bind(new_status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Ok(Payment::try_from_row(row)?),
            None => {
                // Either the payment does not exist or it is already terminal.
                let current: Option<String> =
                    sqlx::query_scalar("SELECT status FROM payments WHERE id = $1")
                        .bind(payment_id)
                        .fetch_optional(&self.pool)
                        .await?;

                match current {
                    None => Err(AppError::PaymentNotFound(payment_id.to_string())),
                    Some(status) => Err(AppError::InvalidState(format!(
                        "payment is already {}, only pending payments can be settled",
                        status
                    ))),
                }
            }
        }
    }

    /// Pending withdrawals in FIFO order for the admin queue. Ordering by
    /// requested_at (id as tiebreaker) is a stable contract independent of
    /// insertion order.
    pub async fn pending_withdrawals(&self) -> AppResult<Vec<Withdrawal>> {
        let rows: Vec<WithdrawalRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, amount, mobile_provider, mobile_number,
                   status, requested_at, processed_at, transaction_id
            FROM withdrawals
            WHERE status = 'pending'
            ORDER BY requested_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Withdrawal::try_from_row(row).map_err(AppError::from))
            .collect()
    }

    /// A creator's payment history, newest first.
    pub async fn creator_payments(&self, creator_id: Uuid) -> AppResult<Vec<Payment>> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, submission_id, amount, status, created_at
            FROM payments
            WHERE creator_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Payment::try_from_row(row).map_err(AppError::from))
            .collect()
    }

    /// A creator's withdrawal history, newest first.
    pub async fn creator_withdrawals(&self, creator_id: Uuid) -> AppResult<Vec<Withdrawal>> {
        let rows: Vec<WithdrawalRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, amount, mobile_provider, mobile_number,
                   status, requested_at, processed_at, transaction_id
            FROM withdrawals
            WHERE creator_id = $1
            ORDER BY requested_at DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Withdrawal::try_from_row(row).map_err(AppError::from))
            .collect()
    }
}

/// All payment (amount, status) pairs for a creator. A single statement,
/// so the read sees one committed snapshot and never a half-applied
/// review transaction.
async fn payment_amounts<'e>(
    executor: impl PgExecutor<'e>,
    creator_id: Uuid,
) -> AppResult<Vec<(Decimal, PaymentStatus)>> {
    let rows: Vec<(Decimal, String)> =
        sqlx::query_as("SELECT amount, status FROM payments WHERE creator_id = $1")
            .bind(creator_id)
            .fetch_all(executor)
            .await?;

    rows.into_iter()
        .map(|(amount, status)| Ok((amount, status.parse()?)))
        .collect()
}

/// All withdrawal (amount, status) pairs for a creator.
async fn withdrawal_amounts<'e>(
    executor: impl PgExecutor<'e>,
    creator_id: Uuid,
) -> AppResult<Vec<(Decimal, WithdrawalStatus)>> {
    let rows: Vec<(Decimal, String)> =
        sqlx::query_as("SELECT amount, status FROM withdrawals WHERE creator_id = $1")
            .bind(creator_id)
            .fetch_all(executor)
            .await?;

    rows.into_iter()
        .map(|(amount, status)| Ok((amount, status.parse()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_ignores_pending_payments() {
        let payments = vec![
            (dec!(100000), PaymentStatus::Completed),
            (dec!(50000), PaymentStatus::Pending),
        ];
        assert_eq!(spendable_balance(&payments, &[]), dec!(100000));
    }

    #[test]
    fn test_balance_ignores_failed_payments() {
        let payments = vec![
            (dec!(100000), PaymentStatus::Completed),
            (dec!(75000), PaymentStatus::Failed),
        ];
        assert_eq!(spendable_balance(&payments, &[]), dec!(100000));
    }

    #[test]
    fn test_balance_subtracts_processed_withdrawals() {
        let payments = vec![(dec!(250000), PaymentStatus::Completed)];
        let withdrawals = vec![(dec!(200000), WithdrawalStatus::Processed)];
        assert_eq!(spendable_balance(&payments, &withdrawals), dec!(50000));
    }

    #[test]
    fn test_balance_ignores_rejected_withdrawals() {
        let payments = vec![(dec!(250000), PaymentStatus::Completed)];
        let withdrawals = vec![(dec!(200000), WithdrawalStatus::Rejected)];
        assert_eq!(spendable_balance(&payments, &withdrawals), dec!(250000));
    }

    #[test]
    fn test_spendable_does_not_subtract_pending_withdrawals() {
        // Pending withdrawals have not left the ledger yet; they only reserve
        // funds for new withdrawal requests.
        let payments = vec![(dec!(100000), PaymentStatus::Completed)];
        let withdrawals = vec![(dec!(60000), WithdrawalStatus::Pending)];
        assert_eq!(spendable_balance(&payments, &withdrawals), dec!(100000));
        assert_eq!(available_for_withdrawal(&payments, &withdrawals), dec!(40000));
    }

    #[test]
    fn test_available_can_go_to_zero() {
        let payments = vec![(dec!(100000), PaymentStatus::Completed)];
        let withdrawals = vec![
            (dec!(60000), WithdrawalStatus::Pending),
            (dec!(40000), WithdrawalStatus::Processed),
        ];
        assert_eq!(available_for_withdrawal(&payments, &withdrawals), dec!(0));
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        assert_eq!(spendable_balance(&[], &[]), dec!(0));
        assert_eq!(available_for_withdrawal(&[], &[]), dec!(0));
    }
}
