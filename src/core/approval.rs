//! Approval state machine for expense claims.
//!
//! The only component allowed to mutate a category's `realized_amount`.
//! A claim moves `pending -> approved` or `pending -> rejected`, each exactly
//! once; both outcomes are terminal and an approved claim is only ever
//! reversed by a compensating transaction.
//!
//! The whole read-check-mutate sequence of an approval runs inside one
//! database transaction: the remaining budget is recomputed from the
//! approved-claims view after the transaction begins, so two concurrent
//! approvals against a near-exhausted category cannot both pass the check
//! and jointly overspend it. Decisions on claims against different
//! categories do not contend.

use crate::{
    core::{allocation, audit, ledger, program},
    entities::{RabCategory, expense_claim, rab_category},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

/// Approves a pending expense claim, atomically consuming budget.
///
/// Fails with `NotFound` for an unknown claim, `InvalidState` when the claim
/// was already decided, `Validation` when the decider is not an admin of the
/// program, and `BudgetExceeded` when the amount is larger than the
/// category's remaining budget at decision time. The budget check is
/// server-authoritative; it does not matter what a client UI allowed.
pub async fn approve_claim(
    db: &DatabaseConnection,
    claim_id: i64,
    admin_user_id: &str,
) -> Result<expense_claim::Model> {
    let txn = db.begin().await?;

    let claim = require_pending_claim(&txn, claim_id).await?;
    program::require_admin(&txn, claim.program_id, admin_user_id).await?;

    let category = allocation::require_category(&txn, claim.category_id).await?;

    // Recompute from the ledger inside the transaction; never trust the
    // cached column for the decision
    let spent = allocation::approved_spend(&txn, claim.category_id).await?;
    let remaining = category.total_budget - spent;
    if claim.amount > remaining {
        return Err(Error::BudgetExceeded {
            requested: claim.amount,
            remaining,
        });
    }

    let amount = claim.amount;
    let program_id = claim.program_id;
    let category_id = claim.category_id;

    let mut active: expense_claim::ActiveModel = claim.into();
    active.status = Set(ledger::CLAIM_APPROVED.to_string());
    active.decided_by = Set(Some(admin_user_id.to_string()));
    active.decided_at = Set(Some(chrono::Utc::now()));
    let decided = active.update(&txn).await?;

    // Keep the cached realized_amount in step with the approved-claims view,
    // as a single column-level increment
    RabCategory::update_many()
        .col_expr(
            rab_category::Column::RealizedAmount,
            Expr::col(rab_category::Column::RealizedAmount).add(amount),
        )
        .filter(rab_category::Column::Id.eq(category_id))
        .exec(&txn)
        .await?;

    audit::record(
        &txn,
        program_id,
        admin_user_id,
        "claim.approved",
        &format!(
            "Approved claim {claim_id} for {amount:.0} against category '{}'",
            category.name
        ),
    )
    .await?;

    txn.commit().await?;

    info!(claim_id, category_id, amount, decided_by = admin_user_id, "claim approved");
    Ok(decided)
}

/// Rejects a pending expense claim with a mandatory explanation.
///
/// The note is what the submitter sees; an empty or whitespace-only note
/// fails with `Validation`. Rejection never mutates budget figures.
pub async fn reject_claim(
    db: &DatabaseConnection,
    claim_id: i64,
    admin_user_id: &str,
    rejection_note: &str,
) -> Result<expense_claim::Model> {
    let note = rejection_note.trim();
    if note.is_empty() {
        return Err(Error::validation("A rejection requires a non-empty note"));
    }

    let txn = db.begin().await?;

    let claim = require_pending_claim(&txn, claim_id).await?;
    program::require_admin(&txn, claim.program_id, admin_user_id).await?;

    let program_id = claim.program_id;
    let amount = claim.amount;

    let mut active: expense_claim::ActiveModel = claim.into();
    active.status = Set(ledger::CLAIM_REJECTED.to_string());
    active.rejection_note = Set(Some(note.to_string()));
    active.decided_by = Set(Some(admin_user_id.to_string()));
    active.decided_at = Set(Some(chrono::Utc::now()));
    let decided = active.update(&txn).await?;

    audit::record(
        &txn,
        program_id,
        admin_user_id,
        "claim.rejected",
        &format!("Rejected claim {claim_id} for {amount:.0}: {note}"),
    )
    .await?;

    txn.commit().await?;

    info!(claim_id, decided_by = admin_user_id, "claim rejected");
    Ok(decided)
}

/// Loads a claim and guards that it is still pending. The pending guard is
/// what makes a retried decision safe: a second attempt observes the
/// terminal status and fails with `InvalidState` instead of double-applying.
async fn require_pending_claim<C>(db: &C, claim_id: i64) -> Result<expense_claim::Model>
where
    C: ConnectionTrait,
{
    let claim = ledger::get_claim_by_id(db, claim_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "expense claim",
            id: claim_id.to_string(),
        })?;

    if claim.status != ledger::CLAIM_PENDING {
        return Err(Error::invalid_state(format!(
            "Claim {claim_id} was already decided (status: {})",
            claim.status
        )));
    }

    Ok(claim)
}
