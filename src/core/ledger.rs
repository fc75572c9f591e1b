//! Ledger business logic - the append-only record of cash movements and
//! expense claims.
//!
//! Transactions record money that has already moved and need no approval.
//! Expense claims are requests to spend: they enter the ledger as `pending`
//! and touch no budget figure until an admin decides them, so concurrently
//! submitted claims can never double-count against the same remaining budget
//! ahead of decision. Only the approval workflow in [`crate::core::approval`]
//! mutates realized spend.

use crate::{
    core::{allocation, program, receipt::ReceiptStore, receipt::ReceiptUpload},
    entities::{
        ExpenseClaim, LedgerTransaction, TransactionAllocation, expense_claim, ledger_transaction,
        program_member, transaction_allocation,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Transaction kind: money received.
pub const KIND_INCOME: &str = "income";
/// Transaction kind: money already spent (settled, not a claim).
pub const KIND_EXPENSE: &str = "expense";

/// Claim status: submitted, awaiting an admin decision.
pub const CLAIM_PENDING: &str = "pending";
/// Claim status: approved; counted in realized spend. Terminal.
pub const CLAIM_APPROVED: &str = "approved";
/// Claim status: rejected with a note. Terminal.
pub const CLAIM_REJECTED: &str = "rejected";

/// Tolerance when comparing an expense transaction's amount with the sum of
/// its allocation rows. Covers float rounding of whole-rupiah amounts.
const ALLOCATION_SUM_TOLERANCE: f64 = 0.005;

/// One slice of an expense transaction attributed to a RAB category.
#[derive(Debug, Clone)]
pub struct AllocationInput {
    /// Target RAB category
    pub category_id: i64,
    /// Portion of the transaction amount, must be positive
    pub amount: f64,
}

/// Filter for listing expense claims.
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    /// Restrict to one status (`"pending"`, `"approved"`, `"rejected"`)
    pub status: Option<String>,
    /// Restrict to one RAB category
    pub category_id: Option<i64>,
    /// Case-insensitive substring match on the description
    pub search: Option<String>,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(format!(
            "Amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}

/// Records a settled cash movement, optionally split across RAB categories.
///
/// Policy: when an expense transaction carries allocations, their amounts
/// must sum to the transaction amount (within rounding tolerance) - a
/// mismatch is a hard error, not a warning. Income transactions may not
/// carry allocations at all. Every referenced category must belong to the
/// same program. The transaction and its allocation rows are inserted
/// atomically.
pub async fn record_transaction(
    db: &DatabaseConnection,
    program_id: i64,
    kind: &str,
    amount: f64,
    transaction_date: NaiveDate,
    description: String,
    created_by: String,
    allocations: Vec<AllocationInput>,
) -> Result<ledger_transaction::Model> {
    if kind != KIND_INCOME && kind != KIND_EXPENSE {
        return Err(Error::validation(format!("Unknown transaction kind: {kind}")));
    }
    validate_amount(amount)?;
    if description.trim().is_empty() {
        return Err(Error::validation("Transaction description cannot be empty"));
    }
    if kind == KIND_INCOME && !allocations.is_empty() {
        return Err(Error::validation(
            "Income transactions cannot be allocated to RAB categories",
        ));
    }

    let txn = db.begin().await?;

    program::require_program(&txn, program_id).await?;

    if !allocations.is_empty() {
        let mut sum = 0.0;
        for alloc in &allocations {
            validate_amount(alloc.amount)?;
            let category = allocation::require_category(&txn, alloc.category_id).await?;
            if category.program_id != program_id {
                return Err(Error::validation(format!(
                    "Category '{}' belongs to a different program",
                    category.name
                )));
            }
            sum += alloc.amount;
        }
        if (sum - amount).abs() > ALLOCATION_SUM_TOLERANCE {
            return Err(Error::validation(format!(
                "Allocation amounts sum to {sum} but the transaction amount is {amount}"
            )));
        }
    }

    let model = ledger_transaction::ActiveModel {
        program_id: Set(program_id),
        kind: Set(kind.to_string()),
        amount: Set(amount),
        description: Set(description),
        transaction_date: Set(transaction_date),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    for alloc in allocations {
        let row = transaction_allocation::ActiveModel {
            transaction_id: Set(created.id),
            category_id: Set(alloc.category_id),
            amount: Set(alloc.amount),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    txn.commit().await?;

    info!(
        transaction_id = created.id,
        program_id, kind, amount, "recorded ledger transaction"
    );
    Ok(created)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<ledger_transaction::Model>> {
    LedgerTransaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a program's transactions, newest first, optionally restricted
/// to one kind.
pub async fn list_transactions(
    db: &DatabaseConnection,
    program_id: i64,
    kind: Option<&str>,
) -> Result<Vec<ledger_transaction::Model>> {
    let mut query = LedgerTransaction::find()
        .filter(ledger_transaction::Column::ProgramId.eq(program_id));
    if let Some(kind) = kind {
        query = query.filter(ledger_transaction::Column::Kind.eq(kind));
    }
    query
        .order_by_desc(ledger_transaction::Column::TransactionDate)
        .order_by_desc(ledger_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the allocation rows of one transaction.
pub async fn get_allocations_for_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Vec<transaction_allocation::Model>> {
    TransactionAllocation::find()
        .filter(transaction_allocation::Column::TransactionId.eq(transaction_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a transaction together with its allocation rows and owned
/// receipts (files included).
pub async fn delete_transaction(
    db: &DatabaseConnection,
    store: &ReceiptStore,
    transaction_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let model = LedgerTransaction::find_by_id(transaction_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "transaction",
            id: transaction_id.to_string(),
        })?;

    TransactionAllocation::delete_many()
        .filter(transaction_allocation::Column::TransactionId.eq(transaction_id))
        .exec(&txn)
        .await?;

    let receipts = store.delete_rows_for_transaction(&txn, transaction_id).await?;

    model.delete(&txn).await?;
    txn.commit().await?;

    // Files go only after the rows are durably gone; a failed commit leaves
    // both row and file in place
    store.remove_files(&receipts).await;
    Ok(())
}

/// Submits an expense claim against a RAB category.
///
/// The claim is created in `pending` status with its receipt attached; the
/// category's realized amount is untouched until an admin approves. Fails
/// with `Validation` when the amount is not positive, the description is
/// empty, or the receipt is missing/invalid; with `InvalidState` when the
/// program is not active; and with `NotFound` for unknown program/category.
#[allow(clippy::too_many_arguments)]
pub async fn submit_expense_claim(
    db: &DatabaseConnection,
    store: &ReceiptStore,
    program_id: i64,
    category_id: i64,
    amount: f64,
    description: String,
    transaction_date: NaiveDate,
    submitted_by: String,
    upload: ReceiptUpload,
) -> Result<expense_claim::Model> {
    validate_amount(amount)?;
    if description.trim().is_empty() {
        return Err(Error::validation("Claim description cannot be empty"));
    }
    store.validate(&upload)?;

    let txn = db.begin().await?;

    let prog = program::require_program(&txn, program_id).await?;
    if prog.status != program::STATUS_ACTIVE {
        return Err(Error::invalid_state(format!(
            "Claims can only be submitted to an active program (status: {})",
            prog.status
        )));
    }

    let category = allocation::require_category(&txn, category_id).await?;
    if category.program_id != program_id {
        return Err(Error::validation(format!(
            "Category '{}' belongs to a different program",
            category.name
        )));
    }

    require_member(&txn, program_id, &submitted_by).await?;

    let model = expense_claim::ActiveModel {
        program_id: Set(program_id),
        category_id: Set(category_id),
        amount: Set(amount),
        description: Set(description),
        transaction_date: Set(transaction_date),
        submitted_by: Set(submitted_by),
        status: Set(CLAIM_PENDING.to_string()),
        rejection_note: Set(None),
        decided_by: Set(None),
        decided_at: Set(None),
        submitted_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    store.store_for_claim(&txn, created.id, upload).await?;

    txn.commit().await?;

    info!(
        claim_id = created.id,
        program_id, category_id, amount, "expense claim submitted"
    );
    Ok(created)
}

/// Retrieves a specific expense claim by its unique ID.
pub async fn get_claim_by_id<C>(db: &C, claim_id: i64) -> Result<Option<expense_claim::Model>>
where
    C: ConnectionTrait,
{
    ExpenseClaim::find_by_id(claim_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a program's expense claims matching the filter, newest submission
/// first. The result is finite and the query can be re-run from the start
/// at any time.
pub async fn list_claims(
    db: &DatabaseConnection,
    program_id: i64,
    filter: &ClaimFilter,
) -> Result<Vec<expense_claim::Model>> {
    let mut query =
        ExpenseClaim::find().filter(expense_claim::Column::ProgramId.eq(program_id));

    if let Some(status) = &filter.status {
        query = query.filter(expense_claim::Column::Status.eq(status.as_str()));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(expense_claim::Column::CategoryId.eq(category_id));
    }
    if let Some(search) = &filter.search {
        // SQLite LIKE is case-insensitive for ASCII
        query = query.filter(expense_claim::Column::Description.contains(search.as_str()));
    }

    query
        .order_by_desc(expense_claim::Column::SubmittedAt)
        .order_by_desc(expense_claim::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Checks that `user_id` sits on the program roster, with any role.
async fn require_member<C>(db: &C, program_id: i64, user_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    use crate::entities::ProgramMember;

    let member = ProgramMember::find()
        .filter(program_member::Column::ProgramId.eq(program_id))
        .filter(program_member::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    if member.is_none() {
        return Err(Error::validation(format!(
            "User {user_id} is not a member of this program"
        )));
    }
    Ok(())
}
