//! Dashboard aggregation business logic.
//!
//! Pure read-side projections over the allocation store and the ledger.
//! Nothing here mutates state, and every figure reflects committed state
//! only: pending claims are excluded from all totals, consistent with the
//! approval workflow's rule that budgets move only on decision.

use crate::{
    core::{ledger, program},
    entities::{ExpenseClaim, expense_claim},
    errors::Result,
};
use sea_orm::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// Program-level money totals.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramSummary {
    /// Sum of all category allocations
    pub total_budget: f64,
    /// Sum of income transactions
    pub total_income: f64,
    /// Sum of approved claims plus expense-type transactions
    pub total_expense: f64,
    /// `total_income - total_expense`
    pub balance: f64,
}

/// One category's allocation versus committed spend.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    /// Category ID
    pub id: i64,
    /// Category name
    pub name: String,
    /// Allocated amount (`total_budget`)
    pub allocated: f64,
    /// Approved claim amounts against the category
    pub spent: f64,
    /// `allocated - spent`
    pub remaining: f64,
}

/// One member's committed spending.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSpending {
    /// Submitter user ID
    pub user_id: String,
    /// Display name from the roster, or the user ID when no longer seated
    pub name: String,
    /// Sum of the member's approved claim amounts
    pub amount: f64,
}

/// Full dashboard payload for one program.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Program-level totals
    pub program: ProgramSummary,
    /// Per-category breakdown
    pub category_breakdown: Vec<CategoryBreakdown>,
    /// Per-member committed spending
    pub member_spending: Vec<MemberSpending>,
}

/// Computes program-level totals from committed state.
pub async fn get_program_summary(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<ProgramSummary> {
    program::require_program(db, program_id).await?;

    let categories = crate::core::allocation::list_categories(db, program_id).await?;
    let total_budget: f64 = categories.iter().map(|c| c.total_budget).sum();

    let transactions = ledger::list_transactions(db, program_id, None).await?;
    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.kind == ledger::KIND_INCOME)
        .map(|t| t.amount)
        .sum();
    let settled_expense: f64 = transactions
        .iter()
        .filter(|t| t.kind == ledger::KIND_EXPENSE)
        .map(|t| t.amount)
        .sum();

    let approved_claims = approved_claims_for_program(db, program_id).await?;
    let claimed_expense: f64 = approved_claims.iter().map(|c| c.amount).sum();

    let total_expense = settled_expense + claimed_expense;

    Ok(ProgramSummary {
        total_budget,
        total_income,
        total_expense,
        balance: total_income - total_expense,
    })
}

/// Computes the per-category breakdown of allocation versus approved spend.
///
/// Spent figures are derived from approved claims only; a pending claim
/// leaves the breakdown unchanged until it is decided.
pub async fn get_category_breakdown(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<Vec<CategoryBreakdown>> {
    program::require_program(db, program_id).await?;

    let categories = crate::core::allocation::list_categories(db, program_id).await?;
    let approved_claims = approved_claims_for_program(db, program_id).await?;

    let mut spent_by_category: HashMap<i64, f64> = HashMap::new();
    for claim in &approved_claims {
        *spent_by_category.entry(claim.category_id).or_insert(0.0) += claim.amount;
    }

    Ok(categories
        .into_iter()
        .map(|c| {
            let spent = spent_by_category.get(&c.id).copied().unwrap_or(0.0);
            CategoryBreakdown {
                id: c.id,
                name: c.name,
                allocated: c.total_budget,
                spent,
                remaining: c.total_budget - spent,
            }
        })
        .collect())
}

/// Computes per-member sums of approved claim amounts, largest spender
/// first. Members with no approved claims are omitted.
pub async fn get_member_spending(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<Vec<MemberSpending>> {
    program::require_program(db, program_id).await?;

    let approved_claims = approved_claims_for_program(db, program_id).await?;
    let roster = program::list_members(db, program_id).await?;
    let names: HashMap<&str, &str> = roster
        .iter()
        .map(|m| (m.user_id.as_str(), m.name.as_str()))
        .collect();

    let mut by_member: HashMap<String, f64> = HashMap::new();
    for claim in &approved_claims {
        *by_member.entry(claim.submitted_by.clone()).or_insert(0.0) += claim.amount;
    }

    let mut spending: Vec<MemberSpending> = by_member
        .into_iter()
        .map(|(user_id, amount)| {
            let name = names.get(user_id.as_str()).map_or_else(
                || user_id.clone(),
                |n| (*n).to_string(),
            );
            MemberSpending {
                user_id,
                name,
                amount,
            }
        })
        .collect();
    spending.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    Ok(spending)
}

/// Bundles the three projections into the dashboard payload.
pub async fn get_dashboard(db: &DatabaseConnection, program_id: i64) -> Result<DashboardSummary> {
    Ok(DashboardSummary {
        program: get_program_summary(db, program_id).await?,
        category_breakdown: get_category_breakdown(db, program_id).await?,
        member_spending: get_member_spending(db, program_id).await?,
    })
}

async fn approved_claims_for_program(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<Vec<expense_claim::Model>> {
    ExpenseClaim::find()
        .filter(expense_claim::Column::ProgramId.eq(program_id))
        .filter(expense_claim::Column::Status.eq(ledger::CLAIM_APPROVED))
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::approval::approve_claim;
    use crate::core::ledger::{AllocationInput, KIND_EXPENSE, KIND_INCOME, record_transaction};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_summary_unknown_program() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_program_summary(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            crate::errors::Error::NotFound { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_mixes_transactions_and_approved_claims() -> Result<()> {
        let (db, prog, cat) = setup_active_program_with_category(2_000_000.0).await?;

        record_transaction(
            &db,
            prog.id,
            KIND_INCOME,
            3_000_000.0,
            date(2025, 2, 1),
            "Dana hibah".to_string(),
            "admin1".to_string(),
            vec![],
        )
        .await?;
        record_transaction(
            &db,
            prog.id,
            KIND_EXPENSE,
            400_000.0,
            date(2025, 2, 5),
            "Belanja langsung".to_string(),
            "admin1".to_string(),
            vec![AllocationInput {
                category_id: cat.id,
                amount: 400_000.0,
            }],
        )
        .await?;

        let claim = submit_test_claim(&db, prog.id, cat.id, 600_000.0).await?;
        approve_claim(&db, claim.id, "admin1").await?;

        let summary = get_program_summary(&db, prog.id).await?;
        assert_eq!(summary.total_budget, 2_000_000.0);
        assert_eq!(summary.total_income, 3_000_000.0);
        assert_eq!(summary.total_expense, 1_000_000.0); // 400k settled + 600k approved
        assert_eq!(summary.balance, 2_000_000.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_breakdown_excludes_pending_claims() -> Result<()> {
        let (db, prog, cat) = setup_active_program_with_category(1_000_000.0).await?;

        // Pending claim leaves the breakdown unchanged
        let claim = submit_test_claim(&db, prog.id, cat.id, 500_000.0).await?;
        let breakdown = get_category_breakdown(&db, prog.id).await?;
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].spent, 0.0);
        assert_eq!(breakdown[0].remaining, 1_000_000.0);

        // After approval the remaining moves
        approve_claim(&db, claim.id, "admin1").await?;
        let breakdown = get_category_breakdown(&db, prog.id).await?;
        assert_eq!(breakdown[0].spent, 500_000.0);
        assert_eq!(breakdown[0].remaining, 500_000.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_claims_never_counted() -> Result<()> {
        let (db, prog, cat) = setup_active_program_with_category(1_000_000.0).await?;

        let claim = submit_test_claim(&db, prog.id, cat.id, 500_000.0).await?;
        crate::core::approval::reject_claim(&db, claim.id, "admin1", "bukti kurang").await?;

        let breakdown = get_category_breakdown(&db, prog.id).await?;
        assert_eq!(breakdown[0].spent, 0.0);

        let summary = get_program_summary(&db, prog.id).await?;
        assert_eq!(summary.total_expense, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_member_spending_groups_by_submitter() -> Result<()> {
        let (db, prog, cat) = setup_active_program_with_category(5_000_000.0).await?;

        // member1 is seated by the fixture; two approved claims for them
        let a = submit_test_claim(&db, prog.id, cat.id, 300_000.0).await?;
        let b = submit_test_claim(&db, prog.id, cat.id, 200_000.0).await?;
        approve_claim(&db, a.id, "admin1").await?;
        approve_claim(&db, b.id, "admin1").await?;

        // One left pending must not appear in the totals
        submit_test_claim(&db, prog.id, cat.id, 999_000.0).await?;

        let spending = get_member_spending(&db, prog.id).await?;
        assert_eq!(spending.len(), 1);
        assert_eq!(spending[0].user_id, "member1");
        assert_eq!(spending[0].name, "Budi");
        assert_eq!(spending[0].amount, 500_000.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_bundle() -> Result<()> {
        let (db, prog, cat) = setup_active_program_with_category(1_000_000.0).await?;

        let claim = submit_test_claim(&db, prog.id, cat.id, 250_000.0).await?;
        approve_claim(&db, claim.id, "admin1").await?;

        let dashboard = get_dashboard(&db, prog.id).await?;
        assert_eq!(dashboard.program.total_budget, 1_000_000.0);
        assert_eq!(dashboard.category_breakdown.len(), 1);
        assert_eq!(dashboard.category_breakdown[0].remaining, 750_000.0);
        assert_eq!(dashboard.member_spending.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_program_dashboard() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Empty").await?;

        let dashboard = get_dashboard(&db, prog.id).await?;
        assert_eq!(dashboard.program.total_budget, 0.0);
        assert_eq!(dashboard.program.balance, 0.0);
        assert!(dashboard.category_breakdown.is_empty());
        assert!(dashboard.member_spending.is_empty());

        Ok(())
    }
}
