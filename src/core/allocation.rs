//! Budget allocation store - CRUD for RAB categories.
//!
//! Categories (budget line items) are editable only while their program is in
//! draft; activation freezes the plan. The remaining budget of a category is
//! always recomputed from the ledger's approved-claims view rather than read
//! from the cached `realized_amount` column, so callers can never observe a
//! stale figure.

use crate::{
    core::{ledger, program},
    entities::{ExpenseClaim, RabCategory, expense_claim, rab_category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Input for creating or updating a RAB category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    /// Line item name
    pub name: String,
    /// Free-form grouping tag
    pub category: String,
    /// Unit of measure
    pub unit: String,
    /// Number of units budgeted, must be positive
    pub volume: f64,
    /// Price per unit in rupiah, must be positive
    pub unit_price: f64,
    /// Optional planning notes
    pub notes: Option<String>,
}

fn validate_input(input: &CategoryInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }
    if !(input.volume.is_finite() && input.volume > 0.0) {
        return Err(Error::validation(format!(
            "Volume must be positive, got {}",
            input.volume
        )));
    }
    if !(input.unit_price.is_finite() && input.unit_price > 0.0) {
        return Err(Error::validation(format!(
            "Unit price must be positive, got {}",
            input.unit_price
        )));
    }
    Ok(())
}

/// Loads the owning program and checks it is still in draft.
async fn require_draft_program(db: &DatabaseConnection, program_id: i64) -> Result<()> {
    let prog = program::require_program(db, program_id).await?;
    if prog.status != program::STATUS_DRAFT {
        return Err(Error::invalid_state(format!(
            "Budget plan of program '{}' is frozen (status: {})",
            prog.name, prog.status
        )));
    }
    Ok(())
}

/// Creates a RAB category on a draft program's budget plan.
///
/// `total_budget` is derived as `volume * unit_price`; `realized_amount`
/// starts at zero and is only ever written by the approval workflow.
pub async fn create_category(
    db: &DatabaseConnection,
    program_id: i64,
    input: CategoryInput,
) -> Result<rab_category::Model> {
    validate_input(&input)?;
    require_draft_program(db, program_id).await?;

    let model = rab_category::ActiveModel {
        program_id: Set(program_id),
        name: Set(input.name.trim().to_string()),
        category: Set(input.category),
        unit: Set(input.unit),
        volume: Set(input.volume),
        unit_price: Set(input.unit_price),
        total_budget: Set(input.volume * input.unit_price),
        realized_amount: Set(0.0),
        notes: Set(input.notes),
        is_deleted: Set(false),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Updates the budget fields of a category while its program is still draft.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    input: CategoryInput,
) -> Result<rab_category::Model> {
    validate_input(&input)?;

    let existing = require_category(db, category_id).await?;
    require_draft_program(db, existing.program_id).await?;

    let mut active: rab_category::ActiveModel = existing.into();
    active.name = Set(input.name.trim().to_string());
    active.category = Set(input.category);
    active.unit = Set(input.unit);
    active.volume = Set(input.volume);
    active.unit_price = Set(input.unit_price);
    active.total_budget = Set(input.volume * input.unit_price);
    active.notes = Set(input.notes);

    active.update(db).await.map_err(Into::into)
}

/// Soft-deletes a category from a draft program's budget plan.
///
/// Fails with `Conflict` if any approved expense claim already references
/// the category; that spend is part of the realized ledger and must keep its
/// referent. The conflict guard runs before the draft guard so callers always
/// learn about the stronger obstacle first.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let existing = require_category(db, category_id).await?;

    let approved_refs = ExpenseClaim::find()
        .filter(expense_claim::Column::CategoryId.eq(category_id))
        .filter(expense_claim::Column::Status.eq(ledger::CLAIM_APPROVED))
        .count(db)
        .await?;
    if approved_refs > 0 {
        return Err(Error::Conflict {
            message: format!(
                "Category '{}' is referenced by {approved_refs} approved expense claim(s)",
                existing.name
            ),
        });
    }

    require_draft_program(db, existing.program_id).await?;

    let mut active: rab_category::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.update(db).await?;
    Ok(())
}

/// Finds a category by ID, excluding soft-deleted ones.
pub async fn get_category_by_id<C>(db: &C, category_id: i64) -> Result<Option<rab_category::Model>>
where
    C: ConnectionTrait,
{
    let found = RabCategory::find_by_id(category_id).one(db).await?;
    Ok(found.filter(|c| !c.is_deleted))
}

/// Loads a category or fails with `NotFound`.
pub async fn require_category<C>(db: &C, category_id: i64) -> Result<rab_category::Model>
where
    C: ConnectionTrait,
{
    get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "RAB category",
            id: category_id.to_string(),
        })
}

/// Retrieves all active categories of a program, ordered alphabetically by name.
pub async fn list_categories(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<Vec<rab_category::Model>> {
    RabCategory::find()
        .filter(rab_category::Column::ProgramId.eq(program_id))
        .filter(rab_category::Column::IsDeleted.eq(false))
        .order_by_asc(rab_category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums the approved expense claim amounts against one category.
///
/// This is the ledger-derived view of realized spend; the approval workflow
/// keeps the cached `realized_amount` column in step with it, but reads for
/// budget decisions always come through here.
pub async fn approved_spend<C>(db: &C, category_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let claims = ExpenseClaim::find()
        .filter(expense_claim::Column::CategoryId.eq(category_id))
        .filter(expense_claim::Column::Status.eq(ledger::CLAIM_APPROVED))
        .all(db)
        .await?;

    Ok(claims.iter().map(|c| c.amount).sum())
}

/// Computes `total_budget - approved spend` for a category, recomputed from
/// the ledger on every call.
pub async fn get_remaining_budget<C>(db: &C, category_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let category = require_category(db, category_id).await?;
    let spent = approved_spend(db, category_id).await?;
    Ok(category.total_budget - spent)
}
