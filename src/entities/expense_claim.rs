//! Expense claim entity - A member's request to spend against a budget category.
//!
//! Lifecycle: created as `"pending"` by a non-admin member, then decided
//! exactly once by an admin into `"approved"` or `"rejected"`. Both decisions
//! are terminal; an approved claim is reversed only by a compensating
//! transaction, never by a state transition. Pending claims do not affect
//! the category's realized amount.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense claim database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_claims")]
pub struct Model {
    /// Unique identifier for the claim
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the program this claim belongs to
    pub program_id: i64,
    /// ID of the RAB category the claim spends against
    pub category_id: i64,
    /// Claimed amount in rupiah, always positive
    pub amount: f64,
    /// Human-readable description of the expense
    pub description: String,
    /// Business date of the expense
    pub transaction_date: Date,
    /// User ID of the submitting member
    pub submitted_by: String,
    /// Lifecycle status: `"pending"`, `"approved"`, or `"rejected"`
    pub status: String,
    /// Mandatory explanation stored when the claim is rejected
    pub rejection_note: Option<String>,
    /// User ID of the admin who decided the claim, if decided
    pub decided_by: Option<String>,
    /// When the claim was decided, if decided
    pub decided_at: Option<DateTimeUtc>,
    /// When the claim was submitted
    pub submitted_at: DateTimeUtc,
}

/// Defines relationships between `ExpenseClaim` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each claim belongs to one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id"
    )]
    Program,
    /// Each claim spends against one RAB category
    #[sea_orm(
        belongs_to = "super::rab_category::Entity",
        from = "Column::CategoryId",
        to = "super::rab_category::Column::Id"
    )]
    Category,
    /// One claim owns its attached receipts
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::rab_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
