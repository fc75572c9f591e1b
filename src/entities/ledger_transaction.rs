//! Ledger transaction entity - An already-settled cash movement.
//!
//! Transactions are distinct from expense claims: they record money that has
//! actually moved (income or settled expense) and require no approval.
//! Expense-type transactions may carry allocation rows splitting the amount
//! across RAB categories.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the program this transaction belongs to
    pub program_id: i64,
    /// Kind of movement: `"income"` or `"expense"`
    pub kind: String,
    /// Transaction amount in rupiah, always positive
    pub amount: f64,
    /// Human-readable description of the transaction
    pub description: String,
    /// Business date the money moved
    pub transaction_date: Date,
    /// User ID of the member who recorded the transaction
    pub created_by: String,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `LedgerTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id"
    )]
    Program,
    /// One transaction has zero or more category allocations
    #[sea_orm(has_many = "super::transaction_allocation::Entity")]
    Allocations,
    /// One transaction owns zero or more receipts
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::transaction_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
