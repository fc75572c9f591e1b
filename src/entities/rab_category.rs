//! RAB category entity - One budget allocation line item of a program's plan.
//!
//! `total_budget` is derived (`volume * unit_price`) and stored at write time.
//! `realized_amount` is the portion consumed by approved expense claims and is
//! written exclusively by the approval workflow; the authoritative remaining
//! budget is always recomputed from approved claims, never from this column.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// RAB category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rab_categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the program whose budget plan this line belongs to
    pub program_id: i64,
    /// Human-readable name of the line item (e.g., "Konsumsi Peserta")
    pub name: String,
    /// Free-form category tag for grouping (e.g., "konsumsi", "perlengkapan")
    pub category: String,
    /// Unit of measure (e.g., "box", "orang", "paket")
    pub unit: String,
    /// Number of units budgeted
    pub volume: f64,
    /// Price per unit in rupiah
    pub unit_price: f64,
    /// Allocated amount, `volume * unit_price`
    pub total_budget: f64,
    /// Sum of approved expense claim amounts against this category
    pub realized_amount: f64,
    /// Optional planning notes
    pub notes: Option<String>,
    /// Soft delete flag - if true, category is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between `RabCategory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category belongs to one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id"
    )]
    Program,
    /// One category has many expense claims
    #[sea_orm(has_many = "super::expense_claim::Entity")]
    ExpenseClaims,
    /// One category has many transaction allocations
    #[sea_orm(has_many = "super::transaction_allocation::Entity")]
    TransactionAllocations,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::expense_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseClaims.def()
    }
}

impl Related<super::transaction_allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
