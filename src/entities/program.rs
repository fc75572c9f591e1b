//! Program entity - Represents a budgeting period/project.
//!
//! A program owns a budget plan (RAB categories), a ledger of transactions
//! and expense claims, and a small member roster. The budget plan is editable
//! only while the program is in `"draft"`; activation freezes it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Program database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "programs")]
pub struct Model {
    /// Unique identifier for the program
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the program (e.g., "Dies Natalis 2025")
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Lifecycle status: `"draft"`, `"active"`, `"closed"`, or `"cancelled"`
    pub status: String,
    /// First day of the budgeting period
    pub start_date: Date,
    /// Last day of the budgeting period
    pub end_date: Date,
    /// User ID of the admin who created the program
    pub created_by: String,
    /// When the program was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Program and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One program has many RAB categories
    #[sea_orm(has_many = "super::rab_category::Entity")]
    RabCategories,
    /// One program has many ledger transactions
    #[sea_orm(has_many = "super::ledger_transaction::Entity")]
    LedgerTransactions,
    /// One program has many expense claims
    #[sea_orm(has_many = "super::expense_claim::Entity")]
    ExpenseClaims,
    /// One program has a member roster
    #[sea_orm(has_many = "super::program_member::Entity")]
    Members,
}

impl Related<super::rab_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RabCategories.def()
    }
}

impl Related<super::ledger_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerTransactions.def()
    }
}

impl Related<super::expense_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseClaims.def()
    }
}

impl Related<super::program_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
