//! Transaction allocation entity - Splits an expense transaction across
//! RAB categories. The allocation amounts of one transaction must sum to the
//! transaction amount; the ledger enforces this at write time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction allocation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_allocations")]
pub struct Model {
    /// Unique identifier for the allocation row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the transaction being split
    pub transaction_id: i64,
    /// ID of the RAB category this slice is attributed to
    pub category_id: i64,
    /// Portion of the transaction amount attributed to the category
    pub amount: f64,
}

/// Defines relationships between `TransactionAllocation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each allocation belongs to one transaction
    #[sea_orm(
        belongs_to = "super::ledger_transaction::Entity",
        from = "Column::TransactionId",
        to = "super::ledger_transaction::Column::Id"
    )]
    Transaction,
    /// Each allocation references one RAB category
    #[sea_orm(
        belongs_to = "super::rab_category::Entity",
        from = "Column::CategoryId",
        to = "super::rab_category::Column::Id"
    )]
    Category,
}

impl Related<super::ledger_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::rab_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
