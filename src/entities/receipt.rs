//! Receipt entity - Metadata for a stored proof-of-purchase file.
//!
//! A receipt is exclusively owned by either an expense claim or a ledger
//! transaction (exactly one of the two foreign keys is set) and is deleted
//! together with its parent. The file itself lives on disk under the
//! configured storage directory; only the path is stored here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Receipt database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    /// Unique identifier for the receipt
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning expense claim, if attached to a claim
    pub expense_claim_id: Option<i64>,
    /// Owning ledger transaction, if attached to a transaction
    pub transaction_id: Option<i64>,
    /// Path of the stored file, relative to the storage directory
    pub file_path: String,
    /// Filename as uploaded by the user
    pub original_filename: String,
    /// MIME type: `"image/jpeg"`, `"image/png"`, or `"application/pdf"`
    pub content_type: String,
    /// File size in bytes (capped at 2 MiB)
    pub size_bytes: i64,
    /// When the file was uploaded
    pub uploaded_at: DateTimeUtc,
}

/// Defines relationships between Receipt and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional owning expense claim
    #[sea_orm(
        belongs_to = "super::expense_claim::Entity",
        from = "Column::ExpenseClaimId",
        to = "super::expense_claim::Column::Id"
    )]
    ExpenseClaim,
    /// Optional owning ledger transaction
    #[sea_orm(
        belongs_to = "super::ledger_transaction::Entity",
        from = "Column::TransactionId",
        to = "super::ledger_transaction::Column::Id"
    )]
    Transaction,
}

impl Related<super::expense_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseClaim.def()
    }
}

impl Related<super::ledger_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
