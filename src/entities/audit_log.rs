//! Audit log entity - Append-only record of decisions and lifecycle changes.
//!
//! Every approval, rejection and program transition writes one row so the
//! organization can reconstruct who decided what and when.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the program the action happened in
    pub program_id: i64,
    /// User ID of the actor who performed the action
    pub actor: String,
    /// Machine-readable action name (e.g., `"claim.approved"`)
    pub action: String,
    /// Human-readable detail of what happened
    pub detail: String,
    /// When the action happened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `AuditLog` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log entry belongs to one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id"
    )]
    Program,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
