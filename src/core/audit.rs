//! Audit log business logic.
//!
//! Append-only record of decisions and lifecycle changes, written inside the
//! same database transaction as the change it describes so the log can never
//! drift from the ledger.

use crate::{
    entities::{AuditLog, audit_log},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Appends one audit entry. Called by the approval workflow and program
/// lifecycle transitions with the transaction they run in.
pub async fn record<C>(
    db: &C,
    program_id: i64,
    actor: &str,
    action: &str,
    detail: &str,
) -> Result<audit_log::Model>
where
    C: ConnectionTrait,
{
    let entry = audit_log::ActiveModel {
        program_id: Set(program_id),
        actor: Set(actor.to_string()),
        action: Set(action.to_string()),
        detail: Set(detail.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    entry.insert(db).await.map_err(Into::into)
}

/// Retrieves a program's audit trail, newest entries first.
pub async fn list_for_program(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<Vec<audit_log::Model>> {
    AuditLog::find()
        .filter(audit_log::Column::ProgramId.eq(program_id))
        .order_by_desc(audit_log::Column::CreatedAt)
        .order_by_desc(audit_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
