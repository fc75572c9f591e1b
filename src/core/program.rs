//! Program lifecycle business logic.
//!
//! A program is the container for a budget plan, its ledger, and a small
//! member roster. Lifecycle: `draft -> active` (one-way, freezes the budget
//! plan), `active -> closed`, and `draft|active -> cancelled`; closed and
//! cancelled are terminal. Roster membership is capped and role-checked here;
//! the approval workflow calls [`require_admin`] to authorize deciders with
//! an explicit actor identity rather than ambient session state.

use crate::{
    core::audit,
    entities::{Program, ProgramMember, program, program_member},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Program status: budget plan still editable, claims not yet accepted.
pub const STATUS_DRAFT: &str = "draft";
/// Program status: budget plan frozen, claims and transactions accepted.
pub const STATUS_ACTIVE: &str = "active";
/// Program status: period finished normally. Terminal.
pub const STATUS_CLOSED: &str = "closed";
/// Program status: abandoned before completion. Terminal.
pub const STATUS_CANCELLED: &str = "cancelled";

/// Roster role with decision authority over claims and lifecycle.
pub const ROLE_ADMIN: &str = "admin";
/// Roster role: program chair.
pub const ROLE_KETUA: &str = "ketua";
/// Roster role: treasurer.
pub const ROLE_BENDAHARA: &str = "bendahara";
/// Roster role: ordinary member.
pub const ROLE_ANGGOTA: &str = "anggota";

const VALID_ROLES: [&str; 4] = [ROLE_ADMIN, ROLE_KETUA, ROLE_BENDAHARA, ROLE_ANGGOTA];

/// Maximum number of members on a program roster, including the creator.
pub const MAX_ROSTER_SIZE: u64 = 5;

/// Creates a new program in draft status and seats its creator on the roster
/// as admin.
///
/// Validates that the name is non-empty and that the period end date is not
/// before the start date.
pub async fn create_program(
    db: &DatabaseConnection,
    name: String,
    description: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    creator_user_id: String,
    creator_name: String,
) -> Result<program::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Program name cannot be empty"));
    }
    if end_date < start_date {
        return Err(Error::validation(format!(
            "Program end date {end_date} is before start date {start_date}"
        )));
    }

    let txn = db.begin().await?;

    let model = program::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        status: Set(STATUS_DRAFT.to_string()),
        start_date: Set(start_date),
        end_date: Set(end_date),
        created_by: Set(creator_user_id.clone()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    let member = program_member::ActiveModel {
        program_id: Set(created.id),
        user_id: Set(creator_user_id),
        name: Set(creator_name),
        role: Set(ROLE_ADMIN.to_string()),
        ..Default::default()
    };
    member.insert(&txn).await?;

    txn.commit().await?;

    info!(program_id = created.id, name = %created.name, "created program");
    Ok(created)
}

/// Finds a program by its unique ID.
pub async fn get_program_by_id<C>(db: &C, program_id: i64) -> Result<Option<program::Model>>
where
    C: ConnectionTrait,
{
    Program::find_by_id(program_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a program or fails with `NotFound`. Shared guard for ledger and
/// allocation operations.
pub async fn require_program<C>(db: &C, program_id: i64) -> Result<program::Model>
where
    C: ConnectionTrait,
{
    get_program_by_id(db, program_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "program",
            id: program_id.to_string(),
        })
}

/// Retrieves all programs, newest first.
pub async fn get_all_programs(db: &DatabaseConnection) -> Result<Vec<program::Model>> {
    Program::find()
        .order_by_desc(program::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Activates a draft program, freezing its budget plan.
///
/// This is a one-way transition: once active, RAB categories can no longer
/// be created, edited, or deleted.
pub async fn activate_program(
    db: &DatabaseConnection,
    program_id: i64,
    actor: &str,
) -> Result<program::Model> {
    transition_status(db, program_id, actor, STATUS_ACTIVE, &[STATUS_DRAFT]).await
}

/// Closes an active program. Terminal.
pub async fn close_program(
    db: &DatabaseConnection,
    program_id: i64,
    actor: &str,
) -> Result<program::Model> {
    transition_status(db, program_id, actor, STATUS_CLOSED, &[STATUS_ACTIVE]).await
}

/// Cancels a draft or active program. Terminal.
pub async fn cancel_program(
    db: &DatabaseConnection,
    program_id: i64,
    actor: &str,
) -> Result<program::Model> {
    transition_status(
        db,
        program_id,
        actor,
        STATUS_CANCELLED,
        &[STATUS_DRAFT, STATUS_ACTIVE],
    )
    .await
}

/// Performs a status transition after validating the current state and the
/// actor's admin role. Records the transition in the audit log.
async fn transition_status(
    db: &DatabaseConnection,
    program_id: i64,
    actor: &str,
    target: &str,
    allowed_from: &[&str],
) -> Result<program::Model> {
    let txn = db.begin().await?;

    let prog = require_program(&txn, program_id).await?;
    require_admin(&txn, program_id, actor).await?;

    if !allowed_from.contains(&prog.status.as_str()) {
        return Err(Error::invalid_state(format!(
            "Cannot move program '{}' from {} to {target}",
            prog.name, prog.status
        )));
    }

    let old_status = prog.status.clone();
    let mut active: program::ActiveModel = prog.into();
    active.status = Set(target.to_string());
    let updated = active.update(&txn).await?;

    audit::record(
        &txn,
        program_id,
        actor,
        &format!("program.{target}"),
        &format!("Status changed from {old_status} to {target}"),
    )
    .await?;

    txn.commit().await?;

    info!(program_id, from = %old_status, to = %target, "program status changed");
    Ok(updated)
}

/// Adds a member to the program roster.
///
/// Fails with `Validation` for an unknown role or a full roster, `Conflict`
/// if the user already sits on the roster, and `InvalidState` when the
/// program is closed or cancelled.
pub async fn add_member(
    db: &DatabaseConnection,
    program_id: i64,
    user_id: String,
    name: String,
    role: String,
) -> Result<program_member::Model> {
    if !VALID_ROLES.contains(&role.as_str()) {
        return Err(Error::validation(format!("Unknown role: {role}")));
    }
    if name.trim().is_empty() {
        return Err(Error::validation("Member name cannot be empty"));
    }

    let prog = require_program(db, program_id).await?;
    if prog.status == STATUS_CLOSED || prog.status == STATUS_CANCELLED {
        return Err(Error::invalid_state(format!(
            "Cannot modify the roster of a {} program",
            prog.status
        )));
    }

    let existing = ProgramMember::find()
        .filter(program_member::Column::ProgramId.eq(program_id))
        .filter(program_member::Column::UserId.eq(user_id.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: format!("User {user_id} is already a member of this program"),
        });
    }

    let count = ProgramMember::find()
        .filter(program_member::Column::ProgramId.eq(program_id))
        .count(db)
        .await?;
    if count >= MAX_ROSTER_SIZE {
        return Err(Error::validation(format!(
            "Program roster is full ({MAX_ROSTER_SIZE} members maximum)"
        )));
    }

    let member = program_member::ActiveModel {
        program_id: Set(program_id),
        user_id: Set(user_id),
        name: Set(name.trim().to_string()),
        role: Set(role),
        ..Default::default()
    };

    member.insert(db).await.map_err(Into::into)
}

/// Removes a member from the roster.
///
/// The last remaining admin cannot be removed, otherwise nobody could ever
/// decide the program's pending claims.
pub async fn remove_member(db: &DatabaseConnection, program_id: i64, user_id: &str) -> Result<()> {
    let member = ProgramMember::find()
        .filter(program_member::Column::ProgramId.eq(program_id))
        .filter(program_member::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "program member",
            id: user_id.to_string(),
        })?;

    if member.role == ROLE_ADMIN {
        let admin_count = ProgramMember::find()
            .filter(program_member::Column::ProgramId.eq(program_id))
            .filter(program_member::Column::Role.eq(ROLE_ADMIN))
            .count(db)
            .await?;
        if admin_count <= 1 {
            return Err(Error::Conflict {
                message: "Cannot remove the last admin from a program".to_string(),
            });
        }
    }

    member.delete(db).await?;
    Ok(())
}

/// Retrieves the program roster, ordered alphabetically by member name.
pub async fn list_members(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<Vec<program_member::Model>> {
    ProgramMember::find()
        .filter(program_member::Column::ProgramId.eq(program_id))
        .order_by_asc(program_member::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Verifies that `user_id` sits on the program roster with the admin role.
///
/// Used by the approval workflow and lifecycle transitions; the actor
/// identity is passed explicitly on every call.
pub async fn require_admin<C>(
    db: &C,
    program_id: i64,
    user_id: &str,
) -> Result<program_member::Model>
where
    C: ConnectionTrait,
{
    let member = ProgramMember::find()
        .filter(program_member::Column::ProgramId.eq(program_id))
        .filter(program_member::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "program member",
            id: user_id.to_string(),
        })?;

    if member.role != ROLE_ADMIN {
        return Err(Error::validation(format!(
            "User {user_id} has role '{}' but this operation requires admin",
            member.role
        )));
    }

    Ok(member)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_program_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_program(
            &db,
            String::new(),
            None,
            date(2025, 1, 1),
            date(2025, 6, 30),
            "admin1".to_string(),
            "Admin".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // End before start
        let result = create_program(
            &db,
            "Backwards".to_string(),
            None,
            date(2025, 6, 30),
            date(2025, 1, 1),
            "admin1".to_string(),
            "Admin".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_program_seats_creator_as_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Test Program").await?;

        assert_eq!(prog.status, STATUS_DRAFT);

        let members = list_members(&db, prog.id).await?;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, "admin1");
        assert_eq!(members[0].role, ROLE_ADMIN);

        Ok(())
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Lifecycle").await?;

        // draft -> active
        let prog = activate_program(&db, prog.id, "admin1").await?;
        assert_eq!(prog.status, STATUS_ACTIVE);

        // active -> active is not a legal transition
        let result = activate_program(&db, prog.id, "admin1").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidState { .. }));

        // active -> closed
        let prog = close_program(&db, prog.id, "admin1").await?;
        assert_eq!(prog.status, STATUS_CLOSED);

        // closed is terminal
        let result = cancel_program(&db, prog.id, "admin1").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidState { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_from_draft() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Doomed").await?;

        let prog = cancel_program(&db, prog.id, "admin1").await?;
        assert_eq!(prog.status, STATUS_CANCELLED);

        // Cancelled is terminal
        let result = activate_program(&db, prog.id, "admin1").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidState { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_transition_requires_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Guarded").await?;

        add_member(
            &db,
            prog.id,
            "member1".to_string(),
            "Budi".to_string(),
            ROLE_ANGGOTA.to_string(),
        )
        .await?;

        // Ordinary member cannot activate
        let result = activate_program(&db, prog.id, "member1").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Stranger is not found on the roster at all
        let result = activate_program(&db, prog.id, "stranger").await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_member_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Roster").await?;

        let result = add_member(
            &db,
            prog.id,
            "u2".to_string(),
            "Siti".to_string(),
            "supreme_leader".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = add_member(
            &db,
            prog.id,
            "u2".to_string(),
            "   ".to_string(),
            ROLE_ANGGOTA.to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_roster_cap_and_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Full House").await?;

        // Creator occupies one seat; four more fill the roster
        for i in 2..=5 {
            add_member(
                &db,
                prog.id,
                format!("u{i}"),
                format!("Member {i}"),
                ROLE_ANGGOTA.to_string(),
            )
            .await?;
        }

        let result = add_member(
            &db,
            prog.id,
            "u6".to_string(),
            "One Too Many".to_string(),
            ROLE_ANGGOTA.to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Duplicate user
        let result = add_member(
            &db,
            prog.id,
            "u2".to_string(),
            "Again".to_string(),
            ROLE_ANGGOTA.to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_member_last_admin_guard() -> Result<()> {
        let db = setup_test_db().await?;
        let prog = create_test_program(&db, "Admins").await?;

        let result = remove_member(&db, prog.id, "admin1").await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        // With a second admin, removal is fine
        add_member(
            &db,
            prog.id,
            "admin2".to_string(),
            "Second Admin".to_string(),
            ROLE_ADMIN.to_string(),
        )
        .await?;
        remove_member(&db, prog.id, "admin1").await?;

        let members = list_members(&db, prog.id).await?;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, "admin2");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_programs() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_program(&db, "One").await?;
        create_test_program(&db, "Two").await?;

        let programs = get_all_programs(&db).await?;
        assert_eq!(programs.len(), 2);

        Ok(())
    }
}
