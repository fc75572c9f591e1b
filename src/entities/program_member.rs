//! Program member entity - One row per user on a program's roster.
//!
//! A roster holds at most five members. The role decides what a member may
//! do: only `"admin"` members decide expense claims.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Program member database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program_members")]
pub struct Model {
    /// Unique identifier for the roster entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the program this roster entry belongs to
    pub program_id: i64,
    /// External user ID of the member
    pub user_id: String,
    /// Display name of the member
    pub name: String,
    /// Role: `"admin"`, `"ketua"`, `"bendahara"`, or `"anggota"`
    pub role: String,
}

/// Defines relationships between `ProgramMember` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each roster entry belongs to one program
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
