//! Database configuration module for `RabLedger`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    AuditLog, ExpenseClaim, LedgerTransaction, Program, ProgramMember, RabCategory, Receipt,
    TransactionAllocation,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the `SQLite` database at the given URL.
///
/// This function handles connection errors and provides a clean interface for
/// database access throughout the application.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct
/// definitions. It creates tables for programs, rosters, RAB categories, transactions,
/// allocations, expense claims, receipts, and the audit log.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let program_table = schema.create_table_from_entity(Program);
    let member_table = schema.create_table_from_entity(ProgramMember);
    let category_table = schema.create_table_from_entity(RabCategory);
    let transaction_table = schema.create_table_from_entity(LedgerTransaction);
    let allocation_table = schema.create_table_from_entity(TransactionAllocation);
    let claim_table = schema.create_table_from_entity(ExpenseClaim);
    let receipt_table = schema.create_table_from_entity(Receipt);
    let audit_table = schema.create_table_from_entity(AuditLog);

    db.execute(builder.build(&program_table)).await?;
    db.execute(builder.build(&member_table)).await?;
    db.execute(builder.build(&category_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&allocation_table)).await?;
    db.execute(builder.build(&claim_table)).await?;
    db.execute(builder.build(&receipt_table)).await?;
    db.execute(builder.build(&audit_table)).await?;

    Ok(())
}
