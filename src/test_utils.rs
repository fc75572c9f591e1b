//! Shared fixtures for unit tests.
//!
//! Every helper builds on an in-memory SQLite database so tests stay fast
//! and isolated from each other.
#![allow(clippy::unwrap_used)]

use crate::{
    config::database::create_tables,
    core::{
        allocation::{self, CategoryInput},
        ledger,
        program::{self, ROLE_ANGGOTA},
        receipt::{ReceiptStore, ReceiptUpload},
    },
    entities::{expense_claim, program as program_entity, rab_category},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

/// Creates a fresh in-memory database with all tables.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for building a `NaiveDate` in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a draft program named `name`, created by "admin1" who is seated
/// as the program admin.
pub async fn create_test_program(
    db: &DatabaseConnection,
    name: &str,
) -> Result<program_entity::Model> {
    program::create_program(
        db,
        name.to_string(),
        None,
        date(2025, 1, 1),
        date(2025, 12, 31),
        "admin1".to_string(),
        "Admin One".to_string(),
    )
    .await
}

/// Builds a `CategoryInput` with sensible defaults for the remaining fields.
pub fn category_input(name: &str, volume: f64, unit_price: f64) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        category: "Operasional".to_string(),
        unit: "paket".to_string(),
        volume,
        unit_price,
        notes: None,
    }
}

/// Full claim-workflow fixture: an active program with one category holding
/// `total_budget`, with "member1" (Budi, anggota) seated alongside the
/// admin. Categories must be created before activation, so the order here
/// matters.
pub async fn setup_active_program_with_category(
    total_budget: f64,
) -> Result<(
    DatabaseConnection,
    program_entity::Model,
    rab_category::Model,
)> {
    let db = setup_test_db().await?;
    let prog = create_test_program(&db, "Test Program").await?;
    let cat = allocation::create_category(
        &db,
        prog.id,
        category_input("Konsumsi", 1.0, total_budget),
    )
    .await?;
    program::add_member(
        &db,
        prog.id,
        "member1".to_string(),
        "Budi".to_string(),
        ROLE_ANGGOTA.to_string(),
    )
    .await?;
    let prog = program::activate_program(&db, prog.id, "admin1").await?;
    Ok((db, prog, cat))
}

/// A small valid JPEG-typed upload.
pub fn test_receipt_upload() -> ReceiptUpload {
    ReceiptUpload {
        original_filename: "nota.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02, 0x03],
    }
}

/// A receipt store rooted in the system temp directory, for tests that do
/// not inspect the files themselves.
pub fn test_receipt_store() -> ReceiptStore {
    ReceiptStore::new(std::env::temp_dir().join("rab_ledger_test_receipts"))
}

/// Submits a pending claim from "member1" using a throwaway receipt store.
pub async fn submit_test_claim(
    db: &DatabaseConnection,
    program_id: i64,
    category_id: i64,
    amount: f64,
) -> Result<expense_claim::Model> {
    submit_test_claim_with_store(db, &test_receipt_store(), program_id, category_id, amount).await
}

/// Same as [`submit_test_claim`] but through a caller-owned store, for
/// tests that assert on the stored files.
pub async fn submit_test_claim_with_store(
    db: &DatabaseConnection,
    store: &ReceiptStore,
    program_id: i64,
    category_id: i64,
    amount: f64,
) -> Result<expense_claim::Model> {
    ledger::submit_expense_claim(
        db,
        store,
        program_id,
        category_id,
        amount,
        "Konsumsi rapat".to_string(),
        date(2025, 3, 10),
        "member1".to_string(),
        test_receipt_upload(),
    )
    .await
}

/// Submits a pending claim with a caller-chosen description, for tests that
/// exercise the claim search filter.
pub async fn submit_claim_described(
    db: &DatabaseConnection,
    program_id: i64,
    category_id: i64,
    amount: f64,
    description: &str,
) -> Result<expense_claim::Model> {
    ledger::submit_expense_claim(
        db,
        &test_receipt_store(),
        program_id,
        category_id,
        amount,
        description.to_string(),
        date(2025, 3, 10),
        "member1".to_string(),
        test_receipt_upload(),
    )
    .await
}
