//! Receipt file storage business logic.
//!
//! Receipts are proof-of-purchase files (JPEG, PNG, or PDF, capped at 2 MiB)
//! exclusively owned by one expense claim or one ledger transaction. The
//! bytes live on disk under the store's root directory; the database row
//! carries only metadata and the relative path. Deleting the parent removes
//! its receipts, files included.

use crate::{
    config::settings::DEFAULT_MAX_RECEIPT_BYTES,
    entities::{Receipt, receipt},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use std::path::{Path, PathBuf};
use tracing::warn;

/// MIME types accepted for receipt uploads.
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// An uploaded receipt file, as received from the caller.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    /// Filename as provided by the uploader
    pub original_filename: String,
    /// Declared MIME type
    pub content_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Disk-backed receipt storage rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct ReceiptStore {
    root: PathBuf,
    max_bytes: u64,
}

impl ReceiptStore {
    /// Creates a store rooted at `root` with the default 2 MiB size cap.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: DEFAULT_MAX_RECEIPT_BYTES,
        }
    }

    /// Creates a store with a custom size cap.
    pub fn with_max_bytes(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Validates an upload against the size cap and accepted content types.
    pub fn validate(&self, upload: &ReceiptUpload) -> Result<()> {
        if upload.bytes.is_empty() {
            return Err(Error::validation("Receipt file is empty"));
        }
        if upload.bytes.len() as u64 > self.max_bytes {
            return Err(Error::validation(format!(
                "Receipt file is {} bytes, maximum is {} bytes",
                upload.bytes.len(),
                self.max_bytes
            )));
        }
        if !ACCEPTED_CONTENT_TYPES.contains(&upload.content_type.as_str()) {
            return Err(Error::validation(format!(
                "Receipt must be JPEG, PNG, or PDF, got '{}'",
                upload.content_type
            )));
        }
        Ok(())
    }

    /// Stores a receipt owned by an expense claim.
    pub async fn store_for_claim<C>(
        &self,
        db: &C,
        claim_id: i64,
        upload: ReceiptUpload,
    ) -> Result<receipt::Model>
    where
        C: ConnectionTrait,
    {
        self.store(db, Some(claim_id), None, upload).await
    }

    /// Stores a receipt owned by a ledger transaction.
    pub async fn store_for_transaction<C>(
        &self,
        db: &C,
        transaction_id: i64,
        upload: ReceiptUpload,
    ) -> Result<receipt::Model>
    where
        C: ConnectionTrait,
    {
        self.store(db, None, Some(transaction_id), upload).await
    }

    async fn store<C>(
        &self,
        db: &C,
        claim_id: Option<i64>,
        transaction_id: Option<i64>,
        upload: ReceiptUpload,
    ) -> Result<receipt::Model>
    where
        C: ConnectionTrait,
    {
        self.validate(&upload)?;

        let owner_tag = match (claim_id, transaction_id) {
            (Some(id), None) => format!("claim_{id}"),
            (None, Some(id)) => format!("txn_{id}"),
            _ => return Err(Error::validation("Receipt must have exactly one owner")),
        };

        let relative_path = format!(
            "{owner_tag}_{}_{}",
            chrono::Utc::now().timestamp_micros(),
            sanitize_filename(&upload.original_filename)
        );
        let full_path = self.root.join(&relative_path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, &upload.bytes).await?;

        let size_bytes = i64::try_from(upload.bytes.len()).map_err(Error::Conversion)?;
        let model = receipt::ActiveModel {
            expense_claim_id: Set(claim_id),
            transaction_id: Set(transaction_id),
            file_path: Set(relative_path),
            original_filename: Set(upload.original_filename),
            content_type: Set(upload.content_type),
            size_bytes: Set(size_bytes),
            uploaded_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let inserted = model.insert(db).await;
        if inserted.is_err() {
            // Do not leave an orphan file behind when the row insert fails
            if let Err(e) = tokio::fs::remove_file(&full_path).await {
                warn!(path = %full_path.display(), error = %e, "failed to clean up receipt file");
            }
        }
        inserted.map_err(Into::into)
    }

    /// Loads a receipt's metadata together with its file contents.
    pub async fn load(
        &self,
        db: &DatabaseConnection,
        receipt_id: i64,
    ) -> Result<(receipt::Model, Vec<u8>)> {
        let model = Receipt::find_by_id(receipt_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "receipt",
                id: receipt_id.to_string(),
            })?;

        let bytes = tokio::fs::read(self.root.join(&model.file_path)).await?;
        Ok((model, bytes))
    }

    /// Deletes a receipt row and its stored file. The row goes first; the
    /// file is only removed once the row delete has succeeded, so a failure
    /// never leaves a row pointing at a missing file.
    pub async fn delete(&self, db: &DatabaseConnection, receipt_id: i64) -> Result<()> {
        let model = Receipt::find_by_id(receipt_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "receipt",
                id: receipt_id.to_string(),
            })?;

        let file_path = model.file_path.clone();
        model.delete(db).await?;
        self.remove_file(&file_path).await;
        Ok(())
    }

    /// Deletes the receipt rows owned by a ledger transaction and returns
    /// them. Runs inside the caller's database transaction; the files stay
    /// on disk until the caller commits and then passes the returned rows to
    /// [`Self::remove_files`], so a failed commit cannot orphan any row.
    pub async fn delete_rows_for_transaction<C>(
        &self,
        db: &C,
        transaction_id: i64,
    ) -> Result<Vec<receipt::Model>>
    where
        C: ConnectionTrait,
    {
        let owned = Receipt::find()
            .filter(receipt::Column::TransactionId.eq(transaction_id))
            .all(db)
            .await?;

        Receipt::delete_many()
            .filter(receipt::Column::TransactionId.eq(transaction_id))
            .exec(db)
            .await?;

        Ok(owned)
    }

    /// Removes the stored files of already-deleted receipt rows.
    pub async fn remove_files(&self, receipts: &[receipt::Model]) {
        for model in receipts {
            self.remove_file(&model.file_path).await;
        }
    }

    /// Removes a stored file, logging rather than failing when it is already
    /// gone; the database row is the source of truth for existence.
    async fn remove_file(&self, relative_path: &str) {
        let full_path = self.root.join(relative_path);
        if let Err(e) = tokio::fs::remove_file(&full_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %full_path.display(), error = %e, "failed to remove receipt file");
            }
        }
    }
}

/// Lists the receipts attached to an expense claim.
pub async fn list_for_claim<C>(db: &C, claim_id: i64) -> Result<Vec<receipt::Model>>
where
    C: ConnectionTrait,
{
    Receipt::find()
        .filter(receipt::Column::ExpenseClaimId.eq(claim_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the receipts attached to a ledger transaction.
pub async fn list_for_transaction<C>(db: &C, transaction_id: i64) -> Result<Vec<receipt::Model>>
where
    C: ConnectionTrait,
{
    Receipt::find()
        .filter(receipt::Column::TransactionId.eq(transaction_id))
        .all(db)
        .await
        .map_err(Into::into)
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "receipt".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_validate_rejects_oversized_upload() {
        let store = ReceiptStore::with_max_bytes("/tmp/unused", 16);
        let upload = ReceiptUpload {
            original_filename: "nota.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0u8; 17],
        };
        assert!(matches!(
            store.validate(&upload).unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_content_type() {
        let store = ReceiptStore::new("/tmp/unused");
        let upload = ReceiptUpload {
            original_filename: "nota.exe".to_string(),
            content_type: "application/octet-stream".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(
            store.validate(&upload).unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_empty_file() {
        let store = ReceiptStore::new("/tmp/unused");
        let upload = ReceiptUpload {
            original_filename: "nota.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Vec::new(),
        };
        assert!(matches!(
            store.validate(&upload).unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("nota makan.jpg"), "nota_makan.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(""), "receipt");
    }

    #[tokio::test]
    async fn test_store_and_load_roundtrip() -> Result<()> {
        let (db, prog, cat) = setup_active_program_with_category(1_000_000.0).await?;
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(dir.path());

        let claim = submit_test_claim_with_store(&db, &store, prog.id, cat.id, 50_000.0).await?;

        let receipts = list_for_claim(&db, claim.id).await?;
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].content_type, "image/jpeg");
        assert_eq!(receipts[0].expense_claim_id, Some(claim.id));

        let (model, bytes) = store.load(&db, receipts[0].id).await?;
        assert_eq!(model.id, receipts[0].id);
        assert_eq!(bytes, test_receipt_upload().bytes);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_file() -> Result<()> {
        let (db, prog, cat) = setup_active_program_with_category(1_000_000.0).await?;
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(dir.path());

        let claim = submit_test_claim_with_store(&db, &store, prog.id, cat.id, 50_000.0).await?;
        let receipts = list_for_claim(&db, claim.id).await?;
        let receipt_id = receipts[0].id;
        let file_path = dir.path().join(&receipts[0].file_path);
        assert!(file_path.exists());

        store.delete(&db, receipt_id).await?;

        assert!(!file_path.exists());
        let result = store.load(&db, receipt_id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_rolled_back_row_delete_keeps_files() -> Result<()> {
        use sea_orm::TransactionTrait;

        let (db, prog, _cat) = setup_active_program_with_category(1_000_000.0).await?;
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::new(dir.path());

        let created = crate::core::ledger::record_transaction(
            &db,
            prog.id,
            crate::core::ledger::KIND_EXPENSE,
            100_000.0,
            date(2025, 3, 1),
            "Belanja".to_string(),
            "admin1".to_string(),
            vec![],
        )
        .await?;
        let stored = store
            .store_for_transaction(&db, created.id, test_receipt_upload())
            .await?;
        let file_path = dir.path().join(&stored.file_path);
        assert!(file_path.exists());

        // Row deletion that never commits must leave both row and file alone
        let txn = db.begin().await?;
        let rows = store.delete_rows_for_transaction(&txn, created.id).await?;
        assert_eq!(rows.len(), 1);
        drop(txn);

        assert_eq!(list_for_transaction(&db, created.id).await?.len(), 1);
        assert!(file_path.exists());

        // After a successful commit the returned rows drive file removal
        let txn = db.begin().await?;
        let rows = store.delete_rows_for_transaction(&txn, created.id).await?;
        txn.commit().await?;
        store.remove_files(&rows).await;

        assert!(list_for_transaction(&db, created.id).await?.is_empty());
        assert!(!file_path.exists());

        Ok(())
    }
}
