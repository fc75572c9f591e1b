//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod audit_log;
pub mod expense_claim;
pub mod ledger_transaction;
pub mod program;
pub mod program_member;
pub mod rab_category;
pub mod receipt;
pub mod transaction_allocation;

// Re-export specific types to avoid conflicts
pub use audit_log::{Column as AuditLogColumn, Entity as AuditLog, Model as AuditLogModel};
pub use expense_claim::{
    Column as ExpenseClaimColumn, Entity as ExpenseClaim, Model as ExpenseClaimModel,
};
pub use ledger_transaction::{
    Column as LedgerTransactionColumn, Entity as LedgerTransaction, Model as LedgerTransactionModel,
};
pub use program::{Column as ProgramColumn, Entity as Program, Model as ProgramModel};
pub use program_member::{
    Column as ProgramMemberColumn, Entity as ProgramMember, Model as ProgramMemberModel,
};
pub use rab_category::{
    Column as RabCategoryColumn, Entity as RabCategory, Model as RabCategoryModel,
};
pub use receipt::{Column as ReceiptColumn, Entity as Receipt, Model as ReceiptModel};
pub use transaction_allocation::{
    Column as TransactionAllocationColumn, Entity as TransactionAllocation,
    Model as TransactionAllocationModel,
};
