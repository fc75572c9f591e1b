//! Core business logic - framework-agnostic ledger operations.
//!
//! Each submodule owns one component of the service: the budget allocation
//! store, the append-only ledger, the approval state machine, the read-only
//! dashboard aggregator, receipt file storage, program lifecycle, and the
//! audit log. Everything takes an explicit database connection and actor
//! identity; no module reads ambient session state.

pub mod allocation;
pub mod approval;
pub mod audit;
pub mod dashboard;
pub mod ledger;
pub mod program;
pub mod receipt;
