//! Guildhall: lifecycle core of a student task marketplace.
//!
//! This crate owns the task, application, and submission aggregates of a
//! marketplace where organizations post paid micro-tasks and students apply
//! to perform them. It enforces the status state machines, the authorization
//! predicates gating each transition, and the atomic persistence contract
//! through which every transition is executed.
//!
//! # Architecture
//!
//! Guildhall follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Orchestration of domain operations over the ports
//!
//! # Modules
//!
//! - [`marketplace`]: task posting, applications, submissions, and review

pub mod marketplace;
