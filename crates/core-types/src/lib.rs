//! # Querybench Core Types
//!
//! The shared vocabulary of the benchmark harness: the entities that live in
//! the store, the projection record, the load-strategy selector, and the
//! `Measurement` produced by every strategy run.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** This crate sits at the bottom of the workspace. It has no
//!   knowledge of the store, the runner, or the comparator; everything else
//!   depends on it.
//! - **Plain data:** No behavior beyond small accessors. All types derive
//!   `Serialize` so reports can be emitted as JSON.

pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::LoadStrategy;
pub use structs::{Customer, Measurement, NewCustomer, NewOrder, Order, OrderSummary};
