//! # Querybench Store
//!
//! The persistence provider the harness benchmarks against. It is the
//! system's only stateful collaborator.
//!
//! ## Architectural Principles
//!
//! - **Trait at the seam:** The seeder and runner talk to the [`Provider`]
//!   and [`SessionHandle`] traits, never to a concrete store. The in-memory
//!   implementation is enough to honor every measured contract; a SQL-backed
//!   provider would slot in behind the same seam.
//! - **Explicit loading:** There is no deferred-property interception in
//!   Rust, so relationship loading is a [`LoadStrategy`](core_types::LoadStrategy)
//!   variant passed into the query call, and the store branches on it.
//! - **Scoped sessions:** Change tracking lives in a session handle that is
//!   opened per strategy run and detaches everything on drop, so one run's
//!   tracked state cannot bias the next run's numbers.
//!
//! ## Public API
//!
//! - `Provider` / `SessionHandle`: the seam traits.
//! - `MemoryStore` / `MemorySession`: the in-memory implementation, with
//!   round-trip counting and offline failure injection.
//! - `OrderPage`: what a page query returns, entity- or projection-shaped.
//! - `StoreError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod memory;
pub mod provider;

// Re-export the key components to create a clean, public-facing API.
pub use error::StoreError;
pub use memory::{MemorySession, MemoryStore};
pub use provider::{OrderPage, Provider, SessionHandle};
