use crate::error::StoreError;
use core_types::{LoadStrategy, NewCustomer, NewOrder, Order, OrderSummary};

/// What a query for a page of orders hands back, depending on the strategy
/// it was issued with.
///
/// Entity strategies (`Lazy`, `EagerJoin`) materialize full `Order` rows;
/// `Projection` skips entity materialization entirely and returns summaries.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPage {
    Entities(Vec<Order>),
    Summaries(Vec<OrderSummary>),
}

/// A generic trait for a persistence provider.
///
/// This trait allows the seeder and the strategy runner to be agnostic about
/// what actually stores the rows. The in-tree implementation is the in-memory
/// `MemoryStore`; a SQL-backed provider would slot in behind the same seam.
pub trait Provider {
    /// The scoped handle this provider hands out. Dropping it detaches every
    /// entity it tracked.
    type Session<'s>: SessionHandle
    where
        Self: 's;

    /// Inserts all given customers in a single round trip and returns the
    /// ids the store assigned, in input order.
    fn insert_customers(&self, rows: &[NewCustomer]) -> Result<Vec<i64>, StoreError>;

    /// Inserts all given orders in a single round trip and returns the ids
    /// the store assigned, in input order. Every `customer_id` must already
    /// exist.
    fn insert_orders(&self, rows: &[NewOrder]) -> Result<Vec<i64>, StoreError>;

    /// Drops all stored rows and resets id assignment.
    fn truncate(&self) -> Result<(), StoreError>;

    fn customer_count(&self) -> Result<usize, StoreError>;

    fn order_count(&self) -> Result<usize, StoreError>;

    /// Opens a fresh scoped handle with an empty change tracker and a zeroed
    /// round-trip counter.
    fn session(&self) -> Result<Self::Session<'_>, StoreError>;

    /// Data-plane round trips (inserts and queries) issued against this
    /// provider over its lifetime. `truncate` is schema maintenance and is
    /// not counted.
    fn round_trips(&self) -> u64;
}

/// A scoped store handle: the unit of change tracking and round-trip
/// accounting for one strategy run.
pub trait SessionHandle {
    /// Issues one query for the first `limit` orders, shaped by the explicit
    /// load strategy. Exactly one round trip regardless of strategy.
    fn fetch_orders(&mut self, limit: usize, strategy: LoadStrategy)
    -> Result<OrderPage, StoreError>;

    /// Resolves a single customer's display name, the lazy loading path.
    /// One round trip per call; the fetched customer enters the tracker.
    fn customer_name(&mut self, customer_id: i64) -> Result<String, StoreError>;

    /// How many distinct entities this session's change tracker holds.
    fn tracked_entities(&self) -> usize;

    /// Round trips issued through this session since it was opened.
    fn round_trips(&self) -> u64;
}
