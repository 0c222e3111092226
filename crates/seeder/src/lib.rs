//! # Querybench Dataset Seeder
//!
//! Populates the store with a reproducible synthetic dataset: a block of
//! customers, then a block of orders referencing them. Everything random is
//! driven by a caller-supplied seed, so two runs (or two independent stores)
//! given the same parameters hold byte-identical data and their measurements
//! can be compared.
//!
//! Writes are batched: one bulk insert for all customers, one for all
//! orders. Issuing a round trip per row is exactly the pathology the
//! benchmark exists to demonstrate, so the seeder refuses to model it.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_types::{NewCustomer, NewOrder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use store::Provider;

pub mod error;

pub use error::SeedError;

/// Order timestamps are spread over the 365 days before a fixed anchor.
/// Anchoring to "now" would make consecutive runs differ byte-for-byte.
const CREATED_AT_SPREAD_DAYS: i64 = 365;

/// How the dataset is generated. All three values must be supplied; the
/// documented defaults (100 customers, 1000 orders, seed 42) live in the
/// `configuration` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedParams {
    pub customers: u32,
    pub orders: u32,
    pub seed: u64,
}

/// What was actually written, for the CLI's "seeded N customers, M orders"
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub orders: usize,
}

/// Drops the store's contents and seeds it afresh.
///
/// Idempotent per invocation: calling it twice with the same parameters
/// leaves the store in the same state. Fails fast with
/// [`SeedError::InvalidParams`] before touching the store if either count is
/// zero.
pub fn seed<P: Provider>(provider: &P, params: &SeedParams) -> Result<SeedSummary, SeedError> {
    if params.customers == 0 {
        return Err(SeedError::InvalidParams(
            "customer count must be at least 1".to_string(),
        ));
    }
    if params.orders == 0 {
        return Err(SeedError::InvalidParams(
            "order count must be at least 1".to_string(),
        ));
    }

    provider.truncate()?;

    let mut rng = StdRng::seed_from_u64(params.seed);

    // Customers first: orders need the assigned ids to exist.
    let customers: Vec<NewCustomer> = (1..=params.customers)
        .map(|i| NewCustomer {
            name: format!("Customer {i}"),
            email: format!("customer{i}@example.com"),
        })
        .collect();
    let customer_ids = provider.insert_customers(&customers)?;
    tracing::info!(count = customer_ids.len(), "seeded customers");

    let anchor = created_at_anchor();
    let mut orders = Vec::with_capacity(params.orders as usize);
    for _ in 0..params.orders {
        // Draw order is part of the determinism contract: days, cents,
        // customer index, for every order in sequence.
        let days_ago = rng.gen_range(0..CREATED_AT_SPREAD_DAYS);
        let cents = rng.gen_range(0..100_000i64);
        let customer_ix = rng.gen_range(0..customer_ids.len());
        orders.push(NewOrder {
            created_at: anchor - Duration::days(days_ago),
            amount: Decimal::new(cents, 2),
            customer_id: customer_ids[customer_ix],
        });
    }
    let order_ids = provider.insert_orders(&orders)?;
    tracing::info!(count = order_ids.len(), "seeded orders");

    Ok(SeedSummary {
        customers: customer_ids.len(),
        orders: order_ids.len(),
    })
}

fn created_at_anchor() -> DateTime<Utc> {
    // Infallible for a hard-coded calendar date.
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}
