use crate::enums::LoadStrategy;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer as stored. The id is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A customer row about to be inserted, before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

/// An order as stored. Every order references exactly one customer.
///
/// `customer` is the navigation slot: it is `None` as stored and stays `None`
/// under lazy loading, and is populated in the same round trip under
/// `LoadStrategy::EagerJoin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub amount: Decimal,
    pub customer_id: i64,
    pub customer: Option<Customer>,
}

/// An order row about to be inserted, before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub created_at: DateTime<Utc>,
    pub amount: Decimal,
    pub customer_id: i64,
}

/// The named projection record: exactly the fields the report needs, chosen
/// at compile time. Rows of this shape never enter change tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub created_at: DateTime<Utc>,
    pub amount: Decimal,
    pub customer_name: String,
}

/// The instrumentation captured for one strategy run.
///
/// Consumed immediately by the comparator; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub strategy: LoadStrategy,
    /// Round trips issued to the store. Counts queries, not rows.
    pub query_count: u64,
    /// Wall-clock span from query issuance through the last field access,
    /// taken from a monotonic clock.
    pub elapsed_millis: f64,
    /// Net allocation delta across the run. Signed because the sampling is
    /// noisy; comparisons clamp it to zero.
    pub memory_delta_bytes: i64,
    /// Entities enrolled in the session's change tracker when the run ended.
    pub tracked_entity_count: usize,
}

impl Measurement {
    /// The memory delta as used for ranking and ratios: measurement noise can
    /// drive the raw delta negative, so it is floored at zero.
    pub fn comparable_memory_bytes(&self) -> i64 {
        self.memory_delta_bytes.max(0)
    }
}
