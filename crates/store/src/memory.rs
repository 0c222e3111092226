use crate::error::StoreError;
use crate::provider::{OrderPage, Provider, SessionHandle};
use core_types::{Customer, LoadStrategy, NewCustomer, NewOrder, Order, OrderSummary};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The two tables the harness works against. Ids are assigned monotonically
/// from 1, matching what a sequence-backed SQL store would hand out.
#[derive(Debug, Default)]
struct Tables {
    customers: Vec<Customer>,
    orders: Vec<Order>,
    next_customer_id: i64,
    next_order_id: i64,
}

impl Tables {
    fn new() -> Self {
        Self {
            customers: Vec::new(),
            orders: Vec::new(),
            next_customer_id: 1,
            next_order_id: 1,
        }
    }

    fn customer(&self, id: i64) -> Result<&Customer, StoreError> {
        self.customers
            .iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound {
                entity: "customer",
                id,
            })
    }
}

/// The in-memory persistence provider.
///
/// Stands in for the external database the harness benchmarks against. It
/// honors the contracts the measurements rely on: one round trip per bulk
/// insert or query, explicit load-strategy branching, and failure injection
/// via [`MemoryStore::set_offline`] for the unreachable-store path.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    round_trips: AtomicU64,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::new()),
            round_trips: AtomicU64::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulates the provider becoming unreachable. Every subsequent
    /// operation fails with `StoreError::Unavailable` until cleared.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Accounts for one data-plane round trip, failing first if the store is
    /// offline.
    fn begin_round_trip(&self) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "the in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        // The harness is single-threaded; a poisoned mutex means a previous
        // operation panicked and no measurement can be trusted anyway.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for MemoryStore {
    type Session<'s>
        = MemorySession<'s>
    where
        Self: 's;

    fn insert_customers(&self, rows: &[NewCustomer]) -> Result<Vec<i64>, StoreError> {
        self.begin_round_trip()?;
        let mut tables = self.lock_tables();
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let id = tables.next_customer_id;
            tables.next_customer_id += 1;
            tables.customers.push(Customer {
                id,
                name: row.name.clone(),
                email: row.email.clone(),
            });
            ids.push(id);
        }
        tracing::debug!(inserted = ids.len(), "bulk customer insert");
        Ok(ids)
    }

    fn insert_orders(&self, rows: &[NewOrder]) -> Result<Vec<i64>, StoreError> {
        self.begin_round_trip()?;
        let mut tables = self.lock_tables();

        // Enforce referential integrity up front so the batch is all-or-nothing.
        for row in rows {
            if !tables.customers.iter().any(|c| c.id == row.customer_id) {
                return Err(StoreError::ForeignKeyViolation {
                    customer_id: row.customer_id,
                });
            }
        }

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let id = tables.next_order_id;
            tables.next_order_id += 1;
            tables.orders.push(Order {
                id,
                created_at: row.created_at,
                amount: row.amount,
                customer_id: row.customer_id,
                customer: None,
            });
            ids.push(id);
        }
        tracing::debug!(inserted = ids.len(), "bulk order insert");
        Ok(ids)
    }

    fn truncate(&self) -> Result<(), StoreError> {
        self.check_reachable()?;
        let mut tables = self.lock_tables();
        *tables = Tables::new();
        tracing::debug!("store truncated");
        Ok(())
    }

    fn customer_count(&self) -> Result<usize, StoreError> {
        self.begin_round_trip()?;
        Ok(self.lock_tables().customers.len())
    }

    fn order_count(&self) -> Result<usize, StoreError> {
        self.begin_round_trip()?;
        Ok(self.lock_tables().orders.len())
    }

    fn session(&self) -> Result<Self::Session<'_>, StoreError> {
        self.check_reachable()?;
        Ok(MemorySession {
            store: self,
            tracked: HashSet::new(),
            trips: 0,
        })
    }

    fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::SeqCst)
    }
}

/// Identity of a tracked entity. A `HashSet` of these is the change tracker:
/// fetching the same row twice tracks it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EntityKey {
    Customer(i64),
    Order(i64),
}

/// A scoped handle over a [`MemoryStore`].
///
/// Owns the change tracker and a session-local round-trip counter so one
/// strategy run's state cannot leak into the next. Dropping the session
/// detaches everything it tracked.
#[derive(Debug)]
pub struct MemorySession<'s> {
    store: &'s MemoryStore,
    tracked: HashSet<EntityKey>,
    trips: u64,
}

impl MemorySession<'_> {
    fn begin_round_trip(&mut self) -> Result<(), StoreError> {
        self.store.begin_round_trip()?;
        self.trips += 1;
        Ok(())
    }
}

impl SessionHandle for MemorySession<'_> {
    fn fetch_orders(
        &mut self,
        limit: usize,
        strategy: LoadStrategy,
    ) -> Result<OrderPage, StoreError> {
        self.begin_round_trip()?;
        let tables = self.store.lock_tables();
        let page = tables.orders.iter().take(limit);

        let result = match strategy {
            LoadStrategy::Lazy => {
                let mut orders = Vec::with_capacity(limit.min(tables.orders.len()));
                for order in page {
                    // Navigation slot stays empty: the customer is resolved
                    // later, one query per access.
                    orders.push(order.clone());
                    self.tracked.insert(EntityKey::Order(order.id));
                }
                OrderPage::Entities(orders)
            }
            LoadStrategy::EagerJoin => {
                let mut orders = Vec::with_capacity(limit.min(tables.orders.len()));
                for order in page {
                    let customer = tables.customer(order.customer_id)?;
                    let mut joined = order.clone();
                    joined.customer = Some(customer.clone());
                    self.tracked.insert(EntityKey::Order(order.id));
                    self.tracked.insert(EntityKey::Customer(customer.id));
                    orders.push(joined);
                }
                OrderPage::Entities(orders)
            }
            LoadStrategy::Projection => {
                let mut summaries = Vec::with_capacity(limit.min(tables.orders.len()));
                for order in page {
                    let customer = tables.customer(order.customer_id)?;
                    summaries.push(OrderSummary {
                        order_id: order.id,
                        created_at: order.created_at,
                        amount: order.amount,
                        customer_name: customer.name.clone(),
                    });
                }
                OrderPage::Summaries(summaries)
            }
        };

        tracing::debug!(
            limit,
            %strategy,
            tracked = self.tracked.len(),
            "order page fetched"
        );
        Ok(result)
    }

    fn customer_name(&mut self, customer_id: i64) -> Result<String, StoreError> {
        self.begin_round_trip()?;
        let tables = self.store.lock_tables();
        let customer = tables.customer(customer_id)?;
        self.tracked.insert(EntityKey::Customer(customer.id));
        tracing::debug!(customer_id, "lazy customer resolution");
        Ok(customer.name.clone())
    }

    fn tracked_entities(&self) -> usize {
        self.tracked.len()
    }

    fn round_trips(&self) -> u64 {
        self.trips
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        tracing::debug!(
            detached = self.tracked.len(),
            trips = self.trips,
            "session closed; all tracked entities detached"
        );
        self.tracked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn new_order(customer_id: i64, cents: i64) -> NewOrder {
        NewOrder {
            created_at: Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            amount: Decimal::new(cents, 2),
            customer_id,
        }
    }

    fn seeded_store(customers: usize, orders_per_customer: usize) -> MemoryStore {
        let store = MemoryStore::new();
        let rows: Vec<NewCustomer> = (1..=customers)
            .map(|i| NewCustomer {
                name: format!("Customer {i}"),
                email: format!("customer{i}@example.com"),
            })
            .collect();
        let ids = store.insert_customers(&rows).unwrap();

        let order_rows: Vec<NewOrder> = ids
            .iter()
            .flat_map(|&id| (0..orders_per_customer).map(move |n| new_order(id, 1000 + n as i64)))
            .collect();
        store.insert_orders(&order_rows).unwrap();
        store
    }

    #[test]
    fn inserts_assign_sequential_ids_and_count_one_trip_each() {
        let store = seeded_store(3, 2);
        assert_eq!(store.round_trips(), 2);
        assert_eq!(store.lock_tables().customers[0].id, 1);
        assert_eq!(store.lock_tables().customers[2].id, 3);
        assert_eq!(store.lock_tables().orders.last().unwrap().id, 6);
    }

    #[test]
    fn order_insert_rejects_unknown_customer() {
        let store = seeded_store(1, 0);
        let err = store.insert_orders(&[new_order(99, 500)]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ForeignKeyViolation { customer_id: 99 }
        ));
    }

    #[test]
    fn lazy_fetch_leaves_navigation_empty_and_tracks_orders() {
        let store = seeded_store(2, 3);
        let mut session = store.session().unwrap();
        let page = session.fetch_orders(4, LoadStrategy::Lazy).unwrap();

        let OrderPage::Entities(orders) = page else {
            panic!("lazy fetch must return entities");
        };
        assert_eq!(orders.len(), 4);
        assert!(orders.iter().all(|o| o.customer.is_none()));
        assert_eq!(session.tracked_entities(), 4);
        assert_eq!(session.round_trips(), 1);
    }

    #[test]
    fn eager_fetch_attaches_customers_and_tracks_both_sides() {
        let store = seeded_store(2, 2);
        let mut session = store.session().unwrap();
        let page = session.fetch_orders(4, LoadStrategy::EagerJoin).unwrap();

        let OrderPage::Entities(orders) = page else {
            panic!("eager fetch must return entities");
        };
        assert!(
            orders
                .iter()
                .all(|o| o.customer.as_ref().is_some_and(|c| c.id == o.customer_id))
        );
        // 4 orders + 2 distinct customers.
        assert_eq!(session.tracked_entities(), 6);
        assert_eq!(session.round_trips(), 1);
    }

    #[test]
    fn projection_fetch_returns_summaries_and_tracks_nothing() {
        let store = seeded_store(2, 2);
        let mut session = store.session().unwrap();
        let page = session.fetch_orders(3, LoadStrategy::Projection).unwrap();

        let OrderPage::Summaries(summaries) = page else {
            panic!("projection fetch must return summaries");
        };
        assert_eq!(summaries.len(), 3);
        assert!(summaries.iter().all(|s| !s.customer_name.is_empty()));
        assert_eq!(session.tracked_entities(), 0);
        assert_eq!(session.round_trips(), 1);
    }

    #[test]
    fn lazy_resolution_tracks_each_distinct_customer_once() {
        let store = seeded_store(2, 1);
        let mut session = store.session().unwrap();
        let name_a = session.customer_name(1).unwrap();
        let name_again = session.customer_name(1).unwrap();
        session.customer_name(2).unwrap();

        assert_eq!(name_a, name_again);
        assert_eq!(session.tracked_entities(), 2);
        assert_eq!(session.round_trips(), 3);
    }

    #[test]
    fn a_fresh_session_starts_untracked() {
        let store = seeded_store(2, 2);
        {
            let mut session = store.session().unwrap();
            session.fetch_orders(4, LoadStrategy::EagerJoin).unwrap();
            assert!(session.tracked_entities() > 0);
        }
        let session = store.session().unwrap();
        assert_eq!(session.tracked_entities(), 0);
        assert_eq!(session.round_trips(), 0);
    }

    #[test]
    fn fetch_limit_beyond_table_size_returns_all_rows() {
        let store = seeded_store(1, 2);
        let mut session = store.session().unwrap();
        let OrderPage::Entities(orders) =
            session.fetch_orders(100, LoadStrategy::Lazy).unwrap()
        else {
            panic!("lazy fetch must return entities");
        };
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn offline_store_fails_every_operation() {
        let store = seeded_store(1, 1);
        store.set_offline(true);

        assert!(matches!(
            store.insert_customers(&[]).unwrap_err(),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            store.session().unwrap_err(),
            StoreError::Unavailable(_)
        ));

        store.set_offline(false);
        assert!(store.session().is_ok());
    }

    #[test]
    fn truncate_resets_rows_and_id_assignment_without_counting_a_trip() {
        let store = seeded_store(2, 1);
        let trips_before = store.round_trips();
        store.truncate().unwrap();
        assert_eq!(store.round_trips(), trips_before);

        let ids = store
            .insert_customers(&[NewCustomer {
                name: "Customer 1".to_string(),
                email: "customer1@example.com".to_string(),
            }])
            .unwrap();
        assert_eq!(ids, vec![1]);
    }
}
