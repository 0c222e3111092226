use serde::{Deserialize, Serialize};

/// How related rows are brought in when a page of orders is queried.
///
/// Relationship loading is an explicit, inspectable parameter here rather than
/// a runtime hook: the store branches on the variant it is handed, and the
/// caller can see at the call site exactly which shape of query it is paying
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadStrategy {
    /// Fetch orders only. Each customer is resolved with a separate query on
    /// first access, the classic N+1 pattern.
    Lazy,
    /// Fetch orders joined with their customers in a single round trip. All
    /// returned entities enter change tracking.
    EagerJoin,
    /// Fetch only the fields the report needs, as `OrderSummary` rows.
    /// Nothing is materialized as an entity and nothing is tracked.
    Projection,
}

impl LoadStrategy {
    /// The strategies in the order the benchmark runs them.
    pub const ALL: [LoadStrategy; 3] = [
        LoadStrategy::Lazy,
        LoadStrategy::EagerJoin,
        LoadStrategy::Projection,
    ];

    /// Human-readable name used in reports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            LoadStrategy::Lazy => "Lazy Loading",
            LoadStrategy::EagerJoin => "Eager Join",
            LoadStrategy::Projection => "Projection",
        }
    }
}

impl std::fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
