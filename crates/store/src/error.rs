use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("The store is unreachable: {0}")]
    Unavailable(String),

    #[error("No {entity} row with id {id} exists in the store.")]
    NotFound { entity: &'static str, id: i64 },

    #[error(
        "Foreign key violation: order insert references customer {customer_id}, which does not exist."
    )]
    ForeignKeyViolation { customer_id: i64 },
}
