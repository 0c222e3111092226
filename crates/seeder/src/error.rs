use store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Invalid seeding parameters: {0}")]
    InvalidParams(String),

    #[error("The store rejected a seeding operation: {0}")]
    Store(#[from] StoreError),
}
