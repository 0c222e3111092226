use core_types::LoadStrategy;
use store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("A store operation failed during the {strategy} run: {source}")]
    Store {
        strategy: LoadStrategy,
        #[source]
        source: StoreError,
    },

    #[error("The store returned a page shape that does not match the {strategy} strategy.")]
    UnexpectedPageShape { strategy: LoadStrategy },

    #[error("Eager join left order {order_id} without its customer attached.")]
    MissingJoin { order_id: i64 },
}
