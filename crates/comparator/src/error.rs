use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Cannot compare an empty set of measurements.")]
    EmptyInput,
}
