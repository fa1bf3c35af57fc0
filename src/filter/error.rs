use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid timestep range: min {min} and max {max} must satisfy 0 <= min <= max")]
    InvalidTimestepRange { min: i64, max: i64 },
}
