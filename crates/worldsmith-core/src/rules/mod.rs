//! Business rules applied before anything is written

pub mod validation;

pub use validation::validate_values;
