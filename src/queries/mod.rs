//! Query modules for the dataset.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and returns typed rows.

pub mod observations;

pub use observations::{ObservationFilter, ObservationQuery};
