//! Test doubles for exercising the facade without a real database.

pub mod mock;
pub mod test_helpers;

pub use mock::{MockDriver, MockOp, MockState};
pub use test_helpers::{MemorySink, create_test_row, mock_database};
