//! Checkout: cart validation, per-seller order splitting, and the atomic
//! stock reservation transaction.

mod orchestrator;
pub mod splitter;

pub use orchestrator::{CheckoutOutcome, create_orders};
pub use splitter::CartLine;
