//! Conecta Rural — marketplace order engine
//!
//! Multi-seller checkout with per-seller order splitting, atomic stock
//! reservation, PagSeguro payment integration, and an order fulfillment
//! state machine.

pub mod api;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod fulfillment;
pub mod pagseguro;
pub mod state;
pub mod util;
