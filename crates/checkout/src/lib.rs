//! Terminal client for placing marketplace orders.
//!
//! Fetches the product to get a trusted price, runs one settlement, renders
//! its progress, and refreshes the order list once an order goes through.

pub mod cli;
pub mod config;
pub mod console;
