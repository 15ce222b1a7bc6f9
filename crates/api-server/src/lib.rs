#![warn(clippy::unwrap_used)]

pub mod rest;
pub mod server;
pub mod simulate_rest;

pub use server::ApiServer;
