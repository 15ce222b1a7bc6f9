//! Outbound channels used by chain simulation.
//!
//! Only a mock email transport exists: sends are logged and recorded in an
//! in-memory outbox, nothing leaves the process.

pub mod email;

pub use email::{MockMailer, OutboundEmail, SendReceipt, SentEmail};
