//! Adapters - Concrete implementations of the ports.

pub mod date;
pub mod oracle;
pub mod phone;
