//! Outbound ports (driven side): interfaces implemented by storage adapters.

pub mod store;
