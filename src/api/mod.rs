//! Outbound integrations.

pub mod payments;
pub mod stripe;
