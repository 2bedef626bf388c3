//! Domain operations. Each service talks to persistence through
//! [`crate::store::Store`] and reports failures with its own error enum,
//! converted into [`crate::app::error::AppError`] at the HTTP boundary.

pub mod addresses;
pub mod browse;
pub mod cart;
pub mod checkout;
pub mod feedback;
pub mod refunds;
pub mod saved;
