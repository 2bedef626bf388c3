pub mod api;
pub mod app;
pub mod models;
pub mod reference;
pub mod responses;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

#[cfg(test)]
mod test_support;
