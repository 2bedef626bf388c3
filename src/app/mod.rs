//! Service plumbing shared by every route module.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod state;
pub mod swagger;
