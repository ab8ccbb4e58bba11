//! Infrastructure layer - Store clients, services and observability

pub mod cache;
pub mod logging;
pub mod observability;
pub mod persistent;
pub mod services;
