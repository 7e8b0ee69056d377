pub mod api;
pub mod cache;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod flags;
pub mod metrics_consts;
pub mod metrics_utils;
pub mod overrides;
pub mod pages;
pub mod rewrite;
pub mod router;
pub mod server;

// Shared by unit tests and the integration tests under tests/, so it is
// compiled into the library.
pub mod test_utils;
