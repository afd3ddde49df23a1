//! Integration tests for the grove explorer

mod explorer_scenarios;
mod http_session;
mod sled_engine;
