pub mod config;
pub mod error;
pub mod ids;
pub mod lobby;
pub mod protocol;
pub mod routes;
pub mod session;
