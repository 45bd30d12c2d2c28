pub mod alias;
pub mod classify;
pub mod compat;
pub mod config;
pub mod error;
pub mod flatten;
pub mod missing;
pub mod state;
pub mod types;
