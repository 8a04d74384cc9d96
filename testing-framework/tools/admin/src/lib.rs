//! Operator-facing admin service: generates, funds and reports test
//! accounts over HTTP.

pub mod error;
pub mod server;
pub mod state;

pub use error::AdminError;
pub use server::admin_app;
pub use state::{AdminState, ChainFactory, connect_http};
