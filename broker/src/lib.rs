pub mod config;
pub mod error;
pub mod handlers;
pub mod monitor;
pub mod queue;
pub mod state;
pub mod store;

pub use error::StoreError;
pub use state::AppState;
