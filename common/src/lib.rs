pub mod api;
pub mod env;
pub mod substrings;
pub mod task;

pub use api::*;
pub use env::env_or;
pub use substrings::all_substrings;
pub use task::*;
