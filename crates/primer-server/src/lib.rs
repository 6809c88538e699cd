pub mod error;
pub mod handlers;
pub mod logging;
pub mod server;
pub mod state;

pub use error::AppError;
pub use server::{configure_routes, run_server_with_config};
pub use state::AppState;
