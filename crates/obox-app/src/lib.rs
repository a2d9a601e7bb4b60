pub mod command;
pub mod config;
pub mod logging;
pub mod render;
pub mod route;
pub mod state;

pub use command::{Command, CommandError};
pub use config::Config;
pub use route::{Route, RouteError};
pub use state::AppState;
