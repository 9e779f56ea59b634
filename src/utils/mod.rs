pub mod config;
pub mod fd_limit;
pub(crate) mod file_config;
pub mod logger;

pub use config::*;
pub use fd_limit::cap_workers_by_fd_limit;
pub use logger::setup_logging;
