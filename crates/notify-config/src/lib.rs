//! Configuration, credentials, paths and logging for the notification service.

mod config;
mod credentials;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_LOG_LEVEL, DEFAULT_PUSH_ENDPOINT};
pub use credentials::{
    load_service_account, resolve_service_account_path, ServiceAccount,
    SERVICE_ACCOUNT_ENV, SERVICE_ACCOUNT_FALLBACK_ENV,
};
pub use error::{ConfigError, ConfigResult};
pub use logging::init_logging;
pub use paths::Paths;
