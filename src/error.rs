use crate::config::ConfigError;

/// Anything that stops the server from coming up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("templates: {0}")]
    Template(#[from] tera::Error),
    #[error("http server: {0}")]
    Server(#[from] hyper::Error),
}
