//! Initialisation du logging (tracing)

use crate::config::RemoteConfig;
use tracing_subscriber::EnvFilter;

/// Installe un subscriber `fmt` global
///
/// `RUST_LOG` a priorité ; à défaut, le niveau minimum de la configuration
/// est utilisé. Sans effet si un subscriber est déjà installé.
pub fn init_logging(config: &RemoteConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logger.min_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
