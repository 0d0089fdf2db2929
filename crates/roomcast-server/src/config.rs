//! Configuration for the relay server.
//!
//! All configuration is loaded from environment variables; there is no
//! config file. The defaults match the original deployment: listen on
//! every interface, port 5000.

use crate::server::ServerConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set to an unparseable value.
    #[error("invalid {name}: {detail}")]
    Invalid {
        /// The offending variable name.
        name: &'static str,
        /// Why it failed to parse.
        detail: String,
    },
}

/// Load the server configuration from environment variables.
///
/// Recognized variables:
/// - `ROOMCAST_HOST` -- bind address (default `0.0.0.0`)
/// - `ROOMCAST_PORT` -- TCP port (default `5000`)
///
/// The log filter is read separately by `tracing-subscriber` from
/// `RUST_LOG`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if `ROOMCAST_PORT` is not a valid
/// port number.
pub fn from_env() -> Result<ServerConfig, ConfigError> {
    let host =
        std::env::var("ROOMCAST_HOST").unwrap_or_else(|_| String::from("0.0.0.0"));

    let port: u16 = std::env::var("ROOMCAST_PORT")
        .unwrap_or_else(|_| String::from("5000"))
        .parse()
        .map_err(|e| ConfigError::Invalid {
            name: "ROOMCAST_PORT",
            detail: format!("{e}"),
        })?;

    Ok(ServerConfig { host, port })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_deployment() {
        // Direct construction test since from_env reads real env vars.
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
    }
}
