//! `[serve]` section configuration.
//!
//! Settings of the reload socket used by `pages-merge serve`.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[serve]` section in pages-merge.toml.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"  # Accept reload clients from the LAN
/// port = 5278
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// WebSocket port for reload clients.
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::super::MergeConfig;

    #[test]
    fn test_serve_config() {
        let config: MergeConfig = toml::from_str(
            r#"
            [serve]
            interface = "0.0.0.0"
            port = 8080
        "#,
        )
        .unwrap();

        assert_eq!(config.serve.interface, "0.0.0.0");
        assert_eq!(config.serve.port, 8080);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config: MergeConfig = toml::from_str("").unwrap();

        assert_eq!(config.serve.interface, "127.0.0.1");
        assert_eq!(config.serve.port, 5278);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let result: Result<MergeConfig, _> = toml::from_str(
            r#"
            [serve]
            watch = false
        "#,
        );

        assert!(result.is_err());
    }
}
