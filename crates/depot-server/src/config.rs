use std::net::SocketAddr;
use std::path::Path;

use depot::DepotConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Room for the JSON envelope around a hex attachment: key, field names,
/// quoting.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Which storage backend the server runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Sqlite,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub backend: BackendKind,
    /// Largest accepted request body. When unset it follows the configured
    /// limits, see [`ServerConfig::body_limit`].
    pub max_body_bytes: Option<usize>,
    pub depot: DepotConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            backend: BackendKind::Sqlite,
            max_body_bytes: None,
            depot: DepotConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Request body cap. Attachments travel hex-encoded, so by default this
    /// is twice the attachment limit plus the value limit and some overhead.
    pub fn body_limit(&self) -> usize {
        self.max_body_bytes.unwrap_or_else(|| {
            let limits = &self.depot.limits;
            limits
                .max_attachment_bytes
                .saturating_mul(2)
                .saturating_add(limits.max_value_bytes)
                .saturating_add(BODY_OVERHEAD_BYTES)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.backend, BackendKind::Sqlite);
        assert_eq!(c.max_body_bytes, None);
        assert!(c.body_limit() > 2 * c.depot.limits.max_attachment_bytes);
    }

    #[test]
    fn parse_toml() {
        let c = ServerConfig::from_toml(
            r#"
            bind_addr = "0.0.0.0:9000"
            backend = "memory"

            [depot]
            data_dir = "/srv/depot"

            [depot.limits]
            max_key_bytes = 64
            "#,
        )
        .unwrap();

        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.backend, BackendKind::Memory);
        assert_eq!(c.depot.data_dir, PathBuf::from("/srv/depot"));
        assert_eq!(c.depot.database_file, "depot.sqlite");
        assert_eq!(c.depot.limits.max_key_bytes, 64);
    }

    #[test]
    fn body_limit_follows_configured_limits() {
        let c = ServerConfig::from_toml(
            r#"
            [depot.limits]
            max_attachment_bytes = 67108864
            "#,
        )
        .unwrap();

        let limits = c.depot.limits;
        assert!(c.body_limit() >= 2 * limits.max_attachment_bytes + limits.max_value_bytes);
    }

    #[test]
    fn explicit_body_limit_wins() {
        let c = ServerConfig::from_toml("max_body_bytes = 4096").unwrap();
        assert_eq!(c.body_limit(), 4096);
    }

    #[test]
    fn parse_toml_rejects_unknown_backend() {
        let err = ServerConfig::from_toml(r#"backend = "postgres""#).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
