use std::path::Path;

use anyhow::Context;
use pgstore_crypto::DigestAlgorithm;
use pgstore_notp::PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// Packet type tag for streams of object records.
pub const OBJECT_STREAM_PACKET_TYPE: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub digest: DigestAlgorithm,
    pub protocol_version: u32,
    pub packet_type: i32,
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::Blake3,
            protocol_version: PROTOCOL_VERSION,
            packet_type: OBJECT_STREAM_PACKET_TYPE,
            log_level: "info".into(),
        }
    }
}

impl CliConfig {
    /// Load from a TOML file, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log level {:?}", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CliConfig::default();
        assert_eq!(c.digest, DigestAlgorithm::Blake3);
        assert_eq!(c.protocol_version, PROTOCOL_VERSION);
        assert_eq!(c.packet_type, OBJECT_STREAM_PACKET_TYPE);
        assert_eq!(c.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let c = CliConfig::parse("digest = \"sha256\"\n").unwrap();
        assert_eq!(c.digest, DigestAlgorithm::Sha256);
        assert_eq!(c.log_level, "info");
    }

    #[test]
    fn full_file() {
        let c = CliConfig::parse(
            "digest = \"blake3\"\nprotocol_version = 2\npacket_type = 9\nlog_level = \"debug\"\n",
        )
        .unwrap();
        assert_eq!(c.protocol_version, 2);
        assert_eq!(c.packet_type, 9);
        assert_eq!(c.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn unknown_digest_is_rejected() {
        assert!(CliConfig::parse("digest = \"md5\"\n").is_err());
    }

    #[test]
    fn bad_log_level() {
        let c = CliConfig {
            log_level: "loud".into(),
            ..CliConfig::default()
        };
        assert!(c.log_level().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pgstore.toml");
        std::fs::write(&path, "packet_type = 3\n").unwrap();
        let c = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(c.packet_type, 3);
        assert!(CliConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn no_path_is_default() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }
}
