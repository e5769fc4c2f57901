//! Configuration du codec SOAP
//!
//! Seules les limites de lecture sont configurables ; le format des
//! enveloppes écrites est fixe.
//!
//! ```yaml
//! soap:
//!   max_envelope_size: 1048576
//! ```

use std::{env, fs, path::Path};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::info;

const ENV_MAX_ENVELOPE_SIZE: &str = "PMOSOAP_MAX_ENVELOPE_SIZE";

// Default values for configuration
const DEFAULT_MAX_ENVELOPE_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapConfig {
    /// Taille maximale (en octets) d'une enveloppe lue
    pub max_envelope_size: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    soap: SoapConfig,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            max_envelope_size: DEFAULT_MAX_ENVELOPE_SIZE,
        }
    }
}

impl SoapConfig {
    /// Lit la section `soap` d'un document YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile =
            serde_yaml::from_str(yaml).context("Invalid SOAP configuration")?;
        Ok(file.soap)
    }

    /// Charge un fichier YAML puis applique les surcharges d'environnement
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&yaml)?.with_env_overrides()?;
        info!(
            "SOAP configuration loaded from {} (max_envelope_size={})",
            path.display(),
            config.max_envelope_size
        );
        Ok(config)
    }

    /// Applique `PMOSOAP_MAX_ENVELOPE_SIZE` si la variable est définie
    pub fn with_env_overrides(self) -> Result<Self> {
        match env::var(ENV_MAX_ENVELOPE_SIZE) {
            Ok(value) => self.with_override(&value),
            Err(_) => Ok(self),
        }
    }

    fn with_override(mut self, value: &str) -> Result<Self> {
        self.max_envelope_size = value
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a byte count, got {:?}", ENV_MAX_ENVELOPE_SIZE, value))?;
        Ok(self)
    }
}
