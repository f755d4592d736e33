//! Service configuration: listener, submission limits, and the emulated host.

use std::path::Path;

use hostsvc_dynalloc::DatasetDefinition;
use hostsvc_encoding::{Ccsid, CodePage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Job numbers run `JOB00001`..`JOB99999`, so no more jobs can be queued.
const MAX_QUEUED_JOBS: usize = 99_999;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema.
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Job submission settings.
    #[serde(default)]
    pub submit: SubmitConfig,
    /// Emulated host backends.
    #[serde(default)]
    pub host: HostConfig,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Job submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Record length for inline JCL.
    #[serde(default = "default_jcl_record_length")]
    pub jcl_record_length: usize,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Most records a single submission may write.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// EBCDIC code page of the records handed to the internal reader.
    #[serde(default = "default_native_codepage")]
    pub native_codepage: String,
    /// Status for inline text that does not start with `//` (400 or 500).
    #[serde(default = "default_non_jcl_status")]
    pub non_jcl_status: u16,
}

/// Emulated host: dataset catalog and device state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Root of the dataset tree.
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: String,
    /// Whether the catalog starts out reachable.
    #[serde(default = "default_true")]
    pub catalog_available: bool,
    /// Volumes that start out offline.
    #[serde(default)]
    pub offline_volumes: Vec<String>,
    /// Datasets with explicit attributes.
    #[serde(default)]
    pub datasets: Vec<DatasetDefinition>,
    /// Jobs the input queue retains; the oldest is dropped beyond this.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.submit.code_page()?;
        if self.submit.jcl_record_length == 0 {
            return Err(ConfigError::Invalid(
                "submit.jcl_record_length must be positive".to_string(),
            ));
        }
        if self.submit.max_records == 0 {
            return Err(ConfigError::Invalid(
                "submit.max_records must be positive".to_string(),
            ));
        }
        if self.host.max_jobs == 0 || self.host.max_jobs > MAX_QUEUED_JOBS {
            return Err(ConfigError::Invalid(format!(
                "host.max_jobs must be between 1 and {MAX_QUEUED_JOBS}, got {}",
                self.host.max_jobs
            )));
        }
        if !matches!(self.submit.non_jcl_status, 400 | 500) {
            return Err(ConfigError::Invalid(format!(
                "submit.non_jcl_status must be 400 or 500, got {}",
                self.submit.non_jcl_status
            )));
        }
        Ok(())
    }
}

impl SubmitConfig {
    /// The native code page, which must be EBCDIC.
    pub fn code_page(&self) -> Result<(Ccsid, &'static CodePage), ConfigError> {
        let ccsid = Ccsid::from_name(&self.native_codepage)
            .map_err(|e| ConfigError::Invalid(format!("submit.native_codepage: {e}")))?;
        let page = ccsid.code_page().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "submit.native_codepage must be an EBCDIC code page, got {}",
                self.native_codepage
            ))
        })?;
        Ok((ccsid, page))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            jcl_record_length: default_jcl_record_length(),
            max_body_bytes: default_max_body_bytes(),
            max_records: default_max_records(),
            native_codepage: default_native_codepage(),
            non_jcl_status: default_non_jcl_status(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            catalog_available: true,
            offline_volumes: Vec::new(),
            datasets: Vec::new(),
            max_jobs: default_max_jobs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8542
}

fn default_jcl_record_length() -> usize {
    80
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_records() -> usize {
    100_000
}

fn default_native_codepage() -> String {
    "IBM-1047".to_string()
}

fn default_non_jcl_status() -> u16 {
    500
}

fn default_dataset_dir() -> String {
    "/var/lib/hostsvc/datasets".to_string()
}

fn default_max_jobs() -> usize {
    hostsvc_intrdr::DEFAULT_MAX_JOBS
}

fn default_true() -> bool {
    true
}
