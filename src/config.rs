//! Configuration for nbs
//!
//! Centralized configuration with sensible defaults. The backend is chosen
//! here, once, when a table set is constructed.

use std::path::PathBuf;

use crate::error::{NbsError, Result};

/// Main configuration for a table store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Where tables live
    pub backend: Backend,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Max size of memtable before flush (in bytes)
    pub memtable_size_limit: usize,

    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Timeout for each request to a remote backend (seconds)
    pub http_timeout_secs: u64,
}

/// Storage backend for tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// One file per table in a local directory
    Local { dir: PathBuf },

    /// One object per table in a bucket behind an HTTP endpoint
    Remote { endpoint: String, bucket: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Local {
                dir: PathBuf::from("./nbs_data"),
            },
            memtable_size_limit: 64 * 1024 * 1024, // 64 MB
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values that can never work
    pub fn validate(&self) -> Result<()> {
        match &self.backend {
            Backend::Local { dir } if dir.as_os_str().is_empty() => {
                return Err(NbsError::Config("local table directory is empty".to_string()));
            }
            Backend::Remote { endpoint, .. } if endpoint.is_empty() => {
                return Err(NbsError::Config("remote endpoint is empty".to_string()));
            }
            Backend::Remote { bucket, .. } if bucket.is_empty() => {
                return Err(NbsError::Config("remote bucket is empty".to_string()));
            }
            _ => {}
        }
        if self.memtable_size_limit == 0 {
            return Err(NbsError::Config("memtable size limit must be positive".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(NbsError::Config("http timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Store tables as files in `path`
    pub fn local_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.backend = Backend::Local { dir: path.into() };
        self
    }

    /// Store tables as objects in `bucket` at `endpoint`
    pub fn remote(mut self, endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.config.backend = Backend::Remote {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
        };
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    /// Set the per-request timeout for remote backends (in seconds)
    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_selects_backend() {
        let config = Config::builder().remote("http://s3.local", "tables").build();
        assert_eq!(
            config.backend,
            Backend::Remote {
                endpoint: "http://s3.local".to_string(),
                bucket: "tables".to_string()
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_values() {
        assert!(Config::builder().local_dir("").build().validate().is_err());
        assert!(Config::builder().remote("http://x", "").build().validate().is_err());
        assert!(Config::builder().http_timeout_secs(0).build().validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
