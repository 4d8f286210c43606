use crate::defaults;
use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pipeline configuration loaded from `config.json`.
///
/// Only `bucket` is required; everything else falls back to the values in
/// [`defaults`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// S3 bucket holding the uploaded audio and the transcription output.
    pub bucket: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: u32,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RecapError::ConfigFileNotFound {
                path: path.display().to_string(),
            }
        } else {
            RecapError::Io(e)
        }
    })
}

fn default_key_prefix() -> String {
    defaults::KEY_PREFIX.to_string()
}

fn default_language_code() -> String {
    defaults::LANGUAGE_CODE.to_string()
}

fn default_sample_rate_hz() -> u32 {
    defaults::SAMPLE_RATE_HZ
}

fn default_model_id() -> String {
    defaults::MODEL_ID.to_string()
}

impl Config {
    /// Config for `bucket` with every optional field at its default.
    pub fn for_bucket(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key_prefix: default_key_prefix(),
            language_code: default_language_code(),
            sample_rate_hz: default_sample_rate_hz(),
            model_id: default_model_id(),
            max_tokens: None,
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// Fails if the file is missing, is not valid JSON, lacks `bucket`, or
    /// carries an empty bucket name.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&read_config_file(path)?)
    }

    /// Load a JSON file, apply environment overrides, then validate.
    ///
    /// The file must still contain a `bucket` key, but it may be empty when
    /// `RECAP_BUCKET` supplies the value.
    pub fn load_with_env_overrides(path: &Path) -> Result<Self> {
        let config = Self::parse(&read_config_file(path)?)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self> {
        let config = Self::parse(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| RecapError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(RecapError::ConfigInvalidValue {
                key: "bucket".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.sample_rate_hz == 0 {
            return Err(RecapError::ConfigInvalidValue {
                key: "sample_rate_hz".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - RECAP_BUCKET → bucket
    /// - RECAP_MODEL_ID → model_id
    /// - RECAP_LANGUAGE → language_code
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bucket) = std::env::var("RECAP_BUCKET")
            && !bucket.is_empty()
        {
            self.bucket = bucket;
        }

        if let Ok(model_id) = std::env::var("RECAP_MODEL_ID")
            && !model_id.is_empty()
        {
            self.model_id = model_id;
        }

        if let Ok(language) = std::env::var("RECAP_LANGUAGE")
            && !language.is_empty()
        {
            self.language_code = language;
        }

        self
    }
}
