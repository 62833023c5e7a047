use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::Sort;
use crate::parser::DEFAULT_PROPERTY_DELIMITER;
use crate::resolver::{SortResolver, DEFAULT_QUALIFIER_DELIMITER, DEFAULT_SORT_PARAMETER};

lazy_static! {
    /// `${VAR}` or `${VAR:-default}`
    static ref ENV_VAR_PATTERN: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("valid env var pattern");
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub sort: SortConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SortConfig {
    #[serde(default = "default_sort_parameter")]
    pub parameter: String,
    #[serde(default = "default_property_delimiter")]
    pub property_delimiter: String,
    #[serde(default = "default_qualifier_delimiter")]
    pub qualifier_delimiter: String,
    #[serde(default)]
    pub fallback: Sort,
}

fn default_sort_parameter() -> String {
    DEFAULT_SORT_PARAMETER.to_string()
}

fn default_property_delimiter() -> String {
    DEFAULT_PROPERTY_DELIMITER.to_string()
}

fn default_qualifier_delimiter() -> String {
    DEFAULT_QUALIFIER_DELIMITER.to_string()
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            parameter: default_sort_parameter(),
            property_delimiter: default_property_delimiter(),
            qualifier_delimiter: default_qualifier_delimiter(),
            fallback: Sort::unsorted(),
        }
    }
}

impl SortConfig {
    pub fn build_resolver(&self) -> AppResult<SortResolver> {
        if self.parameter.trim().is_empty() {
            return Err(AppError::Configuration(
                "sort parameter name must not be blank".to_string(),
            ));
        }
        if self.property_delimiter.is_empty() {
            return Err(AppError::Configuration(
                "sort property delimiter must not be empty".to_string(),
            ));
        }
        if self.qualifier_delimiter.is_empty() {
            return Err(AppError::Configuration(
                "sort qualifier delimiter must not be empty".to_string(),
            ));
        }

        Ok(SortResolver::new()
            .with_sort_parameter(self.parameter.trim())
            .with_property_delimiter(self.property_delimiter.clone())
            .with_qualifier_delimiter(self.qualifier_delimiter.clone())
            .with_fallback(self.fallback.clone()))
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let expanded = Self::expand_env_vars(content)?;
        let app_config: AppConfig = serde_yaml::from_str(&expanded)?;

        // Surface delimiter problems at load time rather than on first request.
        app_config.sort.build_resolver()?;

        Ok(app_config)
    }

    /// Local server with the default `sort` parameter and no fallback.
    pub fn default_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            sort: SortConfig::default(),
        }
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut missing = None;
        let expanded = ENV_VAR_PATTERN.replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match (std::env::var(name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(AppError::Configuration(format!(
                "Environment variable {} not found and no default provided",
                name
            ))),
            None => Ok(expanded.into_owned()),
        }
    }
}
