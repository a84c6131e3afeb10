//! # MDCalc Configuration Module
//!
//! This module provides configuration management for MDCalc, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Lazily loaded process-wide instance
//!
//! ## Usage
//!
//! ```no_run
//! use mdcconfig::get_config;
//!
//! let config = get_config()?;
//!
//! let rate = config.get_charge_rate();
//! let banner = config.banner();
//!
//! config.set_charge_rate(4.5)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use mdcledger::{
    ChargeRate, ThresholdBanner, DEFAULT_BANNER_LABEL, DEFAULT_BANNER_LIMIT,
    DEFAULT_RATE_PER_MINUTE,
};
use once_cell::sync::OnceCell;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{info, warn};

// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("mdcalc.yaml");

static CONFIG: OnceCell<Arc<Config>> = OnceCell::new();

const ENV_CONFIG_DIR: &str = "MDCALC_CONFIG";
const ENV_PREFIX: &str = "MDCALC_CONFIG__";
const CONFIG_DIR_NAME: &str = ".mdcalc";

const DEFAULT_BANNER_ENABLED: bool = true;
const DEFAULT_TIMEOUT_SECS: f64 = 0.0;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// Macro to generate getter/setter for f64 values with default
macro_rules! impl_f64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> f64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) => n.as_f64().unwrap_or($default),
                Ok(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
                    warn!(path = %$path.join("."), value = %s, "Not a number, using default");
                    $default
                }),
                _ => $default,
            }
        }

        pub fn $setter(&self, value: f64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration manager for MDCalc
///
/// # Examples
///
/// ```no_run
/// use mdcconfig::Config;
///
/// let config = Config::load_config("/tmp/mdcalc")?;
/// println!("Rate: {}", config.get_charge_rate());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        // Write then read permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;
        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `MDCALC_CONFIG` environment variable
    /// 3. `.mdcalc` in the current directory
    /// 4. `.mdcalc` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Keys are lowered before merging so `Charge:` and `charge:` meet.
        // An empty file parses as null and leaves the defaults untouched.
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        if !external_value.is_null() {
            merge_yaml(&mut default_value, &Self::lower_keys_value(external_value));
        }
        let mut config_value = Self::lower_keys_value(default_value);

        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    fn data(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("configuration lock poisoned"))
    }

    pub fn config_directory(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.data()?)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["charge", "rate_per_minute"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data()?;
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data()?;
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                if let Some(next) = map.get(&Value::String(key.to_lowercase())) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                if let Err(e) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var = %key, error = %e, "Ignoring environment override");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let new_key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(new_key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    impl_f64_config!(
        get_charge_rate,
        set_charge_rate,
        &["charge", "rate_per_minute"],
        DEFAULT_RATE_PER_MINUTE
    );

    impl_bool_config!(
        get_banner_enabled,
        set_banner_enabled,
        &["charge", "banner", "enabled"],
        DEFAULT_BANNER_ENABLED
    );

    impl_f64_config!(
        get_banner_limit,
        set_banner_limit,
        &["charge", "banner", "limit"],
        DEFAULT_BANNER_LIMIT
    );

    impl_f64_config!(
        get_probe_timeout_secs,
        set_probe_timeout_secs,
        &["probe", "timeout_secs"],
        DEFAULT_TIMEOUT_SECS
    );

    /// Label shown above the summary when the charge exceeds the banner limit
    pub fn get_banner_label(&self) -> String {
        match self.get_value(&["charge", "banner", "label"]) {
            Ok(Value::String(s)) => s,
            _ => DEFAULT_BANNER_LABEL.to_string(),
        }
    }

    pub fn set_banner_label(&self, label: String) -> Result<()> {
        self.set_value(&["charge", "banner", "label"], Value::String(label))
    }

    /// The configured rate, clamped like any other rate input
    pub fn charge_rate(&self) -> ChargeRate {
        ChargeRate::new(self.get_charge_rate())
    }

    /// Builds the threshold banner from the `charge.banner` section
    pub fn banner(&self) -> ThresholdBanner {
        ThresholdBanner {
            enabled: self.get_banner_enabled(),
            limit: self.get_banner_limit(),
            label: self.get_banner_label(),
        }
    }

    /// Per-file resolution bound; `None` when unset, zero or invalid
    pub fn get_resolve_timeout(&self) -> Option<Duration> {
        let secs = self.get_probe_timeout_secs();
        (secs.is_finite() && secs > 0.0).then(|| Duration::from_secs_f64(secs))
    }

    /// Minimum log level
    pub fn get_log_min_level(&self) -> String {
        match self.get_value(&["logger", "min_level"]) {
            Ok(Value::String(s)) => s,
            _ => DEFAULT_LOG_MIN_LEVEL.to_string(),
        }
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["logger", "min_level"], Value::String(level))
    }
}

/// Returns the global configuration instance
///
/// The configuration is loaded from the default location on first access.
pub fn get_config() -> Result<Arc<Config>> {
    CONFIG
        .get_or_try_init(|| Config::load_config("").map(Arc::new))
        .cloned()
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings, keys from external are merged into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_merge_yaml_overrides_leaves() {
        let mut base = yaml("charge:\n  rate_per_minute: 3\n  banner:\n    limit: 150\n");
        merge_yaml(&mut base, &yaml("charge:\n  banner:\n    limit: 99\n"));
        assert_eq!(
            Config::get_value_internal(&base, &["charge", "banner", "limit"]).unwrap(),
            yaml("99")
        );
        assert_eq!(
            Config::get_value_internal(&base, &["charge", "rate_per_minute"]).unwrap(),
            yaml("3")
        );
    }

    #[test]
    fn test_lower_keys() {
        let lowered = Config::lower_keys_value(yaml("Charge:\n  Rate_Per_Minute: 2\n"));
        assert!(Config::get_value_internal(&lowered, &["charge", "rate_per_minute"]).is_ok());
    }

    #[test]
    fn test_set_value_internal_creates_path() {
        let mut data = Value::Mapping(Mapping::new());
        Config::set_value_internal(&mut data, &["PROBE", "timeout_secs"], yaml("5")).unwrap();
        assert_eq!(
            Config::get_value_internal(&data, &["probe", "timeout_secs"]).unwrap(),
            yaml("5")
        );
    }

    #[test]
    fn test_set_value_internal_rejects_scalar_parent() {
        let mut data = yaml("probe: 3");
        assert!(Config::set_value_internal(&mut data, &["probe", "timeout_secs"], yaml("5")).is_err());
    }

    #[test]
    fn test_convert_env_value() {
        assert_eq!(Config::convert_env_value("4.5"), yaml("4.5"));
        assert_eq!(Config::convert_env_value("false"), Value::Bool(false));
        assert_eq!(
            Config::convert_env_value("big spender"),
            Value::String("big spender".into())
        );
    }
}
