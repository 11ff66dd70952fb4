use std::{
    fs,
    path::PathBuf,
    sync::{LazyLock, PoisonError, RwLock},
};

use apkicon_utils::{bytes::parse_bytes, path::xdg_config_home};
use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    display::DisplaySettings,
    error::{ConfigError, Result},
};

pub const DEFAULT_MAX_ENTRY_SIZE: &str = "16 MiB";
pub const DEFAULT_MAX_MEMBER_SIZE: &str = "1 GiB";
pub const DEFAULT_PARALLEL_LIMIT: usize = 4;

/// apkicon configuration
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Largest icon payload that will be decompressed, e.g. "16 MiB".
    /// Larger candidates are skipped.
    /// Default: "16 MiB"
    pub max_entry_size: Option<String>,

    /// Largest bundle member (nested .apk) that will be decompressed.
    /// Larger members are skipped.
    /// Default: "1 GiB"
    pub max_member_size: Option<String>,

    /// If true, multiple input files are processed in parallel.
    /// Default: true
    pub parallel: Option<bool>,

    /// Maximum number of files processed at once.
    /// Default: 4
    pub parallel_limit: Option<usize>,

    /// Terminal output settings.
    pub display: Option<DisplaySettings>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("APKICON_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("apkicon").join("config.toml"),
    })
});

/// Loads the configuration file into the process-wide slot.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    *global_config = Some(config);
    Ok(())
}

/// Returns the loaded configuration, or the defaults if [`init`] was not called.
pub fn get_config() -> Config {
    CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(Config::default_config)
}

pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .to_path_buf()
}

pub fn set_config_path(path: PathBuf) {
    let mut config_path = CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner);
    *config_path = path;
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            max_entry_size: Some(DEFAULT_MAX_ENTRY_SIZE.to_string()),
            max_member_size: Some(DEFAULT_MAX_MEMBER_SIZE.to_string()),
            parallel: Some(true),
            parallel_limit: Some(DEFAULT_PARALLEL_LIMIT),
            display: Some(DisplaySettings {
                colors: Some(true),
                icons: Some(true),
            }),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = config_path();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %config_path.display(), "no config file, using defaults");
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills unset fields with defaults and validates the sizes.
    pub fn resolve(&mut self) -> Result<()> {
        self.max_entry_size
            .get_or_insert_with(|| DEFAULT_MAX_ENTRY_SIZE.to_string());
        self.max_member_size
            .get_or_insert_with(|| DEFAULT_MAX_MEMBER_SIZE.to_string());
        self.parallel.get_or_insert(true);
        self.parallel_limit.get_or_insert(DEFAULT_PARALLEL_LIMIT);
        self.display.get_or_insert_with(DisplaySettings::default);

        if self.max_entry_size()? == 0 {
            return Err(ConfigError::ZeroValue("max_entry_size"));
        }
        if self.max_member_size()? == 0 {
            return Err(ConfigError::ZeroValue("max_member_size"));
        }
        if self.parallel_limit == Some(0) {
            return Err(ConfigError::ZeroValue("parallel_limit"));
        }

        Ok(())
    }

    /// Largest icon payload in bytes. `APKICON_MAX_ENTRY_SIZE` takes precedence.
    pub fn max_entry_size(&self) -> Result<u64> {
        size_setting(
            "max_entry_size",
            "APKICON_MAX_ENTRY_SIZE",
            self.max_entry_size.as_deref(),
            DEFAULT_MAX_ENTRY_SIZE,
        )
    }

    /// Largest bundle member in bytes. `APKICON_MAX_MEMBER_SIZE` takes precedence.
    pub fn max_member_size(&self) -> Result<u64> {
        size_setting(
            "max_member_size",
            "APKICON_MAX_MEMBER_SIZE",
            self.max_member_size.as_deref(),
            DEFAULT_MAX_MEMBER_SIZE,
        )
    }

    pub fn parallel_limit(&self) -> usize {
        if self.parallel.unwrap_or(true) {
            self.parallel_limit.unwrap_or(DEFAULT_PARALLEL_LIMIT).max(1)
        } else {
            1
        }
    }

    pub fn display(&self) -> DisplaySettings {
        self.display.clone().unwrap_or_default()
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(display_table) = doc.get_mut("display").and_then(|d| d.as_table_mut()) {
            annotate_toml_table::<DisplaySettings>(display_table, true)?;
        }

        Ok(doc)
    }
}

fn size_setting(
    field: &'static str,
    env_var: &str,
    configured: Option<&str>,
    default: &str,
) -> Result<u64> {
    let value = std::env::var(env_var)
        .ok()
        .or_else(|| configured.map(String::from))
        .unwrap_or_else(|| default.to_string());

    parse_bytes(&value).map_err(|source| {
        ConfigError::InvalidSize {
            field,
            source,
        }
    })
}

/// Writes an annotated default configuration file to [`CONFIG_PATH`].
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();

        assert_eq!(config.max_entry_size.as_deref(), Some("16 MiB"));
        assert_eq!(config.max_member_size.as_deref(), Some("1 GiB"));
        assert_eq!(config.parallel, Some(true));
        assert_eq!(config.parallel_limit, Some(4));
        assert!(config.display().colors());
    }

    #[test]
    #[serial]
    fn test_size_accessors() {
        let config = Config::default_config();
        assert_eq!(config.max_entry_size().unwrap(), 16 * 1024 * 1024);
        assert_eq!(config.max_member_size().unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn test_size_env_override() {
        with_env(vec![("APKICON_MAX_ENTRY_SIZE", "2 MiB")], || {
            let config = Config::default_config();
            assert_eq!(config.max_entry_size().unwrap(), 2 * 1024 * 1024);
        });
    }

    #[test]
    #[serial]
    fn test_resolve_fills_defaults() {
        let mut config: Config = toml::from_str("parallel = false").unwrap();
        config.resolve().unwrap();

        assert_eq!(config.max_entry_size.as_deref(), Some(DEFAULT_MAX_ENTRY_SIZE));
        assert_eq!(config.max_member_size.as_deref(), Some(DEFAULT_MAX_MEMBER_SIZE));
        assert_eq!(config.parallel_limit, Some(DEFAULT_PARALLEL_LIMIT));
        assert_eq!(config.parallel_limit(), 1);
    }

    #[test]
    #[serial]
    fn test_resolve_rejects_bad_sizes() {
        let mut config = Config::default_config();
        config.max_entry_size = Some("lots".to_string());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidSize {
                field: "max_entry_size",
                ..
            })
        ));

        let mut config = Config::default_config();
        config.max_member_size = Some("0".to_string());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::ZeroValue("max_member_size"))
        ));

        let mut config = Config::default_config();
        config.parallel_limit = Some(0);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::ZeroValue("parallel_limit"))
        ));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default_config();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(deserialized.max_entry_size, config.max_entry_size);
        assert_eq!(deserialized.parallel_limit, config.parallel_limit);
    }

    #[test]
    #[serial]
    fn test_load_and_generate_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apkicon").join("config.toml");
        set_config_path(path.clone());

        let loaded = Config::new().unwrap();
        assert_eq!(loaded.max_entry_size.as_deref(), Some(DEFAULT_MAX_ENTRY_SIZE));

        assert_eq!(generate_default_config().unwrap(), path);
        assert!(matches!(
            generate_default_config(),
            Err(ConfigError::ConfigAlreadyExists)
        ));

        fs::write(&path, "max_entry_size = \"512 KiB\"\n").unwrap();
        let loaded = Config::new().unwrap();
        assert_eq!(loaded.max_entry_size().unwrap(), 512 * 1024);
        assert_eq!(loaded.parallel_limit(), DEFAULT_PARALLEL_LIMIT);
    }
}
