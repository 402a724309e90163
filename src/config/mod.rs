use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::LedgerError;
use crate::utils::paths;

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Appended to every rendered amount.
    pub currency_suffix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Ask before deleting banked income, resetting savings, or removing reports.
    pub confirm_destructive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_suffix: "円".into(),
            store_path: None,
            confirm_destructive: true,
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        fs::create_dir_all(&base).map_err(|err| {
            LedgerError::Config(format!("cannot create `{}`: {err}", base.display()))
        })?;
        Ok(Self {
            path: paths::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("invalid `{}`: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Store file for `config`: the override when set, relative overrides resolved
    /// against the data directory.
    pub fn store_path(&self, config: &Config) -> PathBuf {
        match &config.store_path {
            Some(custom) if custom.is_absolute() => custom.clone(),
            Some(custom) => self.base.join(custom),
            None => paths::store_file_in(&self.base),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
