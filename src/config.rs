use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that selects the database file
pub const DATABASE_ENV: &str = "APP_DB_PATH";

/// Database used when nothing else selects one
pub const DEFAULT_DATABASE: &str = "app.db";

pub const DEFAULT_PORT: u16 = 8501;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StockgridConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("stockgrid.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StockgridConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StockgridConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StockgridConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Pick the database path: explicit flag, then `APP_DB_PATH`, then the
/// config file, then [`DEFAULT_DATABASE`].
pub fn resolve_database_path(
    flag: Option<&Path>,
    env_value: Option<&str>,
    config: Option<&StockgridConfig>,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return PathBuf::from(value);
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}

/// [`resolve_database_path`] reading `APP_DB_PATH` from the process environment
pub fn database_path(flag: Option<&Path>, config: Option<&StockgridConfig>) -> PathBuf {
    let env_value = std::env::var(DATABASE_ENV).ok();
    resolve_database_path(flag, env_value.as_deref(), config)
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
