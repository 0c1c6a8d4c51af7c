use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "gridform";
const LOG_FILE_NAME: &str = "gridform.log";

pub const DATA_DIR_ENV: &str = "GRIDFORM_DATA_DIR";
pub const CACHE_DIR_ENV: &str = "GRIDFORM_CACHE_DIR";

/// Filesystem locations used by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the key-value store.
    pub data_dir: PathBuf,
    /// Directory receiving exports and the log file.
    pub cache_dir: PathBuf,
}

impl AppConfig {
    /// Resolves directories from the environment, then platform defaults.
    pub fn from_env() -> Self {
        Self::resolve(
            env::var_os(DATA_DIR_ENV).map(PathBuf::from),
            env::var_os(CACHE_DIR_ENV).map(PathBuf::from),
        )
    }

    fn resolve(data_override: Option<PathBuf>, cache_override: Option<PathBuf>) -> Self {
        let data_dir = data_override
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| platform_dir(dirs::data_dir()));
        let cache_dir = cache_override
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| platform_dir(dirs::cache_dir()));
        Self { data_dir, cache_dir }
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join(LOG_FILE_NAME)
    }
}

fn platform_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(env::temp_dir).join(APP_DIR_NAME)
}
