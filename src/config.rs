use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeaConfig {
    /// File extensions treated as Sea source
    pub extensions: Vec<String>,
    /// Extra gitignore-style patterns skipped when walking directories
    pub exclude: Vec<String>,
    /// Grammar library to load instead of the built-in grammar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
    /// Worker threads for batch parsing (0 = available parallelism)
    pub threads: usize,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["sea".to_string()],
            exclude: Vec::new(),
            library: None,
            threads: 0,
        }
    }
}

impl SeaConfig {
    pub fn is_sea_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }

    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("sea.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SeaConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SeaConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

/// Config for a command run. A file named with `--config` must exist; the
/// default `sea.toml` may be absent.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<SeaConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("config file {} does not exist", path.display());
        }
    }
    Ok(load_config(explicit)?.unwrap_or_default())
}

pub fn write_config(path: &Path, config: &SeaConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("sea.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sea.toml");
        let config = SeaConfig {
            exclude: vec!["generated/".to_string()],
            threads: 2,
            ..SeaConfig::default()
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = resolve_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        let path = dir.path().join("sea.toml");
        std::fs::write(&path, "threads = 3\n").unwrap();
        assert_eq!(resolve_config(Some(&path)).unwrap().threads, 3);
    }

    #[test]
    fn test_invalid_config_can_be_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sea.toml");
        std::fs::write(&path, "threads = \"many\"\n").unwrap();
        assert!(resolve_config(Some(&path)).is_err());

        write_config(&path, &SeaConfig::default(), true).unwrap();
        assert_eq!(resolve_config(Some(&path)).unwrap(), SeaConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SeaConfig = toml::from_str("threads = 4\n").unwrap();
        assert_eq!(config.extensions, vec!["sea".to_string()]);
        assert_eq!(config.worker_count(), 4);
        assert!(config.is_sea_file(Path::new("src/main.sea")));
        assert!(!config.is_sea_file(Path::new("src/main.c")));
    }
}
