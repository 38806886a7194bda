// Copyright 2023 Remi Bernotavicius

use crate::label::preset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr as _;

pub const FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
    #[error("unknown default label preset {0:?}")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    /// A TrueType font with Japanese glyphs. System locations are searched when unset.
    pub font_path: Option<PathBuf>,
    pub default_preset: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            default_preset: preset::STANDARD.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Defaults to `data.sqlite` in the data directory.
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub labels: LabelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".into(),
            labels: LabelConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`, or returns the defaults if there is no such file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default())
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.into(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&contents).map_err(|source| Error::Parse {
            path: path.into(),
            source,
        })?;
        config.level_filter()?;
        if preset::find_preset(&config.labels.default_preset).is_none() {
            return Err(Error::UnknownPreset(config.labels.default_preset));
        }
        Ok(config)
    }

    pub fn level_filter(&self) -> Result<log::LevelFilter, Error> {
        log::LevelFilter::from_str(&self.log_level)
            .map_err(|_| Error::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn database_path(&self, data_path: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_path.join("data.sqlite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.level_filter().unwrap(), log::LevelFilter::Info);
        assert_eq!(
            config.database_path(Path::new("/data")),
            Path::new("/data/data.sqlite")
        );
    }

    #[test]
    fn full_file() {
        let (_dir, path) = write(
            r#"
            database_path = "/tmp/bakery.sqlite"
            log_level = "debug"

            [labels]
            font_path = "/fonts/ipag.ttf"
            default_preset = "a-one-72224"
            "#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.level_filter().unwrap(), log::LevelFilter::Debug);
        assert_eq!(
            config.database_path(Path::new("/data")),
            Path::new("/tmp/bakery.sqlite")
        );
        assert_eq!(
            config.labels.font_path.as_deref(),
            Some(Path::new("/fonts/ipag.ttf"))
        );
        assert_eq!(config.labels.default_preset, "a-one-72224");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let (_dir, path) = write("log_level = \"warn\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.labels, LabelConfig::default());
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn rejects_bad_values() {
        let (_dir, path) = write("log_level = \"loud\"\n");
        assert!(matches!(
            Config::load(&path),
            Err(Error::InvalidLogLevel(_))
        ));

        let (_dir, path) = write("[labels]\ndefault_preset = \"nope\"\n");
        assert!(matches!(Config::load(&path), Err(Error::UnknownPreset(_))));

        let (_dir, path) = write("log_level = [");
        assert!(matches!(Config::load(&path), Err(Error::Parse { .. })));
    }
}
