use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::layout_engine::Direction;

pub fn config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("treetile").join("config.toml"))
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct TreeLayoutSettings {
    /// Display name of the layout engine.
    #[serde(default = "default_name")]
    pub name: String,
    /// Side of the focused window new windows are placed on. Must be one of
    /// `left`, `right`, `up` or `down`.
    #[serde(default = "default_add_direction")]
    pub default_add_direction: Direction,
    /// Edge moves that would leave a pane with this share of its split, or
    /// less, are rejected.
    #[serde(default)]
    pub min_pane_fraction: f64,
}

fn default_name() -> String { "Tree".to_string() }

fn default_add_direction() -> Direction { Direction::RIGHT }

impl Default for TreeLayoutSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            default_add_direction: default_add_direction(),
            min_pane_fraction: 0.0,
        }
    }
}

impl TreeLayoutSettings {
    pub fn load(path: &Path) -> anyhow::Result<TreeLayoutSettings> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("loading {}", path.display()))
    }

    /// Loads the settings at the default location, falling back to the
    /// defaults when no file exists there.
    pub fn load_default() -> anyhow::Result<TreeLayoutSettings> {
        match config_file() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn parse(buf: &str) -> anyhow::Result<TreeLayoutSettings> {
        let settings: TreeLayoutSettings = toml::from_str(buf)?;
        let issues = settings.validate();
        if !issues.is_empty() {
            bail!("invalid settings:\n{}", issues.join("\n"));
        }
        Ok(settings)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push("name must not be empty".to_string());
        }

        if !self.default_add_direction.is_cardinal() {
            issues.push(format!(
                "default_add_direction must be left, right, up or down, got {}",
                self.default_add_direction
            ));
        }

        if !(0.0..0.5).contains(&self.min_pane_fraction) {
            issues.push(format!(
                "min_pane_fraction must be in [0, 0.5), got {}",
                self.min_pane_fraction
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let settings = TreeLayoutSettings::parse("").unwrap();
        assert_eq!(settings, TreeLayoutSettings::default());
        assert_eq!(settings.name, "Tree");
        assert_eq!(settings.default_add_direction, Direction::RIGHT);
        assert_eq!(settings.min_pane_fraction, 0.0);
    }

    #[test]
    fn test_parse_all_fields() {
        let toml = r#"
            name = "Columns"
            default_add_direction = "down"
            min_pane_fraction = 0.05
        "#;
        let settings = TreeLayoutSettings::parse(toml).unwrap();
        assert_eq!(settings.name, "Columns");
        assert_eq!(settings.default_add_direction, Direction::DOWN);
        assert_eq!(settings.min_pane_fraction, 0.05);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(TreeLayoutSettings::parse("gaps = 4").is_err());
    }

    #[test]
    fn test_validation_diagonal_direction() {
        let err = TreeLayoutSettings::parse("default_add_direction = \"left_up\"").unwrap_err();
        assert!(err.to_string().contains("default_add_direction"));
    }

    #[test]
    fn test_validation_min_pane_fraction_out_of_range() {
        let mut settings = TreeLayoutSettings::default();
        settings.min_pane_fraction = 0.5;
        let issues = settings.validate();
        assert!(issues.iter().any(|i| i.contains("min_pane_fraction")));

        settings.min_pane_fraction = -0.1;
        assert_eq!(settings.validate().len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_add_direction = \"up\"").unwrap();
        let settings = TreeLayoutSettings::load(file.path()).unwrap();
        assert_eq!(settings.default_add_direction, Direction::UP);
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = TreeLayoutSettings::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }
}
