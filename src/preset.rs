//! Preset resolution: a named preset points at a fingerprint file and
//! carries default duck/fade/target parameters. No detection or loudness
//! logic lives here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DuckError;

#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub fingerprint_path: PathBuf,
    pub duck_db: f32,
    pub fade_seconds: f32,
    pub target_lufs: Option<f32>,
}

/// Load `<presets_dir>/<name>.toml`.
pub fn load(presets_dir: &Path, name: &str) -> Result<Preset, DuckError> {
    let path = presets_dir.join(format!("{name}.toml"));
    let text = std::fs::read_to_string(&path)?;
    toml::from_str(&text)
        .map_err(|e| DuckError::InvalidInterval(format!("invalid preset '{name}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_well_formed_preset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("my-show.toml"),
            "fingerprint_path = \"/fp/my-show.bin\"\nduck_db = -8.0\nfade_seconds = 0.5\n",
        )
        .unwrap();

        let preset = load(dir.path(), "my-show").unwrap();
        assert_eq!(preset.duck_db, -8.0);
        assert_eq!(preset.target_lufs, None);
    }

    #[test]
    fn missing_preset_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path(), "nonexistent").unwrap_err();
        assert!(matches!(err, DuckError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_invalid_interval() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not valid toml {{{").unwrap();
        let err = load(dir.path(), "broken").unwrap_err();
        assert!(matches!(err, DuckError::InvalidInterval(_)));
    }
}
