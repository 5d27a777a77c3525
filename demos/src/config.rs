//! JSON configuration files.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DemoError;

/// Reads `path` as JSON, or returns the default when no path is given.
/// Missing fields fall back to their defaults.
pub fn load_json<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, DemoError> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = fs::read_to_string(path).map_err(|source| DemoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = serde_json::from_str(&text).map_err(|source| DemoError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded {}", path.display());
    Ok(cfg)
}

/// Seed of the first run: the command line wins, then the loaded file,
/// then a random one.
pub fn first_seed(cli: Option<u64>, file: Option<u64>) -> u64 {
    cli.or(file).unwrap_or_else(rand::random)
}

/// The default configuration of type `T`, pretty-printed.
pub fn example_json<T: Serialize + Default>() -> Result<String, DemoError> {
    Ok(serde_json::to_string_pretty(&T::default())?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use stepviz_algos::{AnnealConfig, Objective};
    use stepviz_paths::BoardConfig;

    use super::*;

    fn temp_file(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("stepviz-{}-{name}", std::process::id()));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn no_path_means_defaults() {
        let cfg: AnnealConfig = load_json(None).unwrap();
        assert_eq!(cfg, AnnealConfig::default());
    }

    #[test]
    fn partial_files_keep_defaults() {
        let path = temp_file("anneal.json", r#"{ "objective": "sine", "initial_temp": 50.0 }"#);
        let cfg: AnnealConfig = load_json(Some(&path)).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(cfg.objective, Objective::Sine);
        assert_eq!(cfg.initial_temp, 50.0);
        assert_eq!(cfg.cooling_rate, AnnealConfig::default().cooling_rate);
    }

    #[test]
    fn errors_name_the_file() {
        let missing = Path::new("/nonexistent/stepviz.json");
        let err = load_json::<BoardConfig>(Some(missing)).unwrap_err();
        assert!(matches!(err, DemoError::Read { .. }));
        assert!(err.to_string().contains("stepviz.json"));

        let path = temp_file("broken.json", "{ grid_size: ");
        let err = load_json::<BoardConfig>(Some(&path)).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, DemoError::Parse { .. }));
    }

    #[test]
    fn command_line_seed_wins() {
        assert_eq!(first_seed(Some(1), Some(2)), 1);
        assert_eq!(first_seed(None, Some(2)), 2);
    }

    #[test]
    fn examples_parse_back() {
        let text = example_json::<BoardConfig>().unwrap();
        let back: BoardConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, BoardConfig::default());
    }
}
