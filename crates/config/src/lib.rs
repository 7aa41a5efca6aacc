#![forbid(unsafe_code)]

mod error;
mod output;
mod policy;
mod scanner;

pub use error::Error;
pub use output::{Output, OutputLevel};
pub use policy::Policy;
pub use scanner::Scanner;

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub scanner: Scanner,
    pub output: Output,
    pub policy: Policy,
}

impl Config {
    /// Load configuration from a TOML file. Missing fields are filled with defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml_edit::de::from_str(&text)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let toml = toml_edit::ser::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from multiple TOML files. Later files override earlier ones.
    pub fn load_multiple<T, U>(paths: U) -> Result<Self, Error>
    where
        T: AsRef<Path>,
        U: IntoIterator<Item = T>,
    {
        let mut merged = toml_edit::DocumentMut::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(path)?;
            let doc: toml_edit::DocumentMut = text.parse()?;
            merge_document(&mut merged, doc);
        }
        let config: Config = toml_edit::de::from_str(&merged.to_string())?;
        Ok(config)
    }
}

fn merge_document(target: &mut toml_edit::DocumentMut, source: toml_edit::DocumentMut) {
    for (key, item) in source.iter() {
        merge_item(
            target.entry(key).or_insert(toml_edit::Item::None),
            item.clone(),
        );
    }
}

fn merge_item(target: &mut toml_edit::Item, source: toml_edit::Item) {
    use toml_edit::Item;
    match (target, source) {
        (Item::Table(target_table), Item::Table(source_table)) => {
            for (key, item) in source_table.iter() {
                merge_item(target_table.entry(key).or_insert(Item::None), item.clone());
            }
        }
        (Item::ArrayOfTables(target_array), Item::ArrayOfTables(source_array)) => {
            for table in source_array.iter() {
                target_array.push(table.clone());
            }
        }
        (target_item, source_item) => {
            *target_item = source_item;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.scanner.daemonize = true;
        config.scanner.datadir = Some(PathBuf::from("/var/lib/clamav"));
        config.output.level = OutputLevel::High;
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[scanner]\ndaemonize = true\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert!(cfg.scanner.daemonize);
        assert_eq!(cfg.scanner.executable_path_clamscan, PathBuf::from("clamscan"));
        assert_eq!(cfg.output.level, OutputLevel::Low);
        assert!(cfg.policy.error_file_virus);
    }

    #[test]
    fn load_multiple_merges() {
        let dir = tempdir().unwrap();
        let path1 = dir.path().join("a.toml");
        let path2 = dir.path().join("b.toml");

        std::fs::write(&path1, "[scanner]\ndaemonize = true\nfdpass = true\n").unwrap();
        std::fs::write(
            &path2,
            "[scanner]\nfdpass = false\n[policy]\nerror_file_missing = true\n",
        )
        .unwrap();

        let cfg = Config::load_multiple([path1, path2]).unwrap();
        assert!(cfg.scanner.daemonize);
        assert!(!cfg.scanner.fdpass);
        assert!(cfg.policy.error_file_missing);
    }

    #[test]
    fn load_multiple_skips_missing_files() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present.toml");
        let absent = dir.path().join("absent.toml");

        std::fs::write(&present, "[output]\nlevel = \"off\"\n").unwrap();

        let cfg = Config::load_multiple([absent, present]).unwrap();
        assert_eq!(cfg.output.level, OutputLevel::Off);
    }
}
