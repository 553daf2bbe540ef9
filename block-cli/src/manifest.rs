use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use block::compiler::Config;
use log::debug;
use serde::Deserialize;

use crate::MANIFEST;

/// The optional `block.toml` next to (or above) the
/// sources being transpiled.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub transpile: Config,
}

impl Manifest {
    /// Searches up from `path` for a manifest. No manifest
    /// is not an error; a manifest that can't be read is.
    pub fn find(mut path: &Path) -> Result<Option<(Manifest, PathBuf)>, String> {
        loop {
            let candidate = path.join(MANIFEST);
            if candidate.is_file() {
                let source = fs::read_to_string(&candidate).map_err(|_| {
                    format!("The manifest file '{}' could not be read", candidate.display())
                })?;
                debug!("found manifest at {}", candidate.display());
                return Ok(Some((Manifest::parse(&source)?, candidate)));
            }

            path = match path.parent() {
                Some(parent) => parent,
                None => return Ok(None),
            };
        }
    }

    pub fn parse(source: &str) -> Result<Manifest, String> {
        toml::from_str(source)
            .map_err(|e| format!("Could not parse the manifest file: {}", e))
    }
}

#[cfg(test)]
mod test {
    use block::compiler::Prelude;

    use super::*;

    #[test]
    fn empty_manifest_is_default() {
        let manifest = Manifest::parse("").unwrap();
        assert_eq!(manifest.transpile, Config::default());
    }

    #[test]
    fn partial_table() {
        let manifest = Manifest::parse("[transpile]\nindent = 2\n").unwrap();
        assert_eq!(manifest.transpile.indent, 2);
        assert_eq!(manifest.transpile.tab_width, 4);
    }

    #[test]
    fn prelude_mode() {
        let manifest = Manifest::parse("[transpile]\nprelude = \"import\"\n").unwrap();
        assert_eq!(manifest.transpile.prelude, Prelude::Import);
        assert!(Manifest::parse("[transpile]\nprelude = \"always\"\n").is_err());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(Manifest::parse("[transpile]\nwidth = 2\n").is_err());
        assert!(Manifest::parse("[package]\nname = \"x\"\n").is_err());
    }
}
