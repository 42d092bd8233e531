//! Script library export and import using `MessagePack`.
//!
//! A library carries every loaded script: name, owner, trigger, source and
//! the parsed instruction tree. Importing installs the scripts into an
//! engine without re-parsing.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use textspace_engine::Engine;
use textspace_foundation::{Error, ErrorKind, Result};
use textspace_script::Script;
use tracing::info;

/// Format version written into every export.
pub const LIBRARY_VERSION: u32 = 1;

/// A portable set of scripts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptLibrary {
    /// Format version.
    pub version: u32,
    /// Scripts, sorted by name.
    pub scripts: Vec<Script>,
}

impl ScriptLibrary {
    /// Captures every script loaded in an engine.
    #[must_use]
    pub fn from_engine(engine: &Engine) -> Self {
        Self {
            version: LIBRARY_VERSION,
            scripts: engine.scripts().map(|s| s.as_ref().clone()).collect(),
        }
    }

    /// Installs the scripts, replacing same-named ones. Returns how many.
    pub fn install(self, engine: &mut Engine) -> usize {
        let count = self.scripts.len();
        for script in self.scripts {
            engine.add_script(script);
        }
        info!(count, "script library installed");
        count
    }
}

/// Serializes a library to bytes using `MessagePack` format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(library: &ScriptLibrary) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(library).map_err(|e| Error::internal(e.to_string()))
}

/// Deserializes a library from `MessagePack` bytes.
///
/// # Errors
///
/// Returns a `Config` error if the bytes are not a library of a supported
/// version.
pub fn from_bytes(bytes: &[u8]) -> Result<ScriptLibrary> {
    let library: ScriptLibrary = rmp_serde::from_slice(bytes)
        .map_err(|e| Error::config(format!("invalid script library: {e}")))?;
    if library.version != LIBRARY_VERSION {
        return Err(Error::config(format!(
            "unsupported script library version {}",
            library.version
        )));
    }
    Ok(library)
}

/// Saves a library to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(library: &ScriptLibrary, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_err = |action: &str, e: std::io::Error| {
        Error::new(ErrorKind::Io(format!(
            "failed to {action} '{}': {e}",
            path.display()
        )))
    };

    let file = File::create(path).map_err(|e| io_err("create", e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&to_bytes(library)?)
        .map_err(|e| io_err("write", e))?;
    writer.flush().map_err(|e| io_err("flush", e))?;
    Ok(())
}

/// Loads a library from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a library.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ScriptLibrary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to open '{}': {e}",
            path.display()
        )))
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to read '{}': {e}",
            path.display()
        )))
    })?;
    from_bytes(&bytes)
}
