// Primitives for reading and writing the data files.

use std::path::Path;

use crate::store::*;

pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

pub fn ensure_dir(path: &Path) -> StoreResult<()> {
    if !path.exists() {
        info!("Creating directory {:?}", path);
        fs::create_dir_all(path).context(CreatingDirSnafu {
            path: display_path(path),
        })?;
    }
    Ok(())
}

/// Reads a JSON file. Returns None if the file does not exist.
pub fn read_json(path: &Path) -> StoreResult<Option<JSValue>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).context(ReadingFileSnafu {
        path: display_path(path),
    })?;
    debug!("read_json: {:?}: {} bytes", path, contents.len());
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
        path: display_path(path),
    })?;
    Ok(Some(js))
}

pub fn write_json(path: &Path, js: &JSValue) -> StoreResult<()> {
    let contents = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {
        path: display_path(path),
    })?;
    write_text(path, &contents)
}

pub fn write_text(path: &Path, contents: &str) -> StoreResult<()> {
    debug!("write_text: {:?}: {} bytes", path, contents.len());
    fs::write(path, contents).context(WritingFileSnafu {
        path: display_path(path),
    })
}

pub fn remove_file(path: &Path) -> StoreResult<()> {
    fs::remove_file(path).context(WritingFileSnafu {
        path: display_path(path),
    })
}
