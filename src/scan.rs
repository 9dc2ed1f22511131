use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// All `.tex` files under `root`, sorted, skipping any whose file name is in `ignore`.
pub fn tex_files(root: &Path, ignore: &BTreeSet<String>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tex"))
        .filter(|e| !ignore.contains(e.file_name().to_string_lossy().as_ref()))
        .map(|e| e.into_path())
        .collect()
}

/// Read a source document. Anything that is not UTF-8 is an error.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| Error::Decode {
        path: path.to_path_buf(),
    })
}
