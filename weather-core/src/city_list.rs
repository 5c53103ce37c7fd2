//! Flat city list file: one name per line, no trailing newline.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::CityListError;

#[derive(Debug, Clone)]
pub struct CityListFile {
    path: PathBuf,
}

impl CityListFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the list. A missing file is an error; no default list is made up.
    pub fn load(&self) -> Result<Vec<String>, CityListError> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|source| CityListError::Read { path: self.path.clone(), source })?;

        Ok(contents.lines().map(str::to_string).collect())
    }

    /// Overwrite the list in place. Not atomic: a failed write can leave a
    /// truncated file.
    pub fn save(&self, names: &[String]) -> Result<(), CityListError> {
        let write_err = |source| CityListError::Write { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        fs::write(&self.path, names.join("\n")).map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), count = names.len(), "saved city list");
        Ok(())
    }
}
