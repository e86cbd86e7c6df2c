// src/export.rs

use anyhow::{Context, Result};
use ndarray::Array2;
use ndarray_npy::{ReadableElement, WritableElement, read_npy, write_npy};
use std::path::{Path, PathBuf};

/// `<stem>.npy`. The stem is taken as typed, no extension check.
pub fn npy_path(stem: &str) -> PathBuf {
    PathBuf::from(format!("{stem}.npy"))
}

/// Write `array` to `<stem>.npy`, replacing any existing file.
pub fn save_npy<T: WritableElement>(stem: &str, array: &Array2<T>) -> Result<PathBuf> {
    let path = npy_path(stem);
    write_npy(&path, array).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

pub fn load_npy<T: ReadableElement>(path: &Path) -> Result<Array2<T>> {
    read_npy(path).with_context(|| format!("Failed to read {}", path.display()))
}
