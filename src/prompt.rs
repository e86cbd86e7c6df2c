// src/prompt.rs
// Terminal prompts. Generic over reader/writer so the loops can be tested.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub const FITS_PROMPT: &str = "Enter the FITS file name (with extension): ";
pub const CROP_NAME_PROMPT: &str = "Enter name for cropped data file (without extension): ";
pub const MASK_NAME_PROMPT: &str = "Enter name for mask file (without extension): ";

/// Print `message` and read one line, without the trailing newline.
pub fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<String> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read from terminal")?;
    if read == 0 {
        bail!("Input closed while waiting for: {}", message.trim_end());
    }
    Ok(line.trim().to_string())
}

/// 反复询问，直到输入一个存在的文件路径
pub fn prompt_existing_path<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<PathBuf> {
    loop {
        let name = prompt_line(input, output, FITS_PROMPT)?;
        let path = PathBuf::from(&name);
        if path.exists() {
            info!("File '{}' found.", name);
            return Ok(path);
        }
        warn!("File '{}' not found.", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    #[test]
    fn prompt_line_trims_newline() {
        let mut input = Cursor::new("result\r\n");
        let mut output = Vec::new();
        let line = prompt_line(&mut input, &mut output, CROP_NAME_PROMPT).unwrap();
        assert_eq!(line, "result");
        assert_eq!(String::from_utf8(output).unwrap(), CROP_NAME_PROMPT);
    }

    #[test]
    fn prompt_line_errors_on_eof() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(prompt_line(&mut input, &mut output, MASK_NAME_PROMPT).is_err());
    }

    #[test]
    fn existing_path_repeats_until_found() {
        let file = NamedTempFile::new().unwrap();
        let real = file.path().to_string_lossy().into_owned();
        let mut input = Cursor::new(format!("missing-1.fits\nmissing-2.fits\n{real}\n"));
        let mut output = Vec::new();

        let path = prompt_existing_path(&mut input, &mut output).unwrap();
        assert_eq!(path, file.path());
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches(FITS_PROMPT).count(), 3);
    }

    #[test]
    fn existing_path_gives_up_when_input_closes() {
        let mut input = Cursor::new("missing.fits\n");
        let mut output = Vec::new();
        assert!(prompt_existing_path(&mut input, &mut output).is_err());
    }
}
