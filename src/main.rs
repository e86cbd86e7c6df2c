use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

mod config;
mod export;
mod fits;
mod prompt;
mod selection;
mod selection_logic;
mod session;
mod stretch;

use config::Cli;
use prompt::{CROP_NAME_PROMPT, MASK_NAME_PROMPT, prompt_existing_path, prompt_line};

fn setup_logging(level: &str) -> Result<LoggerHandle> {
    let handle = Logger::try_with_str(level)
        .with_context(|| format!("Invalid log specification '{level}'"))?
        .log_to_stdout()
        .start()
        .context("Logger initialization failed")?;
    Ok(handle)
}

/// Path from the command line if it exists, otherwise ask until one does.
fn resolve_input<R: BufRead, W: Write>(arg: Option<PathBuf>, input: &mut R, output: &mut W) -> Result<PathBuf> {
    match arg {
        Some(path) if path.exists() => Ok(path),
        Some(path) => {
            warn!("File '{}' not found.", path.display());
            prompt_existing_path(input, output)
        }
        None => prompt_existing_path(input, output),
    }
}

fn output_name<R: BufRead, W: Write>(arg: Option<String>, input: &mut R, output: &mut W, message: &str) -> Result<String> {
    match arg {
        Some(name) => Ok(name),
        None => prompt_line(input, output, message),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level)?;
    let cfg = cli.selector_config()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let path = resolve_input(cli.input.clone(), &mut input, &mut output)?;
    let image = fits::load_fits(&path)?;
    info!(
        "File '{}' loaded successfully ({}x{}).",
        path.display(),
        image.width(),
        image.height()
    );

    let region = session::run_crop_session(&image.data, &cfg)?;
    let cropped = region.crop(&image.data);
    info!("Cropped data to {}", region);

    let crop_name = output_name(cli.crop_output.clone(), &mut input, &mut output, CROP_NAME_PROMPT)?;
    let crop_path = export::save_npy(&crop_name, &cropped)?;
    info!("Cropped data saved as '{}'", crop_path.display());

    let mask = session::run_mask_session(&cropped, &cfg)?;
    let mask_name = output_name(cli.mask_output.clone(), &mut input, &mut output, MASK_NAME_PROMPT)?;
    let mask_path = export::save_npy(&mask_name, &mask)?;
    info!("Mask saved as {}", mask_path.display());

    Ok(())
}
