// src/config.rs

use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;

/// Crop a FITS image and paint a boolean mask over it.
///
/// Anything not given on the command line is asked for on the terminal.
#[derive(Debug, Parser)]
#[command(name = "maskselect", version, about)]
pub struct Cli {
    /// FITS file to open
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output name for the cropped array (".npy" is appended)
    #[arg(long)]
    pub crop_output: Option<String>,

    /// Output name for the mask array (".npy" is appended)
    #[arg(long)]
    pub mask_output: Option<String>,

    /// Lower display stretch percentile
    #[arg(long, default_value_t = 3.0)]
    pub low_percentile: f64,

    /// Upper display stretch percentile
    #[arg(long, default_value_t = 99.7)]
    pub high_percentile: f64,

    /// Log filter, e.g. "info" or "maskselect=debug"
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// 选区窗口的显示参数
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorConfig {
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub outline_rgb: (u8, u8, u8),
    pub line_width: f64,
    pub window_size: (f64, f64),
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            low_percentile: 3.0,
            high_percentile: 99.7,
            outline_rgb: (255, 0, 0),
            line_width: 2.0,
            window_size: (900.0, 900.0),
        }
    }
}

impl Cli {
    pub fn selector_config(&self) -> Result<SelectorConfig> {
        let (low, high) = (self.low_percentile, self.high_percentile);
        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
            bail!("Invalid stretch percentiles {low}/{high}: need 0 <= low < high <= 100");
        }
        Ok(SelectorConfig {
            low_percentile: low,
            high_percentile: high,
            ..SelectorConfig::default()
        })
    }
}
