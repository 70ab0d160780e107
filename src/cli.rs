//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use antenati_core::Quality;
use clap::Parser;

/// Downloads records from Portale Antenati.
///
/// Fetches every page image of the record at URL and stores them as
/// numbered JPEG files under `city/type/year`.
#[derive(Parser, Debug)]
#[command(name = "antenati-dl")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the record page on antenati.cultura.gov.it
    pub url: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Image quality: high (2048px), mid (1024px), low (512px), or a pixel width
    #[arg(long, value_name = "QUALITY")]
    pub quality: Option<Quality>,

    /// Number of the first page
    #[arg(long, default_value_t = 1, value_name = "N")]
    pub start_at: u32,

    /// Root directory of the city/type/year tree [default: .]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Show which files would be downloaded without downloading them
    #[arg(long)]
    pub dry_run: bool,
}
