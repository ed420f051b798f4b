//! Support code for the `distance_map` binary: image stack input, distance
//! field output and terminal progress.

pub mod output;
pub mod progress_bar;
pub mod stack;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use distmap::TransformOptions;

/// Read transform options from a JSON file
///
/// Missing fields take their default values.
pub fn load_options(path: &Path) -> Result<TransformOptions> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open options file {}", path.display()))?;
    let options: TransformOptions = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse options file {}", path.display()))?;
    options.validate()?;
    Ok(options)
}
