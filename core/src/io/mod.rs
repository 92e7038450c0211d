#[cfg(feature = "fits")]
pub mod fits;
pub mod output;
pub mod table;

#[cfg(feature = "fits")]
pub use fits::FitsTableReader;
pub use output::{read_light_curve, write_light_curve, LIGHT_CURVE_FILE};
pub use table::TextTableReader;

use crate::prelude::{LightCurveError, LightCurveResult, PhotometryReader};
use crate::records::PhotometryRow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const FITS_MAGIC: &[u8] = b"SIMPLE  =";

/// Picks the FITS or text reader by looking at the first bytes of the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoReader;

impl AutoReader {
    pub fn new() -> Self {
        Self
    }

    pub fn is_fits(path: &Path) -> LightCurveResult<bool> {
        let mut file = File::open(path).map_err(|err| LightCurveError::io(path, err))?;
        let mut magic = [0u8; 9];
        let mut filled = 0;
        while filled < magic.len() {
            let read = file
                .read(&mut magic[filled..])
                .map_err(|err| LightCurveError::io(path, err))?;
            if read == 0 {
                return Ok(false);
            }
            filled += read;
        }
        Ok(magic == FITS_MAGIC)
    }
}

impl PhotometryReader for AutoReader {
    fn read_rows(&self, path: &Path) -> LightCurveResult<Vec<PhotometryRow>> {
        if Self::is_fits(path)? {
            read_fits(path)
        } else {
            TextTableReader::new().read_rows(path)
        }
    }
}

#[cfg(feature = "fits")]
fn read_fits(path: &Path) -> LightCurveResult<Vec<PhotometryRow>> {
    FitsTableReader::new().read_rows(path)
}

#[cfg(not(feature = "fits"))]
fn read_fits(path: &Path) -> LightCurveResult<Vec<PhotometryRow>> {
    Err(LightCurveError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason: "FITS input needs the `fits` feature".into(),
    })
}
