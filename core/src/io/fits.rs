use crate::prelude::{LightCurveError, LightCurveResult, PhotometryReader};
use crate::records::{columns, PhotometryRow};
use fitsio::hdu::HduInfo;
use fitsio::FitsFile;
use std::path::Path;

/// Reads the source table in HDU 1 of a `uvotsource`/`uvotmaghist` output file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FitsTableReader;

impl FitsTableReader {
    pub fn new() -> Self {
        Self
    }
}

fn fits_error(path: &Path, err: fitsio::errors::Error) -> LightCurveError {
    LightCurveError::Fits {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl PhotometryReader for FitsTableReader {
    fn read_rows(&self, path: &Path) -> LightCurveResult<Vec<PhotometryRow>> {
        let mut fptr = FitsFile::open(path).map_err(|err| fits_error(path, err))?;
        let hdu = fptr.hdu(1).map_err(|err| fits_error(path, err))?;

        let names: Vec<String> = match &hdu.info {
            HduInfo::TableInfo {
                column_descriptions,
                ..
            } => column_descriptions
                .iter()
                .map(|column| column.name.clone())
                .collect(),
            _ => {
                return Err(LightCurveError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    reason: "HDU 1 is not a table".into(),
                })
            }
        };

        let mut data: Vec<Vec<f64>> = Vec::with_capacity(columns::REQUIRED.len());
        for name in columns::REQUIRED {
            let stored = names
                .iter()
                .find(|column| column.eq_ignore_ascii_case(name))
                .ok_or_else(|| LightCurveError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })?;
            let column: Vec<f64> = hdu
                .read_col(&mut fptr, stored)
                .map_err(|err| fits_error(path, err))?;
            data.push(column);
        }

        let rows = data[0].len();
        if let Some(short) = data.iter().position(|column| column.len() != rows) {
            return Err(LightCurveError::Fits {
                path: path.to_path_buf(),
                message: format!("column {} has a different length", columns::REQUIRED[short]),
            });
        }

        Ok((0..rows)
            .map(|row| {
                let mut values = [0.0f64; 10];
                for (value, column) in values.iter_mut().zip(&data) {
                    *value = column[row];
                }
                PhotometryRow::from_columns(values)
            })
            .collect())
    }
}

/// Writes `rows` as a `uvotmaghist`-style binary table in HDU 1.
#[cfg(test)]
pub(crate) fn write_table(path: &Path, rows: &[PhotometryRow], names: &[&str]) {
    use fitsio::tables::{ColumnDataType, ColumnDescription};

    let mut fptr = FitsFile::create(path).open().unwrap();
    let descriptions: Vec<_> = names
        .iter()
        .map(|name| {
            ColumnDescription::new(*name)
                .with_type(ColumnDataType::Double)
                .create()
                .unwrap()
        })
        .collect();
    let hdu = fptr
        .create_table("MAGHIST".to_string(), &descriptions)
        .unwrap();
    for (index, name) in names.iter().enumerate() {
        let column: Vec<f64> = rows
            .iter()
            .map(|row| {
                [
                    row.met,
                    row.flux,
                    row.flux_err,
                    row.ab_mag,
                    row.ab_mag_err,
                    row.vega_mag,
                    row.vega_mag_err,
                    row.ab_mag_lim,
                    row.vega_mag_lim,
                    row.lim_sig,
                ][index]
            })
            .collect();
        hdu.write_col(&mut fptr, *name, &column).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> PhotometryRow {
        PhotometryRow::from_columns([
            700_000_000.0,
            0.05,
            0.005,
            18.0,
            0.1,
            17.5,
            0.1,
            20.1,
            19.6,
            3.0,
        ])
    }

    #[test]
    fn reads_rows_from_binary_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("U_stacked.out");
        write_table(&path, &[sample(), sample()], &columns::REQUIRED);

        let rows = FitsTableReader::new().read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], sample());
    }

    #[test]
    fn absent_column_is_reported_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("B_maghist.out");
        write_table(&path, &[sample()], &columns::REQUIRED[..9]);

        let err = FitsTableReader::new().read_rows(&path).unwrap_err();
        assert!(matches!(err, LightCurveError::MissingColumn { column, .. } if column == columns::LIM_SIG));
    }

    #[test]
    fn unreadable_file_is_a_fits_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("V_stacked.out");
        std::fs::write(&path, b"SIMPLE  =                    T / truncated").unwrap();

        let err = FitsTableReader::new().read_rows(&path).unwrap_err();
        assert!(matches!(err, LightCurveError::Fits { .. }));
    }
}
