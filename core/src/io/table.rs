use crate::prelude::{LightCurveError, LightCurveResult, PhotometryReader};
use crate::records::{columns, PhotometryRow};
use std::fs;
use std::path::Path;

/// Reads whitespace-delimited dumps of the photometry table.
///
/// The first non-blank line names the columns (a leading `#` is allowed);
/// later lines starting with `#` are comments. Extra columns are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextTableReader;

impl TextTableReader {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path, contents: &str) -> LightCurveResult<Vec<PhotometryRow>> {
        let mut lines = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let header: Vec<&str> = match lines.next() {
            Some((_, line)) => line.trim_start_matches('#').split_whitespace().collect(),
            None => {
                return Err(LightCurveError::MissingColumn {
                    path: path.to_path_buf(),
                    column: columns::MET.to_string(),
                })
            }
        };

        let mut indices = [0usize; 10];
        for (slot, name) in indices.iter_mut().zip(columns::REQUIRED) {
            *slot = header
                .iter()
                .position(|column| column.eq_ignore_ascii_case(name))
                .ok_or_else(|| LightCurveError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })?;
        }

        let mut rows = Vec::new();
        for (index, line) in lines {
            if line.trim_start().starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != header.len() {
                return Err(LightCurveError::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message: format!("expected {} fields, found {}", header.len(), fields.len()),
                });
            }

            let mut values = [0.0f64; 10];
            for (value, (&column, name)) in values
                .iter_mut()
                .zip(indices.iter().zip(columns::REQUIRED))
            {
                *value = fields[column]
                    .parse::<f64>()
                    .map_err(|err| LightCurveError::Parse {
                        path: path.to_path_buf(),
                        line: index + 1,
                        message: format!("{} '{}': {}", name, fields[column], err),
                    })?;
            }
            rows.push(PhotometryRow::from_columns(values));
        }

        Ok(rows)
    }
}

impl PhotometryReader for TextTableReader {
    fn read_rows(&self, path: &Path) -> LightCurveResult<Vec<PhotometryRow>> {
        let contents = fs::read_to_string(path).map_err(|err| LightCurveError::io(path, err))?;
        self.parse(path, &contents)
    }
}
