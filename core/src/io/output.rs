//! The flat multi-band light-curve table.
//!
//! One line per classified point with the columns
//! `MJD VegaMag VegaMagErr Flux(µJy) FluxErr(µJy) ABMag Upper Lower Limit Filter`,
//! written as `%.6f %.6f %.6f %.6e %.6e %.6f %.6f %.6f %.0f %s`.

use crate::math::ModifiedJulianDate;
use crate::prelude::{Filter, LightCurveError, LightCurveResult};
use crate::records::{LightCurvePoint, LightCurveRow};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default file name, relative to the target directory.
pub const LIGHT_CURVE_FILE: &str = "UVOT_light_curve.dat";

const FIELDS: usize = 10;

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("nan")
    } else if value == f64::INFINITY {
        Some("inf")
    } else if value == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

/// `%.6f`
pub fn format_fixed(value: f64) -> String {
    match non_finite(value) {
        Some(text) => text.to_string(),
        None => format!("{:.6}", value),
    }
}

/// `%.6e`, with the two-digit signed exponent C prints.
pub fn format_scientific(value: f64) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_string();
    }
    let rendered = format!("{:.6e}", value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => rendered,
    }
}

pub fn format_row(row: &LightCurveRow) -> String {
    let point = &row.point;
    format!(
        "{} {} {} {} {} {} {} {} {} {}",
        format_fixed(point.mjd.value()),
        format_fixed(row.vega_mag),
        format_fixed(row.vega_mag_err),
        format_scientific(row.flux),
        format_scientific(row.flux_err),
        format_fixed(row.ab_mag),
        format_fixed(point.upper),
        format_fixed(point.lower),
        if point.is_limit { 1 } else { 0 },
        point.filter.code(),
    )
}

/// Writes `rows` in the order given, creating parent directories as needed.
pub fn write_light_curve(path: &Path, rows: &[LightCurveRow]) -> LightCurveResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| LightCurveError::io(parent, err))?;
    }
    let file = File::create(path).map_err(|err| LightCurveError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        writeln!(writer, "{}", format_row(row)).map_err(|err| LightCurveError::io(path, err))?;
    }
    writer.flush().map_err(|err| LightCurveError::io(path, err))
}

/// Parses a table written by [`write_light_curve`].
pub fn read_light_curve(path: &Path) -> LightCurveResult<Vec<LightCurveRow>> {
    let contents = fs::read_to_string(path).map_err(|err| LightCurveError::io(path, err))?;
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_row(path, index + 1, line))
        .collect()
}

fn parse_row(path: &Path, line: usize, text: &str) -> LightCurveResult<LightCurveRow> {
    let parse_error = |message: String| LightCurveError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != FIELDS {
        return Err(parse_error(format!(
            "expected {} fields, found {}",
            FIELDS,
            fields.len()
        )));
    }

    let mut numbers = [0.0f64; FIELDS - 1];
    for (slot, field) in numbers.iter_mut().zip(&fields) {
        *slot = field
            .parse::<f64>()
            .map_err(|err| parse_error(format!("'{}': {}", field, err)))?;
    }
    let filter: Filter = fields[FIELDS - 1]
        .parse()
        .map_err(|err: LightCurveError| parse_error(err.to_string()))?;

    let [mjd, vega_mag, vega_mag_err, flux, flux_err, ab_mag, upper, lower, limit] = numbers;
    Ok(LightCurveRow {
        point: LightCurvePoint {
            filter,
            mjd: ModifiedJulianDate::new(mjd),
            // The table keeps the measured magnitude, not the plotted limit.
            value: ab_mag,
            upper,
            lower,
            is_limit: limit != 0.0,
        },
        vega_mag,
        vega_mag_err,
        flux,
        flux_err,
        ab_mag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(filter: Filter, mjd: f64, ab_mag: f64, is_limit: bool) -> LightCurveRow {
        let point = if is_limit {
            LightCurvePoint::limit(filter, mjd.into(), ab_mag - 0.3, 0.3)
        } else {
            LightCurvePoint::detection(filter, mjd.into(), ab_mag, -0.05, -0.06)
        };
        LightCurveRow {
            point,
            vega_mag: ab_mag - 0.4,
            vega_mag_err: 0.05,
            flux: 123.456789,
            flux_err: 0.0123,
            ab_mag,
        }
    }

    #[test]
    fn scientific_matches_c_printf() {
        assert_eq!(format_scientific(123.456789), "1.234568e+02");
        assert_eq!(format_scientific(0.0123), "1.230000e-02");
        assert_eq!(format_scientific(0.0), "0.000000e+00");
        assert_eq!(format_scientific(-5.0e-120), "-5.000000e-120");
        assert_eq!(format_scientific(f64::NAN), "nan");
    }

    #[test]
    fn row_uses_fixed_column_formats() {
        let text = format_row(&row(Filter::B, 59000.25, 18.5, true));
        assert_eq!(
            text,
            "59000.250000 18.100000 0.050000 1.234568e+02 1.230000e-02 18.500000 0.300000 0.000000 1 B"
        );
    }

    #[test]
    fn round_trip_preserves_time_magnitude_and_flag() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LIGHT_CURVE_FILE);
        let rows = vec![
            row(Filter::B, 59000.123456789, 18.123456789, false),
            row(Filter::B, 59001.5, 18.5, true),
            row(Filter::B, 59002.75, 19.0, false),
        ];

        write_light_curve(&path, &rows).unwrap();
        let parsed = read_light_curve(&path).unwrap();

        assert_eq!(parsed.len(), rows.len());
        for (original, parsed) in rows.iter().zip(&parsed) {
            assert!((original.point.mjd.value() - parsed.point.mjd.value()).abs() <= 1e-6);
            assert!((original.ab_mag - parsed.ab_mag).abs() <= 1e-6);
            assert!((original.vega_mag - parsed.vega_mag).abs() <= 1e-6);
            assert_eq!(original.point.is_limit, parsed.point.is_limit);
            assert_eq!(parsed.point.filter, Filter::B);
        }
        assert_eq!(parsed[1].point.lower, 0.0);
    }

    #[test]
    fn non_finite_offsets_survive_the_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nan.dat");
        let mut degenerate = row(Filter::U, 59000.0, 19.0, false);
        degenerate.point.lower = f64::NAN;

        write_light_curve(&path, &[degenerate]).unwrap();
        let parsed = read_light_curve(&path).unwrap();
        assert!(parsed[0].point.lower.is_nan());
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.dat");
        fs::write(&path, "1 2 3 4 5 6 7 8 0 Z\n").unwrap();
        let err = read_light_curve(&path).unwrap_err();
        assert!(matches!(err, LightCurveError::Parse { line: 1, .. }));
    }
}
