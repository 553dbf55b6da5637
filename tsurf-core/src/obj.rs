//! Wavefront OBJ writer for surface records
use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

use crate::error::{Result, TsurfError};
use crate::geometry::SurfaceRecord;

/// Decimal exponents printed in positional notation; others use `e±XX`
const FIXED_EXPONENTS: Range<i32> = -4..17;

/// What ended up in one OBJ file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjStats {
    pub vertices: usize,
    pub faces: usize,
}

/// Serialize one surface as OBJ.
///
/// Vertices are written in ascending source-id order and faces are
/// renumbered into that order. Faces citing an undeclared vertex are skipped.
pub fn write_obj<W: Write>(
    record: &SurfaceRecord,
    fallback_name: &str,
    mut writer: W,
) -> io::Result<ObjStats> {
    let index = record.vertex_index();
    let mut stats = ObjStats::default();

    writeln!(writer, "o {}", record.display_name().unwrap_or(fallback_name))?;

    // BTreeMap order is the index order
    for position in record.vertices.values() {
        writeln!(
            writer,
            "v {} {} {}",
            format_coordinate(position.x),
            format_coordinate(position.y),
            format_coordinate(position.z)
        )?;
        stats.vertices += 1;
    }

    for face in &record.faces {
        if let Some([a, b, c]) = index.remap_face(face) {
            writeln!(writer, "f {} {} {}", a, b, c)?;
            stats.faces += 1;
        }
    }

    Ok(stats)
}

/// Write `record` to `path`, creating or replacing it.
///
/// The object name falls back to the file stem. The mesh is written to a
/// temporary file next to `path` and renamed into place once flushed, so
/// `path` only ever holds a complete file and is untouched on failure.
pub fn save_obj(record: &SurfaceRecord, path: &Path) -> Result<ObjStats> {
    let fallback = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let write_error = |source: io::Error| TsurfError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = staging_file(dir).map_err(write_error)?;
    let stats = {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let stats = write_obj(record, &fallback, &mut writer).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
        stats
    };

    // Dropping the staged file on any error above removes it
    staged.persist(path).map_err(|err| write_error(err.error))?;
    Ok(stats)
}

fn staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".tsurf2obj-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    builder.tempfile_in(dir)
}

/// Format a coordinate with the fewest digits that parse back to `value`.
///
/// Trailing zeros are trimmed and an exponent is only used for very large
/// or very small magnitudes, e.g. `1e+20` or `2.5e-07`.
pub fn format_coordinate(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.25e-3"
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(unsigned) => ("-", unsigned),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if FIXED_EXPONENTS.contains(&exponent) {
        positional(&digits, exponent)
    } else {
        let (lead, tail) = digits.split_at(1);
        let fraction = if tail.is_empty() {
            String::new()
        } else {
            format!(".{}", tail)
        };
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", lead, fraction, exponent_sign, exponent.abs())
    };

    format!("{}{}", sign, body)
}

fn positional(digits: &str, exponent: i32) -> String {
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{}{}", zeros, digits);
    }

    let integer_len = exponent as usize + 1;
    if digits.len() <= integer_len {
        format!("{}{}", digits, "0".repeat(integer_len - digits.len()))
    } else {
        format!("{}.{}", &digits[..integer_len], &digits[integer_len..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::fs;

    fn render(record: &SurfaceRecord, fallback: &str) -> (String, ObjStats) {
        let mut out = Vec::new();
        let stats = write_obj(record, fallback, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_triangle_output() {
        let mut record = SurfaceRecord::new();
        record.set_vertex(1, Point3::new(0.0, 0.0, 0.0));
        record.set_vertex(2, Point3::new(1.0, 0.0, 0.0));
        record.set_vertex(3, Point3::new(0.0, 1.0, 0.0));
        record.add_face([1, 2, 3]);

        let (text, stats) = render(&record, "tri");
        assert_eq!(text, "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(stats, ObjStats { vertices: 3, faces: 1 });
    }

    #[test]
    fn test_sparse_ids_are_renumbered() {
        let mut record = SurfaceRecord::new();
        record.name = Some("Horizon".to_string());
        record.set_vertex(500, Point3::new(3.0, 3.0, 3.0));
        record.set_vertex(20, Point3::new(2.0, 2.0, 2.0));
        record.set_vertex(7, Point3::new(1.0, 1.0, 1.0));
        record.add_face([500, 7, 20]);

        let (text, _) = render(&record, "unused");
        assert_eq!(text, "o Horizon\nv 1 1 1\nv 2 2 2\nv 3 3 3\nf 3 1 2\n");
    }

    #[test]
    fn test_dangling_faces_are_skipped() {
        let mut record = SurfaceRecord::new();
        record.set_vertex(1, Point3::origin());
        record.set_vertex(2, Point3::origin());
        record.set_vertex(3, Point3::origin());
        record.add_face([1, 2, 5]);
        record.add_face([3, 2, 1]);

        let (text, stats) = render(&record, "s");
        assert!(!text.contains("f 1 2"));
        assert!(text.ends_with("f 3 2 1\n"));
        assert_eq!(stats.faces, 1);
    }

    #[test]
    fn test_blank_name_uses_fallback() {
        let mut record = SurfaceRecord::new();
        record.name = Some("  ".to_string());
        let (text, _) = render(&record, "surface_004");
        assert_eq!(text, "o surface_004\n");
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(0.0), "0");
        assert_eq!(format_coordinate(-0.0), "-0");
        assert_eq!(format_coordinate(1.0), "1");
        assert_eq!(format_coordinate(-2.5), "-2.5");
        assert_eq!(format_coordinate(0.1), "0.1");
        assert_eq!(format_coordinate(1500.0), "1500");
        assert_eq!(format_coordinate(0.0001), "0.0001");
        assert_eq!(format_coordinate(0.00001), "1e-05");
        assert_eq!(format_coordinate(-2.5e-7), "-2.5e-07");
        assert_eq!(format_coordinate(1e20), "1e+20");
        assert_eq!(format_coordinate(1.25e300), "1.25e+300");
        assert_eq!(format_coordinate(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_coordinate(f64::NAN), "nan");
        assert_eq!(format_coordinate(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_format_coordinate_round_trips() {
        let samples = [
            612345.678901234,
            6_789_012.3456789,
            -1234.000000000001,
            std::f64::consts::PI,
            1.0 / 3.0,
            f64::MAX,
            f64::MIN_POSITIVE,
        ];
        for value in samples {
            let text = format_coordinate(value);
            assert_eq!(text.parse::<f64>().unwrap(), value, "{}", text);
        }
    }

    #[test]
    fn test_save_obj_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Fault_A.obj");
        let stats = save_obj(&SurfaceRecord::new(), &path).unwrap();

        assert_eq!(stats, ObjStats::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "o Fault_A\n");
    }

    #[test]
    fn test_save_obj_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("a.obj");
        let err = save_obj(&SurfaceRecord::new(), &path).unwrap_err();

        assert!(matches!(err, TsurfError::OutputWrite { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_obj_replaces_existing_file_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.obj");
        fs::write(&path, "o stale\nv 9 9 9\nv 9 9 9\n").unwrap();

        let mut record = SurfaceRecord::new();
        record.set_vertex(1, Point3::new(1.0, 2.0, 3.0));
        save_obj(&record, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "o old\nv 1 2 3\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_save_leaves_existing_entry_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("Fault.obj");
        fs::create_dir(&occupied).unwrap();
        fs::write(occupied.join("keep.txt"), "kept").unwrap();

        let err = save_obj(&SurfaceRecord::new(), &occupied).unwrap_err();

        assert!(matches!(err, TsurfError::OutputWrite { .. }));
        assert_eq!(fs::read_to_string(occupied.join("keep.txt")).unwrap(), "kept");
        // no staging file left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
