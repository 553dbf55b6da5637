//! End-to-end TSurf to OBJ conversion
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::geometry::SurfaceRecord;
use crate::naming::{base_name, NameRegistry};
use crate::obj::save_obj;
use crate::tsurf::{parse_tsurf, read_tsurf_file};

/// Where and how a conversion writes its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Must already exist; the converter never creates directories.
    pub output_dir: PathBuf,
}

impl ConvertOptions {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

/// One OBJ file produced by a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSurface {
    pub path: PathBuf,
    /// Object name written to the `o` line
    pub name: String,
    pub vertices: usize,
    pub faces: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub output_dir: PathBuf,
    /// In source order
    pub outputs: Vec<WrittenSurface>,
}

impl ConversionReport {
    pub fn surface_count(&self) -> usize {
        self.outputs.len()
    }
}

/// Convert a TSurf file on disk.
///
/// The whole input is parsed before anything is written, so input and
/// parse errors never leave files behind.
pub fn convert_file<P: AsRef<Path>>(
    input: P,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let input = input.as_ref();
    info!("Reading TSurf input {}", input.display());
    let surfaces = read_tsurf_file(input)?;
    write_surfaces(&surfaces, options)
}

/// Convert TSurf text already held in memory
pub fn convert_str(input: &str, options: &ConvertOptions) -> Result<ConversionReport> {
    let surfaces = parse_tsurf(input)?;
    write_surfaces(&surfaces, options)
}

/// Write one OBJ per record, in order.
///
/// Stops at the first write failure; files written for earlier records are
/// complete and stay in place.
pub fn write_surfaces(
    surfaces: &[SurfaceRecord],
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let mut registry = NameRegistry::new(&options.output_dir);
    let mut outputs = Vec::with_capacity(surfaces.len());

    for (position, record) in surfaces.iter().enumerate() {
        let path = registry.reserve_path(&base_name(record, position + 1));
        let stats = save_obj(record, &path)?;

        let name = match record.display_name() {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        info!(
            "Wrote {} ({} vertices, {} faces)",
            path.display(),
            stats.vertices,
            stats.faces
        );

        outputs.push(WrittenSurface {
            path,
            name,
            vertices: stats.vertices,
            faces: stats.faces,
        });
    }

    Ok(ConversionReport {
        output_dir: options.output_dir.clone(),
        outputs,
    })
}
