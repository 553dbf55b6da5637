//! tsurf-core - GOCAD TSurf to Wavefront OBJ conversion
//!
//! Splits multi-surface TSurf files into independent surface records and
//! writes each one as an indexed OBJ mesh with collision-safe file names.

pub mod convert;
pub mod error;
pub mod geometry;
pub mod naming;
pub mod obj;
pub mod tsurf;

// Re-export commonly used types
pub use convert::{convert_file, convert_str, ConversionReport, ConvertOptions, WrittenSurface};
pub use error::{Result, TsurfError};
pub use geometry::{Face, SurfaceRecord, VertexId, VertexIndex};
pub use obj::{format_coordinate, save_obj, write_obj, ObjStats};
pub use tsurf::{parse_tsurf, read_tsurf_file};
