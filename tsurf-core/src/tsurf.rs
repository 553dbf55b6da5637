//! GOCAD TSurf reader
//!
//! Splits a (possibly multi-surface) TSurf text into [`SurfaceRecord`]s.
//! The scan is line oriented: every line is classified by its leading token
//! and applied to an explicit [`SplitState`] folded over the input.
use std::fs;
use std::path::Path;

use log::{debug, trace, warn};
use nalgebra::Point3;
use nom::{
    bytes::complete::{tag_no_case, take_till1},
    character::complete::{char, i64 as signed, multispace0},
    combinator::{all_consuming, rest},
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{Result, TsurfError};
use crate::geometry::{Face, SurfaceRecord, VertexId};

const HEADER_OPEN: &str = "HEADER";
const HEADER_CLOSE: &str = "}";
const END_MARKER: &str = "END";

/// Read and split a TSurf file from disk.
///
/// Bytes that are not valid UTF-8 are dropped rather than rejected.
pub fn read_tsurf_file<P: AsRef<Path>>(path: P) -> Result<Vec<SurfaceRecord>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| TsurfError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!("{} is not valid UTF-8, dropping undecodable bytes", path.display());
            String::from_utf8_lossy(err.as_bytes()).replace('\u{FFFD}', "")
        }
    };

    parse_tsurf(&text)
}

/// Split TSurf text into surface records, preserving source order.
pub fn parse_tsurf(input: &str) -> Result<Vec<SurfaceRecord>> {
    let surfaces = source_lines(input)
        .enumerate()
        .try_fold(SplitState::default(), |state, (index, line)| {
            state.step(index + 1, line)
        })?
        .finish();

    if surfaces.is_empty() {
        return Err(TsurfError::NoSurfacesFound);
    }

    debug!("split input into {} surfaces", surfaces.len());
    Ok(surfaces)
}

/// Lines terminated by `\n`, `\r\n` or a lone `\r`
fn source_lines(input: &str) -> impl Iterator<Item = &str> {
    let mut remaining = Some(input);
    std::iter::from_fn(move || {
        let text = remaining?;
        match text.find(|c: char| c == '\r' || c == '\n') {
            Some(at) => {
                let end_len = if text[at..].starts_with("\r\n") { 2 } else { 1 };
                remaining = Some(&text[at + end_len..]);
                Some(&text[..at])
            }
            None => {
                remaining = None;
                Some(text).filter(|last| !last.is_empty())
            }
        }
    })
}

/// Scanner state threaded through the lines of one input
#[derive(Debug, Default)]
struct SplitState {
    surfaces: Vec<SurfaceRecord>,
    current: Option<SurfaceRecord>,
    in_header: bool,
}

impl SplitState {
    fn step(mut self, line_number: usize, raw: &str) -> Result<Self> {
        let line = raw.trim();

        if is_block_start(line) {
            self.close_current();
            self.current = Some(SurfaceRecord::new());
            self.in_header = false;
            return Ok(self);
        }

        let Some(record) = self.current.as_mut() else {
            return Ok(self);
        };

        if line.starts_with(HEADER_OPEN) {
            self.in_header = true;
            return Ok(self);
        }

        if self.in_header {
            if line.starts_with(HEADER_CLOSE) {
                self.in_header = false;
            } else if let Some(name) = header_name(line) {
                record.name = Some(name.to_string());
            }
            return Ok(self);
        }

        if line == END_MARKER {
            self.close_current();
            return Ok(self);
        }

        let data = data_line(line)
            .map_err(|reason| TsurfError::malformed(line_number, line, reason))?;

        match data {
            Some(DataLine::Vertex(id, position)) => record.set_vertex(id, position),
            Some(DataLine::Alias(id, reference)) => {
                if !record.alias_vertex(id, reference) {
                    trace!(
                        "line {}: alias {} -> {} has no target, dropped",
                        line_number,
                        id,
                        reference
                    );
                }
            }
            Some(DataLine::Face(face)) => record.add_face(face),
            None => {}
        }

        Ok(self)
    }

    fn close_current(&mut self) {
        if let Some(record) = self.current.take() {
            debug!(
                "closed surface {:?}: {} vertices, {} faces",
                record.display_name().unwrap_or("<unnamed>"),
                record.vertex_count(),
                record.face_count()
            );
            self.surfaces.push(record);
        }
        self.in_header = false;
    }

    fn finish(mut self) -> Vec<SurfaceRecord> {
        self.close_current();
        self.surfaces
    }
}

fn is_block_start(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.starts_with("gocad") && lower.contains("tsurf")
}

/// A vertex, alias or face declaration
#[derive(Debug, Clone, PartialEq)]
enum DataLine {
    Vertex(VertexId, Point3<f64>),
    Alias(VertexId, VertexId),
    Face(Face),
}

/// Classify a trimmed line.
///
/// `Ok(None)` for anything that is not a data line; `Err` carries the
/// reason a data line could not be read.
fn data_line(line: &str) -> std::result::Result<Option<DataLine>, String> {
    let Ok((rest, keyword)) = token(line) else {
        return Ok(None);
    };
    let mut fields = Fields { rest };

    let data = match keyword {
        "VRTX" | "PVRTX" => {
            let id = fields.id("vertex id")?;
            let x = fields.coordinate("x coordinate")?;
            let y = fields.coordinate("y coordinate")?;
            let z = fields.coordinate("z coordinate")?;
            DataLine::Vertex(id, Point3::new(x, y, z))
        }
        "ATOM" => {
            let id = fields.id("alias id")?;
            let reference = fields.id("alias target id")?;
            DataLine::Alias(id, reference)
        }
        "TRGL" => DataLine::Face([
            fields.id("first corner id")?,
            fields.id("second corner id")?,
            fields.id("third corner id")?,
        ]),
        _ => return Ok(None),
    };

    Ok(Some(data))
}

/// Whitespace-separated fields following a keyword; trailing extras are ignored
struct Fields<'a> {
    rest: &'a str,
}

impl<'a> Fields<'a> {
    fn next(&mut self, what: &str) -> std::result::Result<&'a str, String> {
        let (rest, field) = token(self.rest).map_err(|_| format!("missing {}", what))?;
        self.rest = rest;
        Ok(field)
    }

    fn id(&mut self, what: &str) -> std::result::Result<VertexId, String> {
        let field = self.next(what)?;
        whole(field, signed).ok_or_else(|| format!("invalid {} `{}`", what, field))
    }

    fn coordinate(&mut self, what: &str) -> std::result::Result<f64, String> {
        let field = self.next(what)?;
        whole(field, double).ok_or_else(|| format!("invalid {} `{}`", what, field))
    }
}

fn token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(|c: char| c.is_whitespace()))(input)
}

/// Run `parser` over the entire field, rejecting leftovers such as `1.5abc`
fn whole<'a, O>(field: &'a str, parser: impl FnMut(&'a str) -> IResult<&'a str, O>) -> Option<O> {
    all_consuming(parser)(field).ok().map(|(_, value)| value)
}

fn name_assignment(input: &str) -> IResult<&str, &str> {
    preceded(
        tuple((tag_no_case("name"), multispace0, char('='), multispace0)),
        rest,
    )(input)
}

/// Find a `name = value` assignment anywhere in a header line
fn header_name(line: &str) -> Option<&str> {
    line.char_indices()
        .find_map(|(at, _)| name_assignment(&line[at..]).ok())
        .map(|(_, value)| value.trim())
}
