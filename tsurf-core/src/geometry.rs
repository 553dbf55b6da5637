//! Surface records and the dense vertex renumbering used for output
use std::collections::BTreeMap;

use nalgebra::Point3;

/// Source-declared vertex identifier. Not necessarily dense or 1-based.
pub type VertexId = i64;

/// A triangle referencing three source vertex identifiers
pub type Face = [VertexId; 3];

/// One parsed TSurf block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceRecord {
    pub name: Option<String>,
    pub vertices: BTreeMap<VertexId, Point3<f64>>,
    pub faces: Vec<Face>,
}

impl SurfaceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a vertex, overwriting any earlier coordinates for `id`.
    pub fn set_vertex(&mut self, id: VertexId, position: Point3<f64>) {
        self.vertices.insert(id, position);
    }

    /// Give `id` the coordinates of the already-declared vertex `reference`.
    ///
    /// Returns `false` and leaves the record untouched when `reference` is
    /// not known yet. Aliases are never resolved later.
    pub fn alias_vertex(&mut self, id: VertexId, reference: VertexId) -> bool {
        match self.vertices.get(&reference).copied() {
            Some(position) => {
                self.vertices.insert(id, position);
                true
            }
            None => false,
        }
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// The declared name, if it is non-empty after trimming
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Build the 1-based output numbering for this record's vertices
    pub fn vertex_index(&self) -> VertexIndex {
        VertexIndex::new(self)
    }
}

/// Maps source vertex ids, in ascending order, onto `1..=n`
#[derive(Debug, Clone, Default)]
pub struct VertexIndex {
    indices: BTreeMap<VertexId, usize>,
}

impl VertexIndex {
    pub fn new(record: &SurfaceRecord) -> Self {
        let indices = record
            .vertices
            .keys()
            .enumerate()
            .map(|(position, &id)| (id, position + 1))
            .collect();
        Self { indices }
    }

    pub fn get(&self, id: VertexId) -> Option<usize> {
        self.indices.get(&id).copied()
    }

    /// Translate a face into output indices.
    ///
    /// `None` if any corner references an undeclared vertex.
    pub fn remap_face(&self, face: &Face) -> Option<[usize; 3]> {
        Some([self.get(face[0])?, self.get(face[1])?, self.get(face[2])?])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
