//! Polygon-soup import.
//!
//! [`SurfaceImport`] collects faces as plain vertex-index lists together
//! with per-vertex and per-face attributes, and assembles them into a
//! [`CMap2`] in one pass:
//!
//! 1. **Topology**: every face record becomes a `phi1` loop of darts. Repeated
//!    consecutive indices are dropped, and faces left with fewer than three
//!    vertices are discarded.
//! 2. **Sewing**: darts running along the same edge in opposite directions
//!    are paired with `phi2`, first match wins, in dart creation order.
//! 3. **Closing**: every remaining hole is filled with a cap face.
//! 4. **Vertex repair**: when sewing met an edge claimed by more than two
//!    faces, vertex orbits that ended up sharing an embedding are split so
//!    each one gets its own vertex row.
//!
//! Defects never abort the import; they are summarised in the returned
//! [`ImportReport`] and logged.
//!
//! # Example
//!
//! ```
//! use darn::import::SurfaceImport;
//! use darn::map::CMap2;
//! use nalgebra::Point3;
//!
//! let mut import = SurfaceImport::new();
//! import.set_positions(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, -1.0, 0.0),
//! ]).unwrap();
//! import.add_triangle(0, 1, 2);
//! import.add_triangle(1, 0, 3);
//! import.add_triangle(5, 5, 5); // degenerate, dropped
//!
//! let mut map: CMap2 = CMap2::new();
//! let report = import.create_map(&mut map);
//!
//! assert_eq!(report.faces, 2);
//! assert_eq!(report.degenerate_faces, 1);
//! assert_eq!(report.boundary_edges, 4);
//! assert_eq!(report.holes_closed, 1);
//! assert_eq!(import.nb_faces(), 0); // the buffer is consumed
//! ```

mod sew;
mod topology;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::map::builder::MapBuilder;
use crate::map::{
    AttributeContainer, AttributeValue, CMap2, Column, ColumnHandle, MeshIndex, POSITION_ATTRIBUTE,
};

/// When to re-derive vertex embeddings from vertex orbits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexRepair {
    /// Never split vertices.
    Never,
    /// Split only if sewing met an edge claimed by more than two faces.
    #[default]
    WhenFlagged,
    /// Always check every vertex. This also separates faces that touch at a
    /// single vertex only, which sewing cannot detect.
    Always,
}

/// Options for [`SurfaceImport::create_map_with_options`].
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Check vertex indices and face attribute sizes before building.
    pub validate: bool,

    /// Vertex repair policy.
    pub vertex_repair: VertexRepair,

    /// Run [`CMap2::check_integrity`] on the result.
    pub verify: bool,

    /// Whether integrity verification may use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            validate: false,
            vertex_repair: VertexRepair::WhenFlagged,
            verify: false,
            parallel: true,
        }
    }
}

impl ImportOptions {
    /// Options for untrusted input: validate, and verify the result.
    pub fn checked() -> Self {
        Self {
            validate: true,
            verify: true,
            ..Self::default()
        }
    }

    /// Set whether input is validated before building.
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set the vertex repair policy.
    pub fn with_vertex_repair(mut self, vertex_repair: VertexRepair) -> Self {
        self.vertex_repair = vertex_repair;
        self
    }

    /// Set whether the result is verified after building.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// What happened while assembling a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    /// Face loops created from the input, caps excluded.
    pub faces: usize,

    /// Face records dropped for having fewer than three distinct vertices.
    pub degenerate_faces: usize,

    /// Darts left unpaired by sewing.
    pub boundary_edges: usize,

    /// Cap faces created to close holes.
    pub holes_closed: usize,

    /// Whether sewing found an edge claimed by more than two faces.
    pub non_manifold_detected: bool,

    /// Vertex orbits that received a new vertex row.
    pub vertices_split: usize,
}

/// Import buffer for polygon soups.
///
/// Vertex indices refer to rows of the vertex attribute container, which
/// the producer sizes with [`insert_vertex_rows`](Self::insert_vertex_rows),
/// [`set_positions`](Self::set_positions) or
/// [`add_vertex_attribute`](Self::add_vertex_attribute) before building.
#[derive(Debug, Default)]
pub struct SurfaceImport {
    faces_nb_edges: Vec<u32>,
    faces_vertex_indices: Vec<u32>,
    vertex_attributes: AttributeContainer,
    face_attributes: AttributeContainer,
    position: Option<ColumnHandle<Point3<f64>>>,
}

impl SurfaceImport {
    /// Create an empty import buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the buffer. Called by [`create_map`](Self::create_map).
    pub fn clear(&mut self) {
        self.faces_nb_edges.clear();
        self.faces_vertex_indices.clear();
        self.vertex_attributes.remove_columns();
        self.face_attributes.remove_columns();
        self.position = None;
    }

    /// Reserve room for `nb_faces` face records.
    pub fn reserve(&mut self, nb_faces: usize) {
        self.faces_nb_edges.reserve(nb_faces);
        self.faces_vertex_indices.reserve(nb_faces * 4);
    }

    /// Number of face records.
    pub fn nb_faces(&self) -> usize {
        self.faces_nb_edges.len()
    }

    /// Number of rows in the vertex container.
    pub fn nb_vertices(&self) -> usize {
        self.vertex_attributes.nb_rows()
    }

    /// Append a triangle.
    pub fn add_triangle(&mut self, p0: u32, p1: u32, p2: u32) {
        self.faces_nb_edges.push(3);
        self.faces_vertex_indices.extend_from_slice(&[p0, p1, p2]);
    }

    /// Append a quad.
    pub fn add_quad(&mut self, p0: u32, p1: u32, p2: u32, p3: u32) {
        self.faces_nb_edges.push(4);
        self.faces_vertex_indices.extend_from_slice(&[p0, p1, p2, p3]);
    }

    /// Append a polygon.
    pub fn add_face(&mut self, vertex_indices: &[u32]) {
        self.faces_nb_edges.push(vertex_indices.len() as u32);
        self.faces_vertex_indices.extend_from_slice(vertex_indices);
    }

    /// Append `n` rows to the vertex container; returns the first row.
    pub fn insert_vertex_rows(&mut self, n: usize) -> usize {
        self.vertex_attributes.reserve_rows(n)
    }

    /// Append `n` rows to the face container; returns the first row.
    pub fn insert_face_rows(&mut self, n: usize) -> usize {
        self.face_attributes.reserve_rows(n)
    }

    /// Add a vertex attribute, one value per vertex in insertion order.
    ///
    /// The vertex container grows to hold all values if needed.
    pub fn add_vertex_attribute<T: AttributeValue + Default>(
        &mut self,
        name: &str,
        values: Vec<T>,
    ) -> Result<ColumnHandle<T>> {
        let handle = self.vertex_attributes.add_column::<T>(name)?;
        write_values(&mut self.vertex_attributes, handle, values);
        Ok(handle)
    }

    /// Add a face attribute, one value per face record in insertion order.
    pub fn add_face_attribute<T: AttributeValue + Default>(
        &mut self,
        name: &str,
        values: Vec<T>,
    ) -> Result<ColumnHandle<T>> {
        let handle = self.face_attributes.add_column::<T>(name)?;
        write_values(&mut self.face_attributes, handle, values);
        Ok(handle)
    }

    /// The position column, created on first use.
    ///
    /// Fails if a `"position"` column of another type was added.
    pub fn position_attribute_mut(&mut self) -> Result<&mut Column<Point3<f64>>> {
        let handle = match self.position {
            Some(handle) => handle,
            None if self.vertex_attributes.has_column(POSITION_ATTRIBUTE) => {
                let handle = self.vertex_attributes.handle(POSITION_ATTRIBUTE)?;
                self.position = Some(handle);
                handle
            }
            None => {
                let handle = self
                    .vertex_attributes
                    .add_column_with_fill(POSITION_ATTRIBUTE, Point3::origin())?;
                self.position = Some(handle);
                handle
            }
        };
        self.vertex_attributes
            .column_mut(handle)
            .ok_or_else(|| MeshError::MissingAttribute(POSITION_ATTRIBUTE.to_string()))
    }

    /// Write vertex positions, one per vertex in insertion order.
    pub fn set_positions(&mut self, positions: Vec<Point3<f64>>) -> Result<()> {
        let nb_rows = self.vertex_attributes.nb_rows();
        if positions.len() > nb_rows {
            self.vertex_attributes.reserve_rows(positions.len() - nb_rows);
        }
        let column = self.position_attribute_mut()?;
        for (row, p) in positions.into_iter().enumerate() {
            column.set(row, p);
        }
        Ok(())
    }

    /// Vertex attribute container, as filled so far.
    pub fn vertex_attributes(&self) -> &AttributeContainer {
        &self.vertex_attributes
    }

    /// Face attribute container, as filled so far.
    pub fn face_attributes(&self) -> &AttributeContainer {
        &self.face_attributes
    }

    /// Build `map` from the buffered faces with default options.
    ///
    /// An empty buffer leaves `map` untouched. Otherwise `map` is cleared,
    /// receives the vertex (and face) attribute containers, and the buffer is
    /// cleared once assembly is done.
    ///
    /// Vertex indices must be rows of the vertex container; this is not
    /// checked here (see [`ImportOptions::validate`]).
    ///
    /// # Panics
    ///
    /// If the map outgrows its index type `I`.
    /// [`create_map_with_options`](Self::create_map_with_options) reports
    /// that as an error instead.
    pub fn create_map<I: MeshIndex>(&mut self, map: &mut CMap2<I>) -> ImportReport {
        self.assemble(map, VertexRepair::WhenFlagged)
    }

    /// Build `map` from the buffered faces.
    ///
    /// Input that could overflow the index type `I` is always rejected before
    /// `map` or the buffer are modified; with [`ImportOptions::validate`], so
    /// is any other invalid input.
    pub fn create_map_with_options<I: MeshIndex>(
        &mut self,
        map: &mut CMap2<I>,
        options: &ImportOptions,
    ) -> Result<ImportReport> {
        self.check_index_capacity::<I>()?;
        if options.validate {
            self.validate()?;
        }

        let report = self.assemble(map, options.vertex_repair);

        if options.verify {
            map.check_integrity(options.parallel)?;
        }
        Ok(report)
    }

    /// Check that every face record fits in the index stream, references
    /// existing vertex rows, and that face attributes cover every record.
    pub fn validate(&self) -> Result<()> {
        let nb_vertices = self.vertex_attributes.nb_rows();
        let mut offset = 0;
        for (face, &nb_edges) in self.faces_nb_edges.iter().enumerate() {
            let end = offset + nb_edges as usize;
            let run = self.faces_vertex_indices.get(offset..end).ok_or_else(|| {
                MeshError::InvalidState(format!("face {} runs past the index stream", face))
            })?;
            if let Some(&vertex) = run.iter().find(|&&v| v as usize >= nb_vertices) {
                return Err(MeshError::InvalidVertexIndex {
                    face,
                    vertex: vertex as usize,
                    nb_vertices,
                });
            }
            offset = end;
        }

        if self.face_attributes.nb_rows() < self.nb_faces() {
            if let Some(name) = self.face_attributes.column_names().next() {
                return Err(MeshError::AttributeLength {
                    name: name.to_string(),
                    expected: self.nb_faces(),
                    found: self.face_attributes.nb_rows(),
                });
            }
        }
        Ok(())
    }

    /// Face darts plus at most as many cap darts must fit in `I`, and so
    /// must the vertex rows after every split.
    fn check_index_capacity<I: MeshIndex>(&self) -> Result<()> {
        let capacity = I::CAPACITY;
        let nb_face_darts: usize = self.faces_nb_edges.iter().map(|&n| n as usize).sum();
        if 2 * nb_face_darts > capacity {
            return Err(MeshError::invalid_param(
                "darts",
                2 * nb_face_darts,
                "exceeds the capacity of the map index type",
            ));
        }
        let nb_rows = self.vertex_attributes.nb_rows() + nb_face_darts;
        if nb_rows > capacity {
            return Err(MeshError::invalid_param(
                "vertex rows",
                nb_rows,
                "exceeds the capacity of the map index type",
            ));
        }
        Ok(())
    }

    fn assemble<I: MeshIndex>(&mut self, map: &mut CMap2<I>, repair: VertexRepair) -> ImportReport {
        if self.nb_faces() == 0 {
            return ImportReport::default();
        }

        map.clear();
        let embed_faces = self.face_attributes.nb_columns() > 0;
        {
            let mut builder = MapBuilder::new(map);
            builder.swap_vertex_attributes(&mut self.vertex_attributes);
            if embed_faces {
                builder.swap_face_attributes(&mut self.face_attributes);
            }
        }

        let topology = topology::build_faces(
            map,
            &self.faces_nb_edges,
            &self.faces_vertex_indices,
            embed_faces,
        );
        let sewing = sew::sew_faces(map, &topology.darts_per_vertex);
        log::debug!(
            "{} face(s) created, {} boundary dart(s)",
            topology.nb_faces,
            sewing.boundary_edges
        );

        let holes_closed = if sewing.boundary_edges > 0 {
            map.close_map()
        } else {
            0
        };
        if holes_closed > 0 {
            log::warn!("{} hole(s) have been closed", holes_closed);
        }

        let run_repair = match repair {
            VertexRepair::Never => false,
            VertexRepair::WhenFlagged => sewing.non_manifold,
            VertexRepair::Always => true,
        };
        let vertices_split = if run_repair {
            map.enforce_unique_vertex_embedding()
        } else {
            0
        };
        if vertices_split > 0 {
            log::warn!(
                "non-manifold vertices detected and corrected ({} vertex orbit(s) split)",
                vertices_split
            );
        } else if sewing.non_manifold {
            log::debug!("edge claimed by more than two faces, no vertex needed splitting");
        }

        self.clear();

        ImportReport {
            faces: topology.nb_faces,
            degenerate_faces: topology.nb_degenerate,
            boundary_edges: sewing.boundary_edges,
            holes_closed,
            non_manifold_detected: sewing.non_manifold,
            vertices_split,
        }
    }
}

fn write_values<T: AttributeValue>(
    container: &mut AttributeContainer,
    handle: ColumnHandle<T>,
    values: Vec<T>,
) {
    let nb_rows = container.nb_rows();
    if values.len() > nb_rows {
        container.reserve_rows(values.len() - nb_rows);
    }
    if let Some(column) = container.column_mut(handle) {
        for (row, value) in values.into_iter().enumerate() {
            column.set(row, value);
        }
    }
}
