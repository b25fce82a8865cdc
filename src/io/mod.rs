//! Surface file I/O.
//!
//! Loaders fill a [`SurfaceImport`] and assemble it with validation on, so a
//! malformed file is reported as an error instead of a panic.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | PLY | `.ply` | ✓ | ✓ | Polygons, extra scalar vertex properties |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII; saved as binary triangles |
//!
//! # Usage
//!
//! ```no_run
//! use darn::io::{load, save};
//! use darn::map::CMap2;
//!
//! let map: CMap2 = load("scan.ply").unwrap();
//! save(&map, "repaired.stl").unwrap();
//! ```

pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::import::{ImportOptions, ImportReport, SurfaceImport};
use crate::map::{CMap2, MeshIndex};

/// Supported surface file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PLY (Stanford polygon) format.
    Ply,
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "ply" => Some(Format::Ply),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    fn detect(path: &Path) -> Result<Format> {
        Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }
}

/// Read a file into an import buffer without building a map.
pub fn load_import<P: AsRef<Path>>(path: P) -> Result<SurfaceImport> {
    let path = path.as_ref();
    match Format::detect(path)? {
        Format::Ply => ply::load_import(path),
        Format::Stl => stl::load_import(path),
    }
}

/// Load a map from a file with automatic format detection.
///
/// Input is validated and vertices are repaired when sewing flags a
/// non-manifold edge.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<CMap2<I>> {
    let options = ImportOptions::default().with_validate(true);
    load_with_options(path, &options).map(|(map, _)| map)
}

/// Load a map from a file and return it with its import report.
pub fn load_with_options<P: AsRef<Path>, I: MeshIndex>(
    path: P,
    options: &ImportOptions,
) -> Result<(CMap2<I>, ImportReport)> {
    let path = path.as_ref();
    let mut import = load_import(path)?;
    if import.nb_faces() == 0 {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "file contains no faces".to_string(),
        });
    }

    let mut map = CMap2::new();
    let report = import.create_map_with_options(&mut map, options)?;
    if report.faces == 0 {
        return Err(MeshError::EmptyMesh);
    }
    Ok((map, report))
}

/// Save a map to a file with automatic format detection.
pub fn save<P: AsRef<Path>, I: MeshIndex>(map: &CMap2<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::detect(path)? {
        Format::Ply => ply::save(map, path),
        Format::Stl => stl::save(map, path),
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::PathBuf;

    /// A path in the system temp directory, unique to this process and `name`.
    pub fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("darn-{}-{}", std::process::id(), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/mesh.PLY"), Some(Format::Ply));
        assert_eq!(Format::from_path("mesh.stl"), Some(Format::Stl));
        assert_eq!(Format::from_path("mesh.obj"), None);
        assert!(matches!(
            load::<_, u32>("mesh.obj"),
            Err(MeshError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            load_import("mesh"),
            Err(MeshError::UnsupportedFormat { extension }) if extension == "(none)"
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = test_util::temp_path("does-not-exist.ply");
        assert!(matches!(load::<_, u32>(&path), Err(MeshError::Io(_))));
    }
}
