//! Link and search-hit overlay files
//!
//! The driver has no document engine, so the geometry a renderer would
//! report for a page comes from a YAML file:
//!
//! ```yaml
//! links:
//!   - rect: [72, 90, 210, 104]
//!     uri: "https://mupdf.com"
//!   - rect: [72, 120, 160, 134]
//!     uri: "#page=3"
//! hits:
//!   - - { ul: [72, 300], ur: [140, 300], ll: [72, 314], lr: [140, 314] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::geometry::{Quad, Rect};

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("failed to read overlay {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse overlay {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkEntry {
    pub rect: Rect,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Overlay {
    #[serde(default)]
    pub links: Vec<LinkEntry>,
    /// One entry per search result, each made of one or more quads
    #[serde(default)]
    pub hits: Option<Vec<Vec<Quad>>>,
}

impl Overlay {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document means no overlays at all.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, OverlayError> {
        let content = fs::read_to_string(path).map_err(|source| OverlayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let overlay = Self::from_yaml(&content).map_err(|source| OverlayError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Loaded overlay {path:?}: {} links, {} hits",
            overlay.links.len(),
            overlay.hits.as_ref().map_or(0, Vec::len)
        );
        Ok(overlay)
    }

    /// Link rectangles and URIs as the parallel arrays the view takes
    pub fn into_parts(self) -> (Vec<Rect>, Vec<String>, Option<Vec<Vec<Quad>>>) {
        let (rects, uris) = self.links.into_iter().map(|l| (l.rect, l.uri)).unzip();
        (rects, uris, self.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PointF;

    #[test]
    fn parses_links_and_hits() {
        let overlay = Overlay::from_yaml(
            r##"
links:
  - rect: [1, 2, 3, 4]
    uri: "https://example.com"
  - rect: [5, 6, 7, 8.5]
    uri: "#page=2"
hits:
  - - { ul: [0, 0], ur: [10, 0], ll: [0, 5], lr: [10, 5] }
    - { ul: [0, 6], ur: [4, 6], ll: [0, 11], lr: [4, 11] }
"##,
        )
        .unwrap();

        let (rects, uris, hits) = overlay.into_parts();
        assert_eq!(rects, vec![Rect::new(1.0, 2.0, 3.0, 4.0), Rect::new(5.0, 6.0, 7.0, 8.5)]);
        assert_eq!(uris, vec!["https://example.com", "#page=2"]);
        let hits = hits.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].len(), 2);
        assert_eq!(hits[0][1].lr, PointF::new(4.0, 11.0));
    }

    #[test]
    fn empty_file_has_no_overlays() {
        let overlay = Overlay::from_yaml("\n").unwrap();
        assert!(overlay.links.is_empty());
        assert!(overlay.hits.is_none());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Overlay::load(Path::new("/nonexistent/overlay.yaml")).unwrap_err();
        assert!(matches!(err, OverlayError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/overlay.yaml"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.yaml");
        fs::write(&path, "links: [{ rect: [1, 2], uri: 3 }]\n").unwrap();
        let err = Overlay::load(&path).unwrap_err();
        assert!(matches!(err, OverlayError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse overlay"));
    }
}
