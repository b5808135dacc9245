//! Snapshot loading.

use crate::error::{ErrorContext, Result};
use crate::model::ProductSnapshot;
use std::path::Path;

/// Serialization of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Guess from the file extension; anything but `.yaml`/`.yml` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Parse a snapshot from a string.
pub fn parse_snapshot_str(content: &str, format: SnapshotFormat) -> Result<ProductSnapshot> {
    let snapshot = match format {
        SnapshotFormat::Json => serde_json::from_str(content)?,
        SnapshotFormat::Yaml => serde_yaml_ng::from_str(content)?,
    };
    Ok(snapshot)
}

/// Read and parse a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<ProductSnapshot> {
    tracing::info!("Loading product snapshot: {}", path.display());
    let content = std::fs::read_to_string(path)
        .map_err(|e| crate::AttributionError::io(path, e))?;
    let snapshot = parse_snapshot_str(&content, SnapshotFormat::from_path(path))
        .with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(
        items = snapshot.items.len(),
        relationships = snapshot.relationships.len(),
        edges = snapshot.child_edges.len(),
        "Loaded snapshot for {}",
        snapshot.product.display_name()
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SnapshotFormat::from_path(Path::new("a.YML")), SnapshotFormat::Yaml);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.json")), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_path(Path::new("a")), SnapshotFormat::Json);
    }

    #[test]
    fn test_parse_yaml_snapshot() {
        let yaml = r"
product:
  name: Gadget
  version: '1.0'
items:
  - id: zlib
    name: zlib
    license_expression: zlib
relationships:
  - target:
      type: item
      item: zlib
licenses:
  - key: zlib
    short_name: Zlib License
";
        let snapshot = parse_snapshot_str(yaml, SnapshotFormat::Yaml).unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert!(snapshot.items[0].is_active);
        assert_eq!(snapshot.relationships[0].item_id().map(|id| id.value()), Some("zlib"));
    }

    #[test]
    fn test_bad_json_is_snapshot_error() {
        let err = parse_snapshot_str("{", SnapshotFormat::Json).unwrap_err();
        assert!(matches!(err, crate::AttributionError::Snapshot { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_snapshot(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, crate::AttributionError::Io { .. }));
    }
}
