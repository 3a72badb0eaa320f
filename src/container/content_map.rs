//! Logical part names and their fixed locations inside a container.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use phf::phf_map;

/// A logical part of a pbix container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartName {
    /// File format version (`Version`)
    Version,
    /// Report pages and visuals (`Report/Layout`)
    Layout,
    /// Report metadata (`Metadata`)
    Metadata,
    /// File settings (`Settings`)
    Settings,
    /// Model-view diagram layouts (`DiagramLayout`)
    DiagramLayout,
    /// Data source connections (`Connections`)
    Connections,
}

/// Ordered logical-name to path-segment table.
pub const CONTENT_MAP: [(PartName, &[&str]); 6] = [
    (PartName::Version, &["Version"]),
    (PartName::Layout, &["Report", "Layout"]),
    (PartName::Metadata, &["Metadata"]),
    (PartName::Settings, &["Settings"]),
    (PartName::DiagramLayout, &["DiagramLayout"]),
    (PartName::Connections, &["Connections"]),
];

static PART_NAMES: phf::Map<&'static str, PartName> = phf_map! {
    "version" => PartName::Version,
    "layout" => PartName::Layout,
    "metadata" => PartName::Metadata,
    "settings" => PartName::Settings,
    "diagramLayout" => PartName::DiagramLayout,
    "connections" => PartName::Connections,
};

impl PartName {
    /// All logical parts in table order.
    pub const ALL: [PartName; 6] = [
        PartName::Version,
        PartName::Layout,
        PartName::Metadata,
        PartName::Settings,
        PartName::DiagramLayout,
        PartName::Connections,
    ];

    /// The logical name, e.g. `diagramLayout`.
    pub const fn as_str(self) -> &'static str {
        match self {
            PartName::Version => "version",
            PartName::Layout => "layout",
            PartName::Metadata => "metadata",
            PartName::Settings => "settings",
            PartName::DiagramLayout => "diagramLayout",
            PartName::Connections => "connections",
        }
    }

    /// Look up a part by its logical name.
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        PART_NAMES.get(name).copied()
    }

    /// Path segments locating this part under the staged root.
    pub fn segments(self) -> &'static [&'static str] {
        CONTENT_MAP[self as usize].1
    }

    /// Resolve the full path of this part under `root`.
    pub fn resolve(self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(self.segments());
        path
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown logical part name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown part name: {0}")]
pub struct UnknownPartName(pub String);

impl FromStr for PartName {
    type Err = UnknownPartName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownPartName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_enum() {
        for (index, (part, _)) in CONTENT_MAP.iter().enumerate() {
            assert_eq!(*part as usize, index);
            assert_eq!(PartName::ALL[index], *part);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for part in PartName::ALL {
            assert_eq!(PartName::from_name(part.as_str()), Some(part));
            assert_eq!(part.as_str().parse::<PartName>().unwrap(), part);
        }
        assert_eq!(PartName::from_name("DiagramLayout"), None);
        assert!("dataModel".parse::<PartName>().is_err());
    }

    #[test]
    fn test_resolve_layout() {
        let root = Path::new("/staging");
        assert_eq!(
            PartName::Layout.resolve(root),
            Path::new("/staging").join("Report").join("Layout")
        );
    }
}
