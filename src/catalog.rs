use crate::codegen::RESERVED_TYPE_NAMES;
use crate::commands::{command_symbol, COMMAND_SET_CONST};
use crate::error::{Result, SynthesisError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A single icon as delivered by catalog acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Icon {
    /// Source identifier, unique within its collection (e.g. "AiFillApple")
    #[serde(alias = "Id")]
    pub id: String,
    /// Raw SVG markup, if the scraper captured any
    #[serde(default, alias = "SVG")]
    pub svg: Option<String>,
    /// Cleared when rasterization produced an empty or failed image
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

impl Icon {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            svg: None,
            valid: true,
        }
    }
}

/// A named, ordered group of icons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub icons: Vec<Icon>,
}

impl Collection {
    pub fn new(name: impl Into<String>, icons: Vec<Icon>) -> Self {
        Self {
            name: name.into(),
            icons,
        }
    }

    pub fn with_ids<'a>(name: impl Into<String>, ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(name, ids.into_iter().map(Icon::new).collect())
    }
}

/// Immutable catalog snapshot; collection order is catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub collections: Vec<Collection>,
}

impl Catalog {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self { collections }
    }

    /// Parse a `{ collection: [ {id, svg, valid} ] }` JSON document.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let raw: IndexMap<String, Vec<Icon>> = serde_json::from_str(text)?;
        Ok(Self::new(
            raw.into_iter()
                .map(|(name, icons)| Collection::new(name, icons))
                .collect(),
        ))
    }

    /// Read a JSON catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SynthesisError::io(e, path))?;
        Self::from_json(&text).map_err(|e| SynthesisError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `root/<collection>/<icon>.svg`. Collections and icons are sorted by
    /// file name so repeated loads enumerate identically.
    pub fn from_directory(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(SynthesisError::Catalog {
                path: root.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut dirs: Vec<PathBuf> = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        dirs.sort();

        let mut collections = Vec::new();
        for dir in dirs {
            let name = match dir.file_name().and_then(|s| s.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            let mut entries: Vec<_> = WalkDir::new(&dir)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.path()
                        .extension()
                        .map(|ext| ext == "svg")
                        .unwrap_or(false)
                })
                .collect();
            entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));

            let mut icons = Vec::with_capacity(entries.len());
            for entry in entries {
                let path = entry.path();
                let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                    warn!("Skipping non UTF-8 file name: {}", path.display());
                    continue;
                };
                let svg = std::fs::read_to_string(path).map_err(|e| SynthesisError::io(e, path))?;
                icons.push(Icon {
                    id: id.to_string(),
                    svg: Some(svg),
                    valid: true,
                });
            }

            debug!("Loaded collection {} ({} icons)", name, icons.len());
            collections.push(Collection::new(name, icons));
        }

        Ok(Self::new(collections))
    }

    /// Drop icons flagged invalid, then collections left empty.
    pub fn retain_valid(&mut self) -> usize {
        let before = self.total_icons();
        for collection in &mut self.collections {
            collection.icons.retain(|icon| icon.valid);
        }
        self.collections.retain(|c| !c.icons.is_empty());
        before - self.total_icons()
    }

    pub fn total_icons(&self) -> usize {
        self.collections.iter().map(|c| c.icons.len()).sum()
    }

    /// Check that every emitted name is a usable bare identifier, with no
    /// collisions inside a collection, between normalized collection names,
    /// or between command symbols anywhere in the catalog.
    pub fn validate_identifiers(&self, normalize: fn(&str) -> String) -> Result<()> {
        let mut type_names = HashSet::new();
        let mut symbols: HashSet<String> = HashSet::from([COMMAND_SET_CONST.to_string()]);
        for collection in &self.collections {
            if collection.icons.is_empty() {
                continue;
            }

            let normalized = normalize(&collection.name);
            if !is_identifier(&normalized) || RESERVED_TYPE_NAMES.contains(&normalized.as_str()) {
                return Err(SynthesisError::InvalidCollectionName {
                    collection: collection.name.clone(),
                    normalized,
                });
            }
            if !type_names.insert(normalized.clone()) {
                return Err(SynthesisError::DuplicateIdentifier {
                    collection: collection.name.clone(),
                    id: normalized,
                });
            }

            let mut ids = HashSet::with_capacity(collection.icons.len());
            for icon in &collection.icons {
                if !is_identifier(&icon.id) {
                    return Err(SynthesisError::InvalidIdentifier {
                        collection: collection.name.clone(),
                        id: icon.id.clone(),
                    });
                }
                if !ids.insert(icon.id.as_str()) {
                    return Err(SynthesisError::DuplicateIdentifier {
                        collection: collection.name.clone(),
                        id: icon.id.clone(),
                    });
                }
                let symbol = command_symbol(&normalized, &icon.id);
                if !symbols.insert(symbol.clone()) {
                    return Err(SynthesisError::DuplicateIdentifier {
                        collection: collection.name.clone(),
                        id: symbol,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Default collection-name normalizer: strips spaces, dashes and dots.
pub fn normalize_collection_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.'))
        .collect()
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Whether `s` can appear as a bare identifier in generated source.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);

    first_ok
        && s != "_"
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&s)
}
