use crate::catalog::Catalog;
use crate::config::SynthesisConfig;
use crate::error::Result;
use std::fmt::Write;

const HEADER: &str = "// Generated by iconvsct. Do not edit.\n\
#![allow(non_camel_case_types, clippy::enum_variant_names)]\n";

/// Type names the registry declares itself; no collection may normalize to one.
pub const RESERVED_TYPE_NAMES: &[&str] = &["IconCollection", "IconRef"];

const DERIVES: &str = "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]";

/// Emit the Rust source registry: one enum per non-empty collection, the
/// `IconCollection` tag enum, the `IconRef` value type, the list of icon
/// types and the total icon count.
pub fn source_registry(catalog: &Catalog, config: &SynthesisConfig) -> Result<String> {
    catalog.validate_identifiers(config.normalizer)?;

    let type_names: Vec<String> = catalog
        .collections
        .iter()
        .filter(|c| !c.icons.is_empty())
        .map(|c| config.normalize(&c.name))
        .collect();

    let mut out = String::from(HEADER);

    for collection in catalog.collections.iter().filter(|c| !c.icons.is_empty()) {
        let type_name = config.normalize(&collection.name);
        let _ = writeln!(out);
        let _ = writeln!(out, "// {}: {} icons", type_name, collection.icons.len());
        let _ = writeln!(out, "{DERIVES}");
        let _ = writeln!(out, "#[repr(u32)]");
        let _ = writeln!(out, "pub enum {type_name} {{");
        for icon in &collection.icons {
            let _ = writeln!(out, "    {},", icon.id);
        }
        let _ = writeln!(out, "}}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{DERIVES}");
    let _ = writeln!(out, "pub enum IconCollection {{");
    for name in &type_names {
        let _ = writeln!(out, "    {name},");
    }
    let _ = writeln!(out, "}}");

    out.push_str(
        "
/// An icon of any collection: the collection tag plus the icon's enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconRef {
    pub collection: IconCollection,
    pub raw_value: u32,
}

impl IconRef {
    pub const fn new(collection: IconCollection, raw_value: u32) -> Self {
        Self {
            collection,
            raw_value,
        }
    }
}
",
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "pub const ICON_TYPES: &[IconCollection] = &[");
    for name in &type_names {
        let _ = writeln!(out, "    IconCollection::{name},");
    }
    let _ = writeln!(out, "];");
    let _ = writeln!(out);
    let _ = writeln!(out, "pub const TOTAL_ICONS_COUNT: usize = {};", catalog.total_icons());

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Collection, Icon};
    use crate::error::SynthesisError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_feather_registry() {
        let catalog = Catalog::new(vec![Collection::with_ids("Feather", ["Home", "Settings"])]);
        let source = source_registry(&catalog, &SynthesisConfig::default()).unwrap();

        assert_eq!(
            source,
            r#"// Generated by iconvsct. Do not edit.
#![allow(non_camel_case_types, clippy::enum_variant_names)]

// Feather: 2 icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Feather {
    Home,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconCollection {
    Feather,
}

/// An icon of any collection: the collection tag plus the icon's enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconRef {
    pub collection: IconCollection,
    pub raw_value: u32,
}

impl IconRef {
    pub const fn new(collection: IconCollection, raw_value: u32) -> Self {
        Self {
            collection,
            raw_value,
        }
    }
}

pub const ICON_TYPES: &[IconCollection] = &[
    IconCollection::Feather,
];

pub const TOTAL_ICONS_COUNT: usize = 2;
"#
        );
    }

    #[test]
    fn test_total_count_and_empty_collections() {
        let catalog = Catalog::new(vec![
            Collection::new("Empty", Vec::new()),
            Collection::with_ids("Single One", ["Only"]),
            Collection::new("Game-Icons", (0..300).map(|i| Icon::new(format!("Gi{i}"))).collect()),
        ]);
        let source = source_registry(&catalog, &SynthesisConfig::default()).unwrap();

        assert!(source.contains("pub const TOTAL_ICONS_COUNT: usize = 301;"));
        assert!(source.contains("// SingleOne: 1 icons"));
        assert!(source.contains("// GameIcons: 300 icons"));
        assert!(source.contains("    Gi299,\n"));
        assert!(!source.contains("pub enum Empty"));
        assert!(!source.contains("IconCollection::Empty"));
    }

    #[test]
    fn test_rejects_bad_identifier() {
        let catalog = Catalog::new(vec![Collection::with_ids("Feather", ["x-circle"])]);
        assert!(matches!(
            source_registry(&catalog, &SynthesisConfig::default()),
            Err(SynthesisError::InvalidIdentifier { .. })
        ));
    }
}
