//! Runs every generation stage against one catalog snapshot and one set of
//! previously persisted documents.

use crate::bitmaps::{self, BitmapDocument};
use crate::buttons::ButtonDocument;
use crate::catalog::Catalog;
use crate::codegen;
use crate::commands;
use crate::config::SynthesisConfig;
use crate::documents;
use crate::error::{Result, SynthesisError};
use crate::output::OutputBatch;
use crate::partition::partition;
use crate::strip::{self, TileSource};
use crate::symbols::{self, GuidSource, SymbolDocument, SymbolScope};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Documents written by an earlier run, loaded once at the start.
#[derive(Debug, Clone, Default)]
pub struct PersistedDocuments {
    pub symbols: SymbolDocument,
    pub bitmaps: BitmapDocument,
}

impl PersistedDocuments {
    pub fn load(paths: &OutputPaths) -> Result<Self> {
        Ok(Self {
            symbols: documents::load_symbols(&paths.symbols)?,
            bitmaps: documents::load_bitmaps(&paths.bitmaps)?,
        })
    }
}

/// A partition that exists in the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveScope {
    pub scope_id: String,
    pub type_name: String,
}

#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub source_registry: String,
    pub command_source: String,
    pub symbols: SymbolDocument,
    pub bitmaps: BitmapDocument,
    pub buttons: ButtonDocument,
    pub live_scopes: Vec<LiveScope>,
    /// Persisted scopes with no partition this run; kept, never pruned
    pub dangling_scopes: Vec<String>,
    pub total_icons: usize,
}

/// Pure transformation: catalog plus prior documents in, full document set out.
pub fn synthesize(
    catalog: &Catalog,
    persisted: PersistedDocuments,
    config: &SynthesisConfig,
    guids: &mut dyn GuidSource,
) -> Result<SynthesisOutput> {
    if config.capacity == 0 {
        return Err(SynthesisError::ZeroCapacity);
    }

    let source_registry = codegen::source_registry(catalog, config)?;
    let commands = commands::assign(catalog, config);

    let PersistedDocuments {
        symbols: mut symbol_doc,
        bitmaps: mut bitmap_doc,
    } = persisted;
    let mut buttons = ButtonDocument::default();
    let mut live_scopes = Vec::new();

    for collection in &catalog.collections {
        let type_name = config.normalize(&collection.name);
        let parts = partition(collection, &type_name, config.capacity);
        if parts.is_empty() {
            debug!("Skipping empty collection {}", collection.name);
            continue;
        }

        symbol_doc = symbols::allocate(&parts, symbol_doc, guids);
        bitmap_doc = bitmaps::build(&parts, &symbol_doc, bitmap_doc)?;
        buttons.emit(&parts, &symbol_doc, &commands, config)?;

        info!(
            "{}: {} icons in {} scope(s)",
            type_name,
            collection.icons.len(),
            parts.len()
        );
        live_scopes.extend(parts.iter().map(|p| LiveScope {
            scope_id: p.scope_id(),
            type_name: type_name.clone(),
        }));
    }

    let default_guid = config.command_set_guid.clone();
    let command_guid = symbol_doc
        .replace_entries(
            &config.command_set_name,
            move || SymbolScope::named(default_guid),
            commands.symbol_entries(),
        )
        .guid
        .clone();
    let command_source = commands.to_source(&command_guid);

    let mut live: HashSet<String> = live_scopes.iter().map(|s| s.scope_id.clone()).collect();
    live.insert(config.command_set_name.clone());

    let mut dangling: Vec<String> = symbol_doc
        .dangling(&live)
        .into_iter()
        .map(str::to_string)
        .collect();
    for scope_id in bitmap_doc.entries.keys() {
        if !live.contains(scope_id) && !dangling.contains(scope_id) {
            dangling.push(scope_id.clone());
        }
    }
    for scope_id in &dangling {
        warn!("Scope {} has no icons in this catalog; keeping it", scope_id);
    }

    Ok(SynthesisOutput {
        source_registry,
        command_source,
        symbols: symbol_doc,
        bitmaps: bitmap_doc,
        buttons,
        live_scopes,
        dangling_scopes: dangling,
        total_icons: catalog.total_icons(),
    })
}

/// Where each generated artifact goes.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub source_registry: PathBuf,
    pub command_source: PathBuf,
    pub symbols: PathBuf,
    pub bitmaps: PathBuf,
    pub buttons: PathBuf,
    /// Directory the strip images' relative paths resolve against
    pub resources: PathBuf,
}

impl OutputPaths {
    /// Default file names inside one output directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            source_registry: dir.join("generated.rs"),
            command_source: dir.join("commands.rs"),
            symbols: dir.join("symbols.xml"),
            bitmaps: dir.join("bitmaps.xml"),
            buttons: dir.join("buttons.xml"),
            resources: dir.join("Resources"),
        }
    }
}

impl SynthesisOutput {
    /// Serialize every document, and pack strip images when tiles are given.
    pub fn to_batch(
        &self,
        paths: &OutputPaths,
        config: &SynthesisConfig,
        tiles: Option<&dyn TileSource>,
    ) -> Result<OutputBatch> {
        let mut batch = OutputBatch::new();
        batch.add(&paths.source_registry, self.source_registry.as_str());
        batch.add(&paths.command_source, self.command_source.as_str());
        batch.add(&paths.symbols, documents::symbols_to_xml(&self.symbols)?);
        batch.add(&paths.bitmaps, documents::bitmaps_to_xml(&self.bitmaps)?);
        batch.add(&paths.buttons, documents::buttons_to_xml(&self.buttons, config)?);

        if let Some(tiles) = tiles {
            for scope in &self.live_scopes {
                let entry = self.bitmaps.get(&scope.scope_id).ok_or_else(|| {
                    SynthesisError::inconsistent(&scope.scope_id, "strip", "no bitmap entry")
                })?;
                let png = strip::pack(&scope.type_name, &entry.used_icon_ids, tiles, config.tile_size)?;
                batch.add(paths.resources.join(entry.image_path.replace('\\', "/")), png);
            }
        }

        Ok(batch)
    }
}

/// Load prior documents, synthesize, and write the whole artifact set at once.
/// Nothing is written if any step fails.
pub fn run(
    catalog: &Catalog,
    paths: &OutputPaths,
    config: &SynthesisConfig,
    tiles: Option<&dyn TileSource>,
    guids: &mut dyn GuidSource,
) -> Result<Vec<PathBuf>> {
    let persisted = PersistedDocuments::load(paths)?;
    let output = synthesize(catalog, persisted, config, guids)?;
    let batch = output.to_batch(paths, config, tiles)?;
    info!(
        "Writing {} files for {} icons ({} scopes, {} dangling)",
        batch.len(),
        output.total_icons,
        output.live_scopes.len(),
        output.dangling_scopes.len()
    );
    batch.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Collection, Icon};
    use crate::symbols::SequentialGuids;

    fn feather(ids: &[&str]) -> Catalog {
        Catalog::new(vec![Collection::with_ids("Feather", ids.iter().copied())])
    }

    fn entries(doc: &SymbolDocument, scope: &str) -> Vec<(String, u32)> {
        doc.get(scope)
            .unwrap()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    #[test]
    fn test_feather_two_runs() {
        let config = SynthesisConfig::with_capacity(2);
        let first = synthesize(
            &feather(&["Home", "Settings", "User"]),
            PersistedDocuments::default(),
            &config,
            &mut SequentialGuids(0),
        )
        .unwrap();

        assert_eq!(
            entries(&first.symbols, "Feather_0_1"),
            [("Home".to_string(), 1), ("Settings".to_string(), 2)]
        );
        assert_eq!(entries(&first.symbols, "Feather_2_3"), [("User".to_string(), 1)]);
        assert!(first.dangling_scopes.is_empty());

        let persisted = PersistedDocuments {
            symbols: first.symbols.clone(),
            bitmaps: first.bitmaps.clone(),
        };
        let second = synthesize(
            &feather(&["Settings"]),
            persisted,
            &config,
            &mut SequentialGuids(50),
        )
        .unwrap();

        let guid = |out: &SynthesisOutput, scope: &str| out.symbols.get(scope).unwrap().guid.clone();
        assert_eq!(guid(&second, "Feather_0_1"), guid(&first, "Feather_0_1"));
        assert_eq!(entries(&second.symbols, "Feather_0_1"), [("Settings".to_string(), 1)]);
        assert_eq!(second.symbols.get("Feather_2_3"), first.symbols.get("Feather_2_3"));
        assert_eq!(second.bitmaps.get("Feather_2_3"), first.bitmaps.get("Feather_2_3"));
        assert_eq!(second.dangling_scopes, ["Feather_2_3"]);

        assert_eq!(second.buttons.buttons.len(), 1);
        assert_eq!(second.buttons.buttons[0].command_id, 100);
    }

    #[test]
    fn test_unchanged_catalog_is_idempotent() {
        let config = SynthesisConfig::with_capacity(2);
        let catalog = feather(&["Home", "Settings", "User"]);
        let first = synthesize(&catalog, PersistedDocuments::default(), &config, &mut SequentialGuids(0))
            .unwrap();
        let second = synthesize(
            &catalog,
            PersistedDocuments {
                symbols: first.symbols.clone(),
                bitmaps: first.bitmaps.clone(),
            },
            &config,
            &mut SequentialGuids(99),
        )
        .unwrap();

        assert_eq!(first.symbols, second.symbols);
        assert_eq!(first.bitmaps, second.bitmaps);
        assert_eq!(first.buttons, second.buttons);
        assert_eq!(first.source_registry, second.source_registry);
    }

    #[test]
    fn test_sizes_0_1_300() {
        let catalog = Catalog::new(vec![
            Collection::new("Empty", Vec::new()),
            Collection::with_ids("One", ["Solo"]),
            Collection::new("Many", (0..300).map(|i| Icon::new(format!("M{i}"))).collect()),
        ]);
        let config = SynthesisConfig::default();
        let out = synthesize(&catalog, PersistedDocuments::default(), &config, &mut SequentialGuids(0))
            .unwrap();

        assert_eq!(out.total_icons, 301);
        assert!(out.source_registry.contains("pub const TOTAL_ICONS_COUNT: usize = 301;"));

        let scopes: Vec<_> = out.live_scopes.iter().map(|s| s.scope_id.as_str()).collect();
        assert_eq!(scopes, ["One_0_254", "Many_0_254", "Many_255_509"]);
        assert_eq!(out.symbols.get("Many_0_254").unwrap().entries.len(), 255);
        assert_eq!(out.symbols.get("Many_255_509").unwrap().entries.len(), 45);
        assert_eq!(out.bitmaps.get("Many_255_509").unwrap().used_icon_ids.len(), 45);

        let ids: Vec<u32> = out.buttons.buttons.iter().map(|b| b.command_id).collect();
        assert_eq!(ids.len(), 301);
        assert!(ids.iter().enumerate().all(|(i, id)| *id == (i as u32 + 1) * 100));

        let commands = out.symbols.get(&config.command_set_name).unwrap();
        assert_eq!(commands.guid, config.command_set_guid);
        assert_eq!(commands.entries.get("Many_M299"), Some(&30100));
        assert!(out.command_source.contains("pub const One_Solo: u32 = 100;"));
    }

    #[test]
    fn test_invalid_identifier_stops_before_documents() {
        let catalog = feather(&["Home", "x-circle"]);
        let err = synthesize(
            &catalog,
            PersistedDocuments::default(),
            &SynthesisConfig::default(),
            &mut SequentialGuids(0),
        )
        .unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = synthesize(
            &feather(&["Home"]),
            PersistedDocuments::default(),
            &SynthesisConfig::with_capacity(0),
            &mut SequentialGuids(0),
        )
        .unwrap_err();
        assert!(matches!(err, SynthesisError::ZeroCapacity));
    }

    #[test]
    fn test_run_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_dir(dir.path());
        let config = SynthesisConfig::with_capacity(2);

        let written = run(
            &feather(&["Home", "Settings", "User"]),
            &paths,
            &config,
            None,
            &mut SequentialGuids(0),
        )
        .unwrap();
        assert_eq!(written.len(), 5);
        let first_symbols = documents::load_symbols(&paths.symbols).unwrap();

        run(&feather(&["Settings", "User"]), &paths, &config, None, &mut SequentialGuids(10)).unwrap();
        let second_symbols = documents::load_symbols(&paths.symbols).unwrap();

        assert_eq!(
            second_symbols.get("Feather_0_1").unwrap().guid,
            first_symbols.get("Feather_0_1").unwrap().guid
        );
        assert_eq!(
            entries(&second_symbols, "Feather_0_1"),
            [("Settings".to_string(), 1), ("User".to_string(), 2)]
        );
        // the start-2 partition is gone but its scope survives
        assert_eq!(
            second_symbols.get("Feather_2_3"),
            first_symbols.get("Feather_2_3")
        );

        let buttons = std::fs::read_to_string(&paths.buttons).unwrap();
        assert!(buttons.contains(r#"id="Feather_Settings" commandId="100""#));
        assert!(!buttons.contains("Feather_Home"));
    }

    #[test]
    fn test_malformed_document_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_dir(dir.path());
        std::fs::write(&paths.symbols, "<Symbols><GuidSymbol").unwrap();

        let err = run(
            &feather(&["Home"]),
            &paths,
            &SynthesisConfig::default(),
            None,
            &mut SequentialGuids(0),
        )
        .unwrap_err();

        assert!(matches!(err, SynthesisError::MalformedDocument { document: "symbol", .. }));
        assert!(!paths.source_registry.exists());
        assert!(!paths.buttons.exists());
        assert_eq!(
            std::fs::read_to_string(&paths.symbols).unwrap(),
            "<Symbols><GuidSymbol"
        );
    }

    #[test]
    fn test_command_symbol_clash_stops_before_documents() {
        let catalog = Catalog::new(vec![
            Collection::with_ids("Ai", ["Fill_X"]),
            Collection::with_ids("Ai_Fill", ["X"]),
        ]);
        let err = synthesize(
            &catalog,
            PersistedDocuments::default(),
            &SynthesisConfig::default(),
            &mut SequentialGuids(0),
        )
        .unwrap_err();
        assert!(matches!(err, SynthesisError::DuplicateIdentifier { id, .. } if id == "Ai_Fill_X"));
    }

    #[test]
    fn test_package_symbols_survive_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::in_dir(dir.path());
        std::fs::write(
            &paths.symbols,
            r#"<Symbols>
  <GuidSymbol name="guidPackageCmdSet" value="{pkg}">
    <IDSymbol name="DynamicMenuControllerGroup" value="4128"/>
  </GuidSymbol>
</Symbols>"#,
        )
        .unwrap();
        let config = SynthesisConfig::default();

        let persisted = PersistedDocuments::load(&paths).unwrap();
        let out = synthesize(&feather(&["Home"]), persisted, &config, &mut SequentialGuids(0)).unwrap();
        assert!(out.dangling_scopes.is_empty());

        run(&feather(&["Home"]), &paths, &config, None, &mut SequentialGuids(0)).unwrap();
        let written = std::fs::read_to_string(&paths.symbols).unwrap();
        assert!(written.contains(r#"<GuidSymbol name="guidPackageCmdSet" value="{pkg}">"#));
        assert!(written.contains(r#"<GuidSymbol name="guid_Feather_0_254""#));
        assert!(written.contains(r#"<GuidSymbol name="dynamicCommandIds""#));
        assert!(!written.contains("guid_guidPackageCmdSet"));
    }
}
