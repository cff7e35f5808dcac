//! XML form of the persisted symbol, bitmap and button documents.
//!
//! Documents are read whole into plain values, recomputed, and written back
//! whole. Nothing is patched in place.

use crate::bitmaps::{BitmapDocument, BitmapEntry};
use crate::buttons::{ButtonDocument, COMMAND_FLAGS};
use crate::config::SynthesisConfig;
use crate::error::{Result, SynthesisError};
use crate::symbols::{SymbolDocument, SymbolScope};
use serde::{Deserialize, Serialize};
use std::path::Path;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
const SCOPE_PREFIX: &str = "guid_";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "Symbols")]
struct SymbolsXml {
    #[serde(rename = "GuidSymbol", default)]
    guid_symbols: Vec<GuidSymbolXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GuidSymbolXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value")]
    value: String,
    #[serde(rename = "IDSymbol", default)]
    id_symbols: Vec<IdSymbolXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IdSymbolXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value")]
    value: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "Bitmaps")]
struct BitmapsXml {
    #[serde(rename = "Bitmap", default)]
    bitmaps: Vec<BitmapXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BitmapXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@guid")]
    guid: String,
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@usedList", default)]
    used_list: String,
}

#[derive(Debug, Serialize)]
#[serde(rename = "Buttons")]
struct ButtonsXml {
    #[serde(rename = "Button")]
    buttons: Vec<ButtonXml>,
}

#[derive(Debug, Serialize)]
struct ButtonXml {
    #[serde(rename = "@guid")]
    guid: String,
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@commandId")]
    command_id: u32,
    #[serde(rename = "@priority")]
    priority: u32,
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "Parent")]
    parent: ParentXml,
    #[serde(rename = "Icon")]
    icon: IconXml,
    #[serde(rename = "CommandFlag")]
    flags: Vec<&'static str>,
    #[serde(rename = "Strings")]
    strings: StringsXml,
}

#[derive(Debug, Serialize)]
struct ParentXml {
    #[serde(rename = "@guid")]
    guid: String,
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Debug, Serialize)]
struct IconXml {
    #[serde(rename = "@scope")]
    scope: String,
    #[serde(rename = "@guid")]
    guid: String,
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@position")]
    position: u32,
}

#[derive(Debug, Serialize)]
struct StringsXml {
    #[serde(rename = "ButtonText")]
    button_text: String,
}

fn to_xml<T: Serialize>(value: &T, document: &'static str) -> Result<String> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    value
        .serialize(serializer)
        .map_err(|e| SynthesisError::Serialize {
            document,
            message: e.to_string(),
        })?;

    let mut out = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
    out.push_str(XML_DECLARATION);
    out.push_str(&body);
    out.push('\n');
    Ok(out)
}

/// Read a persisted document; a missing file is an empty document.
fn load<T>(
    path: &Path,
    document: &'static str,
    parse: impl FnOnce(&str) -> std::result::Result<T, String>,
) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|e| SynthesisError::io(e, path))?;
    parse(&text)
        .map(Some)
        .map_err(|message| SynthesisError::MalformedDocument {
            document,
            path: path.to_path_buf(),
            message,
        })
}

pub fn parse_symbols(text: &str) -> std::result::Result<SymbolDocument, String> {
    let xml: SymbolsXml = quick_xml::de::from_str(text).map_err(|e| e.to_string())?;

    let mut document = SymbolDocument::default();
    for symbol in xml.guid_symbols {
        let (scope_id, mut scope) = match symbol.name.strip_prefix(SCOPE_PREFIX) {
            Some(scope_id) => (scope_id.to_string(), SymbolScope::new(symbol.value)),
            None => (symbol.name.clone(), SymbolScope::named(symbol.value)),
        };
        for id in symbol.id_symbols {
            if scope.entries.insert(id.name.clone(), id.value).is_some() {
                return Err(format!("duplicate symbol '{}' in '{}'", id.name, symbol.name));
            }
        }
        if document.scopes.insert(scope_id, scope).is_some() {
            return Err(format!("duplicate scope '{}'", symbol.name));
        }
    }
    Ok(document)
}

/// Serialize the symbol table. Partition scopes are written as `guid_<scopeId>`;
/// bare-named symbols keep the name they were read or created with.
pub fn symbols_to_xml(document: &SymbolDocument) -> Result<String> {
    let guid_symbols = document
        .scopes
        .iter()
        .map(|(scope_id, scope)| GuidSymbolXml {
            name: if scope.prefixed {
                format!("{SCOPE_PREFIX}{scope_id}")
            } else {
                scope_id.clone()
            },
            value: scope.guid.clone(),
            id_symbols: scope
                .entries
                .iter()
                .map(|(name, value)| IdSymbolXml {
                    name: name.clone(),
                    value: *value,
                })
                .collect(),
        })
        .collect();

    to_xml(&SymbolsXml { guid_symbols }, "symbol")
}

pub fn load_symbols(path: &Path) -> Result<SymbolDocument> {
    Ok(load(path, "symbol", parse_symbols)?.unwrap_or_default())
}

pub fn parse_bitmaps(text: &str) -> std::result::Result<BitmapDocument, String> {
    let xml: BitmapsXml = quick_xml::de::from_str(text).map_err(|e| e.to_string())?;

    let mut document = BitmapDocument::default();
    for bitmap in xml.bitmaps {
        let entry = BitmapEntry {
            guid: bitmap.guid,
            image_path: bitmap.href,
            used_icon_ids: bitmap
                .used_list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        };
        if document.entries.insert(bitmap.id.clone(), entry).is_some() {
            return Err(format!("duplicate bitmap '{}'", bitmap.id));
        }
    }
    Ok(document)
}

pub fn bitmaps_to_xml(document: &BitmapDocument) -> Result<String> {
    let bitmaps = document
        .entries
        .iter()
        .map(|(scope_id, entry)| BitmapXml {
            id: scope_id.clone(),
            guid: entry.guid.clone(),
            href: entry.image_path.clone(),
            used_list: entry.used_icon_ids.join(", "),
        })
        .collect();

    to_xml(&BitmapsXml { bitmaps }, "bitmap")
}

pub fn load_bitmaps(path: &Path) -> Result<BitmapDocument> {
    Ok(load(path, "bitmap", parse_bitmaps)?.unwrap_or_default())
}

pub fn buttons_to_xml(document: &ButtonDocument, config: &SynthesisConfig) -> Result<String> {
    let buttons = document
        .buttons
        .iter()
        .map(|button| ButtonXml {
            guid: config.command_set_name.clone(),
            id: button.symbol.clone(),
            command_id: button.command_id,
            priority: button.priority,
            kind: "Button",
            parent: ParentXml {
                guid: config.parent_guid.clone(),
                id: config.parent_id.clone(),
            },
            icon: IconXml {
                scope: button.scope_id.clone(),
                guid: button.guid.clone(),
                id: button.icon_id.clone(),
                position: button.positional_value,
            },
            flags: COMMAND_FLAGS.to_vec(),
            strings: StringsXml {
                button_text: button.label.clone(),
            },
        })
        .collect();

    to_xml(&ButtonsXml { buttons }, "button")
}
