use crate::error::{Result, SynthesisError};
use crate::partition::Partition;
use crate::symbols::SymbolDocument;
use indexmap::IndexMap;

/// Strip image of one partition and the icons occupying it, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapEntry {
    pub guid: String,
    pub image_path: String,
    pub used_icon_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitmapDocument {
    pub entries: IndexMap<String, BitmapEntry>,
}

impl BitmapDocument {
    pub fn get(&self, scope_id: &str) -> Option<&BitmapEntry> {
        self.entries.get(scope_id)
    }
}

pub fn image_path(scope_id: &str) -> String {
    format!("{scope_id}.png")
}

/// Record which icons occupy each partition's strip. Existing entries keep
/// their guid and image path; only the used list is rewritten.
pub fn build(
    partitions: &[Partition<'_>],
    symbols: &SymbolDocument,
    mut document: BitmapDocument,
) -> Result<BitmapDocument> {
    for partition in partitions {
        let scope_id = partition.scope_id();
        let scope = symbols
            .get(&scope_id)
            .ok_or_else(|| SynthesisError::inconsistent(&scope_id, "bitmap", "no symbol scope"))?;

        let used: Vec<String> = partition.ids().map(str::to_string).collect();
        if !scope.entries.keys().eq(used.iter()) {
            return Err(SynthesisError::inconsistent(
                &scope_id,
                "bitmap",
                format!(
                    "symbol scope lists {} icons, partition has {}",
                    scope.entries.len(),
                    used.len()
                ),
            ));
        }

        match document.entries.get_mut(&scope_id) {
            Some(entry) => entry.used_icon_ids = used,
            None => {
                document.entries.insert(
                    scope_id.clone(),
                    BitmapEntry {
                        guid: scope.guid.clone(),
                        image_path: image_path(&scope_id),
                        used_icon_ids: used,
                    },
                );
            }
        }
    }

    Ok(document)
}
