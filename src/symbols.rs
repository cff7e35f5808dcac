use crate::partition::Partition;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Identifier namespace of one partition: a stable guid plus the 1-based
/// positional value of every icon currently in the partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolScope {
    pub guid: String,
    pub entries: IndexMap<String, u32>,
    /// Persisted as `guid_<scope id>`. Cleared for symbols stored under their
    /// own name, such as the command set or symbols owned by other tools.
    pub prefixed: bool,
}

impl SymbolScope {
    /// A partition scope.
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            entries: IndexMap::new(),
            prefixed: true,
        }
    }

    /// A symbol persisted under its bare name.
    pub fn named(guid: impl Into<String>) -> Self {
        Self {
            prefixed: false,
            ..Self::new(guid)
        }
    }
}

/// Persisted symbol table keyed by scope id, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolDocument {
    pub scopes: IndexMap<String, SymbolScope>,
}

impl SymbolDocument {
    pub fn get(&self, scope_id: &str) -> Option<&SymbolScope> {
        self.scopes.get(scope_id)
    }

    /// Reuse the scope `scope_id` (or insert the one built by `create`) and
    /// replace its entries wholesale.
    pub fn replace_entries(
        &mut self,
        scope_id: &str,
        create: impl FnOnce() -> SymbolScope,
        entries: IndexMap<String, u32>,
    ) -> &SymbolScope {
        let scope = self.scopes.entry(scope_id.to_string()).or_insert_with(create);
        scope.entries = entries;
        scope
    }

    /// Partition scope ids not in `live`, in document order. They are reported
    /// but kept. Bare-named symbols are never dangling.
    pub fn dangling<'a>(&'a self, live: &HashSet<String>) -> Vec<&'a str> {
        self.scopes
            .iter()
            .filter(|(id, scope)| scope.prefixed && !live.contains(id.as_str()))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Source of fresh scope guids.
pub trait GuidSource {
    fn next_guid(&mut self) -> String;
}

/// Random v4 guids rendered as `{xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}`.
#[derive(Debug, Default)]
pub struct RandomGuids;

impl GuidSource for RandomGuids {
    fn next_guid(&mut self) -> String {
        format!("{{{}}}", Uuid::new_v4())
    }
}

/// Assign positional values for every partition of one collection, reusing
/// persisted guids. Scopes whose partitions disappeared are left untouched.
pub fn allocate(
    partitions: &[Partition<'_>],
    mut document: SymbolDocument,
    guids: &mut dyn GuidSource,
) -> SymbolDocument {
    for partition in partitions {
        let scope_id = partition.scope_id();
        let entries: IndexMap<String, u32> = partition
            .ids()
            .zip(1u32..)
            .map(|(id, value)| (id.to_string(), value))
            .collect();

        let existed = document.scopes.contains_key(&scope_id);
        let scope = document.replace_entries(&scope_id, || SymbolScope::new(guids.next_guid()), entries);
        debug!(
            "Scope {} {} with {} symbols ({})",
            scope_id,
            if existed { "reused" } else { "created" },
            scope.entries.len(),
            scope.guid
        );
    }

    document
}

#[cfg(test)]
pub(crate) struct SequentialGuids(pub u32);

#[cfg(test)]
impl GuidSource for SequentialGuids {
    fn next_guid(&mut self) -> String {
        self.0 += 1;
        format!("{{00000000-0000-0000-0000-{:012x}}}", self.0)
    }
}
