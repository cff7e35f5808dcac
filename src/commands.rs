use crate::catalog::Catalog;
use crate::config::SynthesisConfig;
use indexmap::IndexMap;
use std::fmt::Write;

/// Name of the generated constant holding the command set guid.
pub const COMMAND_SET_CONST: &str = "COMMAND_SET";

/// `<TypeName>_<iconId>`
pub fn command_symbol(type_name: &str, icon_id: &str) -> String {
    format!("{type_name}_{icon_id}")
}

/// Command assigned to one icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// `<TypeName>_<iconId>`, the name used in the command set and in buttons
    pub symbol: String,
    pub id: u32,
}

/// `(collection, icon id) -> command`, in flattened catalog order.
/// Rebuilt from scratch every run; nothing is merged with earlier output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRegistry {
    commands: IndexMap<(String, String), Command>,
}

impl CommandRegistry {
    pub fn get(&self, collection: &str, icon: &str) -> Option<&Command> {
        self.commands.get(&(collection.to_string(), icon.to_string()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Entries for the command-set scope of the symbol document.
    pub fn symbol_entries(&self) -> IndexMap<String, u32> {
        self.iter().map(|c| (c.symbol.clone(), c.id)).collect()
    }

    /// Rust source exposing the command set guid and one constant per command.
    pub fn to_source(&self, command_set_guid: &str) -> String {
        let mut out = String::new();
        out.push_str("// Generated by iconvsct. Do not edit.\n");
        out.push_str("#![allow(non_upper_case_globals)]\n\n");
        let _ = writeln!(out, "pub const {COMMAND_SET_CONST}: &str = \"{command_set_guid}\";\n");
        for command in self.iter() {
            let _ = writeln!(out, "pub const {}: u32 = {};", command.symbol, command.id);
        }
        out
    }
}

/// Number every icon of the catalog: collections in catalog order, icons in
/// collection order, `id = rank * step` with rank starting at 1.
pub fn assign(catalog: &Catalog, config: &SynthesisConfig) -> CommandRegistry {
    let mut commands = IndexMap::with_capacity(catalog.total_icons());
    let mut rank = 0u32;

    for collection in &catalog.collections {
        let type_name = config.normalize(&collection.name);
        for icon in &collection.icons {
            rank += 1;
            commands.insert(
                (collection.name.clone(), icon.id.clone()),
                Command {
                    symbol: command_symbol(&type_name, &icon.id),
                    id: rank * config.command_id_step,
                },
            );
        }
    }

    CommandRegistry { commands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Collection;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Collection::with_ids("Feather", ["Home", "Settings", "User"]),
            Collection::with_ids("Empty Set", []),
            Collection::with_ids("Ionicons 5", ["IoCar", "IoBus"]),
        ])
    }

    #[test]
    fn test_ids_follow_flattened_rank() {
        let registry = assign(&catalog(), &SynthesisConfig::with_capacity(2));

        let ids: Vec<u32> = registry.iter().map(|c| c.id).collect();
        assert_eq!(ids, [100, 200, 300, 400, 500]);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(registry.get("Feather", "User").unwrap().id, 300);
        let car = registry.get("Ionicons 5", "IoCar").unwrap();
        assert_eq!(car.symbol, "Ionicons5_IoCar");
        assert_eq!(car.id, 400);
        assert!(registry.get("Feather", "IoCar").is_none());
    }

    #[test]
    fn test_ids_independent_of_capacity() {
        let small = assign(&catalog(), &SynthesisConfig::with_capacity(1));
        let large = assign(&catalog(), &SynthesisConfig::default());
        assert_eq!(small, large);
    }

    #[test]
    fn test_to_source() {
        let registry = assign(
            &Catalog::new(vec![Collection::with_ids("Feather", ["Home", "User"])]),
            &SynthesisConfig::default(),
        );
        let source = registry.to_source("{guid}");

        assert!(source.contains("pub const COMMAND_SET: &str = \"{guid}\";"));
        assert!(source.contains("pub const Feather_Home: u32 = 100;\n"));
        assert!(source.contains("pub const Feather_User: u32 = 200;\n"));
        assert_eq!(registry.symbol_entries().get("Feather_User"), Some(&200));
    }
}
