use crate::commands::CommandRegistry;
use crate::config::SynthesisConfig;
use crate::error::{Result, SynthesisError};
use crate::partition::Partition;
use crate::symbols::SymbolDocument;

/// Flags every generated button carries.
pub const COMMAND_FLAGS: [&str; 4] = [
    "DynamicItemStart",
    "DynamicVisibility",
    "DefaultInvisible",
    "TextChanges",
];

/// One dynamic menu command bound to an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonDefinition {
    pub command_id: u32,
    /// Command symbol, `<TypeName>_<iconId>`
    pub symbol: String,
    pub priority: u32,
    pub scope_id: String,
    pub guid: String,
    pub positional_value: u32,
    pub icon_id: String,
    pub label: String,
}

/// Button table, rebuilt from empty on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonDocument {
    pub buttons: Vec<ButtonDefinition>,
}

impl ButtonDocument {
    /// Append one button per icon of `partitions`. Call once per collection,
    /// in catalog order, so priorities follow flattened enumeration.
    pub fn emit(
        &mut self,
        partitions: &[Partition<'_>],
        symbols: &SymbolDocument,
        commands: &CommandRegistry,
        config: &SynthesisConfig,
    ) -> Result<()> {
        for partition in partitions {
            let scope_id = partition.scope_id();
            let scope = symbols
                .get(&scope_id)
                .ok_or_else(|| SynthesisError::inconsistent(&scope_id, "button", "no symbol scope"))?;

            if scope.entries.len() != partition.len() {
                return Err(SynthesisError::inconsistent(
                    &scope_id,
                    "button",
                    format!(
                        "scope has {} entries, partition has {} icons",
                        scope.entries.len(),
                        partition.len()
                    ),
                ));
            }

            for (index, icon) in partition.icons.iter().enumerate() {
                let positional_value = match scope.entries.get(&icon.id) {
                    Some(&value) if value as usize == index + 1 => value,
                    other => {
                        return Err(SynthesisError::inconsistent(
                            &scope_id,
                            "button",
                            format!(
                                "icon '{}' at position {} has symbol value {:?}",
                                icon.id,
                                index + 1,
                                other
                            ),
                        ))
                    }
                };

                let command = commands.get(partition.collection, &icon.id).ok_or_else(|| {
                    SynthesisError::inconsistent(
                        &scope_id,
                        "button",
                        format!("icon '{}' has no command id", icon.id),
                    )
                })?;

                let priority = config.first_priority + self.buttons.len() as u32;
                self.buttons.push(ButtonDefinition {
                    command_id: command.id,
                    symbol: command.symbol.clone(),
                    priority,
                    scope_id: scope_id.clone(),
                    guid: scope.guid.clone(),
                    positional_value,
                    icon_id: icon.id.clone(),
                    label: icon.id.clone(),
                });
            }
        }
        Ok(())
    }
}
