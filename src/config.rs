use crate::catalog::normalize_collection_name;
use std::fmt;

/// Icons per bitmap strip and symbol scope.
pub const DEFAULT_CAPACITY: usize = 255;

/// Settings shared by every synthesis stage. All stages of one run must see
/// the same capacity.
#[derive(Clone)]
pub struct SynthesisConfig {
    pub capacity: usize,
    /// Command ids are `rank * command_id_step`
    pub command_id_step: u32,
    pub first_priority: u32,
    pub command_set_name: String,
    /// Used only when the symbol document has no command set yet
    pub command_set_guid: String,
    pub parent_guid: String,
    pub parent_id: String,
    /// Edge length of one square raster tile in a strip
    pub tile_size: u32,
    pub normalizer: fn(&str) -> String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            command_id_step: 100,
            first_priority: 0x2000,
            command_set_name: "dynamicCommandIds".to_string(),
            command_set_guid: "{124f22e4-53e8-405c-b1d7-d43e63d7e24c}".to_string(),
            parent_guid: "guidPackageCmdSet".to_string(),
            parent_id: "DynamicMenuControllerGroup".to_string(),
            tile_size: 16,
            normalizer: normalize_collection_name,
        }
    }
}

impl fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("capacity", &self.capacity)
            .field("command_id_step", &self.command_id_step)
            .field("first_priority", &self.first_priority)
            .field("command_set_name", &self.command_set_name)
            .field("command_set_guid", &self.command_set_guid)
            .field("parent_guid", &self.parent_guid)
            .field("parent_id", &self.parent_id)
            .field("tile_size", &self.tile_size)
            .finish_non_exhaustive()
    }
}

impl SynthesisConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn normalize(&self, collection: &str) -> String {
        (self.normalizer)(collection)
    }
}
