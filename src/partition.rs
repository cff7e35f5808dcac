use crate::catalog::{Collection, Icon};

/// A fixed-capacity, ordered slice of one collection. Recomputed every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<'a> {
    /// Collection name as it appears in the catalog
    pub collection: &'a str,
    /// Identifier-safe collection name
    pub type_name: String,
    /// Index of the first icon; always a multiple of the capacity
    pub start: usize,
    pub icons: &'a [Icon],
    capacity: usize,
}

impl<'a> Partition<'a> {
    /// `<TypeName>_<start>_<start + capacity - 1>`. The upper bound is the
    /// nominal end, also for a short last partition.
    pub fn scope_id(&self) -> String {
        scope_id(&self.type_name, self.start, self.capacity)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.icons.iter().map(|icon| icon.id.as_str())
    }
}

pub fn scope_id(type_name: &str, start: usize, capacity: usize) -> String {
    format!("{}_{}_{}", type_name, start, start + capacity - 1)
}

/// Split a collection into chunks of `capacity` icons, preserving order.
/// Only the last chunk may be shorter; an empty collection yields none.
pub fn partition<'a>(
    collection: &'a Collection,
    type_name: &str,
    capacity: usize,
) -> Vec<Partition<'a>> {
    debug_assert!(capacity > 0);

    collection
        .icons
        .chunks(capacity)
        .enumerate()
        .map(|(index, icons)| Partition {
            collection: &collection.name,
            type_name: type_name.to_string(),
            start: index * capacity,
            icons,
            capacity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(name: &str, count: usize) -> Collection {
        Collection::new(
            name,
            (0..count).map(|i| Icon::new(format!("Icon{i}"))).collect(),
        )
    }

    #[test]
    fn test_partition_sizes_and_order() {
        for (count, capacity) in [(0, 3), (1, 3), (3, 3), (7, 3), (300, 255), (510, 255)] {
            let collection = numbered("Set", count);
            let parts = partition(&collection, "Set", capacity);

            assert_eq!(parts.len(), count.div_ceil(capacity));
            for (i, part) in parts.iter().enumerate() {
                assert_eq!(part.start, i * capacity);
                if i + 1 < parts.len() {
                    assert_eq!(part.len(), capacity);
                } else {
                    assert!(part.len() >= 1 && part.len() <= capacity);
                }
            }

            let rejoined: Vec<_> = parts.iter().flat_map(|p| p.icons.iter()).collect();
            let original: Vec<_> = collection.icons.iter().collect();
            assert_eq!(rejoined, original);
        }
    }

    #[test]
    fn test_feather_scenario() {
        let collection = Collection::with_ids("Feather", ["Home", "Settings", "User"]);
        let parts = partition(&collection, "Feather", 2);

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].ids().collect::<Vec<_>>(), ["Home", "Settings"]);
        assert_eq!(parts[0].scope_id(), "Feather_0_1");
        assert_eq!(parts[1].ids().collect::<Vec<_>>(), ["User"]);
        assert_eq!(parts[1].start, 2);
        assert_eq!(parts[1].scope_id(), "Feather_2_3");
    }

    #[test]
    fn test_scope_id_uses_nominal_bounds() {
        assert_eq!(scope_id("Ionicons5", 0, 255), "Ionicons5_0_254");
        assert_eq!(scope_id("Ionicons5", 255, 255), "Ionicons5_255_509");
    }
}
