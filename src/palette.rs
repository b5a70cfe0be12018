//! Vehicle -> display color mapping for map and legend renderers.

use serde::Serialize;

/// Colors handed out to vehicles, cycling when there are more vehicles.
pub const VEHICLE_COLORS: [&str; 10] = [
    "red",
    "blue",
    "green",
    "purple",
    "orange",
    "darkred",
    "darkblue",
    "cadetblue",
    "pink",
    "black",
];

/// An ordered vehicle -> color mapping, built once from input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehiclePalette<K> {
    entries: Vec<(K, &'static str)>,
}

impl<K: PartialEq + Clone> VehiclePalette<K> {
    /// Assign colors in first-seen order; repeated keys keep their first color.
    pub fn from_keys<'a, I>(keys: I) -> Self
    where
        K: 'a,
        I: IntoIterator<Item = &'a K>,
    {
        let mut entries: Vec<(K, &'static str)> = Vec::new();
        for key in keys {
            if entries.iter().any(|(known, _)| known == key) {
                continue;
            }
            let color = VEHICLE_COLORS[entries.len() % VEHICLE_COLORS.len()];
            entries.push((key.clone(), color));
        }
        Self { entries }
    }

    pub fn color_for(&self, key: &K) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(known, _)| known == key)
            .map(|(_, color)| *color)
    }

    pub fn entries(&self) -> &[(K, &'static str)] {
        &self.entries
    }
}
