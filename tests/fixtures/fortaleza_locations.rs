//! Fortaleza-area locations for realistic test fixtures.
//!
//! Coordinates are approximate neighbourhood centres around the
//! distribution centre on the western edge of the city.

use delivery_planner::record::StopRecord;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// A stop record for this location.
    pub fn stop(&self, id: &str, revenue: f64, vehicle_key: &str) -> StopRecord {
        StopRecord::new(id, self.name, self.lat, self.lng, revenue, vehicle_key)
    }
}

pub const DEPOT: (f64, f64) = (-3.7572635398641, -38.5854081195323);

// ============================================================================
// Central / Coastal Neighbourhoods
// ============================================================================

pub const CENTRAL: &[Location] = &[
    Location::new("Mercadinho Centro", -3.7275, -38.5270),
    Location::new("Padaria Aldeota", -3.7390, -38.4990),
    Location::new("Mercearia Meireles", -3.7250, -38.4960),
    Location::new("Conveniencia Praia de Iracema", -3.7205, -38.5130),
    Location::new("Emporio Varjota", -3.7310, -38.4870),
    Location::new("Mercado Papicu", -3.7380, -38.4790),
    Location::new("Padaria Benfica", -3.7420, -38.5380),
    Location::new("Minibox Fatima", -3.7500, -38.5240),
];

// ============================================================================
// Western / Southern Neighbourhoods
// ============================================================================

pub const WEST: &[Location] = &[
    Location::new("Mercadinho Antonio Bezerra", -3.7400, -38.5880),
    Location::new("Padaria Barra do Ceara", -3.6960, -38.5820),
    Location::new("Mercearia Pirambu", -3.7100, -38.5540),
    Location::new("Minibox Jacarecanga", -3.7210, -38.5420),
    Location::new("Mercado Conjunto Ceara", -3.7800, -38.6050),
    Location::new("Emporio Parangaba", -3.7750, -38.5620),
    Location::new("Padaria Mondubim", -3.8150, -38.5800),
    Location::new("Mercadinho Bom Jardim", -3.7950, -38.6110),
];

pub const SOUTH: &[Location] = &[
    Location::new("Mercearia Messejana", -3.8310, -38.4920),
    Location::new("Padaria Cidade dos Funcionarios", -3.7950, -38.4960),
    Location::new("Mercado Cambeba", -3.8080, -38.4850),
    Location::new("Minibox Passare", -3.8010, -38.5350),
    Location::new("Emporio Jose Walter", -3.8320, -38.5500),
    Location::new("Mercadinho Lagoa Redonda", -3.8300, -38.4650),
    Location::new("Padaria Maraponga", -3.7900, -38.5620),
    Location::new("Mercearia Dias Macedo", -3.7890, -38.5170),
];

/// Stops for one vehicle built from a location list, revenue 250 each.
pub fn stops_for(locations: &[Location], prefix: &str, vehicle_key: &str) -> Vec<StopRecord> {
    locations
        .iter()
        .enumerate()
        .map(|(i, location)| location.stop(&format!("{}{}", prefix, i + 1), 250.0, vehicle_key))
        .collect()
}
