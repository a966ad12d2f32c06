use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Canonical transport modes with their emission factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Bike,
    Car,
    Bus,
    Truck,
}

impl TransportMode {
    /// Every mode in display order. Comparison tables follow this order.
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Bike,
        TransportMode::Car,
        TransportMode::Bus,
        TransportMode::Truck,
    ];

    /// Stable lowercase identifier used in requests and responses.
    pub fn key(self) -> &'static str {
        match self {
            TransportMode::Bike => "bike",
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Truck => "truck",
        }
    }

    /// Human-readable label shown to end users.
    pub fn display_name(self) -> &'static str {
        match self {
            TransportMode::Bike => "Bicicleta",
            TransportMode::Car => "Carro",
            TransportMode::Bus => "Ônibus",
            TransportMode::Truck => "Caminhão",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TransportMode::Bike => "🚴",
            TransportMode::Car => "🚗",
            TransportMode::Bus => "🚌",
            TransportMode::Truck => "🚚",
        }
    }

    /// Kilograms of CO₂ emitted per kilometre travelled.
    pub fn factor_kg_per_km(self) -> f64 {
        match self {
            TransportMode::Bike => 0.0,
            TransportMode::Car => 0.21,
            TransportMode::Bus => 0.10,
            TransportMode::Truck => 0.27,
        }
    }

    pub fn keys() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(|mode| mode.key())
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.key() == normalized)
            .ok_or_else(|| Error::InvalidMode {
                mode: s.trim().to_string(),
            })
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
