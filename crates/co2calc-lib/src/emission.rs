use serde::Serialize;
use tracing::debug;

use crate::config::EstimatorConfig;
use crate::error::{Error, Result};
use crate::numeric::round2;
use crate::transport::TransportMode;

/// One row of the per-mode comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeEmission {
    pub mode: TransportMode,
    pub emission_kg: f64,
    pub factor: f64,
    pub selected: bool,
}

/// Carbon-offset cost for an emission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCredits {
    pub credits_needed: f64,
    pub price_per_credit: f64,
    pub total_cost: f64,
}

/// Complete emission figures for one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionResult {
    pub distance_km: f64,
    pub mode: TransportMode,
    pub factor: f64,
    pub emission_kg: f64,
    pub comparison: Vec<ModeEmission>,
    pub carbon_credits: CarbonCredits,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trees_needed: Option<u32>,
}

impl EmissionResult {
    /// The comparison row for the selected mode.
    pub fn selected(&self) -> Option<&ModeEmission> {
        self.comparison.iter().find(|row| row.selected)
    }
}

/// Applies per-mode factors and derives credits and tree equivalents.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionCalculator {
    price_per_credit: f64,
    kg_per_credit: f64,
    tree_absorption_kg_per_year: f64,
}

impl Default for EmissionCalculator {
    fn default() -> Self {
        Self::new(&EstimatorConfig::default())
    }
}

impl EmissionCalculator {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            price_per_credit: config.price_per_credit,
            kg_per_credit: config.kg_per_credit,
            tree_absorption_kg_per_year: config.tree_absorption_kg_per_year,
        }
    }

    pub fn price_per_credit(&self) -> f64 {
        self.price_per_credit
    }

    /// The canonical factor table in declaration order.
    pub fn factors(&self) -> Vec<(TransportMode, f64)> {
        TransportMode::ALL
            .iter()
            .map(|mode| (*mode, mode.factor_kg_per_km()))
            .collect()
    }

    /// Parse `mode` and compute. Unknown modes fail with [`Error::InvalidMode`].
    pub fn compute_for(&self, distance_km: f64, mode: &str) -> Result<EmissionResult> {
        let mode: TransportMode = mode.parse()?;
        self.compute(distance_km, mode)
    }

    pub fn compute(&self, distance_km: f64, mode: TransportMode) -> Result<EmissionResult> {
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(Error::InvalidDistance { value: distance_km });
        }

        let comparison: Vec<ModeEmission> = TransportMode::ALL
            .iter()
            .map(|candidate| ModeEmission {
                mode: *candidate,
                emission_kg: round2(distance_km * candidate.factor_kg_per_km()),
                factor: candidate.factor_kg_per_km(),
                selected: *candidate == mode,
            })
            .collect();

        let emission_kg = round2(distance_km * mode.factor_kg_per_km());
        let carbon_credits = self.carbon_credits(emission_kg);
        let trees_needed = self.trees_needed(emission_kg);

        debug!(
            distance_km,
            mode = %mode,
            emission_kg,
            credits = carbon_credits.credits_needed,
            "computed emission"
        );

        Ok(EmissionResult {
            distance_km,
            mode,
            factor: mode.factor_kg_per_km(),
            emission_kg,
            comparison,
            carbon_credits,
            trees_needed,
        })
    }

    pub fn carbon_credits(&self, emission_kg: f64) -> CarbonCredits {
        let credits_needed = round2(emission_kg / self.kg_per_credit);
        CarbonCredits {
            credits_needed,
            price_per_credit: self.price_per_credit,
            total_cost: round2(credits_needed * self.price_per_credit),
        }
    }

    /// Trees needed to absorb the emission in one year; `None` for zero emission.
    pub fn trees_needed(&self, emission_kg: f64) -> Option<u32> {
        if emission_kg <= 0.0 || self.tree_absorption_kg_per_year <= 0.0 {
            return None;
        }
        Some((emission_kg / self.tree_absorption_kg_per_year).ceil() as u32)
    }
}
