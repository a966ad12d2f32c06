//! Output formatting for CLI results.
//!
//! Text renderers return the full block as a `String` so callers decide
//! where it goes; JSON goes straight to stdout.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use co2calc_lib::{RouteDistance, TransportMode, TripEstimate};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Render an emission estimate as text.
pub fn render_estimate_text(trip: &TripEstimate) -> String {
    let emission = &trip.emission;
    let mut out = String::new();

    if let Some(route) = &trip.route {
        let _ = writeln!(
            out,
            "Route: {} -> {}",
            route.origin.place, route.destination.place
        );
    }
    let _ = writeln!(
        out,
        "Distance: {:.2} km ({})",
        emission.distance_km,
        trip.source.as_str()
    );
    let _ = writeln!(
        out,
        "Transport: {} {} ({} kg CO2/km)",
        emission.mode.icon(),
        emission.mode.display_name(),
        emission.factor
    );
    let _ = writeln!(out, "Emission: {:.2} kg CO2", emission.emission_kg);

    out.push_str("\nComparison:\n");
    for row in &emission.comparison {
        let marker = if row.selected { "*" } else { " " };
        let _ = writeln!(
            out,
            " {} {} {:<10} {:>10.2} kg",
            marker,
            row.mode.icon(),
            row.mode.display_name(),
            row.emission_kg
        );
    }

    let credits = &emission.carbon_credits;
    let _ = writeln!(
        out,
        "\nCarbon credits: {:.2} (R$ {:.2} at R$ {:.2} per credit)",
        credits.credits_needed, credits.total_cost, credits.price_per_credit
    );
    match emission.trees_needed {
        Some(trees) => {
            let _ = writeln!(out, "Trees to offset in one year: {}", trees);
        }
        None => out.push_str("No emissions to offset.\n"),
    }

    out
}

/// Render a geocoded road distance as text.
pub fn render_distance_text(route: &RouteDistance) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} -> {} {}",
        route.origin.place,
        route.origin.coordinate,
        route.destination.place,
        route.destination.coordinate
    );
    let _ = writeln!(
        out,
        "Straight line: {:.2} km",
        route.estimate.straight_line_km
    );
    let _ = writeln!(
        out,
        "Estimated road distance: {:.2} km (x{})",
        route.estimate.road_km, route.estimate.correction_factor
    );
    out
}

/// Render the emission factor table as text.
pub fn render_factors_text() -> String {
    let mut out = String::from("Emission factors (kg CO2 per km):\n");
    for mode in TransportMode::ALL {
        let _ = writeln!(
            out,
            " {} {:<6} {:<10} {:.2}",
            mode.icon(),
            mode.key(),
            mode.display_name(),
            mode.factor_kg_per_km()
        );
    }
    out
}

#[derive(Debug, Serialize)]
struct FactorRow {
    key: &'static str,
    name: &'static str,
    factor: f64,
}

/// Factor table as serializable rows.
pub fn factor_rows() -> impl Serialize {
    TransportMode::ALL
        .iter()
        .map(|mode| FactorRow {
            key: mode.key(),
            name: mode.display_name(),
            factor: mode.factor_kg_per_km(),
        })
        .collect::<Vec<_>>()
}

/// Write any serializable value to stdout as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
