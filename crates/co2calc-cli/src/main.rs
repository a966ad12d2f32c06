use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use co2calc_cli::output::{
    factor_rows, render_distance_text, render_estimate_text, render_factors_text, render_json,
    OutputFormat,
};
use co2calc_lib::{
    EstimatorConfig, GeocoderConfig, PlaceKey, TripEstimator, TripRequest,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate CO2 emissions for road trips")]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate emissions from a known distance or from two places.
    Estimate {
        /// Trip distance in km; skips geocoding when given.
        #[arg(long)]
        distance: Option<f64>,
        /// Transport mode: bike, car, bus, or truck.
        #[arg(long)]
        transport: String,
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Geocode two places and estimate the road distance between them.
    Distance {
        #[command(flatten)]
        route: RouteArgs,
    },
    /// List the emission factor per transport mode.
    Factors,
}

#[derive(Args, Debug, Default)]
struct RouteArgs {
    /// Origin city.
    #[arg(long = "from-city")]
    from_city: Option<String>,
    /// Origin state.
    #[arg(long = "from-state")]
    from_state: Option<String>,
    /// Destination city.
    #[arg(long = "to-city")]
    to_city: Option<String>,
    /// Destination state.
    #[arg(long = "to-state")]
    to_state: Option<String>,
}

impl RouteArgs {
    fn origin(&self) -> Option<PlaceKey> {
        place(self.from_city.as_deref(), self.from_state.as_deref())
    }

    fn destination(&self) -> Option<PlaceKey> {
        place(self.to_city.as_deref(), self.to_state.as_deref())
    }
}

fn place(city: Option<&str>, state: Option<&str>) -> Option<PlaceKey> {
    Some(PlaceKey::new(city?, state?))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Estimate {
            distance,
            transport,
            route,
        } => handle_estimate(distance, transport, &route, cli.format).await,
        Command::Distance { route } => handle_distance(&route, cli.format).await,
        Command::Factors => handle_factors(cli.format),
    }
}

async fn handle_estimate(
    distance: Option<f64>,
    transport: String,
    route: &RouteArgs,
    format: OutputFormat,
) -> Result<()> {
    let estimator = build_estimator()?;
    let request = TripRequest {
        distance_km: distance,
        transport,
        origin: route.origin(),
        destination: route.destination(),
    };

    let trip = match estimator.estimate(&request).await {
        Ok(trip) => trip,
        Err(e) if e.is_geocoding_failure() => {
            return Err(e).context(
                "could not determine the distance automatically; pass --distance instead",
            );
        }
        Err(e) => return Err(e).context("failed to estimate emissions"),
    };

    match format {
        OutputFormat::Text => print!("{}", render_estimate_text(&trip)),
        OutputFormat::Json => render_json(&trip)?,
    }
    Ok(())
}

async fn handle_distance(route: &RouteArgs, format: OutputFormat) -> Result<()> {
    let (Some(origin), Some(destination)) = (route.origin(), route.destination()) else {
        anyhow::bail!("--from-city, --from-state, --to-city and --to-state are required");
    };

    let estimator = build_estimator()?;
    let distance = estimator
        .road_distance(&origin, &destination)
        .await
        .with_context(|| format!("failed to estimate distance from {origin} to {destination}"))?;

    match format {
        OutputFormat::Text => print!("{}", render_distance_text(&distance)),
        OutputFormat::Json => render_json(&distance)?,
    }
    Ok(())
}

fn handle_factors(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_factors_text()),
        OutputFormat::Json => render_json(&factor_rows())?,
    }
    Ok(())
}

fn build_estimator() -> Result<TripEstimator> {
    TripEstimator::from_config(&EstimatorConfig::from_env(), &GeocoderConfig::from_env())
        .context("failed to initialize the geocoding client")
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
