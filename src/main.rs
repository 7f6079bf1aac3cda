//! yr: command-line front end for Yr weather forecasts.
//!
//! Resolves a named place or a coordinate triple, serves the forecast from the
//! local cache while it is current, and prints the first record, every record,
//! the raw document, or min/max figures over a time window.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use yr_core::Config;
use yr_forecast::{Coordinates, ForecastClient, ForecastError, ForecastRequest, Language};

/// Yr weather forecast client
#[derive(Parser)]
#[command(name = "yr", about = "Fetch and summarize Yr weather forecasts")]
struct Cli {
    /// Place path, e.g. "Norway/Oslo/Oslo/Oslo". Wins over coordinates.
    #[arg(long, short)]
    location: Option<String>,

    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Height above mean sea level, in metres.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    msl: f64,

    /// Longitude, latitude and altitude as "x,y,z".
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true, conflicts_with_all = ["lat", "lon"])]
    xyz: Option<Vec<f64>>,

    /// "forecast" or "forecast_hour_by_hour"; defaults to the configured variant.
    #[arg(long)]
    variant: Option<String>,

    /// Language table code (en, nb, nn); overrides the config file.
    #[arg(long)]
    language: Option<String>,

    /// JSON language table to use instead of the built-in ones.
    #[arg(long)]
    language_file: Option<PathBuf>,

    /// Alternate config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every record instead of the current one.
    #[arg(long)]
    all: bool,

    /// Print the whole document as XML.
    #[arg(long, conflicts_with = "all")]
    xml: bool,

    /// Window start, e.g. 2018-03-18T19:00:00.
    #[arg(long, requires = "to", value_parser = parse_time)]
    from: Option<NaiveDateTime>,

    /// Window end.
    #[arg(long, requires = "from", value_parser = parse_time)]
    to: Option<NaiveDateTime>,

    /// Drop the cached document before fetching.
    #[arg(long)]
    purge: bool,
}

fn parse_time(raw: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
}

impl Cli {
    fn coordinates(&self) -> Result<Option<Coordinates>> {
        if let Some(xyz) = &self.xyz {
            let [x, y, z] = xyz.as_slice() else {
                bail!("--xyz takes exactly three values");
            };
            return Ok(Some(Coordinates::from_xyz(*x, *y, *z)));
        }
        Ok(self
            .lat
            .zip(self.lon)
            .map(|(lat, lon)| Coordinates::new(lat, lon, self.msl)))
    }

    fn request(&self, config: &Config) -> Result<ForecastRequest> {
        Ok(ForecastRequest {
            location_name: self.location.clone(),
            coordinates: self.coordinates()?,
            variant: self
                .variant
                .clone()
                .unwrap_or_else(|| config.forecast.variant.clone()),
        })
    }
}

fn build_client(cli: &Cli, config: &Config) -> Result<ForecastClient, ForecastError> {
    match &cli.language_file {
        Some(path) => {
            let language = Language::from_path(&config.forecast.language, path)?;
            ForecastClient::with_language(config, language)
        }
        None => ForecastClient::new(config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    yr_core::init()?;

    let (mut config, _) = Config::load_validated(cli.config.as_deref())?;
    if let Some(language) = &cli.language {
        config.forecast.language = language.clone();
    }

    let client = match build_client(&cli, &config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "could not set up forecast client");
            bail!(e.user_message());
        }
    };
    let request = cli.request(&config)?;

    if cli.purge {
        client.purge(&request)?;
    }

    let forecast = match client.forecast(&request).await {
        Ok(forecast) => forecast,
        Err(e) => {
            tracing::error!(error = %e, "forecast failed");
            bail!(e.user_message());
        }
    };

    if let (Some(start), Some(end)) = (cli.from, cli.to) {
        let summary = forecast
            .window(start, end)
            .summary()
            .with_context(|| format!("no summary for {start} .. {end}"))?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if cli.xml {
        println!("{}", forecast.to_xml()?);
    } else if cli.all {
        println!("{}", forecast.all_json()?);
    } else {
        println!("{}", forecast.current_json()?);
    }

    println!("{} ({})", forecast.credit().text, forecast.credit().url);
    Ok(())
}
