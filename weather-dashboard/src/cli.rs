use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::{net::SocketAddr, path::PathBuf};
use weather_core::{Config, OpenWeatherProvider, WeatherProvider};

use crate::server::{self, AppContext};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard with favorite cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the dashboard over HTTP.
    Serve {
        /// Address to listen on, e.g. "127.0.0.1:5000".
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// SQLite file holding favorite cities.
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Store the OpenWeather API key and default city in the config file.
    Configure,

    /// Print current weather and the 5-day forecast for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?.with_env_overrides()?;

        match self.command {
            Command::Serve { listen, database } => {
                let mut config = config;
                if let Some(addr) = listen {
                    config.listen_addr = addr;
                }
                if let Some(path) = database {
                    config.database_path = path;
                }

                let ctx = AppContext::from_config(&config)?;
                server::serve(ctx, config.listen_addr).await;
            }
            Command::Configure => configure(config)?,
            Command::Show { city } => show(&config, &city).await?,
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_city = default_city.trim().to_string();

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(config: &Config, city: &str) -> anyhow::Result<()> {
    let api_key = config.api_key().with_context(|| {
        format!(
            "No OpenWeather API key configured.\n\
             Hint: run `weather-dashboard configure` or set {}.",
            weather_core::config::API_KEY_ENV
        )
    })?;
    let provider = OpenWeatherProvider::with_base_url(api_key.to_string(), config.openweather_base_url.clone());

    let current = provider.fetch_current(city).await?;
    println!(
        "{}, {}: {}°C, {} (humidity {}%, wind {} m/s)",
        current.city, current.country, current.temperature, current.description, current.humidity, current.wind_speed
    );

    match provider.fetch_forecast(city).await {
        Ok(days) => {
            for day in days {
                println!(
                    "  {} {}  {:>3}°C / {:>3}°C  {}",
                    day.day, day.date, day.temp_min, day.temp_max, day.description
                );
            }
        }
        Err(e) => println!("  forecast unavailable: {e}"),
    }

    Ok(())
}
