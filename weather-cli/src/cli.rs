use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{AddCity, CityListFile, Config, Session, provider_from_config};
use inquire::{Confirm, Password, PasswordDisplayMode};

use crate::{display, watch};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Weather for your list of cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherapi.com API key and display preferences.
    Configure,

    /// Create the city list file.
    Init {
        /// Cities to start with, in display order.
        #[arg(required = true)]
        cities: Vec<String>,

        /// Overwrite an existing city list.
        #[arg(long)]
        force: bool,
    },

    /// Print the saved city list.
    List,

    /// Look up a city and, if it exists, append it to the list.
    Add {
        /// City name as the weather API understands it.
        city: String,
    },

    /// Fetch every city once and print the result.
    Show {
        /// Only print this city.
        city: Option<String>,

        /// Use metric units.
        #[arg(long)]
        metric: bool,

        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Keep showing the selected city, refreshing it in the background.
    Watch {
        /// City to start with; defaults to the first in the list.
        #[arg(long)]
        city: Option<String>,

        /// Use metric units.
        #[arg(long)]
        metric: bool,

        /// Seconds between refreshes of the selected city.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config)?,
            Command::Init { cities, force } => {
                let file = CityListFile::new(config.city_file_path()?);
                if file.path().exists() && !force {
                    bail!(
                        "City list {} already exists.\n\
                         Hint: use `cityweather add <city>` or pass --force to replace it.",
                        file.path().display()
                    );
                }
                file.save(&cities)?;
                println!("Saved {} cities to {}", cities.len(), file.path().display());
            }
            Command::List => {
                let file = CityListFile::new(config.city_file_path()?);
                for name in file.load()? {
                    println!("{name}");
                }
            }
            Command::Add { city } => {
                let session = open_session(&config)?;
                match session.add_city(&city).await? {
                    AddCity::Added(record) => {
                        print!("{}", display::render(&record, config.metric, false));
                        println!("Added {}.", record.city_name);
                    }
                    AddCity::Rejected(_) => {
                        bail!("Invalid city name provided or the weather API may be down.")
                    }
                }
            }
            Command::Show { city, metric, json } => {
                let session = open_session(&config)?;
                session.refresh_now().await;

                let names = match city {
                    Some(city) => vec![city],
                    None => session.catalog().names(),
                };
                let records: Vec<_> = names
                    .iter()
                    .filter_map(|name| session.catalog().get(name))
                    .collect();

                if names.len() != records.len() {
                    bail!("City is not in the list. Hint: run `cityweather add <city>` first.");
                }

                if json {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    for record in &records {
                        print!("{}", display::render(record, metric || config.metric, false));
                    }
                }
            }
            Command::Watch { city, metric, interval } => {
                let session = open_session(&config)?;
                let interval = interval.map(Duration::from_secs).unwrap_or_else(|| config.refresh_interval());
                watch::run(session, city, metric || config.metric, interval).await?;
            }
        }

        Ok(())
    }
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    let provider = provider_from_config(config)?;
    let file = CityListFile::new(config.city_file_path()?);

    Session::open(provider, file, config.request_timeout()).context(
        "Could not load the city list.\n\
         Hint: run `cityweather init <city>...` to create it.",
    )
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("weatherapi.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty.");
    }
    config.set_api_key(api_key.to_string());

    config.metric = Confirm::new("Show metric units by default?")
        .with_default(config.metric)
        .prompt()
        .context("Failed to read unit preference")?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}
