//! Core library for the `cityweather` app.
//!
//! This crate defines:
//! - Configuration handling
//! - The weatherapi.com client behind the [`WeatherProvider`] trait
//! - The shared [`CityCatalog`] and the flat city list file
//! - Concurrent full refreshes and the background refresher for the selected city
//!
//! A display layer holds a [`Session`] and a [`Selection`] and never talks to
//! the network directly.

pub mod catalog;
pub mod city_list;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod refresher;
pub mod scheduler;
pub mod session;

pub use catalog::CityCatalog;
pub use city_list::CityListFile;
pub use config::Config;
pub use error::{CityListError, FetchError};
pub use model::{CurrentConditions, ForecastDay, WeatherRecord};
pub use provider::{WeatherProvider, provider_from_config};
pub use refresher::{RefresherHandle, RefresherState, Selection};
pub use session::{AddCity, Session};
