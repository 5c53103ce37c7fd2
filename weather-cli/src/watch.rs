//! Long-running terminal view: shows the selected city, refreshes it in the
//! background and takes simple commands on stdin.

use std::time::Duration;

use anyhow::{Context, Result};
use cityweather_core::{AddCity, CityCatalog, CityListError, RefresherState, Selection, Session};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use crate::display::{LastGood, render};

const HELP: &str = "commands: select <city> | add <city> | refresh | metric | list | help | quit";

enum Input {
    Select(String),
    Add(String),
    Refresh,
    ToggleMetric,
    List,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    Some(match (cmd.to_lowercase().as_str(), arg) {
        ("select" | "s", city) if !city.is_empty() => Input::Select(city.to_string()),
        ("add" | "a", city) if !city.is_empty() => Input::Add(city.to_string()),
        ("refresh" | "r", _) => Input::Refresh,
        ("metric" | "m", _) => Input::ToggleMetric,
        ("list" | "l", _) => Input::List,
        ("help" | "h" | "?", _) => Input::Help,
        ("quit" | "q" | "exit", _) => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    })
}

struct View {
    session: Session,
    selection: Selection,
    metric: bool,
    last_good: LastGood,
}

impl View {
    fn draw(&mut self) {
        let Some(city) = self.selection.get() else {
            println!("No city selected. Hint: `add <city>` or `select <city>`.");
            return;
        };

        match self.session.catalog().get(&city) {
            Some(record) => {
                let (shown, stale) = self.last_good.update(record);
                print!("{}", render(&shown, self.metric, stale));
            }
            None => println!("{city}: waiting for data..."),
        }
    }

    fn list(&self) {
        let selected = self.selection.get();
        for name in self.session.catalog().names() {
            let marker = if selected.as_deref() == Some(name.as_str()) { '*' } else { ' ' };
            println!("{marker} {name}");
        }
    }
}

/// The requested city if it is on the list, otherwise the first listed city.
fn initial_selection(catalog: &CityCatalog, requested: Option<String>) -> Option<String> {
    match requested {
        Some(city) if catalog.contains_name(&city) => Some(city),
        Some(city) => {
            println!("'{city}' is not in the city list. Use `add {city}` to add it.");
            catalog.names().into_iter().next()
        }
        None => catalog.names().into_iter().next(),
    }
}

/// Message for a finished add, and the city to select if it was added.
fn add_outcome(outcome: Result<AddCity, CityListError>) -> (Option<String>, String) {
    match outcome {
        Ok(AddCity::Added(record)) => {
            let message = format!("Added {}.", record.city_name);
            (Some(record.city_name), message)
        }
        Ok(AddCity::Rejected(_)) => {
            (None, "Invalid city name provided or the weather API may be down.".to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to save city list after add");
            (None, format!("Could not save the city list: {err}"))
        }
    }
}

pub async fn run(session: Session, initial: Option<String>, metric: bool, interval: Duration) -> Result<()> {
    let selection = Selection::new(initial_selection(session.catalog(), initial));

    println!("Fetching weather for {} cities...", session.catalog().len());
    session.refresh_now().await;

    let refresher = session.spawn_refresher(selection.clone(), interval);
    let mut updates = refresher.subscribe();
    let (refreshed_tx, mut refreshed_rx) = mpsc::channel::<usize>(4);
    let (added_tx, mut added_rx) = mpsc::channel::<Result<AddCity, CityListError>>(4);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut view = View { session: session.clone(), selection, metric, last_good: LastGood::default() };
    view.draw();
    println!("{HELP}");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *updates.borrow_and_update();
                if state == RefresherState::Idle {
                    view.draw();
                }
            }

            Some(valid) = refreshed_rx.recv() => {
                println!("Refreshed {} cities ({valid} ok).", view.session.catalog().len());
                view.draw();
            }

            Some(outcome) = added_rx.recv() => {
                let (added, message) = add_outcome(outcome);
                println!("{message}");
                if let Some(city) = added {
                    view.selection.set(city);
                    view.draw();
                }
            }

            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let Some(input) = parse_input(&line) else {
                    continue;
                };

                match input {
                    Input::Select(city) => {
                        if view.session.catalog().contains_name(&city) {
                            view.selection.set(city);
                            view.draw();
                        } else {
                            println!("Unknown city '{city}'. Use `add {city}` first.");
                        }
                    }
                    Input::Add(city) => {
                        println!("Looking up {city}...");
                        let session = view.session.clone();
                        let tx = added_tx.clone();
                        tokio::spawn(async move {
                            let outcome = session.add_city(&city).await;
                            let _ = tx.send(outcome).await;
                        });
                    }
                    Input::Refresh => {
                        // Lookups run off the input loop.
                        let session = view.session.clone();
                        let tx = refreshed_tx.clone();
                        tokio::spawn(async move {
                            let valid = session.refresh_now().await;
                            let _ = tx.send(valid).await;
                        });
                    }
                    Input::ToggleMetric => {
                        view.metric = !view.metric;
                        view.draw();
                    }
                    Input::List => view.list(),
                    Input::Help => println!("{HELP}"),
                    Input::Quit => break,
                    Input::Unknown(line) => println!("Unknown command '{line}'. {HELP}"),
                }
            }
        }
    }

    refresher.stop().await;
    session.save().context("Failed to save city list on exit")?;
    tracing::info!("city list saved");

    Ok(())
}
