//! Command-line front end over `AppServices`.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use matchlog_core::AppError;
use matchlog_journal::{Coordinate, JournalError, MatchForm, MatchRecord};
use matchlog_weather::{LookupState, WeatherError};

use crate::error_mapping::{journal_error, weather_error};
use crate::services::AppServices;

#[derive(Debug, Parser)]
#[command(name = "matchlog")]
#[command(about = "Football match journal with match-day weather")]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every recorded match, in insertion order
    List,
    /// Career totals and averages
    Stats,
    /// Record a new match
    Add(MatchArgs),
    /// Change the match at a list position
    Edit {
        position: usize,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Delete the matches at the given list positions
    Remove {
        #[arg(required = true)]
        positions: Vec<usize>,
    },
    /// Look up the weather on the day of a match
    Weather { position: usize },
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    #[arg(long)]
    pub opponent: String,
    #[arg(long)]
    pub score: String,
    #[arg(long, allow_hyphen_values = true)]
    pub goals: String,
    #[arg(long, allow_hyphen_values = true)]
    pub assists: String,
    #[arg(long)]
    pub highlights: String,
    /// Match day, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// JPEG to attach
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(long)]
    pub opponent: Option<String>,
    #[arg(long)]
    pub score: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub goals: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub assists: Option<String>,
    #[arg(long)]
    pub highlights: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

impl MatchArgs {
    fn into_form(self) -> Result<MatchForm, AppError> {
        Ok(MatchForm {
            opponent: self.opponent,
            score: self.score,
            goals: self.goals,
            assists: self.assists,
            highlights: self.highlights,
            date: self.date.map(match_time),
            coordinate: coordinate(self.lat, self.lon),
            media: read_photo(self.photo)?,
        })
    }
}

impl EditArgs {
    fn apply(self, mut form: MatchForm) -> Result<MatchForm, AppError> {
        if let Some(opponent) = self.opponent {
            form.opponent = opponent;
        }
        if let Some(score) = self.score {
            form.score = score;
        }
        if let Some(goals) = self.goals {
            form.goals = goals;
        }
        if let Some(assists) = self.assists {
            form.assists = assists;
        }
        if let Some(highlights) = self.highlights {
            form.highlights = highlights;
        }
        if let Some(date) = self.date {
            form.date = Some(match_time(date));
        }
        if let Some(c) = coordinate(self.lat, self.lon) {
            form.coordinate = Some(c);
        }
        form.media = read_photo(self.photo)?;
        Ok(form)
    }
}

/// Matches entered by day are stored at midnight UTC.
fn match_time(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn coordinate(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinate> {
    match (lat, lon) {
        (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
        _ => None,
    }
}

fn read_photo(path: Option<PathBuf>) -> Result<Option<Vec<u8>>, AppError> {
    path.map(std::fs::read).transpose().map_err(AppError::from)
}

/// Execute one command.
pub fn run(command: Command, services: &AppServices) -> Result<(), AppError> {
    let load_issue = services
        .block_on(services.journal().load_issue())
        .map_err(journal_error)?;
    if let Some(issue) = load_issue {
        eprintln!("warning: saved matches could not be read ({issue}); starting empty");
    }

    match command {
        Command::List => list(services),
        Command::Stats => stats(services),
        Command::Add(args) => add(services, args),
        Command::Edit { position, changes } => edit(services, position, changes),
        Command::Remove { positions } => remove(services, positions),
        Command::Weather { position } => weather(services, position),
    }
}

fn list(services: &AppServices) -> Result<(), AppError> {
    let records = services
        .block_on(services.journal().list())
        .map_err(journal_error)?;

    if records.is_empty() {
        println!("No matches recorded yet.");
        return Ok(());
    }

    for (position, record) in records.iter().enumerate() {
        println!("{}", list_line(position, record));
    }
    Ok(())
}

fn list_line(position: usize, record: &MatchRecord) -> String {
    format!(
        "{:>3}  {}  {:<24} G {} A {}{}",
        position,
        record.match_day().format("%Y-%m-%d"),
        record.title(),
        record.goals,
        record.assists,
        if record.has_media() { "  [photo]" } else { "" }
    )
}

fn stats(services: &AppServices) -> Result<(), AppError> {
    let stats = services
        .block_on(services.journal().stats())
        .map_err(journal_error)?;

    println!("Matches:  {}", stats.total_matches);
    println!("Goals:    {} ({:.2} per match)", stats.total_goals, stats.goals_per_match());
    println!("Assists:  {} ({:.2} per match)", stats.total_assists, stats.assists_per_match());
    println!("G+A:      {}", stats.goal_contributions());
    Ok(())
}

fn add(services: &AppServices, args: MatchArgs) -> Result<(), AppError> {
    let form = args.into_form()?;
    let record = services
        .block_on(services.journal().create(form))
        .map_err(journal_error)?;

    println!("Recorded {} ({})", record.title(), record.id());
    Ok(())
}

fn record_at(services: &AppServices, position: usize) -> Result<MatchRecord, AppError> {
    let records = services
        .block_on(services.journal().list())
        .map_err(journal_error)?;
    let len = records.len();

    records
        .into_iter()
        .nth(position)
        .ok_or_else(|| journal_error(JournalError::InvalidPosition { position, len }))
}

fn edit(services: &AppServices, position: usize, changes: EditArgs) -> Result<(), AppError> {
    let existing = record_at(services, position)?;
    let form = changes.apply(MatchForm::from_record(&existing))?;

    match services
        .block_on(services.journal().edit(existing.id(), form))
        .map_err(journal_error)?
    {
        Some(updated) => println!("Updated {}", updated.title()),
        None => println!("Match {} was removed meanwhile", existing.id()),
    }
    Ok(())
}

fn remove(services: &AppServices, positions: Vec<usize>) -> Result<(), AppError> {
    let positions: BTreeSet<usize> = positions.into_iter().collect();
    let removed = services
        .block_on(services.journal().remove(positions))
        .map_err(journal_error)?;

    println!("Removed {} match{}", removed, if removed == 1 { "" } else { "es" });
    Ok(())
}

fn weather(services: &AppServices, position: usize) -> Result<(), AppError> {
    let record = record_at(services, position)?;
    println!("{} on {}", record.title(), record.match_day().format("%Y-%m-%d"));

    let mut lookup = services.lookup_weather(record);
    lookup.wait();

    match lookup.into_state() {
        LookupState::Succeeded(snapshot) => {
            println!("{}", snapshot.summary(services.temperature_unit()));
            if let Some(icon) = snapshot.outlook.icon_url() {
                println!("{}", icon);
            }
            let missing = snapshot.outlook.missing_fields();
            if !missing.is_empty() {
                println!("(incomplete forecast, missing {:?})", missing);
            }
            Ok(())
        }
        LookupState::Failed(e) => {
            println!("{}", e.display_text());
            Err(weather_error(e))
        }
        _ => Err(weather_error(WeatherError::Cancelled)),
    }
}
