use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// Columns the match table has to carry. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "home_team",
    "away_team",
    "home_team_score",
    "away_team_score",
    "tournament",
    "country",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed match table: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// One fixture. Dates and scores that could not be read are kept as None rather than dropping the row,
// so the record still counts towards tournaments and the other side's goals.
// A blank team or tournament name stays blank here and is skipped by the aggregations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub date: Option<NaiveDate>,
    pub home_team: String,
    pub away_team: String,
    pub home_team_score: Option<u32>,
    pub away_team_score: Option<u32>,
    pub tournament: String,
    pub country: String,
}

impl MatchRecord {
    #[cfg(test)]
    pub fn new(
        date: Option<NaiveDate>,
        home_team: &str,
        away_team: &str,
        home_team_score: Option<u32>,
        away_team_score: Option<u32>,
        tournament: &str,
        country: &str,
    ) -> Self {
        Self {
            date,
            home_team: home_team.to_owned(),
            away_team: away_team.to_owned(),
            home_team_score,
            away_team_score,
            tournament: tournament.to_owned(),
            country: country.to_owned(),
        }
    }

    // Home then away, leaving out a side whose team name is blank.
    pub fn named_sides(&self) -> impl Iterator<Item = (&str, Option<u32>)> {
        [
            (self.home_team.as_str(), self.home_team_score),
            (self.away_team.as_str(), self.away_team_score),
        ]
        .into_iter()
        .filter(|(team, _)| !team.is_empty())
    }

    pub fn tournament_name(&self) -> Option<&str> {
        Some(self.tournament.as_str()).filter(|name| !name.is_empty())
    }

    pub fn country_name(&self) -> Option<&str> {
        Some(self.country.as_str()).filter(|name| !name.is_empty())
    }

    pub fn has_blank_name(&self) -> bool {
        self.home_team.is_empty() || self.away_team.is_empty() || self.tournament.is_empty()
    }

    pub fn has_missing_score(&self) -> bool {
        self.home_team_score.is_none() || self.away_team_score.is_none()
    }

    // Goals credited to named teams, a missing score counting as zero.
    pub fn total_goals(&self) -> u64 {
        self.named_sides().map(|(_, score)| score.unwrap_or(0) as u64).sum()
    }
}

// Names come in as text. Date and score cells are decoded lossily, so a cell that is not
// valid UTF-8 parses as missing instead of failing the row.
#[derive(Deserialize, Debug)]
struct RawMatchRow {
    #[serde(deserialize_with = "lossy_text")]
    date: String,
    home_team: String,
    away_team: String,
    #[serde(deserialize_with = "lossy_text")]
    home_team_score: String,
    #[serde(deserialize_with = "lossy_text")]
    away_team_score: String,
    tournament: String,
    country: String,
}

impl From<RawMatchRow> for MatchRecord {
    fn from(raw: RawMatchRow) -> Self {
        Self {
            date: parse_match_date(&raw.date),
            home_team: raw.home_team,
            away_team: raw.away_team,
            home_team_score: parse_score(&raw.home_team_score),
            away_team_score: parse_score(&raw.away_team_score),
            tournament: raw.tournament,
            country: raw.country,
        }
    }
}

fn lossy_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct LossyText;

    impl<'de> Visitor<'de> for LossyText {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a text cell")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<String, E> {
            Ok(String::from_utf8_lossy(v).into_owned())
        }
    }

    deserializer.deserialize_bytes(LossyText)
}

/// Data quality counters for a loaded table. The report's notices come from here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub invalid_dates: usize,
    pub missing_scores: usize,
    pub blank_names: usize,
}

impl LoadSummary {
    pub fn tally(records: &[MatchRecord]) -> Self {
        Self {
            rows: records.len(),
            invalid_dates: records.iter().filter(|m| m.date.is_none()).count(),
            missing_scores: records.iter().filter(|m| m.has_missing_score()).count(),
            blank_names: records.iter().filter(|m| m.has_blank_name()).count(),
        }
    }
}

pub fn load_data(file_path: &Path) -> Result<(Vec<MatchRecord>, LoadSummary), LoadError> {
    let file = File::open(file_path).map_err(|source| LoadError::Io {
        path: file_path.display().to_string(),
        source,
    })?;

    info!("Loading matches from {}", file_path.display());
    load_data_from_reader(file)
}

pub fn load_data_from_reader<R: Read>(reader: R) -> Result<(Vec<MatchRecord>, LoadSummary), LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.byte_headers()?.clone();
    check_columns(&headers)?;

    let mut records = Vec::new();
    for row in csv_reader.byte_records() {
        let raw: RawMatchRow = row?.deserialize(Some(&headers))?;
        records.push(MatchRecord::from(raw));
    }

    let summary = LoadSummary::tally(&records);

    info!("Loaded {} matches", summary.rows);
    if summary.invalid_dates > 0 {
        warn!("{} matches have a missing or unparseable date", summary.invalid_dates);
    }
    if summary.missing_scores > 0 {
        warn!("{} matches have a missing score, counted as zero goals", summary.missing_scores);
    }
    if summary.blank_names > 0 {
        warn!("{} matches have a blank team or tournament name", summary.blank_names);
    }

    Ok((records, summary))
}

// Fails fast with every absent column listed, in table order.
fn check_columns(headers: &csv::ByteRecord) -> Result<(), LoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == col.as_bytes()))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        debug!("Match table columns: {:?}", headers);
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

// Exports with gaps in a score column write every score as a float, so "2.0" is still two goals.
pub fn parse_score(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(goals) = raw.parse::<u32>() {
        return Some(goals);
    }

    let goals = raw.parse::<f64>().ok()?;
    if goals.is_finite() && goals >= 0.0 && goals.fract() == 0.0 && goals <= u32::MAX as f64 {
        Some(goals as u32)
    } else {
        None
    }
}
