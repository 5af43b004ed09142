use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::data_loader::*;
use crate::util::top_k_by;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamGoalTotal {
    pub team: String,
    pub goals: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentCount {
    pub tournament: String,
    pub matches: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedMatch {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

impl DatedMatch {
    fn from_record(m: &MatchRecord) -> Option<Self> {
        Some(Self {
            date: m.date?,
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub earliest: DatedMatch,
    pub latest: DatedMatch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetOverview {
    pub matches: usize,
    pub distinct_tournaments: usize,
    pub distinct_countries: usize,
    pub goals: u64,
}

// Goals per team over both roles, in order of each team's first appearance (home side checked first).
// A missing score adds nothing but the team is still listed. Blank team names are left out.
pub fn team_goal_totals(records: &[MatchRecord]) -> Vec<TeamGoalTotal> {
    let mut totals: Vec<TeamGoalTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for m in records {
        for (team, score) in m.named_sides() {
            let idx = *index.entry(team).or_insert_with(|| {
                totals.push(TeamGoalTotal { team: team.to_owned(), goals: 0 });
                totals.len() - 1
            });
            totals[idx].goals += score.unwrap_or(0) as u64;
        }
    }

    debug!("Goal totals computed for {} teams", totals.len());
    totals
}

pub fn top_teams(records: &[MatchRecord], k: usize) -> Vec<TeamGoalTotal> {
    top_k_by(team_goal_totals(records), k, |t| t.goals)
}

pub fn tournament_counts(records: &[MatchRecord]) -> Vec<TournamentCount> {
    let mut counts: Vec<TournamentCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tournament in records.iter().filter_map(MatchRecord::tournament_name) {
        let idx = *index.entry(tournament).or_insert_with(|| {
            counts.push(TournamentCount { tournament: tournament.to_owned(), matches: 0 });
            counts.len() - 1
        });
        counts[idx].matches += 1;
    }

    debug!("Match counts computed for {} tournaments", counts.len());
    counts
}

pub fn top_tournaments(records: &[MatchRecord], k: usize) -> Vec<TournamentCount> {
    top_k_by(tournament_counts(records), k, |t| t.matches)
}

// Earliest is the first record holding the minimum date, latest the last record holding the maximum.
// That is exactly first/last after a stable ascending sort, without the sort.
pub fn date_range(records: &[MatchRecord]) -> Option<DateRange> {
    let dated = || records.iter().filter(|m| m.date.is_some());

    let earliest = dated().min_by_key(|m| m.date)?;
    let latest = dated().max_by_key(|m| m.date)?;

    Some(DateRange {
        earliest: DatedMatch::from_record(earliest)?,
        latest: DatedMatch::from_record(latest)?,
    })
}

pub fn dataset_overview(records: &[MatchRecord]) -> DatasetOverview {
    let tournaments: HashSet<&str> = records.iter().filter_map(MatchRecord::tournament_name).collect();
    let countries: HashSet<&str> = records.iter().filter_map(MatchRecord::country_name).collect();

    DatasetOverview {
        matches: records.len(),
        distinct_tournaments: tournaments.len(),
        distinct_countries: countries.len(),
        goals: records.iter().map(MatchRecord::total_goals).sum(),
    }
}
