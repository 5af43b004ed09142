use anyhow::Context;
use chrono::Datelike;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::aggregate::*;
use crate::data_loader::*;
use crate::report_context::ReportContext;
use crate::util::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Text { body: String },
    Chart(BarChart),
}

impl Section {
    pub fn text(body: impl Into<String>) -> Self {
        Section::Text { body: body.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub field: String,
    pub label: String,
    pub title: Option<String>,    // None hides the axis title when rendered
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub category: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub chart_type: String,
    pub title: String,
    pub category_axis: Axis,
    pub value_axis: Axis,
    pub text_position: String,
    pub color_field: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn team_goals(title: String, teams: &[TeamGoalTotal]) -> Self {
        Self {
            chart_type: "bar".to_string(),
            title,
            category_axis: Axis { field: "Team".to_string(), label: "Team".to_string(), title: None },
            value_axis: Axis { field: "Goals".to_string(), label: "Total Goals".to_string(), title: None },
            text_position: "outside".to_string(),
            color_field: "Goals".to_string(),
            bars: teams
                .iter()
                .map(|t| Bar { category: t.team.clone(), value: t.goals })
                .collect(),
        }
    }
}

// " (1993–2022)" when the data carries dates, nothing otherwise.
fn year_span(range: Option<&DateRange>) -> String {
    match range {
        Some(r) => format!(" ({}–{})", r.earliest.date.year(), r.latest.date.year()),
        None => String::new(),
    }
}

pub fn build_report(records: &[MatchRecord], summary: &LoadSummary, ctx: &ReportContext) -> Vec<Section> {
    let mut sections = Vec::new();

    let overview = dataset_overview(records);
    let range = date_range(records);
    let span = year_span(range.as_ref());

    // Header
    sections.push(Section::text("## International Football Match Analysis"));
    let loaded_span = match &range {
        Some(r) => format!(" from {} to {}", r.earliest.date.year(), r.latest.date.year()),
        None => String::new(),
    };
    sections.push(Section::text(format!(
        "**Data successfully loaded** — {} international matches{}.",
        overview.matches, loaded_span
    )));
    sections.push(Section::text(format!(
        "Includes **{} tournaments** across **{} host countries**, with **{} goals** scored.",
        overview.distinct_tournaments, overview.distinct_countries, overview.goals
    )));

    if summary.invalid_dates > 0 {
        sections.push(Section::text(format!(
            "⚠️ {} matches have a missing or unreadable date and are left out of the date range.",
            summary.invalid_dates
        )));
    }
    if summary.missing_scores > 0 {
        sections.push(Section::text(format!(
            "⚠️ {} matches have a missing score, counted as zero goals.",
            summary.missing_scores
        )));
    }
    if summary.blank_names > 0 {
        sections.push(Section::text(format!(
            "⚠️ {} matches have a blank team or tournament name, left out of the rankings.",
            summary.blank_names
        )));
    }

    // Top scoring teams
    sections.push(Section::text("## Most Prolific Teams (Total Goals Scored)"));
    let teams = top_teams(records, ctx.top_teams);
    if ctx.top_teams == 0 {
        sections.push(Section::text("Team ranking skipped (top 0 requested)."));
    } else if teams.is_empty() {
        sections.push(Section::text("No matches available to rank teams."));
    } else {
        sections.push(Section::text(format!("Top {} teams by combined home and away goals:", teams.len())));
        for t in &teams {
            sections.push(Section::text(format!("- **{}**: {} goals", t.team, t.goals)));
        }
    }

    // Tournament frequency
    sections.push(Section::text("## Most Frequently Held Tournaments"));
    let tournaments = top_tournaments(records, ctx.top_tournaments);
    if ctx.top_tournaments == 0 {
        sections.push(Section::text("Tournament ranking skipped (top 0 requested)."));
    } else if tournaments.is_empty() {
        sections.push(Section::text("No matches available to count tournaments."));
    } else {
        sections.push(Section::text(format!(
            "Top {} tournaments by number of matches played:",
            tournaments.len()
        )));
        for t in &tournaments {
            sections.push(Section::text(format!("- **{}**: {} matches", t.tournament, t.matches)));
        }
    }

    // Chart
    let chart_teams = top_teams(records, ctx.chart_teams);
    sections.push(Section::text(format!("## Visual Breakdown: Top {} Scoring Teams", chart_teams.len())));
    sections.push(Section::Chart(BarChart::team_goals(
        format!("Top {} Goal-Scoring Teams{}", chart_teams.len(), span),
        &chart_teams,
    )));

    // Technical summary
    sections.push(Section::text("## Technical Summary & Dataset Info"));
    match &range {
        Some(r) => {
            sections.push(Section::text(format!("**Source File**: `{}`", ctx.source_label)));
            sections.push(Section::text(format!("**First Match**: {}", describe_match(&r.earliest))));
            sections.push(Section::text(format!("**Most Recent Match**: {}", describe_match(&r.latest))));
        }
        None => sections.push(Section::text("⚠️ No valid match dates available in the dataset.")),
    }

    sections
}

fn describe_match(m: &DatedMatch) -> String {
    format!("{} — {} vs {}", m.date, m.home_team, m.away_team)
}

// What is shown when the table could not be obtained. Nothing else follows it.
pub fn load_failure_sections(err: &LoadError) -> Vec<Section> {
    vec![Section::text(format!("❌ Error loading data: {err}"))]
}

pub fn render_text(sections: &[Section], ctx: &ReportContext) -> String {
    let mut out = String::new();

    for section in sections {
        match section {
            Section::Text { body } => {
                out.push_str(body);
                out.push('\n');
            }
            Section::Chart(chart) => out.push_str(&render_chart(chart, ctx.chart_width)),
        }
    }

    out
}

fn render_chart(chart: &BarChart, width: usize) -> String {
    let mut out = format!("{}\n", chart.title);

    if chart.bars.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let label_width = chart.bars.iter().map(|b| b.category.chars().count()).max().unwrap_or(0);
    let max_value = chart.bars.iter().map(|b| b.value).max().unwrap_or(0);

    for bar in &chart.bars {
        let fill = "█".repeat(scale_clamped(bar.value, max_value, width));
        out.push_str(&format!("{:<label_width$} | {fill} {}\n", bar.category, bar.value));
    }

    out
}

pub fn write_json(sections: &[Section], path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(sections).context("serialize report sections")?;
    fs::write(path, json).with_context(|| format!("write report json {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn records() -> Vec<MatchRecord> {
        vec![
            MatchRecord::new(date(2021, 1, 1), "A", "B", Some(2), Some(1), "Cup", "X"),
            MatchRecord::new(date(2021, 6, 1), "B", "A", Some(0), Some(3), "Cup", "Y"),
            MatchRecord::new(date(1993, 5, 1), "A", "C", Some(1), Some(1), "Friendly", "X"),
        ]
    }

    fn report(records: &[MatchRecord], ctx: &ReportContext) -> Vec<Section> {
        build_report(records, &LoadSummary::tally(records), ctx)
    }

    fn texts(sections: &[Section]) -> Vec<&str> {
        sections
            .iter()
            .filter_map(|s| match s {
                Section::Text { body } => Some(body.as_str()),
                Section::Chart(_) => None,
            })
            .collect()
    }

    fn chart(sections: &[Section]) -> &BarChart {
        sections
            .iter()
            .find_map(|s| match s {
                Section::Chart(c) => Some(c),
                Section::Text { .. } => None,
            })
            .expect("report should carry a chart")
    }

    #[test]
    fn full_report_sections() {
        let sections = report(&records(), &ReportContext::default());
        let lines = texts(&sections);

        assert_eq!(lines[0], "## International Football Match Analysis");
        assert_eq!(lines[1], "**Data successfully loaded** — 3 international matches from 1993 to 2021.");
        assert_eq!(lines[2], "Includes **2 tournaments** across **2 host countries**, with **8 goals** scored.");
        assert!(lines.contains(&"- **A**: 6 goals"));
        assert!(lines.contains(&"- **B**: 1 goals"));
        assert!(lines.contains(&"- **Cup**: 2 matches"));
        assert!(lines.contains(&"**Source File**: `international_matches.csv`"));
        assert!(lines.contains(&"**First Match**: 1993-05-01 — A vs C"));
        assert!(lines.contains(&"**Most Recent Match**: 2021-06-01 — B vs A"));
        assert!(!lines.iter().any(|l| l.starts_with("⚠️")));
    }

    #[test]
    fn team_list_precedes_tournaments() {
        let sections = report(&records(), &ReportContext::default());
        let lines = texts(&sections);
        let teams_at = lines.iter().position(|l| *l == "- **A**: 6 goals").unwrap();
        let cups_at = lines.iter().position(|l| *l == "- **Cup**: 2 matches").unwrap();
        let summary_at = lines.iter().position(|l| *l == "## Technical Summary & Dataset Info").unwrap();
        assert!(teams_at < cups_at && cups_at < summary_at);
    }

    #[test]
    fn chart_spec() {
        let sections = report(&records(), &ReportContext::default());
        let chart = chart(&sections);

        assert_eq!(chart.chart_type, "bar");
        assert_eq!(chart.title, "Top 3 Goal-Scoring Teams (1993–2021)");
        assert_eq!(chart.category_axis.field, "Team");
        assert_eq!(chart.value_axis.label, "Total Goals");
        assert_eq!(chart.category_axis.title, None);
        assert_eq!(chart.value_axis.title, None);
        assert_eq!(chart.text_position, "outside");
        assert_eq!(chart.color_field, chart.value_axis.field);
        assert_eq!(
            chart.bars,
            vec![
                Bar { category: "A".into(), value: 6 },
                Bar { category: "B".into(), value: 1 },
                Bar { category: "C".into(), value: 1 },
            ]
        );
    }

    #[test]
    fn no_dates_gives_explicit_notice() {
        let undated = vec![MatchRecord::new(None, "A", "B", Some(1), None, "Cup", "X")];
        let sections = report(&undated, &ReportContext::default());
        let lines = texts(&sections);

        assert_eq!(lines[1], "**Data successfully loaded** — 1 international matches.");
        assert!(lines.contains(&"⚠️ No valid match dates available in the dataset."));
        assert!(lines.iter().any(|l| l.contains("1 matches have a missing or unreadable date")));
        assert!(lines.iter().any(|l| l.contains("1 matches have a missing score")));
        assert!(!lines.iter().any(|l| l.starts_with("**First Match**")));
        assert_eq!(chart(&sections).title, "Top 2 Goal-Scoring Teams");
    }

    #[test]
    fn empty_record_set() {
        let sections = report(&[], &ReportContext::default());
        let lines = texts(&sections);

        assert!(lines.contains(&"No matches available to rank teams."));
        assert!(lines.contains(&"No matches available to count tournaments."));
        assert!(lines.contains(&"⚠️ No valid match dates available in the dataset."));
        assert!(chart(&sections).bars.is_empty());
    }

    #[test]
    fn headings_count_what_is_shown() {
        let sections = report(&records(), &ReportContext::default());
        let lines = texts(&sections);

        assert!(lines.contains(&"Top 3 teams by combined home and away goals:"));
        assert!(lines.contains(&"Top 2 tournaments by number of matches played:"));
        assert!(lines.contains(&"## Visual Breakdown: Top 3 Scoring Teams"));
    }

    #[test]
    fn zero_k_is_not_reported_as_no_matches() {
        let mut ctx = ReportContext::default();
        ctx.top_teams = 0;
        ctx.top_tournaments = 0;
        let sections = report(&records(), &ctx);
        let lines = texts(&sections);

        assert!(lines.contains(&"Team ranking skipped (top 0 requested)."));
        assert!(lines.contains(&"Tournament ranking skipped (top 0 requested)."));
        assert!(!lines.iter().any(|l| l.starts_with("No matches available")));
    }

    #[test]
    fn blank_names_get_a_notice_and_no_list_entry() {
        let mut rows = records();
        rows.push(MatchRecord::new(date(2000, 1, 1), "", "B", Some(4), Some(2), "", "X"));
        let sections = report(&rows, &ReportContext::default());
        let lines = texts(&sections);

        assert!(lines.contains(&"⚠️ 1 matches have a blank team or tournament name, left out of the rankings."));
        assert!(!lines.iter().any(|l| l.starts_with("- ****")));
        assert!(lines.contains(&"- **B**: 3 goals"));
        assert!(chart(&sections).bars.iter().all(|b| !b.category.is_empty()));
    }

    #[test]
    fn load_failure_is_a_single_notice() {
        let err = LoadError::MissingColumns(vec!["country".to_string()]);
        let sections = load_failure_sections(&err);
        assert_eq!(sections, vec![Section::text("❌ Error loading data: missing required columns: country")]);
    }

    #[test]
    fn text_rendering_scales_bars() {
        let mut ctx = ReportContext::default();
        ctx.chart_width = 6;
        let sections = report(&records(), &ctx);
        let text = render_text(&sections, &ctx);

        assert!(text.starts_with("## International Football Match Analysis\n"));
        assert!(text.contains("A | ██████ 6\n"));
        assert!(text.contains("B | █ 1\n"));
    }

    #[test]
    fn sections_serialize_with_kind_tag() {
        let sections = report(&records(), &ReportContext::default());
        let json = serde_json::to_value(&sections).expect("sections should serialize");

        assert_eq!(json[0]["kind"], "text");
        assert_eq!(json[0]["body"], "## International Football Match Analysis");

        let chart = json
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["kind"] == "chart")
            .expect("chart section");
        assert_eq!(chart["chart_type"], "bar");
        assert!(chart["value_axis"]["title"].is_null());
        assert_eq!(chart["bars"][0]["category"], "A");
        assert_eq!(chart["bars"][0]["value"], 6);
    }
}
