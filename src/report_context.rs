use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ReportContext {
    pub source_path: PathBuf,
    pub source_label: String,     // File name shown in the technical summary

    pub top_teams: usize,
    pub top_tournaments: usize,
    pub chart_teams: usize,

    pub chart_width: usize,       // Widest bar in the text rendering, in characters
    pub json_path: Option<PathBuf>,
}

impl Default for ReportContext {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("international_matches.csv"),
            source_label: "international_matches.csv".to_string(),

            top_teams: 5,
            top_tournaments: 5,
            chart_teams: 10,

            chart_width: 40,
            json_path: None,
        }
    }
}

impl ReportContext {
    // Points the report at another file, keeping the label in step with it.
    pub fn with_source(mut self, path: PathBuf) -> Self {
        self.source_label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.source_path = path;
        self
    }
}
