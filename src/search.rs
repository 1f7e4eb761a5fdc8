use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::models::{Application, JobPost};

/// Text rows the input occupies when empty.
pub const MIN_ROWS: u16 = 2;
/// Rows after which the input stops growing and scrolls instead.
pub const MAX_ROWS: u16 = 7;

/// Reasoning-mode terms closer than this (Jaro-Winkler) count as a match.
const FUZZY_THRESHOLD: f64 = 0.88;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Normal,
    Reasoning,
}

impl SearchMode {
    pub fn placeholder(&self) -> &'static str {
        match self {
            SearchMode::Normal => "Search for candidates...",
            SearchMode::Reasoning => "Search with deep knowledge...",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SearchMode::Normal => SearchMode::Reasoning,
            SearchMode::Reasoning => SearchMode::Normal,
        }
    }
}

/// Height clamp for the growing input. `max: None` grows without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoResize {
    pub min: u16,
    pub max: Option<u16>,
}

impl AutoResize {
    pub fn clamp(&self, content_rows: u16) -> u16 {
        let capped = self.max.map_or(content_rows, |max| content_rows.min(max));
        capped.max(self.min)
    }
}

impl Default for AutoResize {
    fn default() -> Self {
        Self {
            min: MIN_ROWS,
            max: Some(MAX_ROWS),
        }
    }
}

/// Structured candidate filter. Written as `skills: rust, sql; college: iit; year: 3`;
/// bare text is read as skills.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub skills: Vec<String>,
    pub college: Option<String>,
    pub year: Option<String>,
}

impl CandidateFilter {
    pub fn parse(line: &str) -> Self {
        let mut filter = Self::default();
        for segment in line.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match segment.split_once(':') {
                Some((k, v)) => (k.trim().to_lowercase(), v.trim()),
                None => ("skills".to_string(), segment),
            };
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "college" => filter.college = Some(value.to_string()),
                "year" => filter.year = Some(value.to_string()),
                _ => filter.skills.extend(
                    value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty()),
                ),
            }
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.college.is_none() && self.year.is_none()
    }

    /// Auxiliary query text; empty when nothing is set.
    pub fn query(&self) -> String {
        let mut parts = Vec::new();
        if !self.skills.is_empty() {
            parts.push(format!("Skills: {}", self.skills.join(", ")));
        }
        if let Some(college) = &self.college {
            parts.push(format!("College: {}", college));
        }
        if let Some(year) = &self.year {
            parts.push(format!("Year: {}", year));
        }
        parts.join("; ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Query,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    Handled,
    Submitted,
    Ignored,
}

/// Chat-style search box: grows with its content, toggles between normal and
/// reasoning mode, and carries a candidate filter. It never runs a search
/// itself; submissions go to the caller's callback.
#[derive(Debug, Clone)]
pub struct SearchInput {
    value: String,
    mode: SearchMode,
    filter: CandidateFilter,
    filter_draft: String,
    focus: Focus,
    sizing: AutoResize,
    width: u16,
    rows: u16,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new(AutoResize::default())
    }
}

impl SearchInput {
    pub fn new(sizing: AutoResize) -> Self {
        Self {
            value: String::new(),
            mode: SearchMode::Normal,
            filter: CandidateFilter::default(),
            filter_draft: String::new(),
            focus: Focus::Query,
            sizing,
            width: 40,
            rows: sizing.min,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.adjust_height();
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub fn placeholder(&self) -> &'static str {
        self.mode.placeholder()
    }

    pub fn filter(&self) -> &CandidateFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: CandidateFilter) {
        self.filter_draft = filter.query();
        self.filter = filter;
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Current text-area height in rows.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Called when the terminal is resized; `width` is the text column count.
    pub fn resize(&mut self, width: u16) {
        self.width = width.max(1);
        self.adjust_height();
    }

    fn content_rows(&self) -> u16 {
        let lines = textwrap::wrap(&self.value, usize::from(self.width)).len();
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    fn adjust_height(&mut self) {
        self.rows = self.sizing.clamp(self.content_rows());
    }

    fn reset_height(&mut self) {
        self.rows = self.sizing.min;
    }

    pub fn insert(&mut self, ch: char) {
        match self.focus {
            Focus::Query => {
                self.value.push(ch);
                self.adjust_height();
            }
            Focus::Filter => self.filter_draft.push(ch),
        }
    }

    pub fn newline(&mut self) {
        if self.focus == Focus::Query {
            self.value.push('\n');
            self.adjust_height();
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Focus::Query => {
                self.value.pop();
                self.adjust_height();
            }
            Focus::Filter => {
                self.filter_draft.pop();
            }
        }
    }

    /// Switches between the text box and the filter field. Leaving the filter
    /// field applies what was typed there.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Query => Focus::Filter,
            Focus::Filter => {
                self.filter = CandidateFilter::parse(&self.filter_draft);
                Focus::Query
            }
        };
    }

    /// `None` when there is nothing to search for.
    pub fn compose_query(&self) -> Option<String> {
        let text = self.value.trim();
        let filter = self.filter.query();
        match (text.is_empty(), filter.is_empty()) {
            (true, true) => None,
            (true, false) => Some(filter),
            (false, true) => Some(text.to_string()),
            (false, false) => Some(format!("{}. {}", text, filter)),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.compose_query().is_some()
    }

    /// Hands the composed query and mode to `on_search`. Returns whether the
    /// callback ran. The text is kept; the caller decides whether to clear it.
    pub fn submit<F>(&mut self, on_search: F) -> bool
    where
        F: FnOnce(String, SearchMode),
    {
        if self.focus == Focus::Filter {
            self.toggle_focus();
        }
        let submitted = match self.compose_query() {
            Some(query) => {
                on_search(query, self.mode);
                true
            }
            None => false,
        };
        self.reset_height();
        submitted
    }

    /// Enter submits, Shift/Alt+Enter inserts a newline, Tab moves to the filter
    /// field, Ctrl+R toggles reasoning mode.
    pub fn handle_key<F>(&mut self, key: KeyEvent, on_search: F) -> KeyResult
    where
        F: FnOnce(String, SearchMode),
    {
        match key.code {
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.newline();
                KeyResult::Handled
            }
            KeyCode::Enter => {
                if self.submit(on_search) {
                    KeyResult::Submitted
                } else {
                    KeyResult::Handled
                }
            }
            KeyCode::Tab => {
                self.toggle_focus();
                KeyResult::Handled
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.toggle_mode();
                KeyResult::Handled
            }
            KeyCode::Backspace => {
                self.backspace();
                KeyResult::Handled
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert(ch);
                KeyResult::Handled
            }
            _ => KeyResult::Ignored,
        }
    }

    /// Total height including borders and the filter line.
    pub fn height(&self) -> u16 {
        self.rows + 3
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let accent = match self.mode {
            SearchMode::Normal => Color::Gray,
            SearchMode::Reasoning => Color::LightRed,
        };
        let title = match self.mode {
            SearchMode::Normal => " Search ".to_string(),
            SearchMode::Reasoning => " Search · Reasoning ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let body = if self.value.is_empty() {
            Paragraph::new(Span::styled(
                self.placeholder(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let overflow = self.content_rows().saturating_sub(self.rows);
            Paragraph::new(self.value.as_str())
                .wrap(Wrap { trim: false })
                .scroll((overflow, 0))
        };
        frame.render_widget(body, chunks[0]);

        let filter_style = if self.focus == Focus::Filter {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let filter_text = match self.focus {
            Focus::Filter => format!("Filter> {}", self.filter_draft),
            Focus::Query if self.filter.is_empty() => "Filter: (tab to edit)".to_string(),
            Focus::Query => format!("Filter query: {}", self.filter.query()),
        };
        let send = if self.can_submit() { "  [enter] send" } else { "" };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(filter_text, filter_style),
                Span::styled(send, Style::default().fg(accent)),
            ])),
            chunks[1],
        );
    }
}

// --- Candidate matching used by the dashboard's search callback ---

/// Text a job post is matched against.
pub fn job_haystack(job: &JobPost) -> String {
    format!("{} {} {} {}", job.title, job.job_type, job.location, job.status)
}

/// Text an applicant is matched against.
pub fn application_haystack(app: &Application) -> String {
    let s = &app.student;
    format!(
        "{} {} {} year {} {} {} {}",
        s.full_name(),
        s.college,
        s.course,
        s.year,
        s.email.as_deref().unwrap_or(""),
        s.skills.join(" "),
        app.status.label()
    )
}

/// Lower-cased query terms. Words ending in `:` are field labels and skipped.
fn terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|w| !w.ends_with(':'))
        .map(|w| {
            w.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | '"' | '\'' | '(' | ')'))
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn term_score(term: &str, haystack: &str, words: &[&str], mode: SearchMode) -> f64 {
    if haystack.contains(term) {
        return 1.0;
    }
    if mode == SearchMode::Normal {
        return 0.0;
    }
    let best = words
        .iter()
        .map(|w| strsim::jaro_winkler(term, w))
        .fold(0.0, f64::max);
    if best >= FUZZY_THRESHOLD { best } else { 0.0 }
}

/// Indices of `haystacks` that satisfy `query`, best first.
///
/// Normal mode requires every term to appear and keeps the original order.
/// Reasoning mode accepts any term, tolerates misspellings and ranks by how
/// much of the query matched.
pub fn rank_matches(haystacks: &[String], query: &str, mode: SearchMode) -> Vec<usize> {
    let terms = terms(query);
    if terms.is_empty() {
        return (0..haystacks.len()).collect();
    }

    let mut scored: Vec<(usize, f64)> = haystacks
        .iter()
        .enumerate()
        .filter_map(|(i, hay)| {
            let hay = hay.to_lowercase();
            let words: Vec<&str> = hay
                .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
                .filter(|w| !w.is_empty())
                .collect();
            let scores: Vec<f64> = terms
                .iter()
                .map(|t| term_score(t, &hay, &words, mode))
                .collect();
            let keep = match mode {
                SearchMode::Normal => scores.iter().all(|s| *s > 0.0),
                SearchMode::Reasoning => scores.iter().any(|s| *s > 0.0),
            };
            keep.then(|| (i, scores.iter().sum()))
        })
        .collect();

    if mode == SearchMode::Reasoning {
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    }
    scored.into_iter().map(|(i, _)| i).collect()
}
