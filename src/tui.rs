use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::dashboard::{Activity, Completion, Dashboard, Pending, View, ViewMode};
use crate::models::{
    Application, ApplicationStatus, JobPost, JobStatus, StudentProfile, format_date,
    format_stipend, pluralize_applications, truncate,
};
use crate::notice::NoticeLevel;
use crate::search::{
    SearchInput, SearchMode, application_haystack, job_haystack, rank_matches,
};

/// Search results narrowing the list of the pane they were made in.
struct Narrowing {
    query: String,
    mode: SearchMode,
    indices: Vec<usize>,
}

struct AppState {
    dashboard: Dashboard,
    user_label: String,
    selected: usize,
    scroll_offset: u16,
    search: SearchInput,
    searching: bool,
    narrowed: Option<Narrowing>,
}

enum Flow {
    Continue,
    Quit,
}

impl AppState {
    fn new(dashboard: Dashboard, user_label: String) -> Self {
        Self {
            dashboard,
            user_label,
            selected: 0,
            scroll_offset: 0,
            search: SearchInput::default(),
            searching: false,
            narrowed: None,
        }
    }

    fn mode(&self) -> ViewMode {
        self.dashboard.view().mode()
    }

    fn list_len(&self) -> usize {
        match self.mode() {
            ViewMode::Jobs => self.dashboard.jobs().len(),
            ViewMode::Applications => self.dashboard.view().applications().len(),
            ViewMode::Profile => 0,
        }
    }

    /// Indices into the pane's list, in display order.
    fn visible(&self) -> Vec<usize> {
        match &self.narrowed {
            Some(n) => n.indices.clone(),
            None => (0..self.list_len()).collect(),
        }
    }

    fn current_index(&self) -> Option<usize> {
        self.visible().get(self.selected).copied()
    }

    fn current_job(&self) -> Option<&JobPost> {
        match self.mode() {
            ViewMode::Jobs => self.current_index().and_then(|i| self.dashboard.jobs().get(i)),
            _ => None,
        }
    }

    /// The highlighted application, or the one belonging to the open profile.
    fn current_application(&self) -> Option<&Application> {
        match self.dashboard.view() {
            View::Jobs => None,
            View::Applications { applications, .. } => {
                self.current_index().and_then(|i| applications.get(i))
            }
            View::Profile {
                applications,
                student,
                ..
            } => applications.iter().find(|a| a.student.id == student.id),
        }
    }

    fn reset_selection(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
        self.narrowed = None;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn next(&mut self) {
        let len = self.visible().len();
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn on_completion(&mut self, completion: Completion) {
        let before = self.mode();
        self.dashboard.apply(completion);
        if self.mode() != before {
            self.reset_selection();
        } else {
            self.clamp_selection();
        }
    }

    fn back(&mut self) {
        self.dashboard.back();
        self.reset_selection();
    }

    fn haystacks(&self) -> Vec<String> {
        match self.mode() {
            ViewMode::Jobs => self.dashboard.jobs().iter().map(job_haystack).collect(),
            ViewMode::Applications => self
                .dashboard
                .view()
                .applications()
                .iter()
                .map(application_haystack)
                .collect(),
            ViewMode::Profile => Vec::new(),
        }
    }

    fn apply_search(&mut self, query: String, mode: SearchMode) {
        let indices = rank_matches(&self.haystacks(), &query, mode);
        info!(%query, ?mode, hits = indices.len(), "search");
        self.narrowed = Some(Narrowing {
            query,
            mode,
            indices,
        });
        self.selected = 0;
        self.scroll_offset = 0;
    }

    fn set_status(&mut self, status: ApplicationStatus, pending: &mut Option<Pending>) {
        let Some(app) = self.current_application() else {
            return;
        };
        if !app.status.can_move_to(status) {
            return;
        }
        let id = app.id.clone();
        *pending = self.dashboard.request_update_status(&id, status);
    }
}

pub async fn run_browse(dashboard: Dashboard, user_label: String) -> Result<()> {
    let mut state = AppState::new(dashboard, user_label);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let size = terminal.size()?;
    state.search.resize(size.width.saturating_sub(2));

    let result = run_loop(&mut terminal, &mut state).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn wait_for(pending: &mut Option<Pending>) -> Completion {
    match pending {
        Some(p) => p.await,
        None => std::future::pending().await,
    }
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut list_state = ListState::default();
    let mut pending = Some(state.dashboard.request_load());

    loop {
        state.dashboard.clear_expired_notice(Instant::now());
        list_state.select(Some(state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        tokio::select! {
            completion = wait_for(&mut pending) => {
                pending = None;
                state.on_completion(completion);
            }
            event = events.next() => {
                let Some(event) = event else { break };
                if let Flow::Quit = handle_event(state, event?, &mut pending) {
                    break;
                }
            }
            _ = ticker.tick() => {}
        }
    }
    Ok(())
}

fn handle_event(state: &mut AppState, event: Event, pending: &mut Option<Pending>) -> Flow {
    match event {
        Event::Resize(width, _) => {
            state.search.resize(width.saturating_sub(2));
            Flow::Continue
        }
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if pending.is_some() {
                handle_loading_key(state, key, pending)
            } else if state.searching {
                handle_search_key(state, key);
                Flow::Continue
            } else {
                handle_key(state, key, pending)
            }
        }
        _ => Flow::Continue,
    }
}

fn handle_loading_key(state: &mut AppState, key: KeyEvent, pending: &mut Option<Pending>) -> Flow {
    match key.code {
        KeyCode::Char('q') => Flow::Quit,
        KeyCode::Esc => {
            if state.dashboard.cancel() {
                *pending = None;
            }
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

fn handle_search_key(state: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        state.searching = false;
        return;
    }
    let mut request = None;
    state
        .search
        .handle_key(key, |query, mode| request = Some((query, mode)));
    if let Some((query, mode)) = request {
        state.apply_search(query, mode);
        state.searching = false;
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent, pending: &mut Option<Pending>) -> Flow {
    let mode = state.mode();
    match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Esc if mode == ViewMode::Jobs && state.narrowed.is_none() => return Flow::Quit,
        KeyCode::Esc if state.narrowed.is_some() => state.narrowed = None,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
            if mode != ViewMode::Jobs {
                state.back();
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if mode == ViewMode::Profile {
                state.scroll_down();
            } else {
                state.next();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if mode == ViewMode::Profile {
                state.scroll_up();
            } else {
                state.prev();
            }
        }
        KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
        KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => match mode {
            ViewMode::Jobs => {
                if let Some(id) = state.current_job().map(|j| j.id.clone()) {
                    *pending = state.dashboard.request_open_job(&id);
                }
            }
            ViewMode::Applications => {
                if let Some(id) = state.current_application().map(|a| a.student.id.clone()) {
                    if state.dashboard.open_student(&id) {
                        state.reset_selection();
                    }
                }
            }
            ViewMode::Profile => {}
        },
        KeyCode::Char('a') => state.set_status(ApplicationStatus::Accepted, pending),
        KeyCode::Char('x') => state.set_status(ApplicationStatus::Rejected, pending),
        KeyCode::Char('u') => state.set_status(ApplicationStatus::UnderReview, pending),
        KeyCode::Char('r') if mode == ViewMode::Jobs => {
            state.reset_selection();
            *pending = Some(state.dashboard.request_load());
        }
        KeyCode::Char('/') if mode != ViewMode::Profile => state.searching = true,
        KeyCode::Char('c') => state.narrowed = None,
        _ => {}
    }
    if let Some(p) = pending {
        debug!(?mode, ticket = p.ticket(), "request issued");
    }
    Flow::Continue
}

// --- Rendering ---

fn status_style(status: ApplicationStatus) -> Style {
    match status {
        ApplicationStatus::Accepted => Style::default().fg(Color::Green),
        ApplicationStatus::Rejected => Style::default().fg(Color::Red),
        ApplicationStatus::UnderReview => Style::default().fg(Color::Yellow),
        ApplicationStatus::Pending => Style::default().fg(Color::Gray),
    }
}

fn status_icon(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Accepted => "+",
        ApplicationStatus::Rejected => "x",
        ApplicationStatus::UnderReview => "*",
        ApplicationStatus::Pending => " ",
    }
}

fn heading(state: &AppState) -> (String, String) {
    match state.dashboard.view() {
        View::Jobs => (
            "Job Applications".to_string(),
            "Manage applications for your job posts".to_string(),
        ),
        View::Applications { job, applications } => (
            format!("Applications for {}", job.title),
            format!("{} received", pluralize_applications(applications.len())),
        ),
        View::Profile { student, .. } => (
            student.full_name(),
            "Candidate profile and details".to_string(),
        ),
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let search_height = if state.searching { state.search.height() } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(search_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Header
    let (title, subtitle) = heading(state);
    let mut title_spans = vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))];
    if let Some(company) = state.dashboard.recruiter().and_then(|r| r.company_name.as_deref()) {
        title_spans.push(Span::styled(
            format!("  {} · {}", company, state.user_label),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let header = Paragraph::new(vec![
        Line::from(title_spans),
        Line::from(Span::styled(subtitle, Style::default().fg(Color::DarkGray))),
    ]);
    frame.render_widget(header, rows[0]);

    // Body
    if state.dashboard.is_loading() {
        draw_loading(frame, state, rows[1]);
    } else {
        match state.mode() {
            ViewMode::Jobs => draw_jobs(frame, state, list_state, rows[1]),
            ViewMode::Applications => draw_applications(frame, state, list_state, rows[1]),
            ViewMode::Profile => draw_profile(frame, state, rows[1]),
        }
    }

    if state.searching {
        state.search.render(frame, rows[2]);
    }

    // Notice
    if let Some(notice) = state.dashboard.notice() {
        let style = match notice.level {
            NoticeLevel::Success => Style::default().fg(Color::Green),
            NoticeLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        };
        frame.render_widget(
            Paragraph::new(format!(" {}: {}", notice.title, notice.message)).style(style),
            rows[3],
        );
    } else if let Some(n) = &state.narrowed {
        let label = match n.mode {
            SearchMode::Normal => "search",
            SearchMode::Reasoning => "reasoning search",
        };
        frame.render_widget(
            Paragraph::new(format!(
                " {} \"{}\": {} match(es)  (c: clear)",
                label,
                n.query,
                n.indices.len()
            ))
            .style(Style::default().fg(Color::Cyan)),
            rows[3],
        );
    }

    // Footer help
    let help = if state.dashboard.is_loading() {
        " esc:cancel  q:quit"
    } else if state.searching {
        " enter:search  shift+enter:newline  tab:filter  ctrl+r:reasoning  esc:close"
    } else {
        match state.mode() {
            ViewMode::Jobs => " j/k:navigate  enter:applications  /:search  r:refresh  q:quit",
            ViewMode::Applications => {
                " j/k:navigate  enter:profile  a:accept x:reject u:review  /:search  esc:back  q:quit"
            }
            ViewMode::Profile => " j/k:scroll  a:accept x:reject u:review  esc:back  q:quit",
        }
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[4],
    );
}

fn draw_loading(frame: &mut Frame, state: &AppState, area: Rect) {
    let what = match state.dashboard.activity() {
        Some(Activity::LoadingApplications) => "Loading applications",
        Some(Activity::UpdatingStatus) => "Updating application",
        Some(Activity::LoadingJobs) | None => "Loading job posts",
    };
    let mut lines = vec![Line::from(what), Line::from("")];
    for _ in 0..3 {
        lines.push(Line::from(Span::styled(
            "░░░░░░░░░░░░░░░░░░░░░░░░",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "░░░░░░░░░░░░",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn split_panes(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area)
}

fn empty_state(frame: &mut Frame, area: Rect, title: &str, hint: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_jobs(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let jobs = state.dashboard.jobs();
    if jobs.is_empty() {
        empty_state(
            frame,
            area,
            "No job posts yet",
            "You haven't posted any jobs yet. Create your first job post to start receiving applications.",
        );
        return;
    }

    let chunks = split_panes(area);
    let items: Vec<ListItem> = state
        .visible()
        .into_iter()
        .filter_map(|i| jobs.get(i))
        .map(|job| {
            let marker = match job.status {
                JobStatus::Active => " ",
                JobStatus::Inactive => "-",
            };
            ListItem::new(format!(
                "{} {} ({})",
                marker,
                truncate(&job.title, 32),
                job.applications
            ))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Jobs ({}) ", jobs.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], list_state);

    let detail = match state.current_job() {
        Some(job) => job_detail(job),
        None => Text::raw("No matching job"),
    };
    frame.render_widget(
        Paragraph::new(detail)
            .block(Block::default().borders(Borders::ALL).title(" Detail "))
            .wrap(Wrap { trim: false })
            .scroll((state.scroll_offset, 0)),
        chunks[1],
    );
}

fn job_detail(job: &JobPost) -> Text<'_> {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        &job.title,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("{} • {}", job.job_type, job.location)));
    let style = match job.status {
        JobStatus::Active => Style::default().fg(Color::Green),
        JobStatus::Inactive => Style::default().fg(Color::DarkGray),
    };
    lines.push(Line::from(Span::styled(format!("Status: {}", job.status), style)));
    if let Some(stipend) = job.stipend {
        lines.push(Line::from(format!("Stipend: {}", format_stipend(stipend))));
    }
    if let Some(posted) = &job.date_posted {
        lines.push(Line::from(format!("Posted {}", format_date(posted))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(pluralize_applications(job.applications as usize)));
    Text::from(lines)
}

fn draw_applications(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let applications = state.dashboard.view().applications();
    if applications.is_empty() {
        empty_state(
            frame,
            area,
            "No applications yet",
            "This job hasn't received any applications yet. Share your job post to get more visibility.",
        );
        return;
    }

    let chunks = split_panes(area);
    let items: Vec<ListItem> = state
        .visible()
        .into_iter()
        .filter_map(|i| applications.get(i))
        .map(|app| {
            ListItem::new(Line::from(vec![
                Span::styled(status_icon(app.status), status_style(app.status)),
                Span::raw(format!(
                    " {} | {}",
                    truncate(&app.student.full_name(), 24),
                    truncate(&app.student.college, 18)
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Applicants ({}) ", applications.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], list_state);

    let detail = match state.current_application() {
        Some(app) => application_detail(app),
        None => Text::raw("No matching applicant"),
    };
    frame.render_widget(
        Paragraph::new(detail)
            .block(Block::default().borders(Borders::ALL).title(" Applicant "))
            .wrap(Wrap { trim: false })
            .scroll((state.scroll_offset, 0)),
        chunks[1],
    );
}

fn application_detail(app: &Application) -> Text<'_> {
    let s = &app.student;
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(format!("[{}] ", s.initials()), Style::default().fg(Color::Cyan)),
        Span::styled(s.full_name(), Style::default().add_modifier(Modifier::BOLD)),
    ]));
    lines.push(Line::from(format!("{} • {}", s.course, s.college)));
    lines.push(Line::from(vec![
        Span::styled(app.status.label(), status_style(app.status)),
        Span::raw(format!("  applied {}", format_date(&app.applied_at))),
    ]));
    lines.push(Line::from(format!("Year {}   CGPA: {}", s.year, s.cgpa_label())));

    if !s.skills.is_empty() {
        let mut skills = s.skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        if s.skills.len() > 3 {
            skills.push_str(&format!("  +{} more", s.skills.len() - 3));
        }
        lines.push(Line::from(format!("Skills: {}", skills)));
    }
    if let Some(url) = &s.resume_url {
        lines.push(Line::from(format!("Resume: {}", url)));
    }

    lines.push(Line::from(""));
    if app.status == ApplicationStatus::Pending {
        lines.push(Line::from(Span::styled(
            "a: accept   x: reject",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(Span::styled(
        "enter: full profile",
        Style::default().fg(Color::DarkGray),
    )));
    Text::from(lines)
}

fn draw_profile(frame: &mut Frame, state: &AppState, area: Rect) {
    let View::Profile { student, .. } = state.dashboard.view() else {
        return;
    };
    let status = state.current_application().map(|a| a.status);
    frame.render_widget(
        Paragraph::new(profile_detail(student, status))
            .block(Block::default().borders(Borders::ALL).title(" Profile "))
            .wrap(Wrap { trim: false })
            .scroll((state.scroll_offset, 0)),
        area,
    );
}

fn profile_detail(student: &StudentProfile, status: Option<ApplicationStatus>) -> Text<'_> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(format!("[{}] ", student.initials()), Style::default().fg(Color::Cyan)),
        Span::styled(student.full_name(), bold),
    ]));
    lines.push(Line::from(format!("{} • Year {}", student.course, student.year)));
    lines.push(Line::from(student.college.clone()));
    lines.push(Line::from(format!("CGPA: {}", student.cgpa_label())));
    if let Some(status) = status {
        lines.push(Line::from(Span::styled(
            format!("Application: {}", status.label()),
            status_style(status),
        )));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Contact Information", bold)));
    lines.push(Line::from(format!(
        "  Email: {}",
        student.email.as_deref().unwrap_or("-")
    )));
    if let Some(phone) = &student.phone {
        lines.push(Line::from(format!("  Phone: {}", phone)));
    }
    lines.push(Line::from(""));

    if !student.skills.is_empty() {
        lines.push(Line::from(Span::styled("Skills", bold)));
        for line in textwrap::fill(&student.skills.join(", "), 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    let links = student.links();
    if !links.is_empty() || student.profile_pic.is_some() {
        lines.push(Line::from(Span::styled("Links", bold)));
        for (label, url) in links {
            lines.push(Line::from(format!("  {}: {}", label, url)));
        }
        if let Some(photo) = &student.profile_pic {
            lines.push(Line::from(format!("  Photo: {}", photo)));
        }
    }
    Text::from(lines)
}
