mod api;
mod config;
mod dashboard;
mod error;
mod models;
mod notice;
mod search;
mod session;
mod tui;

use anyhow::{Context, Result, anyhow, bail};
use api::{HttpApiClient, RecruiterApi};
use clap::{Parser, Subcommand};
use config::Config;
use dashboard::{Dashboard, View};
use models::{ApplicationStatus, format_date, format_stipend, pluralize_applications, truncate};
use notice::NoticeLevel;
use search::{
    CandidateFilter, SearchInput, SearchMode, application_haystack, job_haystack, rank_matches,
};
use session::{Gate, Role, SessionStore, StoredSession, User, gate};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "recruit")]
#[command(about = "Recruiter dashboard - review job posts, applicants and candidate profiles")]
struct Cli {
    /// API base URL (overrides RECRUIT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a session for later commands
    Login {
        /// User ID issued by the platform
        user_id: String,

        /// Account email
        email: String,

        /// Role (RECRUITER, BOTH, STUDENT, ...)
        #[arg(short, long, default_value = "RECRUITER")]
        role: String,

        /// Bearer token for API requests
        #[arg(short, long, env = "RECRUIT_TOKEN")]
        token: Option<String>,
    },

    /// Remove the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// List your job posts
    Jobs,

    /// List applications for a job post
    Applications {
        /// Job ID
        job_id: String,
    },

    /// Show a candidate profile
    Student {
        /// Job ID the candidate applied to
        job_id: String,

        /// Student ID
        student_id: String,
    },

    /// Accept a pending application
    Accept {
        /// Application ID
        application_id: String,
    },

    /// Reject a pending application
    Reject {
        /// Application ID
        application_id: String,
    },

    /// Set an application's status (pending, accepted, rejected, under_review)
    Status {
        /// Application ID
        application_id: String,

        /// New status
        status: ApplicationStatus,
    },

    /// Search job posts, or a job's applicants with --job
    Search {
        /// Search text
        text: Vec<String>,

        /// Candidate filter, e.g. "skills: rust, go; college: IIT; year: 3"
        #[arg(short, long)]
        filter: Option<String>,

        /// Fuzzy matching, ranked by relevance
        #[arg(short, long)]
        reasoning: bool,

        /// Search this job's applicants instead of job posts
        #[arg(short, long)]
        job: Option<String>,
    },

    /// Browse jobs and applicants interactively
    Browse,
}

/// Resolves the stored session through the recruiter gate.
fn require_recruiter(store: &SessionStore) -> Result<StoredSession> {
    let state = store
        .load()
        .with_context(|| format!("Failed to read session from {}", store.path().display()))?;
    match gate(&state) {
        Gate::Allow(session) => Ok(session.clone()),
        Gate::Redirect(route) => Err(anyhow!(
            "Recruiter access required; continue at {} (try `recruit login`)",
            route.path()
        )),
        Gate::Wait => Err(anyhow!("Session is not ready yet")),
    }
}

fn connect(config: &Config, session: &StoredSession) -> Result<Dashboard> {
    let client = HttpApiClient::new(&config.api_url, session.token.clone(), config.timeout)
        .context("Failed to create API client")?;
    let api: Arc<dyn RecruiterApi> = Arc::new(client);
    Ok(Dashboard::new(api, session.user.id.clone()))
}

/// Turns the dashboard's last notice into process output.
fn report(dashboard: &Dashboard) -> Result<()> {
    match dashboard.notice() {
        Some(notice) if notice.level == NoticeLevel::Error => Err(anyhow!("{}", notice.message)),
        Some(notice) => {
            println!("{}", notice.message);
            Ok(())
        }
        None => Ok(()),
    }
}

async fn load(dashboard: &mut Dashboard) -> Result<()> {
    dashboard.load().await;
    report(dashboard)
}

async fn open_job(dashboard: &mut Dashboard, job_id: &str) -> Result<()> {
    load(dashboard).await?;
    open_loaded_job(dashboard, job_id).await
}

async fn open_loaded_job(dashboard: &mut Dashboard, job_id: &str) -> Result<()> {
    if !dashboard.jobs().iter().any(|j| j.id == job_id) {
        bail!("Job {} not found.", job_id);
    }
    if !dashboard.open_job(job_id).await {
        report(dashboard)?;
        bail!("Could not open job {}", job_id);
    }
    Ok(())
}

/// Opens the job an application belongs to, so the update can be issued
/// from its applications pane.
async fn open_application(dashboard: &mut Dashboard, application_id: &str) -> Result<()> {
    load(dashboard).await?;
    if !dashboard.open_application(application_id).await {
        report(dashboard)?;
        bail!("Application {} not found.", application_id);
    }
    Ok(())
}

async fn set_status(
    dashboard: &mut Dashboard,
    application_id: &str,
    status: ApplicationStatus,
) -> Result<()> {
    open_application(dashboard, application_id).await?;
    let current = dashboard
        .view()
        .applications()
        .iter()
        .find(|a| a.id == application_id)
        .map(|a| a.status);
    if let Some(current) = current.filter(|c| !c.can_move_to(status)) {
        bail!(
            "Application {} is already {}; only pending applications can be accepted or rejected",
            application_id,
            current.label()
        );
    }
    dashboard.update_status(application_id, status).await;
    report(dashboard)
}

fn print_jobs(dashboard: &Dashboard, indices: &[usize], empty: &str) {
    let jobs = dashboard.jobs();
    if indices.is_empty() {
        println!("{}", empty);
        return;
    }
    println!(
        "{:<26} {:<9} {:<30} {:<16} {:>12} {:>6}",
        "ID", "STATUS", "TITLE", "LOCATION", "STIPEND", "APPS"
    );
    println!("{}", "-".repeat(104));
    for job in indices.iter().filter_map(|&i| jobs.get(i)) {
        println!(
            "{:<26} {:<9} {:<30} {:<16} {:>12} {:>6}",
            truncate(&job.id, 24),
            job.status.to_string(),
            truncate(&job.title, 28),
            truncate(&job.location, 14),
            job.stipend.map(format_stipend).unwrap_or_else(|| "-".to_string()),
            job.applications
        );
    }
}

fn print_applications(dashboard: &Dashboard, indices: &[usize], empty: &str) {
    let applications = dashboard.view().applications();
    if indices.is_empty() {
        println!("{}", empty);
        return;
    }
    println!(
        "{:<26} {:<13} {:<24} {:<22} {:>5} {:<12}",
        "ID", "STATUS", "CANDIDATE", "COLLEGE", "CGPA", "APPLIED"
    );
    println!("{}", "-".repeat(107));
    for app in indices.iter().filter_map(|&i| applications.get(i)) {
        println!(
            "{:<26} {:<13} {:<24} {:<22} {:>5} {:<12}",
            truncate(&app.id, 24),
            app.status.label(),
            truncate(&app.student.full_name(), 22),
            truncate(&app.student.college, 20),
            app.student.cgpa_label(),
            format_date(&app.applied_at)
        );
    }
}

fn print_profile(dashboard: &Dashboard) {
    let View::Profile {
        student,
        applications,
        ..
    } = dashboard.view()
    else {
        return;
    };
    println!("{} ({})", student.full_name(), student.initials());
    println!("{} • Year {}", student.course, student.year);
    println!("College: {}", student.college);
    println!("CGPA: {}", student.cgpa_label());
    if let Some(app) = applications.iter().find(|a| a.student.id == student.id) {
        println!("Application: {} ({})", app.status.label(), app.id);
    }
    if let Some(email) = &student.email {
        println!("Email: {}", email);
    }
    if let Some(phone) = &student.phone {
        println!("Phone: {}", phone);
    }
    if !student.skills.is_empty() {
        println!("Skills: {}", student.skills.join(", "));
    }
    for (label, url) in student.links() {
        println!("{}: {}", label, url);
    }
    if let Some(photo) = &student.profile_pic {
        println!("Photo: {}", photo);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    config::init_logging(&config)?;
    let store = SessionStore::open()?;

    match cli.command {
        Commands::Login {
            user_id,
            email,
            role,
            token,
        } => {
            let session = StoredSession {
                user: User {
                    id: user_id,
                    email,
                    role: Role::from(role),
                },
                token,
            };
            store.save(&session)?;
            info!(user = %session.user.id, "signed in");
            println!(
                "Signed in as {} ({}). Session saved to {}",
                session.user.email,
                String::from(session.user.role.clone()),
                store.path().display()
            );
            if !session.user.role.can_recruit() {
                println!("Note: this role cannot use the recruiter dashboard.");
            }
        }

        Commands::Logout => {
            if store.clear()? {
                println!("Signed out.");
            } else {
                println!("No session to remove.");
            }
        }

        Commands::Whoami => {
            let session = require_recruiter(&store)?;
            println!("User: {}", session.user.id);
            println!("Email: {}", session.user.email);
            println!("Role: {}", String::from(session.user.role));
            println!("API: {}", config.api_url);
        }

        Commands::Jobs => {
            let session = require_recruiter(&store)?;
            let mut dashboard = connect(&config, &session)?;
            load(&mut dashboard).await?;
            if let Some(company) = dashboard.recruiter().and_then(|r| r.company_name.as_deref()) {
                println!("{}\n", company);
            }
            let all: Vec<usize> = (0..dashboard.jobs().len()).collect();
            print_jobs(&dashboard, &all, "No job posts yet.");
        }

        Commands::Applications { job_id } => {
            let session = require_recruiter(&store)?;
            let mut dashboard = connect(&config, &session)?;
            open_job(&mut dashboard, &job_id).await?;
            if let Some(job) = dashboard.view().selected_job() {
                let count = dashboard.view().applications().len();
                println!("Applications for {}", job.title);
                println!("{} received\n", pluralize_applications(count));
            }
            let all: Vec<usize> = (0..dashboard.view().applications().len()).collect();
            print_applications(&dashboard, &all, "No applications yet.");
        }

        Commands::Student { job_id, student_id } => {
            let session = require_recruiter(&store)?;
            let mut dashboard = connect(&config, &session)?;
            open_job(&mut dashboard, &job_id).await?;
            if !dashboard.open_student(&student_id) {
                bail!("Student {} has not applied to job {}.", student_id, job_id);
            }
            print_profile(&dashboard);
        }

        Commands::Accept { application_id } => {
            let session = require_recruiter(&store)?;
            let mut dashboard = connect(&config, &session)?;
            set_status(&mut dashboard, &application_id, ApplicationStatus::Accepted).await?;
        }

        Commands::Reject { application_id } => {
            let session = require_recruiter(&store)?;
            let mut dashboard = connect(&config, &session)?;
            set_status(&mut dashboard, &application_id, ApplicationStatus::Rejected).await?;
        }

        Commands::Status {
            application_id,
            status,
        } => {
            let session = require_recruiter(&store)?;
            let mut dashboard = connect(&config, &session)?;
            set_status(&mut dashboard, &application_id, status).await?;
        }

        Commands::Search {
            text,
            filter,
            reasoning,
            job,
        } => {
            let session = require_recruiter(&store)?;
            let mut search = SearchInput::default();
            search.set_value(text.join(" "));
            if let Some(filter) = filter {
                search.set_filter(CandidateFilter::parse(&filter));
            }
            if reasoning {
                search.toggle_mode();
            }

            let mut request: Option<(String, SearchMode)> = None;
            if !search.submit(|query, mode| request = Some((query, mode))) {
                bail!("Nothing to search for; pass search text or --filter");
            }
            let Some((query, mode)) = request else {
                return Ok(());
            };
            info!(%query, ?mode, "search");

            let mut dashboard = connect(&config, &session)?;
            match job {
                Some(job_id) => {
                    open_job(&mut dashboard, &job_id).await?;
                    let haystacks: Vec<String> = dashboard
                        .view()
                        .applications()
                        .iter()
                        .map(application_haystack)
                        .collect();
                    print_applications(
                        &dashboard,
                        &rank_matches(&haystacks, &query, mode),
                        "No matching candidates.",
                    );
                }
                None => {
                    load(&mut dashboard).await?;
                    let haystacks: Vec<String> = dashboard
                        .jobs()
                        .iter()
                        .map(job_haystack)
                        .collect();
                    print_jobs(
                        &dashboard,
                        &rank_matches(&haystacks, &query, mode),
                        "No matching job posts.",
                    );
                }
            }
        }

        Commands::Browse => {
            let session = require_recruiter(&store)?;
            let dashboard = connect(&config, &session)?;
            tui::run_browse(dashboard, session.user.email.clone()).await?;
        }
    }

    Ok(())
}
