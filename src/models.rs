use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Wire types (shapes returned by the recruiting API) ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterProfile {
    pub id: String,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCount {
    #[serde(default)]
    pub applications: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJob {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub location: String,
    pub status: String, // "ACTIVE", "INACTIVE", "CLOSED", ...
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub stipend: Option<f64>,
    #[serde(rename = "_count")]
    pub count: Option<RawCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStudent {
    pub id: String,
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub college: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub course: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(default)]
    pub cgpa: Option<f64>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub profile_pic: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub user: Option<RawUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJobSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub location: String,
    pub stipend: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawApplication {
    pub id: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub student: RawStudent,
    pub job: RawJobSummary,
}

/// Incomplete student profiles send `null` for fields they never filled in.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Years come back as `"3"` from some endpoints and `3` from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Year>::deserialize(deserializer)? {
        Some(Year::Text(s)) => s,
        Some(Year::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

// --- View models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Active,
    Inactive,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Active => write!(f, "Active"),
            JobStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobPost {
    pub id: String,
    pub title: String,
    pub job_type: String,
    pub location: String,
    pub applications: u32,
    pub status: JobStatus,
    pub date_posted: Option<DateTime<Utc>>,
    pub stipend: Option<f64>,
}

impl From<RawJob> for JobPost {
    fn from(raw: RawJob) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            job_type: raw.job_type,
            location: raw.location,
            applications: raw.count.map(|c| c.applications).unwrap_or(0),
            status: if raw.status == "ACTIVE" {
                JobStatus::Active
            } else {
                JobStatus::Inactive
            },
            date_posted: raw.created_at,
            stipend: raw.stipend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    UnderReview,
}

impl ApplicationStatus {
    /// Form the API expects in mutation bodies.
    pub fn as_wire(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::UnderReview => "UNDER_REVIEW",
        }
    }

    /// Accepting or rejecting is only offered while a decision is pending;
    /// marking for review is always allowed.
    pub fn can_move_to(&self, next: ApplicationStatus) -> bool {
        match next {
            ApplicationStatus::Accepted | ApplicationStatus::Rejected => {
                *self == ApplicationStatus::Pending
            }
            ApplicationStatus::UnderReview | ApplicationStatus::Pending => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::UnderReview => "under review",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" | "accept" => Ok(ApplicationStatus::Accepted),
            "rejected" | "reject" => Ok(ApplicationStatus::Rejected),
            "under_review" | "review" => Ok(ApplicationStatus::UnderReview),
            other => Err(format!(
                "Unknown status '{}'. Use pending, accepted, rejected or under_review",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub college: String,
    pub course: String,
    pub year: String,
    pub cgpa: Option<f64>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub profile_pic: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
}

impl StudentProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Avatar fallback: first letter of each name part.
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect::<String>()
            .to_uppercase()
    }

    pub fn cgpa_label(&self) -> String {
        self.cgpa.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
    }

    /// Labelled external links, in display order.
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Resume", &self.resume_url),
            ("LinkedIn", &self.linkedin_url),
            ("GitHub", &self.github_url),
            ("Portfolio", &self.portfolio_url),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.as_deref().map(|u| (label, u)))
        .collect()
    }
}

impl From<RawStudent> for StudentProfile {
    fn from(raw: RawStudent) -> Self {
        Self {
            id: raw.id,
            first_name: raw.first_name,
            last_name: raw.last_name,
            email: raw.user.and_then(|u| u.email),
            phone: raw.phone,
            college: raw.college,
            course: raw.course,
            year: raw.year,
            cgpa: raw.cgpa,
            skills: raw.skills.unwrap_or_default(),
            resume_url: raw.resume_url,
            profile_pic: raw.profile_pic,
            linkedin_url: raw.linkedin_url,
            github_url: raw.github_url,
            portfolio_url: raw.portfolio_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub job_type: String,
    pub location: String,
    pub stipend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub id: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub student: StudentProfile,
    pub job: JobSummary,
}

impl From<RawApplication> for Application {
    fn from(raw: RawApplication) -> Self {
        Self {
            id: raw.id,
            status: raw.status,
            applied_at: raw.applied_at,
            student: raw.student.into(),
            job: JobSummary {
                id: raw.job.id,
                title: raw.job.title,
                job_type: raw.job.job_type,
                location: raw.job.location,
                stipend: raw.job.stipend,
            },
        }
    }
}

// --- Display helpers shared by the CLI and the TUI ---

pub fn pluralize_applications(count: usize) -> String {
    if count == 1 {
        "1 application".to_string()
    } else {
        format!("{} applications", count)
    }
}

/// Rupee amount rounded to whole units with comma grouping, e.g. `₹15,000`.
pub fn format_stipend(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%d %b %Y").to_string()
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_JOB: &str = r#"{
        "id": "job-1",
        "title": "Backend Intern",
        "type": "INTERNSHIP",
        "location": "Bengaluru",
        "status": "ACTIVE",
        "createdAt": "2026-09-01T10:00:00Z",
        "stipend": 15000,
        "_count": { "applications": 4 }
    }"#;

    const RAW_APPLICATION: &str = r#"{
        "id": "app-1",
        "status": "UNDER_REVIEW",
        "appliedAt": "2026-09-03T08:30:00Z",
        "student": {
            "id": "stu-1",
            "firstName": "Asha",
            "lastName": "Rao",
            "college": "NIT Trichy",
            "course": "B.Tech CSE",
            "year": 3,
            "cgpa": 8.7,
            "skills": ["Rust", "SQL"],
            "resumeUrl": "https://files.example/asha.pdf",
            "user": { "email": "asha@example.com" }
        },
        "job": {
            "id": "job-1",
            "title": "Backend Intern",
            "type": "INTERNSHIP",
            "location": "Bengaluru"
        }
    }"#;

    #[test]
    fn test_job_post_from_raw() {
        let raw: RawJob = serde_json::from_str(RAW_JOB).unwrap();
        let job = JobPost::from(raw);
        assert_eq!(job.applications, 4);
        assert_eq!(job.status, JobStatus::Active);
        assert_eq!(job.stipend, Some(15000.0));
        assert_eq!(job.date_posted.map(|d| format_date(&d)).as_deref(), Some("01 Sep 2026"));
    }

    #[test]
    fn test_job_post_defaults_missing_count_and_inactive_status() {
        let raw: RawJob = serde_json::from_str(
            r#"{"id":"j","title":"t","type":"FULL_TIME","location":"Remote",
                "status":"CLOSED","createdAt":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let job = JobPost::from(raw);
        assert_eq!(job.applications, 0);
        assert_eq!(job.status, JobStatus::Inactive);
        assert_eq!(job.stipend, None);
    }

    #[test]
    fn test_application_from_raw_pulls_nested_email() {
        let raw: RawApplication = serde_json::from_str(RAW_APPLICATION).unwrap();
        let app = Application::from(raw);
        assert_eq!(app.status, ApplicationStatus::UnderReview);
        assert_eq!(app.student.email.as_deref(), Some("asha@example.com"));
        assert_eq!(app.student.year, "3");
        assert_eq!(app.student.skills, vec!["Rust", "SQL"]);
        assert_eq!(app.job.id, "job-1");
        assert_eq!(app.student.initials(), "AR");
        assert_eq!(app.student.links(), vec![("Resume", "https://files.example/asha.pdf")]);
    }

    #[test]
    fn test_unknown_application_status_is_rejected() {
        let bad = RAW_APPLICATION.replace("UNDER_REVIEW", "ARCHIVED");
        assert!(serde_json::from_str::<RawApplication>(&bad).is_err());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("accept".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Accepted));
        assert_eq!("REJECTED".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Rejected));
        assert_eq!("under-review".parse::<ApplicationStatus>(), Ok(ApplicationStatus::UnderReview));
        assert!("archived".parse::<ApplicationStatus>().is_err());
        assert_eq!(ApplicationStatus::UnderReview.label(), "under review");
        assert_eq!(ApplicationStatus::UnderReview.as_wire(), "UNDER_REVIEW");
    }

    #[test]
    fn test_decisions_only_from_pending() {
        use ApplicationStatus::*;
        assert!(Pending.can_move_to(Accepted));
        assert!(Pending.can_move_to(Rejected));
        assert!(!Accepted.can_move_to(Rejected));
        assert!(!Rejected.can_move_to(Accepted));
        assert!(!UnderReview.can_move_to(Accepted));
        assert!(Accepted.can_move_to(UnderReview));
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(pluralize_applications(1), "1 application");
        assert_eq!(pluralize_applications(0), "0 applications");
        assert_eq!(format_stipend(15000.0), "₹15,000");
        assert_eq!(format_stipend(1234567.4), "₹1,234,567");
        assert_eq!(format_stipend(999.0), "₹999");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Bengaluru • Remote", 10), "Bengalu...");
    }

    #[test]
    fn test_incomplete_student_still_decodes() {
        let raw: RawApplication = serde_json::from_str(
            r#"{"id":"app-9","status":"PENDING","appliedAt":"2026-09-03T08:30:00Z",
                "student":{"id":"stu-9","firstName":"Dev","lastName":null,
                           "college":null,"year":null},
                "job":{"id":"job-1","title":"t","type":"INTERNSHIP","location":"Pune"}}"#,
        )
        .unwrap();
        let app = Application::from(raw);
        assert_eq!(app.student.college, "");
        assert_eq!(app.student.course, "");
        assert_eq!(app.student.year, "");
        assert_eq!(app.student.cgpa_label(), "-");
        assert_eq!(app.student.initials(), "D");
    }

    #[test]
    fn test_job_without_created_at_decodes() {
        let raw: RawJob = serde_json::from_str(
            r#"{"id":"j","title":"t","type":"FULL_TIME","location":"Remote","status":"ACTIVE"}"#,
        )
        .unwrap();
        assert_eq!(JobPost::from(raw).date_posted, None);
    }
}
