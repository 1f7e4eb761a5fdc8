use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::api::RecruiterApi;
use crate::error::ApiError;
use crate::models::{
    Application, ApplicationStatus, JobPost, RawApplication, RecruiterProfile, StudentProfile,
};
use crate::notice::Notice;

/// Which pane is on screen, together with the data only that pane owns.
#[derive(Debug, Clone, Default)]
pub enum View {
    #[default]
    Jobs,
    Applications {
        job: JobPost,
        applications: Vec<Application>,
    },
    Profile {
        job: JobPost,
        applications: Vec<Application>,
        student: StudentProfile,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Jobs,
    Applications,
    Profile,
}

impl View {
    pub fn mode(&self) -> ViewMode {
        match self {
            View::Jobs => ViewMode::Jobs,
            View::Applications { .. } => ViewMode::Applications,
            View::Profile { .. } => ViewMode::Profile,
        }
    }

    pub fn selected_job(&self) -> Option<&JobPost> {
        match self {
            View::Jobs => None,
            View::Applications { job, .. } | View::Profile { job, .. } => Some(job),
        }
    }

    pub fn applications(&self) -> &[Application] {
        match self {
            View::Jobs => &[],
            View::Applications { applications, .. } | View::Profile { applications, .. } => {
                applications
            }
        }
    }

    fn applications_mut(&mut self) -> Option<&mut Vec<Application>> {
        match self {
            View::Jobs => None,
            View::Applications { applications, .. } | View::Profile { applications, .. } => {
                Some(applications)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Load,
    Applications,
    Update,
}

impl Failure {
    pub fn message(&self) -> &'static str {
        match self {
            Failure::Load => "Failed to load data. Please try again.",
            Failure::Applications => "Failed to load applications. Please try again.",
            Failure::Update => "Failed to update application status. Please try again.",
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Loaded {
        profile: RecruiterProfile,
        jobs: Vec<JobPost>,
    },
    /// `job_id` is `None` when the requested application wasn't found.
    Applications {
        job_id: Option<String>,
        applications: Vec<Application>,
    },
    StatusUpdated {
        application_id: String,
        status: ApplicationStatus,
    },
}

#[derive(Debug)]
pub struct Completion {
    ticket: u64,
    result: Result<Outcome, (Failure, ApiError)>,
}

/// What the dashboard is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    LoadingJobs,
    LoadingApplications,
    UpdatingStatus,
}

/// An issued request. Owns everything it needs, so it can be awaited while the
/// dashboard keeps being drawn. Dropping it abandons the request.
pub struct Pending {
    ticket: u64,
    future: BoxFuture<'static, Completion>,
}

impl Pending {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Future for Pending {
    type Output = Completion;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Completion> {
        self.future.as_mut().poll(cx)
    }
}

pub struct Dashboard {
    api: Arc<dyn RecruiterApi>,
    user_id: String,
    recruiter: Option<RecruiterProfile>,
    jobs: Vec<JobPost>,
    view: View,
    /// At most one read is live; a newer one supersedes it.
    read: Option<(u64, Activity)>,
    /// Every sent mutation is committed when it lands.
    mutations: Vec<u64>,
    next_ticket: u64,
    notice: Option<Notice>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn RecruiterApi>, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            recruiter: None,
            jobs: Vec::new(),
            view: View::Jobs,
            read: None,
            mutations: Vec::new(),
            next_ticket: 1,
            notice: None,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn jobs(&self) -> &[JobPost] {
        &self.jobs
    }

    pub fn recruiter(&self) -> Option<&RecruiterProfile> {
        self.recruiter.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.activity().is_some()
    }

    pub fn activity(&self) -> Option<Activity> {
        match self.read {
            Some((_, activity)) => Some(activity),
            None if !self.mutations.is_empty() => Some(Activity::UpdatingStatus),
            None => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_expired_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
    }

    fn issue(&mut self, activity: Activity) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        if activity == Activity::UpdatingStatus {
            self.mutations.push(ticket);
        } else if let Some((stale, _)) = self.read.replace((ticket, activity)) {
            debug!(stale, ticket, "superseding in-flight request");
        }
        ticket
    }

    // --- Requests ---

    /// Recruiter profile for the signed-in user, then that recruiter's jobs.
    pub fn request_load(&mut self) -> Pending {
        let ticket = self.issue(Activity::LoadingJobs);
        let api = Arc::clone(&self.api);
        let user_id = self.user_id.clone();
        let future = async move {
            let result = async {
                let profile = api.get_recruiter_profile(&user_id).await?;
                let jobs = api.get_recruiter_jobs(&profile.id).await?;
                Ok::<_, ApiError>(Outcome::Loaded {
                    jobs: jobs.into_iter().map(JobPost::from).collect(),
                    profile,
                })
            }
            .await
            .map_err(|e| (Failure::Load, e));
            Completion { ticket, result }
        }
        .boxed();
        Pending { ticket, future }
    }

    /// Jobs pane only. The API has no per-job endpoint, so every application
    /// for the recruiter is fetched and narrowed to `job_id` here.
    pub fn request_open_job(&mut self, job_id: &str) -> Option<Pending> {
        if !self.jobs.iter().any(|j| j.id == job_id) {
            return None;
        }
        let job_id = job_id.to_string();
        self.request_applications(move |_| Some(job_id))
    }

    /// Jobs pane only. Opens whichever job `application_id` was submitted to,
    /// resolved from the same single fetch.
    pub fn request_open_application(&mut self, application_id: &str) -> Option<Pending> {
        let application_id = application_id.to_string();
        self.request_applications(move |all| {
            all.iter()
                .find(|a| a.id == application_id)
                .map(|a| a.job.id.clone())
        })
    }

    fn request_applications<F>(&mut self, pick_job: F) -> Option<Pending>
    where
        F: FnOnce(&[RawApplication]) -> Option<String> + Send + 'static,
    {
        if self.view.mode() != ViewMode::Jobs {
            return None;
        }
        let Some(recruiter_id) = self.recruiter.as_ref().map(|r| r.id.clone()) else {
            error!("cannot load applications before the recruiter profile");
            self.notice = Some(Notice::error(Failure::Applications.message()));
            return None;
        };

        let ticket = self.issue(Activity::LoadingApplications);
        let api = Arc::clone(&self.api);
        let future = async move {
            let result = api
                .get_recruiter_applications(&recruiter_id)
                .await
                .map(|all| {
                    let job_id = pick_job(&all);
                    let applications = match &job_id {
                        Some(id) => all
                            .into_iter()
                            .filter(|app| &app.job.id == id)
                            .map(Application::from)
                            .collect(),
                        None => Vec::new(),
                    };
                    Outcome::Applications {
                        job_id,
                        applications,
                    }
                })
                .map_err(|e| (Failure::Applications, e));
            Completion { ticket, result }
        }
        .boxed();
        Some(Pending { ticket, future })
    }

    /// The local copy is only patched once the server accepts the change.
    pub fn request_update_status(
        &mut self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Option<Pending> {
        if !self.view.applications().iter().any(|a| a.id == application_id) {
            return None;
        }

        let ticket = self.issue(Activity::UpdatingStatus);
        let api = Arc::clone(&self.api);
        let application_id = application_id.to_string();
        let future = async move {
            let result = api
                .update_application_status(&application_id, status)
                .await
                .map(|()| Outcome::StatusUpdated {
                    application_id,
                    status,
                })
                .map_err(|e| (Failure::Update, e));
            Completion { ticket, result }
        }
        .boxed();
        Some(Pending { ticket, future })
    }

    // --- Commit ---

    /// Commits a finished request. Returns false when the completion was
    /// a stale read (cancelled or superseded) and nothing changed.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let ticket = completion.ticket;
        if let Some(pos) = self.mutations.iter().position(|t| *t == ticket) {
            self.mutations.remove(pos);
        } else if self.read.is_some_and(|(live, _)| live == ticket) {
            self.read = None;
        } else {
            debug!(ticket, "discarding stale completion");
            return false;
        }

        match completion.result {
            Ok(outcome) => self.commit(outcome),
            Err((failure, err)) => {
                error!(error = %err, "{}", failure.message());
                self.notice = Some(Notice::error(failure.message()));
            }
        }
        true
    }

    fn commit(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Loaded { profile, jobs } => {
                info!(recruiter = %profile.id, jobs = jobs.len(), "loaded job posts");
                self.recruiter = Some(profile);
                self.jobs = jobs;
            }
            Outcome::Applications {
                job_id,
                applications,
            } => {
                if self.view.mode() != ViewMode::Jobs {
                    return;
                }
                let Some(job) = job_id
                    .and_then(|id| self.jobs.iter().find(|j| j.id == id))
                    .cloned()
                else {
                    debug!("no job to open");
                    return;
                };
                info!(job = %job.id, count = applications.len(), "loaded applications");
                self.view = View::Applications { job, applications };
            }
            Outcome::StatusUpdated {
                application_id,
                status,
            } => {
                if let Some(app) = self
                    .view
                    .applications_mut()
                    .and_then(|apps| apps.iter_mut().find(|a| a.id == application_id))
                {
                    app.status = status;
                }
                info!(application = %application_id, status = status.as_wire(), "status updated");
                self.notice = Some(Notice::success(format!(
                    "Application {} successfully.",
                    status.label()
                )));
            }
        }
    }

    /// Drops interest in an in-flight read. Mutations can't be recalled once
    /// sent, so their completion is still applied.
    pub fn cancel(&mut self) -> bool {
        match self.read.take() {
            Some((ticket, _)) => {
                debug!(ticket, "cancelled request");
                true
            }
            None => false,
        }
    }

    /// Awaits a request and commits it.
    pub async fn run(&mut self, pending: Pending) -> bool {
        let completion = pending.await;
        self.apply(completion)
    }

    pub async fn load(&mut self) {
        let pending = self.request_load();
        self.run(pending).await;
    }

    pub async fn open_job(&mut self, job_id: &str) -> bool {
        match self.request_open_job(job_id) {
            Some(pending) => self.run(pending).await && self.view.mode() == ViewMode::Applications,
            None => false,
        }
    }

    pub async fn open_application(&mut self, application_id: &str) -> bool {
        match self.request_open_application(application_id) {
            Some(pending) => self.run(pending).await && self.view.mode() == ViewMode::Applications,
            None => false,
        }
    }

    pub async fn update_status(&mut self, application_id: &str, status: ApplicationStatus) -> bool {
        match self.request_update_status(application_id, status) {
            Some(pending) => {
                self.run(pending).await;
                self.view
                    .applications()
                    .iter()
                    .any(|a| a.id == application_id && a.status == status)
            }
            None => false,
        }
    }

    // --- Navigation ---

    /// Applications pane only. Served from the already-fetched list.
    pub fn open_student(&mut self, student_id: &str) -> bool {
        let View::Applications { applications, .. } = &self.view else {
            return false;
        };
        let Some(student) = applications
            .iter()
            .find(|a| a.student.id == student_id)
            .map(|a| a.student.clone())
        else {
            return false;
        };
        if let View::Applications { job, applications } = std::mem::take(&mut self.view) {
            self.view = View::Profile {
                job,
                applications,
                student,
            };
        }
        true
    }

    pub fn back(&mut self) {
        self.cancel();
        self.view = match std::mem::take(&mut self.view) {
            View::Profile {
                job, applications, ..
            } => View::Applications { job, applications },
            View::Applications { .. } | View::Jobs => View::Jobs,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::models::RawJob;
    use crate::notice::NoticeLevel;
    use std::sync::atomic::Ordering;

    fn raw_job(id: &str, title: &str) -> RawJob {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "type": "INTERNSHIP",
            "location": "Pune",
            "status": "ACTIVE",
            "createdAt": "2026-09-01T00:00:00Z",
            "_count": { "applications": 1 }
        }))
        .unwrap()
    }

    fn raw_application(id: &str, job_id: &str, student_id: &str, first: &str) -> RawApplication {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "status": "PENDING",
            "appliedAt": "2026-09-02T00:00:00Z",
            "student": {
                "id": student_id,
                "firstName": first,
                "lastName": "Shah",
                "college": "IIT Bombay",
                "course": "B.Tech",
                "year": "4",
                "cgpa": 9.1,
                "skills": ["Rust"],
                "user": { "email": format!("{}@example.com", first.to_lowercase()) }
            },
            "job": { "id": job_id, "title": "t", "type": "INTERNSHIP", "location": "Pune" }
        }))
        .unwrap()
    }

    fn seeded() -> Arc<FakeApi> {
        let api = FakeApi::default();
        *api.profile.lock().unwrap() = Some(RecruiterProfile {
            id: "rec-1".to_string(),
            company_name: Some("Acme".to_string()),
        });
        *api.jobs.lock().unwrap() = vec![raw_job("job-1", "Backend"), raw_job("job-2", "Frontend")];
        *api.applications.lock().unwrap() = vec![
            raw_application("app-1", "job-1", "stu-1", "Meera"),
            raw_application("app-2", "job-2", "stu-2", "Kabir"),
            raw_application("app-3", "job-1", "stu-3", "Ira"),
        ];
        Arc::new(api)
    }

    async fn loaded(api: &Arc<FakeApi>) -> Dashboard {
        let mut dash = Dashboard::new(api.clone(), "user-1");
        dash.load().await;
        dash
    }

    #[tokio::test]
    async fn test_load_fetches_profile_then_jobs() {
        let api = seeded();
        let dash = loaded(&api).await;
        assert_eq!(dash.recruiter().map(|r| r.id.as_str()), Some("rec-1"));
        assert_eq!(dash.jobs().len(), 2);
        assert_eq!(dash.jobs()[0].applications, 1);
        assert_eq!(dash.view().mode(), ViewMode::Jobs);
        assert!(!dash.is_loading());
        assert_eq!(api.call_count(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_shows_notice() {
        let api = seeded();
        api.fail_reads.store(true, Ordering::SeqCst);
        let dash = loaded(&api).await;
        assert!(dash.jobs().is_empty());
        let notice = dash.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Failed to load data. Please try again.");
        assert!(!dash.is_loading());
    }

    #[tokio::test]
    async fn test_open_job_keeps_only_that_jobs_applications() {
        let api = seeded();
        let mut dash = loaded(&api).await;

        assert!(dash.open_job("job-1").await);
        assert_eq!(dash.view().mode(), ViewMode::Applications);
        assert_eq!(dash.view().selected_job().unwrap().id, "job-1");
        let apps = dash.view().applications();
        assert_eq!(apps.len(), 2);
        assert!(apps.iter().all(|a| a.job.id == "job-1"));
    }

    #[tokio::test]
    async fn test_open_job_failure_stays_on_jobs() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        api.fail_reads.store(true, Ordering::SeqCst);

        assert!(!dash.open_job("job-1").await);
        assert_eq!(dash.view().mode(), ViewMode::Jobs);
        assert_eq!(
            dash.notice().unwrap().message,
            "Failed to load applications. Please try again."
        );
    }

    #[tokio::test]
    async fn test_open_job_rejects_unknown_job_and_missing_profile() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        assert!(dash.request_open_job("job-9").is_none());

        let mut fresh = Dashboard::new(api.clone(), "user-1");
        assert!(fresh.request_open_job("job-1").is_none());
    }

    #[tokio::test]
    async fn test_open_student_uses_cached_application_without_network() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;
        let calls = api.call_count();

        assert!(dash.open_student("stu-3"));
        assert_eq!(api.call_count(), calls);
        match dash.view() {
            View::Profile { student, .. } => {
                assert_eq!(student.first_name, "Ira");
                assert_eq!(student.email.as_deref(), Some("ira@example.com"));
            }
            other => panic!("expected profile view, got {:?}", other.mode()),
        }
    }

    #[tokio::test]
    async fn test_open_student_ignores_unknown_student_and_wrong_pane() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        assert!(!dash.open_student("stu-1"));

        dash.open_job("job-1").await;
        assert!(!dash.open_student("stu-2"));
        assert_eq!(dash.view().mode(), ViewMode::Applications);
    }

    #[tokio::test]
    async fn test_back_unwinds_one_pane_at_a_time() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;
        dash.open_student("stu-1");

        dash.back();
        assert_eq!(dash.view().mode(), ViewMode::Applications);
        assert_eq!(dash.view().applications().len(), 2);

        dash.back();
        assert_eq!(dash.view().mode(), ViewMode::Jobs);
        assert!(dash.view().selected_job().is_none());
        assert!(dash.view().applications().is_empty());

        dash.back();
        assert_eq!(dash.view().mode(), ViewMode::Jobs);
    }

    #[tokio::test]
    async fn test_accept_commits_after_remote_success() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;

        let pending = dash
            .request_update_status("app-1", ApplicationStatus::Accepted)
            .unwrap();
        // Not patched until the server answers
        assert_eq!(dash.view().applications()[0].status, ApplicationStatus::Pending);
        assert!(dash.is_loading());

        assert!(dash.run(pending).await);
        assert_eq!(dash.view().applications()[0].status, ApplicationStatus::Accepted);
        assert_eq!(
            dash.notice().unwrap().message,
            "Application accepted successfully."
        );
    }

    #[tokio::test]
    async fn test_reject_failure_leaves_status_unchanged() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;
        api.fail_updates.store(true, Ordering::SeqCst);

        assert!(!dash.update_status("app-1", ApplicationStatus::Rejected).await);
        assert_eq!(dash.view().applications()[0].status, ApplicationStatus::Pending);
        let notice = dash.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(
            notice.message,
            "Failed to update application status. Please try again."
        );
    }

    #[tokio::test]
    async fn test_update_from_profile_pane_patches_shared_list() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;
        dash.open_student("stu-3");

        assert!(dash.update_status("app-3", ApplicationStatus::UnderReview).await);
        dash.back();
        let app = dash
            .view()
            .applications()
            .iter()
            .find(|a| a.id == "app-3")
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_completion_after_back_is_discarded() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;
        dash.back();

        let pending = dash.request_open_job("job-2").unwrap();
        dash.back(); // user navigates away before the response lands
        assert!(!dash.is_loading());

        assert!(!dash.run(pending).await);
        assert_eq!(dash.view().mode(), ViewMode::Jobs);
    }

    #[tokio::test]
    async fn test_superseded_request_is_discarded() {
        let api = seeded();
        let mut dash = loaded(&api).await;

        let first = dash.request_load();
        let second = dash.request_load();
        assert_ne!(first.ticket(), second.ticket());

        assert!(!dash.run(first).await);
        assert!(dash.is_loading());
        assert!(dash.run(second).await);
        assert!(!dash.is_loading());
    }

    #[tokio::test]
    async fn test_mutations_are_not_cancellable() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;

        let pending = dash
            .request_update_status("app-1", ApplicationStatus::Accepted)
            .unwrap();
        assert!(!dash.cancel());
        assert!(dash.run(pending).await);
        assert_eq!(dash.view().applications()[0].status, ApplicationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_back_to_back_updates_both_commit() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;

        let first = dash
            .request_update_status("app-1", ApplicationStatus::Accepted)
            .unwrap();
        let second = dash
            .request_update_status("app-3", ApplicationStatus::Rejected)
            .unwrap();

        assert!(dash.run(first).await);
        assert!(dash.is_loading());
        assert!(dash.run(second).await);
        assert!(!dash.is_loading());

        let local: Vec<_> = dash.view().applications().iter().map(|a| a.status).collect();
        let server: Vec<_> = api
            .applications
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.job.id == "job-1")
            .map(|a| a.status)
            .collect();
        assert_eq!(local, vec![ApplicationStatus::Accepted, ApplicationStatus::Rejected]);
        assert_eq!(local, server);
    }

    #[tokio::test]
    async fn test_read_does_not_supersede_pending_update() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        dash.open_job("job-1").await;

        let update = dash
            .request_update_status("app-1", ApplicationStatus::Accepted)
            .unwrap();
        let reload = dash.request_load();
        assert_eq!(dash.activity(), Some(Activity::LoadingJobs));

        assert!(dash.run(update).await);
        assert_eq!(dash.view().applications()[0].status, ApplicationStatus::Accepted);
        assert!(dash.run(reload).await);
        assert_eq!(dash.activity(), None);
    }

    #[tokio::test]
    async fn test_activity_names_the_request_in_flight() {
        let api = seeded();
        let mut dash = Dashboard::new(api.clone(), "user-1");
        assert_eq!(dash.activity(), None);

        let load = dash.request_load();
        assert_eq!(dash.activity(), Some(Activity::LoadingJobs));
        dash.run(load).await;

        let open = dash.request_open_job("job-1").unwrap();
        assert_eq!(dash.activity(), Some(Activity::LoadingApplications));
        dash.run(open).await;

        let update = dash
            .request_update_status("app-1", ApplicationStatus::UnderReview)
            .unwrap();
        assert_eq!(dash.activity(), Some(Activity::UpdatingStatus));
        dash.run(update).await;
        assert_eq!(dash.activity(), None);
    }

    #[tokio::test]
    async fn test_open_application_resolves_job_in_one_fetch() {
        let api = seeded();
        let mut dash = loaded(&api).await;
        let before = api.call_count();

        assert!(dash.open_application("app-2").await);
        assert_eq!(api.call_count(), before + 1);
        assert_eq!(dash.view().selected_job().map(|j| j.id.as_str()), Some("job-2"));
        let ids: Vec<_> = dash.view().applications().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["app-2"]);
    }

    #[tokio::test]
    async fn test_open_unknown_application_stays_on_jobs() {
        let api = seeded();
        let mut dash = loaded(&api).await;

        assert!(!dash.open_application("app-404").await);
        assert_eq!(dash.view().mode(), ViewMode::Jobs);
        assert!(!dash.is_loading());
        assert!(dash.notice().is_none());
    }
}
