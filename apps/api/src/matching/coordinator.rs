//! Match coordinator: the single owner of the session.
//!
//! All mutations go through here. A matching run holds the `matching` flag
//! for its whole duration; the session mutex is only taken for short,
//! synchronous sections and never across an `.await`. Each mutation and its
//! store writes run under `writes`, so the store always ends up holding the
//! most recent session state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::orchestrator::BatchOrchestrator;
use crate::matching::session::{RankingPage, Session};
use crate::models::job::{validate_job_set, JobPosting, MatchResult};
use crate::models::language::{spoken_or_default, LanguageSet};
use crate::models::resume::ResumeProfile;
use crate::store::SessionStore;

pub struct MatchCoordinator {
    session: Mutex<Session>,
    matching: AtomicBool,
    writes: tokio::sync::Mutex<()>,
    orchestrator: BatchOrchestrator,
    store: SessionStore,
}

/// Holds the in-progress flag; releases it on drop, early returns included.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl MatchCoordinator {
    /// Rebuilds the session from the store.
    pub async fn restore(
        orchestrator: BatchOrchestrator,
        store: SessionStore,
    ) -> Result<Self, AppError> {
        let persisted = store.load().await?;
        let session = Session::from_persisted(persisted);
        info!(
            "Session restored: resume={}, jobs={}, rankings={}, cursor={}",
            session.resume().is_some(),
            session.jobs().len(),
            session.snapshot().len(),
            session.display_cursor()
        );
        Ok(Self {
            session: Mutex::new(session),
            matching: AtomicBool::new(false),
            writes: tokio::sync::Mutex::new(()),
            orchestrator,
            store,
        })
    }

    pub fn is_matching(&self) -> bool {
        self.matching.load(Ordering::Acquire)
    }

    pub fn resume(&self) -> Option<ResumeProfile> {
        self.session().resume().cloned()
    }

    pub fn job_count(&self) -> usize {
        self.session().jobs().len()
    }

    pub async fn set_resume(&self, profile: ResumeProfile) {
        let _writes = self.writes.lock().await;
        self.session().set_resume(profile.clone());
        if let Err(e) = self.store.save_resume(Some(&profile)).await {
            warn!("Failed to persist resume: {e}");
        }
    }

    /// Replaces the active job set and discards the current rankings.
    pub async fn set_job_set(&self, jobs: Vec<JobPosting>) -> Result<(), AppError> {
        validate_job_set(&jobs)?;
        let count = jobs.len();
        let _writes = self.writes.lock().await;
        self.session().set_job_set(jobs.clone());
        info!("Job set replaced with {count} postings");
        self.persist_jobs_and_rankings(&jobs).await;
        Ok(())
    }

    /// Called when the extraction agent moves to a new results page.
    pub async fn clear(&self) {
        let _writes = self.writes.lock().await;
        self.session().clear();
        info!("Job set and rankings cleared");
        self.persist_jobs_and_rankings(&[]).await;
    }

    /// Clears everything, resume included.
    pub async fn reset(&self) {
        let _writes = self.writes.lock().await;
        self.session().reset();
        info!("Session reset");
        if let Err(e) = self.store.save_resume(None).await {
            warn!("Failed to clear persisted resume: {e}");
        }
        self.persist_jobs_and_rankings(&[]).await;
    }

    /// Scores the entire active job set and reveals the first page.
    ///
    /// Fails fast with `AlreadyInProgress` instead of queueing. `spoken`
    /// overrides the resume's declared languages for this run only.
    pub async fn start_matching(
        &self,
        display_batch_size: usize,
        spoken: Option<LanguageSet>,
    ) -> Result<RankingPage, AppError> {
        let _guard = RunGuard::acquire(&self.matching).ok_or(AppError::AlreadyInProgress)?;

        let (resume, jobs, generation) = {
            let session = self.session();
            let resume = session.resume().cloned().ok_or(AppError::NoResume)?;
            if session.jobs().is_empty() {
                return Err(AppError::NoJobs);
            }
            (resume, session.jobs().to_vec(), session.generation())
        };

        let spoken = spoken_or_default(spoken.unwrap_or_else(|| resume.spoken_languages.clone()));
        let run_id = Uuid::new_v4();
        info!(
            "Matching run {run_id} started: {} jobs, spoken={:?}",
            jobs.len(),
            spoken
        );

        let snapshot = self.orchestrator.rank(&resume.raw_text, &jobs, &spoken).await;

        let _writes = self.writes.lock().await;
        let (page, stored) = {
            let mut session = self.session();
            if session.generation() != generation {
                warn!("Matching run {run_id} discarded: job set changed during the run");
                return Err(AppError::JobSetChanged);
            }
            let page = session.install_snapshot(snapshot, display_batch_size);
            (page, session.snapshot().to_vec())
        };

        info!(
            "Matching run {run_id} finished: {} ranked, {} revealed",
            stored.len(),
            page.rankings.len()
        );
        self.persist_rankings(&stored, page.pagination.ranked).await;

        Ok(page)
    }

    pub async fn reveal_more(&self, page_size: usize) -> RankingPage {
        let _writes = self.writes.lock().await;
        let (page, snapshot, cursor) = {
            let mut session = self.session();
            let page = session.reveal_more(page_size);
            (page, session.snapshot().to_vec(), session.display_cursor())
        };
        if !page.rankings.is_empty() {
            self.persist_rankings(&snapshot, cursor).await;
        }
        page
    }

    pub fn current_page(&self) -> RankingPage {
        self.session().current_page()
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn persist_jobs_and_rankings(&self, jobs: &[JobPosting]) {
        if let Err(e) = self.store.save_jobs(jobs).await {
            warn!("Failed to persist job set: {e}");
        }
        self.persist_rankings(&[], 0).await;
    }

    async fn persist_rankings(&self, snapshot: &[MatchResult], cursor: usize) {
        if let Err(e) = self.store.save_rankings(snapshot, cursor).await {
            warn!("Failed to persist rankings: {e}");
        }
    }
}
