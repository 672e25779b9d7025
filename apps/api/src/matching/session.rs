//! Session state and pagination over the ranking snapshot.
//!
//! Pure, synchronous state machine. `MatchCoordinator` owns one `Session`
//! behind a mutex and is the only writer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::job::{JobPosting, MatchResult};
use crate::models::resume::ResumeProfile;
use crate::store::PersistedSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Index of the first result in this page.
    pub start: usize,
    /// Requested page size.
    pub limit: usize,
    /// Results in the snapshot.
    pub total: usize,
    /// Postings scored in the run that produced the snapshot.
    pub processed: usize,
    /// Results revealed so far, this page included.
    pub ranked: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingPage {
    pub rankings: Vec<MatchResult>,
    pub pagination: Pagination,
}

/// Slices an already-sorted result list for a stateless caller.
pub fn paginate(results: &[MatchResult], start: usize, limit: usize) -> RankingPage {
    let start = start.min(results.len());
    let end = start.saturating_add(limit).min(results.len());
    RankingPage {
        rankings: results[start..end].to_vec(),
        pagination: Pagination {
            start,
            limit,
            total: results.len(),
            processed: results.len(),
            ranked: end,
            has_more: end < results.len(),
        },
    }
}

/// Invariant: `display_cursor <= snapshot.len()`.
#[derive(Debug, Default, Clone)]
pub struct Session {
    resume: Option<ResumeProfile>,
    jobs: Vec<JobPosting>,
    snapshot: Vec<MatchResult>,
    display_cursor: usize,
    /// Bumped whenever the job set is replaced or cleared.
    generation: u64,
}

impl Session {
    /// Rebuilds a session from stored state. A snapshot that mentions a job
    /// outside the stored job set is dropped along with its cursor.
    pub fn from_persisted(persisted: PersistedSession) -> Self {
        let PersistedSession {
            resume,
            jobs,
            mut snapshot,
            display_cursor,
        } = persisted;

        let ids: HashSet<&str> = jobs.iter().map(|job| job.id.as_str()).collect();
        if !snapshot.iter().all(|result| ids.contains(result.job.id.as_str())) {
            warn!(
                "Stored rankings do not match the stored job set; dropping {} results",
                snapshot.len()
            );
            snapshot.clear();
        }
        let display_cursor = display_cursor.min(snapshot.len());

        Self {
            resume,
            jobs,
            snapshot,
            display_cursor,
            generation: 0,
        }
    }

    pub fn resume(&self) -> Option<&ResumeProfile> {
        self.resume.as_ref()
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn snapshot(&self) -> &[MatchResult] {
        &self.snapshot
    }

    pub fn display_cursor(&self) -> usize {
        self.display_cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_resume(&mut self, profile: ResumeProfile) {
        self.resume = Some(profile);
    }

    /// Replaces the job set; any previous rankings are stale.
    pub fn set_job_set(&mut self, jobs: Vec<JobPosting>) {
        self.jobs = jobs;
        self.drop_rankings();
    }

    /// Empties job set, snapshot and cursor. The resume survives.
    pub fn clear(&mut self) {
        self.jobs.clear();
        self.drop_rankings();
    }

    /// Clears everything, resume included.
    pub fn reset(&mut self) {
        self.resume = None;
        self.clear();
    }

    /// Installs the snapshot of a finished run and reveals its first page.
    pub fn install_snapshot(
        &mut self,
        snapshot: Vec<MatchResult>,
        display_batch_size: usize,
    ) -> RankingPage {
        self.snapshot = snapshot;
        self.display_cursor = display_batch_size.min(self.snapshot.len());
        RankingPage {
            rankings: self.snapshot[..self.display_cursor].to_vec(),
            pagination: self.pagination(0, display_batch_size),
        }
    }

    /// Reveals the next `page_size` results. Idempotent once exhausted.
    pub fn reveal_more(&mut self, page_size: usize) -> RankingPage {
        let start = self.display_cursor;
        if start >= self.snapshot.len() {
            return RankingPage {
                rankings: vec![],
                pagination: self.pagination(start, page_size),
            };
        }
        self.display_cursor = start.saturating_add(page_size).min(self.snapshot.len());
        RankingPage {
            rankings: self.snapshot[start..self.display_cursor].to_vec(),
            pagination: self.pagination(start, page_size),
        }
    }

    /// Everything revealed so far.
    pub fn current_page(&self) -> RankingPage {
        RankingPage {
            rankings: self.snapshot[..self.display_cursor].to_vec(),
            pagination: self.pagination(0, self.display_cursor),
        }
    }

    fn pagination(&self, start: usize, limit: usize) -> Pagination {
        Pagination {
            start,
            limit,
            total: self.snapshot.len(),
            processed: self.snapshot.len(),
            ranked: self.display_cursor,
            has_more: self.display_cursor < self.snapshot.len(),
        }
    }

    fn drop_rankings(&mut self) {
        self.snapshot.clear();
        self.display_cursor = 0;
        self.generation += 1;
    }
}
