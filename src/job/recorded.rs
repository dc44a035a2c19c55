//! Analysis provider backed by recorded results.

use super::{AnalysisProvider, AnalysisRequest, AnalysisResponse, JobStatus};
use crate::error::{Error, Result};
use crate::model::{parse_pages, Block};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Serves previously captured analysis output as a finished job.
///
/// Useful for replaying results offline and for tests. Every submitted
/// request is kept so callers can inspect what would have been sent.
#[derive(Debug, Default)]
pub struct RecordedAnalysis {
    pages: Vec<Vec<Block>>,
    pending_polls: AtomicU32,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl RecordedAnalysis {
    /// Serve `blocks` as a single page.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            pages: vec![blocks],
            ..Self::default()
        }
    }

    /// Parse recorded JSON: a block array or one or more response objects.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            pages: parse_pages(json)?,
            ..Self::default()
        })
    }

    /// Load recorded JSON from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Re-split all blocks into pages of `size` blocks.
    pub fn with_page_size(mut self, size: usize) -> Self {
        let blocks: Vec<Block> = self.pages.into_iter().flatten().collect();
        self.pages = blocks.chunks(size.max(1)).map(<[Block]>::to_vec).collect();
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        self
    }

    /// Report IN_PROGRESS for the first `polls` status checks.
    pub fn with_pending_polls(self, polls: u32) -> Self {
        self.pending_polls.store(polls, Ordering::SeqCst);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Total number of recorded blocks.
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

impl AnalysisProvider for RecordedAnalysis {
    fn start_analysis(&self, request: &AnalysisRequest) -> Result<String> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| Error::Provider("request log poisoned".to_string()))?;
        requests.push(request.clone());
        Ok(format!("recorded-{}", requests.len()))
    }

    fn get_analysis(&self, job_id: &str, next_token: Option<&str>) -> Result<AnalysisResponse> {
        if next_token.is_none()
            && self
                .pending_polls
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Ok(AnalysisResponse::status(JobStatus::InProgress));
        }

        let page: usize = match next_token {
            Some(token) => token
                .parse()
                .map_err(|_| Error::Provider(format!("invalid token {} for {}", token, job_id)))?,
            None => 0,
        };
        let blocks = self.pages.get(page).cloned().ok_or_else(|| {
            Error::Provider(format!("page {} out of range for {}", page, job_id))
        })?;
        let next_token = (page + 1 < self.pages.len()).then(|| (page + 1).to_string());

        Ok(AnalysisResponse {
            job_status: JobStatus::Succeeded,
            blocks,
            next_token,
            status_message: None,
        })
    }
}
