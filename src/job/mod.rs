//! Analysis job collaborators.
//!
//! The extraction core needs a complete block list. This module defines how
//! that list is obtained from an asynchronous analysis service, where the
//! question metadata comes from, and where exports are written. Concrete
//! cloud clients implement the traits here; [`RecordedAnalysis`],
//! [`DirectoryMetadata`] and [`DirectorySink`] cover local use.

mod metadata;
mod pipeline;
mod poll;
mod recorded;
mod sink;

pub use metadata::{metadata_key, DirectoryMetadata, DocumentMetadata, MetadataProvider, QuerySpec};
pub use pipeline::{Pipeline, PipelineConfig, ProcessReport};
pub use poll::{wait_for_job, PollOptions};
pub use recorded::RecordedAnalysis;
pub use sink::{output_key, DirectorySink, OutputSink};

use crate::error::{Error, Result};
use crate::model::Block;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where the document to analyze is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentLocation {
    /// Bucket or root container
    pub bucket: String,
    /// Object key within the bucket
    pub name: String,
}

/// Analysis features to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    /// Key-value pairs
    Forms,
    /// Tables and cells
    Tables,
    /// Answers to configured questions
    Queries,
}

/// One question submitted with an analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryConfig {
    /// The question
    pub text: String,
    /// Alias reported back on the QUERY block
    pub alias: String,
    /// Pages to ask on ("*" for all)
    pub pages: Vec<String>,
}

/// Request to start an analysis job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Document to analyze
    pub document: DocumentLocation,
    /// Requested features
    pub feature_types: Vec<FeatureType>,
    /// Questions to answer
    pub queries: Vec<QueryConfig>,
}

impl AnalysisRequest {
    /// Request forms, tables and queries for one document.
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            document: DocumentLocation {
                bucket: bucket.into(),
                name: name.into(),
            },
            feature_types: vec![FeatureType::Forms, FeatureType::Tables, FeatureType::Queries],
            queries: Vec::new(),
        }
    }

    /// Set the questions and return self.
    pub fn with_queries(mut self, queries: Vec<QueryConfig>) -> Self {
        self.queries = queries;
        self
    }
}

/// Status of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Still running
    InProgress,
    /// Finished
    Succeeded,
    /// Finished with some pages missing
    PartialSuccess,
    /// Terminal failure
    Failed,
}

impl JobStatus {
    /// Whether results can be fetched.
    pub fn is_complete(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::PartialSuccess)
    }
}

/// One page of analysis results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisResponse {
    /// Current job status
    pub job_status: JobStatus,

    /// Blocks on this page
    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Token for the next page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,

    /// Reason for a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl AnalysisResponse {
    /// A response with only a status.
    pub fn status(job_status: JobStatus) -> Self {
        Self {
            job_status,
            blocks: Vec::new(),
            next_token: None,
            status_message: None,
        }
    }
}

/// An asynchronous document-analysis service.
pub trait AnalysisProvider: Send + Sync {
    /// Submit a document; returns the job id.
    fn start_analysis(&self, request: &AnalysisRequest) -> Result<String>;

    /// Fetch job status and one page of results.
    fn get_analysis(&self, job_id: &str, next_token: Option<&str>) -> Result<AnalysisResponse>;
}

/// Fetch every block of a finished job, following pagination tokens.
pub fn fetch_all_blocks<P: AnalysisProvider + ?Sized>(
    provider: &P,
    job_id: &str,
) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut next_token: Option<String> = None;
    let mut seen_tokens = HashSet::new();
    let mut pages = 0u32;

    loop {
        let response = provider.get_analysis(job_id, next_token.as_deref())?;
        pages += 1;
        blocks.extend(response.blocks);

        match response.next_token {
            Some(token) if !token.is_empty() => {
                if !seen_tokens.insert(token.clone()) {
                    return Err(Error::Provider(format!(
                        "job {} repeated pagination token {} after {} pages",
                        job_id, token, pages
                    )));
                }
                next_token = Some(token);
            }
            _ => break,
        }
    }

    log::debug!(
        "Fetched {} blocks in {} pages for job {}",
        blocks.len(),
        pages,
        job_id
    );
    Ok(blocks)
}
