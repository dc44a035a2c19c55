//! End-to-end document processing.

use super::{
    fetch_all_blocks, metadata_key, output_key, wait_for_job, AnalysisProvider, AnalysisRequest,
    MetadataProvider, OutputSink, PollOptions,
};
use crate::error::{Error, Result};
use crate::extract::Extraction;
use crate::model::BlockGraph;
use crate::render::{to_csv, ExtractionStats, RenderOptions, CSV_MIME_TYPE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Environment variable naming the export bucket.
pub const ANALYSIS_BUCKET_ENV: &str = "ANALYSIS_BUCKET_NAME";

/// Environment variable naming the metadata bucket.
pub const METADATA_BUCKET_ENV: &str = "METADATA_BUCKET_NAME";

/// Configuration for [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bucket exports are written to
    pub analysis_bucket: String,

    /// Bucket metadata sidecars are read from
    pub metadata_bucket: String,

    /// Job polling schedule
    pub poll: PollOptions,

    /// CSV rendering options
    pub render: RenderOptions,
}

impl PipelineConfig {
    /// Create a config for the given buckets.
    pub fn new(analysis_bucket: impl Into<String>, metadata_bucket: impl Into<String>) -> Self {
        Self {
            analysis_bucket: analysis_bucket.into(),
            metadata_bucket: metadata_bucket.into(),
            poll: PollOptions::default(),
            render: RenderOptions::default(),
        }
    }

    /// Read bucket names from `ANALYSIS_BUCKET_NAME` and `METADATA_BUCKET_NAME`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env_var(ANALYSIS_BUCKET_ENV)?, env_var(METADATA_BUCKET_ENV)?))
    }

    /// Set the polling schedule.
    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// Set the render options.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
}

/// Outcome of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReport {
    /// Analysis job id
    pub job_id: String,

    /// Bucket the export was written to
    pub output_bucket: String,

    /// Key the export was written under
    pub output_key: String,

    /// Extraction statistics
    pub stats: ExtractionStats,

    /// When the export was written
    pub completed_at: DateTime<Utc>,
}

/// Runs analysis, extraction and export for uploaded documents.
pub struct Pipeline<A, M, S> {
    analysis: A,
    metadata: M,
    sink: S,
    config: PipelineConfig,
}

impl<A, M, S> Pipeline<A, M, S>
where
    A: AnalysisProvider,
    M: MetadataProvider,
    S: OutputSink,
{
    /// Create a pipeline from its collaborators.
    pub fn new(analysis: A, metadata: M, sink: S, config: PipelineConfig) -> Self {
        Self {
            analysis,
            metadata,
            sink,
            config,
        }
    }

    /// Process the document stored at `object_key` in `bucket`.
    pub fn process(&self, bucket: &str, object_key: &str) -> Result<ProcessReport> {
        let metadata = self
            .metadata
            .fetch_metadata(&self.config.metadata_bucket, &metadata_key(object_key))?;

        let request =
            AnalysisRequest::new(bucket, object_key).with_queries(metadata.queries_config());
        let job_id = self.analysis.start_analysis(&request)?;
        log::info!(
            "Started analysis job {} for {} ({} queries)",
            job_id,
            object_key,
            request.queries.len()
        );

        wait_for_job(&self.analysis, &job_id, &self.config.poll)?;
        let graph = BlockGraph::new(fetch_all_blocks(&self.analysis, &job_id)?);

        let extraction = Extraction::from_graph(&graph);
        let stats = extraction.stats();
        let csv = to_csv(&extraction.rows(), &self.config.render);

        let key = output_key(object_key);
        self.sink.put(
            &self.config.analysis_bucket,
            &key,
            csv.as_bytes(),
            CSV_MIME_TYPE,
        )?;

        log::info!(
            "Exported {} rows for {} ({} blocks, {} key-value pairs, {}/{} queries answered)",
            stats.row_count,
            object_key,
            stats.block_count,
            extraction.key_values.pair_count(),
            stats.answered_query_count,
            stats.query_count
        );

        Ok(ProcessReport {
            job_id,
            output_bucket: self.config.analysis_bucket.clone(),
            output_key: key,
            stats,
            completed_at: Utc::now(),
        })
    }

    /// The analysis provider.
    pub fn analysis(&self) -> &A {
        &self.analysis
    }
}
