//! Pipeline orchestration
//!
//! This module provides the public API for Senz Core. Each operation runs
//! the same three stages: the request adapter parses the JSON body, the
//! computation runs on the typed request, and the result is encoded.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::align::collect_senz_lists;
use crate::config::Config;
use crate::encoder::Envelope;
use crate::error::SenzError;
use crate::rank::rank;
use crate::scale::refine;
use crate::schema::{AlignRequest, RankRequest, RefineRequest, RequestAdapter};
use crate::types::{AlignedTuple, CombinedScaleRecord, JointHypothesis};

/// The three request/response operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Align,
    Refine,
    Rank,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Align => "align",
            Operation::Refine => "refine",
            Operation::Rank => "rank",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = SenzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "align" => Ok(Operation::Align),
            "refine" => Ok(Operation::Refine),
            "rank" => Ok(Operation::Rank),
            other => Err(SenzError::ParseError(format!("unknown operation: {other}"))),
        }
    }
}

/// Align timelines from a JSON request body.
///
/// # Returns
/// JSON array of aligned tuples, one per primary event
///
/// # Example
/// ```ignore
/// let tuples = align_timelines_json(r#"{"filter": 1, "timelines": {...}}"#)?;
/// ```
pub fn align_timelines_json(json: &str) -> Result<String, SenzError> {
    let request = RequestAdapter::align(json)?;
    let tuples = SenzProcessor::new().align(&request)?;
    Ok(serde_json::to_string(&tuples)?)
}

/// Refine a per-scale sequence from a JSON request body.
///
/// # Returns
/// JSON array of refined records; empty when the batch was rejected
pub fn refine_scale_json(json: &str) -> Result<String, SenzError> {
    let request = RequestAdapter::refine(json)?;
    let records = SenzProcessor::new().refine(&request)?;
    Ok(serde_json::to_string(&records)?)
}

/// Rank joint hypotheses from a JSON request body.
///
/// # Returns
/// JSON array of `{senzList, prob}` hypotheses
pub fn rank_joint_json(json: &str) -> Result<String, SenzError> {
    let request = RequestAdapter::rank(json)?;
    let hypotheses = SenzProcessor::new().rank(&request)?;
    Ok(serde_json::to_string(&hypotheses)?)
}

/// Processor carrying the defaults that requests may leave out.
#[derive(Debug, Clone, Default)]
pub struct SenzProcessor {
    config: Config,
}

impl SenzProcessor {
    /// Create a processor with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn align(&self, request: &AlignRequest) -> Result<Vec<AlignedTuple>, SenzError> {
        let tuples = collect_senz_lists(
            &request.timelines,
            request.primary_key.as_deref(),
            request.filter,
        )?;
        info!(
            timelines = request.timelines.len(),
            tuples = tuples.len(),
            "aligned timelines"
        );
        Ok(tuples)
    }

    pub fn refine(&self, request: &RefineRequest) -> Result<Vec<CombinedScaleRecord>, SenzError> {
        let refined = refine(
            request.scale_type,
            request.start,
            request.end,
            &request.records,
        )?;
        info!(
            scale_type = %request.scale_type,
            records = request.records.len(),
            refined = refined.len(),
            "refined scale sequence"
        );
        Ok(refined)
    }

    /// Missing `mutiMaxNum` and `logFloor` fall back to the configuration
    pub fn rank(&self, request: &RankRequest) -> Result<Vec<JointHypothesis>, SenzError> {
        let max_num = request.max_num.unwrap_or(self.config.max_hypotheses);
        let log_floor = request.log_floor.unwrap_or(self.config.prob_lower_bound);

        let hypotheses = rank(&request.slots, request.strategy, max_num, log_floor)?;
        info!(
            strategy = request.strategy.as_str(),
            slots = request.slots.len(),
            hypotheses = hypotheses.len(),
            "ranked joint hypotheses"
        );
        Ok(hypotheses)
    }

    /// Parse, compute and serialize one request body
    pub fn process(&self, op: Operation, body: &str) -> Result<Value, SenzError> {
        let result = match op {
            Operation::Align => serde_json::to_value(self.align(&RequestAdapter::align(body)?)?)?,
            Operation::Refine => {
                serde_json::to_value(self.refine(&RequestAdapter::refine(body)?)?)?
            }
            Operation::Rank => serde_json::to_value(self.rank(&RequestAdapter::rank(body)?)?)?,
        };
        Ok(result)
    }

    /// Run one request and wrap the outcome in a response envelope.
    ///
    /// `request_id` is the transport's request id; a fresh one is generated
    /// when it is missing or empty.
    pub fn handle(&self, op: Operation, body: &str, request_id: Option<&str>) -> Envelope {
        let request_id = match request_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        let span = info_span!("senz_request", op = op.as_str(), request_id = %request_id);
        let _guard = span.enter();

        info!(bytes = body.len(), "accepted request");

        match self.process(op, body) {
            Ok(result) => Envelope::success(result),
            Err(err) => {
                if err.is_client_error() {
                    warn!(error = %err, "rejected request");
                } else {
                    error!(error = %err, "computation failed");
                }
                Envelope::from_error(&err)
            }
        }
    }
}
