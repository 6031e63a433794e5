//! Core types for the Senz pipeline
//!
//! This module defines the data structures that flow through the three
//! computations: timeline events and aligned tuples, scale records before and
//! after refinement, and per-slot probability distributions with the joint
//! hypotheses ranked from them.

use crate::error::SenzError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Object id carried by a placeholder event
pub const COUNTERFEIT_OBJECT_ID: &str = "counterfeitObjectId";

/// Raw data id carried by a placeholder event
pub const COUNTERFEIT_RAWDATA_ID: &str = "counterfeitRawdataId";

// ============================================================================
// Timelines
// ============================================================================

/// A single time-stamped reading on one named timeline.
///
/// Only `timestamp` is interpreted; every other field is carried through
/// untouched so aligned output keeps the caller's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Event {
    /// Create an event with no auxiliary fields
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            fields: Map::new(),
        }
    }

    /// Placeholder emitted when a secondary timeline has no close enough event
    pub fn counterfeit(timestamp: i64) -> Self {
        let mut fields = Map::new();
        fields.insert(
            "objectId".to_string(),
            Value::String(COUNTERFEIT_OBJECT_ID.to_string()),
        );
        fields.insert(
            "userRawdataId".to_string(),
            Value::String(COUNTERFEIT_RAWDATA_ID.to_string()),
        );
        Self { timestamp, fields }
    }

    pub fn is_counterfeit(&self) -> bool {
        self.fields.get("objectId").and_then(Value::as_str) == Some(COUNTERFEIT_OBJECT_ID)
    }
}

/// Named timelines. Ordered by name, which also fixes tie-breaking when two
/// timelines score equally as primary.
pub type TimelineSet = BTreeMap<String, Vec<Event>>;

/// One aligned record per primary event: timeline name to matched event
pub type AlignedTuple = BTreeMap<String, Event>;

// ============================================================================
// Probability distributions
// ============================================================================

/// Categorical distribution: label to probability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbDist(BTreeMap<String, f64>);

impl ProbDist {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn insert(&mut self, label: impl Into<String>, prob: f64) {
        self.0.insert(label.into(), prob);
    }

    /// Add `prob` to the label's current value, starting from zero
    pub fn accumulate(&mut self, label: &str, prob: f64) {
        *self.0.entry(label.to_string()).or_insert(0.0) += prob;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(label, prob)| (label.as_str(), *prob))
    }

    /// Multiply every probability by `factor`
    pub fn scaled(mut self, factor: f64) -> Self {
        for prob in self.0.values_mut() {
            *prob *= factor;
        }
        self
    }

    /// Labels ordered by probability, highest first. Equal probabilities keep
    /// label order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ProbDist {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Named probability fields of one record (e.g. `motionProb`, `soundProb`)
pub type ProbFields = BTreeMap<String, ProbDist>;

// ============================================================================
// Scales
// ============================================================================

/// Granularity of the circular bucket dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleType {
    PerMinScale,
    TenMinScale,
    HalfHourScale,
    PerHourScale,
}

impl ScaleType {
    pub const ALL: [ScaleType; 4] = [
        ScaleType::PerMinScale,
        ScaleType::TenMinScale,
        ScaleType::HalfHourScale,
        ScaleType::PerHourScale,
    ];

    /// JSON field name carrying the bucket of this scale
    pub fn field_name(&self) -> &'static str {
        match self {
            ScaleType::PerMinScale => "perMinScale",
            ScaleType::TenMinScale => "tenMinScale",
            ScaleType::HalfHourScale => "halfHourScale",
            ScaleType::PerHourScale => "perHourScale",
        }
    }

    /// Highest valid bucket
    pub fn max_value(&self) -> i64 {
        match self {
            ScaleType::PerMinScale => 1439,
            ScaleType::TenMinScale => 143,
            ScaleType::HalfHourScale => 47,
            ScaleType::PerHourScale => 23,
        }
    }

    /// Number of buckets before the scale wraps around
    pub fn modulus(&self) -> i64 {
        self.max_value() + 1
    }

    pub fn contains(&self, bucket: i64) -> bool {
        (0..=self.max_value()).contains(&bucket)
    }

    /// Whether `key` names any scale field
    pub fn is_scale_field(key: &str) -> bool {
        Self::ALL.iter().any(|s| s.field_name() == key)
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for ScaleType {
    type Err = SenzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scale| scale.field_name() == s)
            .ok_or_else(|| SenzError::InvalidScaleType(s.to_string()))
    }
}

/// Identifier of a source senz record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SenzId {
    Int(i64),
    Text(String),
}

impl fmt::Display for SenzId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenzId::Int(id) => write!(f, "{id}"),
            SenzId::Text(id) => f.write_str(id),
        }
    }
}

/// One senz record placed on a scale bucket
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleRecord {
    /// Bucket on the request's scale
    pub bucket: i64,
    pub timestamp: i64,
    pub senz_id: SenzId,
    pub fields: ProbFields,
}

/// Refined record: one per occupied or interpolated bucket
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedScaleRecord {
    pub scale_type: ScaleType,
    pub bucket: i64,
    /// Average timestamp of contributing records (floor division)
    pub timestamp: i64,
    /// Contributing senz ids; empty when the bucket was synthesized
    pub senz_ids: Vec<SenzId>,
    pub fields: ProbFields,
}

impl CombinedScaleRecord {
    pub fn is_synthesized(&self) -> bool {
        self.senz_ids.is_empty()
    }
}

impl Serialize for CombinedScaleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        map.serialize_entry(self.scale_type.field_name(), &self.bucket)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("senzId", &self.senz_ids)?;
        for (name, dist) in &self.fields {
            map.serialize_entry(name, dist)?;
        }
        map.end()
    }
}

// ============================================================================
// Joint ranking
// ============================================================================

/// The three independent categories combined per time slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Motion,
    Location,
    Sound,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Motion, Category::Location, Category::Sound];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Motion => "motion",
            Category::Location => "location",
            Category::Sound => "sound",
        }
    }
}

/// Per-slot distributions for every category, plus pass-through fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbSlot {
    pub motion: ProbDist,
    pub location: ProbDist,
    pub sound: ProbDist,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProbSlot {
    pub fn new(motion: ProbDist, location: ProbDist, sound: ProbDist) -> Self {
        Self {
            motion,
            location,
            sound,
            extra: Map::new(),
        }
    }

    pub fn distribution(&self, category: Category) -> &ProbDist {
        match category {
            Category::Motion => &self.motion,
            Category::Location => &self.location,
            Category::Sound => &self.sound,
        }
    }
}

/// One label per category chosen for a single slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenzSelection {
    pub motion: String,
    pub location: String,
    pub sound: String,
    /// Natural-log probability of this slot's selection
    pub prob: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A full assignment across all slots, with its cumulative log-probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointHypothesis {
    #[serde(rename = "senzList")]
    pub senz_list: Vec<SenzSelection>,
    pub prob: f64,
}

impl JointHypothesis {
    /// Hypothesis covering a single slot
    pub fn seed(selection: SenzSelection) -> Self {
        Self {
            prob: selection.prob,
            senz_list: vec![selection],
        }
    }

    /// New hypothesis extending this one by one more slot
    pub fn extended(&self, selection: &SenzSelection) -> Self {
        let mut senz_list = Vec::with_capacity(self.senz_list.len() + 1);
        senz_list.extend_from_slice(&self.senz_list);
        senz_list.push(selection.clone());
        Self {
            prob: self.prob + selection.prob,
            senz_list,
        }
    }
}

/// How joint hypotheses are enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Exhaustive product of every slot's candidates
    SelectMaxProb,
    /// Rank-aligned top-N approximation
    SelectMaxNProb,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SelectMaxProb => "SELECT_MAX_PROB",
            Strategy::SelectMaxNProb => "SELECT_MAX_N_PROB",
        }
    }
}

impl FromStr for Strategy {
    type Err = SenzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SELECT_MAX_PROB" => Ok(Strategy::SelectMaxProb),
            "SELECT_MAX_N_PROB" => Ok(Strategy::SelectMaxNProb),
            other => Err(SenzError::InvalidStrategy(other.to_string())),
        }
    }
}
