//! Adapter from raw JSON request bodies to typed requests
//!
//! Every required key is checked explicitly so a missing or malformed value is
//! reported with its full path (e.g. `senzList[2].timestamp`).

use crate::error::SenzError;
use crate::schema::request::{AlignRequest, RankRequest, RefineRequest};
use crate::types::{
    Category, Event, ProbDist, ProbFields, ProbSlot, ScaleRecord, ScaleType, SenzId, Strategy,
    TimelineSet,
};
use serde_json::{Map, Value};

/// Adapter for converting request bodies to typed requests
pub struct RequestAdapter;

impl RequestAdapter {
    /// Parse a body that must be a JSON object
    pub fn parse_object(json: &str) -> Result<Map<String, Value>, SenzError> {
        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SenzError::ParseError(
                "request body is not a JSON object".to_string(),
            )),
            Err(e) => Err(SenzError::ParseError(format!(
                "request body is not a JSON object: {e}"
            ))),
        }
    }

    /// `{"filter", "timelines", "primaryKey"?}`
    pub fn align(json: &str) -> Result<AlignRequest, SenzError> {
        Self::align_from_map(&Self::parse_object(json)?)
    }

    /// `{"scaleType", "startScaleValue", "endScaleValue", "senzList"}`
    pub fn refine(json: &str) -> Result<RefineRequest, SenzError> {
        Self::refine_from_map(&Self::parse_object(json)?)
    }

    /// `{"probSenzList", "strategy", "mutiMaxNum"?, "logFloor"?}`
    pub fn rank(json: &str) -> Result<RankRequest, SenzError> {
        Self::rank_from_map(&Self::parse_object(json)?)
    }

    pub fn align_from_map(body: &Map<String, Value>) -> Result<AlignRequest, SenzError> {
        let filter = as_f64(require(body, "filter", "filter")?, "filter")?;

        let raw_timelines = as_object(require(body, "timelines", "timelines")?, "timelines")?;
        let mut timelines = TimelineSet::new();
        for (name, events) in raw_timelines {
            let path = format!("timelines.{name}");
            let events = as_array(events, &path)?
                .iter()
                .enumerate()
                .map(|(i, event)| parse_event(event, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()?;
            timelines.insert(name.clone(), events);
        }

        let primary_key = match body.get("primaryKey").or_else(|| body.get("primary_key")) {
            None | Some(Value::Null) => None,
            Some(Value::String(key)) => Some(key.clone()),
            Some(_) => return Err(SenzError::invalid("primaryKey", "expected string")),
        };

        Ok(AlignRequest {
            filter,
            timelines,
            primary_key,
        })
    }

    pub fn refine_from_map(body: &Map<String, Value>) -> Result<RefineRequest, SenzError> {
        let scale_type: ScaleType =
            as_str(require(body, "scaleType", "scaleType")?, "scaleType")?.parse()?;
        let start = as_i64(
            require(body, "startScaleValue", "startScaleValue")?,
            "startScaleValue",
        )?;
        let end = as_i64(
            require(body, "endScaleValue", "endScaleValue")?,
            "endScaleValue",
        )?;

        let records = as_array(require(body, "senzList", "senzList")?, "senzList")?
            .iter()
            .enumerate()
            .map(|(i, record)| parse_scale_record(record, scale_type, &format!("senzList[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RefineRequest {
            scale_type,
            start,
            end,
            records,
        })
    }

    pub fn rank_from_map(body: &Map<String, Value>) -> Result<RankRequest, SenzError> {
        let slots = as_array(require(body, "probSenzList", "probSenzList")?, "probSenzList")?
            .iter()
            .enumerate()
            .map(|(i, slot)| parse_prob_slot(slot, &format!("probSenzList[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let strategy: Strategy = as_str(require(body, "strategy", "strategy")?, "strategy")?.parse()?;

        let max_num = match body.get("mutiMaxNum") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let n = as_i64(value, "mutiMaxNum")?;
                let n = usize::try_from(n)
                    .map_err(|_| SenzError::invalid("mutiMaxNum", "must not be negative"))?;
                Some(n)
            }
        };

        let log_floor = match body.get("logFloor") {
            None | Some(Value::Null) => None,
            Some(value) => Some(as_f64(value, "logFloor")?),
        };

        Ok(RankRequest {
            slots,
            strategy,
            max_num,
            log_floor,
        })
    }
}

fn require<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, SenzError> {
    object
        .get(key)
        .ok_or_else(|| SenzError::MissingField(path.to_string()))
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SenzError> {
    value
        .as_object()
        .ok_or_else(|| SenzError::invalid(path, "expected object"))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, SenzError> {
    value
        .as_array()
        .ok_or_else(|| SenzError::invalid(path, "expected array"))
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, SenzError> {
    value
        .as_str()
        .ok_or_else(|| SenzError::invalid(path, "expected string"))
}

fn as_f64(value: &Value, path: &str) -> Result<f64, SenzError> {
    value
        .as_f64()
        .ok_or_else(|| SenzError::invalid(path, "expected number"))
}

/// Integers, or floats with no fractional part
fn as_i64(value: &Value, path: &str) -> Result<i64, SenzError> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(SenzError::invalid(path, "expected integer")),
    }
}

fn parse_event(value: &Value, path: &str) -> Result<Event, SenzError> {
    let object = as_object(value, path)?;
    let timestamp_path = format!("{path}.timestamp");
    let timestamp = as_i64(require(object, "timestamp", &timestamp_path)?, &timestamp_path)?;

    let mut fields = object.clone();
    fields.remove("timestamp");

    Ok(Event { timestamp, fields })
}

fn parse_dist(value: &Value, path: &str) -> Result<ProbDist, SenzError> {
    as_object(value, path)?
        .iter()
        .map(|(label, prob)| {
            prob.as_f64()
                .map(|p| (label.as_str(), p))
                .ok_or_else(|| SenzError::invalid(format!("{path}.{label}"), "expected number"))
        })
        .collect()
}

fn parse_scale_record(
    value: &Value,
    scale_type: ScaleType,
    path: &str,
) -> Result<ScaleRecord, SenzError> {
    let object = as_object(value, path)?;
    let field = |key: &str| {
        let field_path = format!("{path}.{key}");
        require(object, key, &field_path).map(|value| (value, field_path))
    };

    let (bucket, bucket_path) = field(scale_type.field_name())?;
    let bucket = as_i64(bucket, &bucket_path)?;

    let (timestamp, timestamp_path) = field("timestamp")?;
    let timestamp = as_i64(timestamp, &timestamp_path)?;

    let (senz_id, senz_id_path) = field("senzId")?;
    let senz_id = match senz_id {
        Value::String(id) => SenzId::Text(id.clone()),
        other => SenzId::Int(
            other
                .as_i64()
                .ok_or_else(|| SenzError::invalid(senz_id_path, "expected integer or string"))?,
        ),
    };

    let mut fields = ProbFields::new();
    for (key, value) in object {
        if key == "timestamp" || key == "senzId" || ScaleType::is_scale_field(key) {
            continue;
        }
        if value.is_object() {
            fields.insert(key.clone(), parse_dist(value, &format!("{path}.{key}"))?);
        }
    }

    Ok(ScaleRecord {
        bucket,
        timestamp,
        senz_id,
        fields,
    })
}

fn parse_prob_slot(value: &Value, path: &str) -> Result<ProbSlot, SenzError> {
    let object = as_object(value, path)?;

    let mut dists = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let key = category.as_str();
        let field_path = format!("{path}.{key}");
        dists.push(parse_dist(require(object, key, &field_path)?, &field_path)?);
    }
    let [motion, location, sound]: [ProbDist; 3] = dists
        .try_into()
        .map_err(|_| SenzError::ParseError(format!("{path}: incomplete categories")))?;

    let mut slot = ProbSlot::new(motion, location, sound);
    for (key, value) in object {
        if !Category::ALL.iter().any(|c| c.as_str() == key) {
            slot.extra.insert(key.clone(), value.clone());
        }
    }

    Ok(slot)
}
