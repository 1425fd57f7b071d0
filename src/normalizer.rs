//! Regroups the provider's element-oriented forecast into one record per time interval.
//!
//! The provider publishes each weather element with its own list of time periods.
//! Periods from different elements that share the exact same `(StartTime, EndTime)`
//! strings merge into one interval. Keys compare as strings, so two spellings of the
//! same instant stay separate intervals.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::constants::NOT_AVAILABLE;
use crate::error::ForecastError;
use crate::models::{
    display_label, ElementKind, Field, ForecastRecord, LocationSelector, NormalizeOptions,
    NormalizedForecast, ValueFormat,
};

static NO_RECORDS: Value = Value::Null;

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Interval accumulated while walking the elements
struct ForecastInterval {
    time_span: String,
    values: HashMap<String, String>,
}

/// Normalizes a parsed provider payload into ordered forecast records
pub fn normalize(
    body: &Value,
    options: &NormalizeOptions,
) -> Result<NormalizedForecast, ForecastError> {
    ensure_success(body)?;

    let location = select_location(body, &options.selector)?;
    let location_name = location
        .get("LocationName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let elements = array_at(location, "WeatherElement")?;

    let mut intervals: BTreeMap<(String, String), ForecastInterval> = BTreeMap::new();

    for element in elements {
        let element_name = element
            .get("ElementName")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let kind = ElementKind::from_element_name(element_name);
        let label = display_label(element_name);

        for period in array_at(element, "Time")? {
            let start = timestamp_at(period, "StartTime")?;
            let end = timestamp_at(period, "EndTime")?;

            let interval = match intervals.entry((start.to_string(), end.to_string())) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(ForecastInterval {
                        time_span: format_time_span(start, end)?,
                        values: HashMap::new(),
                    })
                }
            };

            if let Some(value) = first_value(period, kind)? {
                interval
                    .values
                    .insert(label.to_string(), format_value(&value, kind, options.value_format));
            }
        }
    }

    if intervals.is_empty() {
        return Err(ForecastError::EmptyForecast);
    }

    tracing::debug!(
        "Normalized {} elements into {} intervals",
        elements.len(),
        intervals.len()
    );

    let records = intervals
        .into_iter()
        .map(|((start_time, end_time), interval)| ForecastRecord {
            start_time,
            end_time,
            time_span: interval.time_span,
            fields: options
                .columns
                .iter()
                .map(|column| Field {
                    column: column.clone(),
                    value: interval
                        .values
                        .get(column)
                        .cloned()
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                })
                .collect(),
        })
        .collect();

    Ok(NormalizedForecast {
        location: location_name,
        records,
    })
}

/// Names of every location entry in traversal order
pub fn location_names(body: &Value) -> Result<Vec<String>, ForecastError> {
    ensure_success(body)?;

    let mut names = Vec::new();
    for group in array_at(records(body)?, "Locations")? {
        for location in array_at(group, "Location")? {
            if let Some(name) = location.get("LocationName").and_then(Value::as_str) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

fn ensure_success(body: &Value) -> Result<(), ForecastError> {
    let success = match body.get("success") {
        Some(Value::String(flag)) => flag == "true",
        Some(Value::Bool(flag)) => *flag,
        _ => false,
    };
    if success {
        return Ok(());
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());
    tracing::warn!("Provider reported failure: {}", message);
    Err(ForecastError::provider_failure(message))
}

fn records(body: &Value) -> Result<&Value, ForecastError> {
    match body.get("records") {
        None | Some(Value::Null) => Ok(&NO_RECORDS),
        Some(value @ Value::Object(_)) => Ok(value),
        Some(_) => Err(ForecastError::unexpected("\"records\" is not an object")),
    }
}

fn select_location<'a>(
    body: &'a Value,
    selector: &LocationSelector,
) -> Result<&'a Value, ForecastError> {
    for group in array_at(records(body)?, "Locations")? {
        for location in array_at(group, "Location")? {
            let matches = match selector {
                LocationSelector::First => true,
                LocationSelector::Exact(name) => {
                    location.get("LocationName").and_then(Value::as_str) == Some(name.as_str())
                }
            };
            if matches {
                return Ok(location);
            }
        }
    }
    Err(ForecastError::location_not_found(selector.requested()))
}

/// Array under `key`, empty when the key is absent or null
fn array_at<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], ForecastError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ForecastError::unexpected(format!(
            "\"{key}\" is not a list"
        ))),
    }
}

fn timestamp_at<'a>(period: &'a Value, key: &str) -> Result<&'a str, ForecastError> {
    period
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ForecastError::unexpected(format!("time period is missing \"{key}\"")))
}

fn parse_local(timestamp: &str) -> Result<NaiveDateTime, ForecastError> {
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(timestamp)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .ok_or_else(|| ForecastError::malformed_timestamp(timestamp))
}

fn format_time_span(start: &str, end: &str) -> Result<String, ForecastError> {
    let start = parse_local(start)?;
    let end = parse_local(end)?;
    Ok(format!(
        "{} - {}",
        start.format("%m/%d %H:%M"),
        end.format("%H:%M")
    ))
}

/// Text of the first `ElementValue` entry, if it holds one
fn first_value(period: &Value, kind: Option<ElementKind>) -> Result<Option<String>, ForecastError> {
    let Some(entry) = array_at(period, "ElementValue")?.first() else {
        return Ok(None);
    };

    let value = match (entry, kind) {
        (Value::Object(fields), Some(kind)) => fields
            .get(kind.value_key())
            .or_else(|| first_scalar(fields)),
        (Value::Object(fields), None) => first_scalar(fields),
        (scalar, _) => Some(scalar),
    };

    Ok(value.and_then(scalar_text))
}

fn first_scalar(fields: &Map<String, Value>) -> Option<&Value> {
    fields
        .values()
        .find(|value| matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn format_value(value: &str, kind: Option<ElementKind>, value_format: ValueFormat) -> String {
    let unit = match (value_format, kind.and_then(ElementKind::unit)) {
        (ValueFormat::WithUnits, Some(unit)) => unit,
        _ => return value.to_string(),
    };
    if value.trim().parse::<f64>().map_or(false, f64::is_finite) {
        format!("{}{}", value.trim(), unit)
    } else {
        value.to_string()
    }
}
