use chrono::{NaiveDate, TimeDelta, Utc};
use lambda_http::http::{Method, StatusCode};
use lambda_http::tracing::{info, warn};
use lambda_http::{Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::blynk::{dispatch, PinUpdater, UpdateResult};
use crate::config::Config;
use crate::range::parse_range;
use crate::sun::{get_sun_times, GeoCoordinate, SunTimes, UTC_OFFSET_HOURS};

// Marker inside the `as` field asking for sunrise/sunset pins
const SUN_MARKER: char = '~';

#[derive(Debug, Default, Deserialize)]
pub struct SensorPayload {
    #[serde(default)]
    nd: Option<Value>,
    #[serde(default)]
    da: Option<Value>,
    #[serde(default, rename = "as")]
    as_field: Option<Value>,
    #[serde(default)]
    lat: Option<Value>,
    #[serde(default)]
    lon: Option<Value>,
}

#[derive(Serialize)]
pub struct ForwardResponse {
    success: bool,
    results: BTreeMap<String, UpdateResult>,
}

pub struct AppState {
    pub config: Config,
    pub updater: Box<dyn PinUpdater>,
}

fn as_text(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

fn as_number(value: &Option<Value>) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

// "~, 12-34" carries a marker before the range; without ", " the whole field is the range
fn range_part(as_field: &str) -> &str {
    as_field.split_once(", ").map_or(as_field, |(_, range)| range)
}

// Either override alone is enough; the other half comes from the fallback
fn requested_coordinate(payload: &SensorPayload, fallback: GeoCoordinate) -> Option<GeoCoordinate> {
    let lat = as_number(&payload.lat);
    let lon = as_number(&payload.lon);
    if lat.is_none() && lon.is_none() {
        return None;
    }
    Some(GeoCoordinate {
        latitude: lat.unwrap_or(fallback.latitude),
        longitude: lon.unwrap_or(fallback.longitude),
    })
}

// Calendar date on the UTC+7 clock the sun times are reported in
pub fn today() -> NaiveDate {
    (Utc::now() + TimeDelta::hours(UTC_OFFSET_HOURS as i64)).date_naive()
}

// The ten pin values derived from one payload
pub fn build_params(
    payload: &SensorPayload,
    date: NaiveDate,
    fallback: GeoCoordinate,
) -> [(&'static str, f64); 10] {
    let (nd_low, nd_high) = parse_range(as_text(&payload.nd));
    let (da_low, da_high) = parse_range(as_text(&payload.da));
    let as_field = as_text(&payload.as_field);
    let (as_low, as_high) = parse_range(as_field.map(range_part));

    let sun = if as_field.is_some_and(|s| s.contains(SUN_MARKER)) {
        let coordinate = requested_coordinate(payload, fallback);
        get_sun_times(date, coordinate, fallback).unwrap_or_else(|e| {
            warn!(error = %e, "no sun times for this location, sending zeros");
            SunTimes::default()
        })
    } else {
        SunTimes::default()
    };

    [
        ("V3", nd_low),
        ("V4", nd_high),
        ("V8", da_low),
        ("V9", da_high),
        ("V12", as_low),
        ("V13", as_high),
        ("V20", sun.sunrise_h as f64),
        ("V21", sun.sunrise_m as f64),
        ("V22", sun.sunset_h as f64),
        ("V23", sun.sunset_m as f64),
    ]
}

fn json_response(status: StatusCode, body: &impl Serialize) -> Result<Response<Body>, Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?;
    Ok(response)
}

// Main Lambda handler - parses the payload and forwards ten pin values
pub async fn function_handler(event: Request, state: &AppState) -> Result<Response<Body>, Error> {
    handle(event, state, today()).await
}

pub async fn handle(event: Request, state: &AppState, date: NaiveDate) -> Result<Response<Body>, Error> {
    if event.method() != Method::POST {
        return json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({ "error": "method not allowed, use POST" }),
        );
    }

    let raw: &[u8] = event.body().as_ref();
    let payload: SensorPayload = if raw.iter().all(u8::is_ascii_whitespace) {
        SensorPayload::default()
    } else {
        match serde_json::from_slice(raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "rejecting malformed payload");
                return json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({ "error": format!("invalid JSON body: {e}") }),
                );
            }
        }
    };

    let params = build_params(&payload, date, state.config.default_coordinate);
    info!(?params, "forwarding pin values");

    let results = dispatch(state.updater.as_ref(), &params, state.config.dispatch_concurrency).await;
    let success = results.values().all(|r| r.success);
    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    json_response(status, &ForwardResponse { success, results })
}
