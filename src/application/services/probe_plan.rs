//! # Probe Plan
//!
//! Ordered table of `(path, payload builder, response extractor)` attempts.
//!
//! The provider's search endpoint and field names are not documented, so the
//! aggregator walks a [`ProbePlan`] in order until one attempt yields plans.
//! The default plan crosses four endpoint paths with three payload shapes,
//! endpoint-major:
//!
//! ```text
//! /plans/search  snake_case | camelCase | native
//! /plans         snake_case | camelCase | native
//! /offers/search snake_case | camelCase | native
//! /offers        snake_case | camelCase | native
//! ```

use crate::domain::value_objects::SearchRequest;
use crate::domain::value_objects::search_request::DATE_FORMAT;
use serde_json::{Value, json};

/// Builds the request body of one attempt.
pub type PayloadBuilder = fn(&SearchRequest) -> Value;

/// Pulls the plan records out of a response body.
pub type ResponseExtractor = fn(&Value) -> Option<Vec<Value>>;

/// Search endpoint paths, in probing order.
pub const SEARCH_PATHS: [&str; 4] = ["/plans/search", "/plans", "/offers/search", "/offers"];

/// Keys under which a response may carry its plan list, in lookup order.
pub const PLAN_LIST_KEYS: [&str; 4] = ["plans", "data", "offers", "results"];

/// One probing attempt.
#[derive(Debug, Clone)]
pub struct ProbeStep {
    /// Endpoint path relative to the provider base URL.
    pub path: String,
    /// Name of the payload shape, for logs.
    pub shape: &'static str,
    /// Builds the body.
    pub build_payload: PayloadBuilder,
    /// Extracts plan records from a 2xx body.
    pub extract: ResponseExtractor,
}

impl ProbeStep {
    /// Creates a step using the default extractor.
    #[must_use]
    pub fn new(path: impl Into<String>, shape: &'static str, build_payload: PayloadBuilder) -> Self {
        Self {
            path: path.into(),
            shape,
            build_payload,
            extract: extract_plans,
        }
    }

    /// Replaces the extractor.
    #[must_use]
    pub fn with_extractor(mut self, extract: ResponseExtractor) -> Self {
        self.extract = extract;
        self
    }
}

/// Ordered list of probing attempts.
#[derive(Debug, Clone)]
pub struct ProbePlan {
    steps: Vec<ProbeStep>,
}

impl ProbePlan {
    /// Creates a plan from explicit steps.
    #[must_use]
    pub fn new(steps: Vec<ProbeStep>) -> Self {
        Self { steps }
    }

    /// Crosses every path with every shape, path-major.
    #[must_use]
    pub fn from_matrix(paths: &[&str], shapes: &[(&'static str, PayloadBuilder)]) -> Self {
        let steps = paths
            .iter()
            .flat_map(|path| {
                shapes
                    .iter()
                    .map(move |(shape, builder)| ProbeStep::new(*path, *shape, *builder))
            })
            .collect();
        Self { steps }
    }

    /// Returns the steps in order.
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[ProbeStep] {
        &self.steps
    }

    /// Returns the number of steps.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if there are no steps.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for ProbePlan {
    fn default() -> Self {
        Self::from_matrix(&SEARCH_PATHS, &PAYLOAD_SHAPES)
    }
}

/// Payload shapes, in probing order.
pub const PAYLOAD_SHAPES: [(&str, PayloadBuilder); 3] = [
    ("snake_case", snake_case_payload),
    ("camelCase", camel_case_payload),
    ("native", native_payload),
];

fn format_date(date: chrono::NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `{"origin", "destination", "departure_date", "return_date", "passengers", "ages"}`
#[must_use]
pub fn snake_case_payload(request: &SearchRequest) -> Value {
    json!({
        "origin": request.origin(),
        "destination": request.destination(),
        "departure_date": format_date(request.departure_date()),
        "return_date": format_date(request.return_date()),
        "passengers": request.passenger_count(),
        "ages": request.passengers(),
    })
}

/// `{"origin", "destination", "departureDate", "returnDate", "passengerCount", "passengerAges"}`
#[must_use]
pub fn camel_case_payload(request: &SearchRequest) -> Value {
    json!({
        "origin": request.origin(),
        "destination": request.destination(),
        "departureDate": format_date(request.departure_date()),
        "returnDate": format_date(request.return_date()),
        "passengerCount": request.passenger_count(),
        "passengerAges": request.passengers(),
    })
}

/// Field names used by the provider's own quoting screens.
#[must_use]
pub fn native_payload(request: &SearchRequest) -> Value {
    json!({
        "origem": request.origin(),
        "destino": request.destination(),
        "dataSaida": format_date(request.departure_date()),
        "dataRetorno": format_date(request.return_date()),
        "dias": request.trip_days(),
        "quantidadePassageiros": request.passenger_count(),
        "idades": request.passengers(),
    })
}

/// Finds a non-empty list of plan objects in a response body.
///
/// Looks at the bare array first, then [`PLAN_LIST_KEYS`] in order, then the
/// same keys one level under `data`. Non-object items are dropped.
#[must_use]
pub fn extract_plans(body: &Value) -> Option<Vec<Value>> {
    if let Some(records) = plan_records(body) {
        return Some(records);
    }

    let direct = PLAN_LIST_KEYS
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(plan_records);
    if direct.is_some() {
        return direct;
    }

    body.get("data").filter(|data| data.is_object()).and_then(|data| {
        PLAN_LIST_KEYS
            .iter()
            .filter_map(|key| data.get(*key))
            .find_map(plan_records)
    })
}

fn plan_records(value: &Value) -> Option<Vec<Value>> {
    let records: Vec<Value> = value
        .as_array()?
        .iter()
        .filter(|item| item.is_object())
        .cloned()
        .collect();
    (!records.is_empty()).then_some(records)
}
