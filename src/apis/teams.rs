use serde_json::Value;
use std::io::Write;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::app::ports::HttpClientPort;
use crate::config::TeamsConfig;
use crate::constants::TEAM_FACTS_ENTITY;
use crate::error::{EtlError, Result};
use crate::protocol::{make_header, StreamWriter};
use crate::types::Record;

/// Pulls the team collection from the stats API, one record per team.
pub struct TeamFactsExtractor<H> {
    http: H,
    endpoint_url: String,
    payload_key: String,
    timeout: Duration,
}

impl<H: HttpClientPort> TeamFactsExtractor<H> {
    pub fn new(http: H, config: &TeamsConfig) -> Self {
        Self {
            http,
            endpoint_url: config.endpoint_url.clone(),
            payload_key: config.payload_key.clone(),
            timeout: config.timeout(),
        }
    }

    #[instrument(skip(self), fields(url = %self.endpoint_url))]
    pub fn extract(&self) -> Result<Vec<Record>> {
        let body = super::fetch_text(&self.http, &self.endpoint_url, self.timeout)?;
        let payload: Value = serde_json::from_str(&body)?;
        let records = team_facts(payload, &self.payload_key)?;
        info!("Fetched {} team facts", records.len());
        Ok(records)
    }
}

/// Takes the array under `payload_key`; non-object elements are skipped.
pub fn team_facts(payload: Value, payload_key: &str) -> Result<Vec<Record>> {
    let missing = || EtlError::MissingPayload {
        key: payload_key.to_string(),
    };
    let Value::Object(mut root) = payload else {
        return Err(missing());
    };
    let Some(Value::Array(elements)) = root.remove(payload_key) else {
        return Err(missing());
    };

    let mut records = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match element {
            Value::Object(record) => records.push(record),
            other => warn!(index, kind = %json_kind(&other), "skipping non-object team element"),
        }
    }
    Ok(records)
}

/// Union of top-level keys in first-seen order
pub fn team_fact_fields(records: &[Record]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !fields.iter().any(|f| f == key) {
                fields.push(key.clone());
            }
        }
    }
    fields
}

pub fn write_stream<W: Write>(records: &[Record], output: W) -> Result<usize> {
    let mut writer = StreamWriter::new(output);
    writer.write_header(&make_header(TEAM_FACTS_ENTITY, team_fact_fields(records)))?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(writer.records_written())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
