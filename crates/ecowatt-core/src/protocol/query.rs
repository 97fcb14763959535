//! Query-string builders for `GET /data` and `GET /data/count`.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::ValidationError;
use crate::pagination::IdWindow;
use crate::types::{parse_timestamp, TIMESTAMP_FORMAT};

/// Filters for a range query. Every field is optional; an empty query
/// matches all records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeQuery {
    pub start_id: Option<u64>,
    pub end_id: Option<u64>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

impl RangeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query selecting exactly the ids of `window`.
    pub fn for_window(window: IdWindow) -> Self {
        Self {
            start_id: Some(window.start_id),
            end_id: Some(window.end_id),
            ..Self::default()
        }
    }

    pub fn ids(mut self, start: Option<u64>, end: Option<u64>) -> Self {
        self.start_id = start;
        self.end_id = end;
        self
    }

    /// Set the time bounds from operator text.
    pub fn times(mut self, start: Option<&str>, end: Option<&str>) -> Result<Self, ValidationError> {
        self.start_time = start.map(parse_timestamp).transpose()?;
        self.end_time = end.map(parse_timestamp).transpose()?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.start_id.is_none()
            && self.end_id.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }

    /// Reject inverted bounds before any request is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(start), Some(end)) = (self.start_id, self.end_id) {
            if start > end {
                return Err(ValidationError::InvertedIdRange { start, end });
            }
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(ValidationError::InvertedTimeRange {
                    start: start.format(TIMESTAMP_FORMAT).to_string(),
                    end: end.format(TIMESTAMP_FORMAT).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Filter parameters, in a stable order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.start_id {
            params.push(("start_id", id.to_string()));
        }
        if let Some(id) = self.end_id {
            params.push(("end_id", id.to_string()));
        }
        if let Some(t) = self.start_time {
            params.push(("start_time", t.format(TIMESTAMP_FORMAT).to_string()));
        }
        if let Some(t) = self.end_time {
            params.push(("end_time", t.format(TIMESTAMP_FORMAT).to_string()));
        }
        params
    }

    /// Filter parameters plus a limit/offset slice.
    pub fn paged_params(&self, limit: u64, offset: u64) -> Vec<(&'static str, String)> {
        let mut params = self.params();
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));
        params
    }
}
