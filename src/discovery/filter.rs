//! Discovery filter and its validation

use serde::{Deserialize, Serialize};
use crate::config::DiscoveryConfig;
use crate::discovery::cursor::Cursor;
use crate::models::GeoPoint;
use crate::utils::errors::{KickaboutError, Result};

/// Pages worth of tied ids a cursor may carry before it is refused
const MAX_VISITED_PAGES: i64 = 20;

/// Client-supplied discovery request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(default)]
    pub event_types: Vec<String>,
    pub from_location: Option<GeoPoint>,
    pub page_size: Option<i64>,
    /// Token from a previous response's `nextCursorId`
    pub next_cursor: Option<String>,
}

/// A filter that passed validation, with its cursor decoded
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFilter {
    /// Deduplicated; empty means nothing matches
    pub event_types: Vec<String>,
    pub from_location: GeoPoint,
    pub page_size: i64,
    pub cursor: Cursor,
}

impl Filter {
    /// Check the request and decode its cursor.
    ///
    /// Paging is forward-only: a decoded cursor must carry `is_next`.
    pub fn validate(&self, config: &DiscoveryConfig) -> Result<ValidatedFilter> {
        let mut problems = Vec::new();

        let page_size = self.page_size.unwrap_or(config.default_page_size);
        if page_size <= 0 {
            problems.push("pageSize must be greater than 0".to_string());
        } else if page_size > config.max_page_size {
            problems.push(format!("pageSize cannot exceed {}", config.max_page_size));
        }

        let from_location = match self.from_location {
            None => {
                problems.push("fromLocation is required".to_string());
                None
            }
            Some(point) if !point.is_valid() => {
                problems.push("fromLocation is out of range".to_string());
                None
            }
            Some(point) => Some(point),
        };

        let from_location = match from_location {
            Some(point) if problems.is_empty() => point,
            _ => return Err(KickaboutError::Validation(problems.join("; "))),
        };

        let cursor = match self.next_cursor.as_deref().map(str::trim) {
            None | Some("") => Cursor::first_page(),
            Some(token) => {
                let cursor = Cursor::decode(token)?;
                let visited_limit = config.max_page_size.saturating_mul(MAX_VISITED_PAGES);
                if cursor.visited_event_index.len() as i64 > visited_limit {
                    return Err(KickaboutError::MalformedCursor(format!(
                        "cursor remembers more than {} events", visited_limit
                    )));
                }
                if !cursor.is_next {
                    return Err(KickaboutError::Validation(
                        "Unmatched cursor, only forward paging is supported".to_string(),
                    ));
                }
                cursor
            }
        };

        let mut event_types: Vec<String> = Vec::with_capacity(self.event_types.len());
        for event_type in &self.event_types {
            if !event_types.contains(event_type) {
                event_types.push(event_type.clone());
            }
        }

        Ok(ValidatedFilter {
            event_types,
            from_location,
            page_size,
            cursor,
        })
    }
}
