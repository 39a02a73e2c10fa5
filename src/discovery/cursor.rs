//! Opaque pagination cursor
//!
//! The cursor rides in the client-held token: JSON wrapped in a version tag,
//! then base64url without padding. Nothing inside the token is part of the
//! public contract.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use crate::utils::errors::{KickaboutError, Result};

/// Pagination progress: the farthest distance already returned plus the ids
/// seen at exactly that distance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub last_distance: Option<f64>,
    #[serde(default)]
    pub visited_event_index: Vec<i64>,
    pub is_next: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "v")]
enum Envelope {
    #[serde(rename = "1")]
    V1(Cursor),
}

impl Cursor {
    /// Cursor for the first page of a forward sequence
    pub fn first_page() -> Self {
        Self {
            last_distance: None,
            visited_event_index: Vec::new(),
            is_next: true,
        }
    }

    /// Encode into a URL-safe token
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(&Envelope::V1(self.clone()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token produced by [`Cursor::encode`]
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| KickaboutError::MalformedCursor(format!("invalid encoding: {}", e)))?;

        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|e| KickaboutError::MalformedCursor(format!("invalid cursor body: {}", e)))?;

        match envelope {
            Envelope::V1(cursor) => Ok(cursor),
        }
    }

    /// Cursor for the page after one whose events sat at `page` distances.
    ///
    /// Ids at the new farthest distance are remembered so the next `>=` query
    /// skips them; when that distance equals the previous boundary the sets are
    /// merged. An empty page leaves the cursor where it was.
    pub fn advance<I>(&self, page: I) -> Cursor
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        let page: Vec<(i64, f64)> = page.into_iter().collect();

        let farthest = page
            .iter()
            .map(|(_, distance)| *distance)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))));

        let Some(farthest) = farthest else {
            return Cursor { is_next: true, ..self.clone() };
        };

        let boundary = page
            .iter()
            .filter(|(_, distance)| *distance == farthest)
            .map(|(id, _)| *id);

        let mut visited = if self.last_distance == Some(farthest) {
            self.visited_event_index.clone()
        } else {
            Vec::new()
        };
        for id in boundary {
            if !visited.contains(&id) {
                visited.push(id);
            }
        }

        Cursor {
            last_distance: Some(farthest),
            visited_event_index: visited,
            is_next: true,
        }
    }
}
