//! Keyset paging by distance
//!
//! Distance is not unique, so a page boundary is `(last_distance, ids seen at
//! it)`. The next query asks for `distance >= last_distance` minus those ids,
//! which neither skips co-located events nor repeats them.

use crate::discovery::cursor::Cursor;
use crate::models::{EventDetail, EventDetailResponse};
use crate::utils::errors::Result;

/// Assemble a response from folded events and the cursor that produced them
pub fn build_page(previous: &Cursor, mut events: Vec<EventDetail>, page_size: i64) -> Result<EventDetailResponse> {
    events.truncate(page_size.max(0) as usize);

    let next = previous.advance(
        events
            .iter()
            .filter_map(|detail| detail.distance.map(|distance| (detail.event.id, distance))),
    );

    Ok(EventDetailResponse {
        events,
        next_cursor_id: next.encode()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::aggregate::fold_rows;
    use crate::models::EventParticipantRow;

    fn row(event_id: i64, distance: f64) -> EventParticipantRow {
        EventParticipantRow {
            id: event_id,
            event_name: "pickup".to_string(),
            host_id: 1,
            host_username: "host".to_string(),
            host_preferred_name: None,
            host_profile_icon_url: None,
            destination: "Park".to_string(),
            longitude: 0.0,
            latitude: 0.0,
            distance: Some(distance),
            start_time: "2030-01-01T10:00:00Z".to_string(),
            end_time: "2030-01-01T11:00:00Z".to_string(),
            event_type: "football".to_string(),
            max_participant_count: 10,
            description: String::new(),
            deleted: false,
            participant_id: None,
            participant_username: None,
            participant_preferred_name: None,
            participant_profile_icon_url: None,
        }
    }

    /// In-memory stand-in for the discovery query: `>=` plus visited exclusion,
    /// ascending distance, limited.
    fn query(all: &[(i64, f64)], cursor: &Cursor, limit: usize) -> Vec<EventParticipantRow> {
        let mut candidates: Vec<(i64, f64)> = all
            .iter()
            .copied()
            .filter(|(id, distance)| match cursor.last_distance {
                None => true,
                Some(last) => *distance >= last && !cursor.visited_event_index.contains(id),
            })
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        candidates.into_iter().take(limit).map(|(id, d)| row(id, d)).collect()
    }

    #[test]
    fn test_follows_cursor_through_ties_exactly_once() {
        let all = vec![(1, 5.0), (2, 10.0), (3, 10.0), (4, 10.0), (5, 10.0), (6, 12.0), (7, 12.0), (8, 20.0)];
        let mut cursor = Cursor::first_page();
        let mut seen = Vec::new();
        let mut last = f64::MIN;

        for _ in 0..10 {
            let page = build_page(&cursor, fold_rows(query(&all, &cursor, 3), 0), 3).unwrap();
            assert!(page.events.len() <= 3);
            for detail in &page.events {
                let d = detail.distance.unwrap();
                assert!(d >= last);
                last = d;
                seen.push(detail.event.id);
            }
            let next = Cursor::decode(&page.next_cursor_id).unwrap();
            if next == cursor {
                break;
            }
            cursor = next;
        }

        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_empty_page_returns_same_cursor() {
        let cursor = Cursor { last_distance: Some(9.0), visited_event_index: vec![4], is_next: true };
        let page = build_page(&cursor, Vec::new(), 5).unwrap();
        assert!(page.events.is_empty());
        assert_eq!(Cursor::decode(&page.next_cursor_id).unwrap(), cursor);
    }
}
