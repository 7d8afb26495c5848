//! The external calendar seam.
//!
//! The real backend (storage, authentication, session refresh) lives
//! outside this crate; the core only needs "list events in a range" and
//! "create an event". `InMemoryCalendar` backs the binary and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;

use super::types::{BookingRequest, CalendarEvent, CreatedEvent};

/// Abstract calendar collaborator.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// List events overlapping `[start, end)`, ordered by start time.
    /// All-day events are included and sort first.
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>>;

    /// Create an event.
    async fn create_event(&self, request: &BookingRequest) -> Result<CreatedEvent>;
}

/// In-memory calendar, used by the binary and by tests.
#[derive(Debug, Default)]
pub struct InMemoryCalendar {
    events: RwLock<Vec<CalendarEvent>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event directly, bypassing the booking path.
    pub async fn insert(&self, event: CalendarEvent) {
        self.events.write().await.push(event);
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl CalendarProvider for InMemoryCalendar {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let events = self.events.read().await;
        let mut matching: Vec<CalendarEvent> = events
            .iter()
            .filter(|e| {
                e.is_all_day
                    || matches!(
                        (e.start, e.end),
                        (Some(s), Some(t)) if s < end && start < t
                    )
            })
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.start);
        Ok(matching)
    }

    async fn create_event(&self, request: &BookingRequest) -> Result<CreatedEvent> {
        let mut events = self.events.write().await;
        let id = format!("evt-{}", events.len() + 1);
        events.push(CalendarEvent::timed(
            request.summary.clone(),
            request.start,
            request.end,
        ));
        Ok(CreatedEvent {
            id,
            summary: request.summary.clone(),
        })
    }
}
