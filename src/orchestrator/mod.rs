//! Per-message orchestration: classify, extract, consult the calendar,
//! and produce the reply text.
//!
//! Stateless per invocation. Collaborators are injected at construction
//! so tests can run against fakes; every collaborator failure degrades to
//! a user-visible reply — a message is never left unanswered.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::calendar::{
    find_free, BookingRequest, BusyInterval, CalendarProvider, WorkingHours,
};
use crate::config::{Config, SchedulingConfig};
use crate::error::Result;
use crate::intent::{Intent, IntentClassifier};
use crate::responder::Responder;
use crate::temporal::{TemporalExtractor, TemporalReference};

const CALENDAR_UNAVAILABLE: &str =
    "Sorry, your calendar is unavailable right now. Please try again in a moment.";
const RESPONDER_UNAVAILABLE: &str =
    "Sorry, I couldn't come up with a reply just now. Please try again.";

/// Composes the classifier, extractor, and slot finder with the external
/// calendar and responder to answer one message.
pub struct SchedulingOrchestrator<C, R> {
    extractor: TemporalExtractor,
    classifier: IntentClassifier,
    hours: WorkingHours,
    policy: SchedulingConfig,
    calendar: Arc<C>,
    responder: Arc<R>,
}

impl<C: CalendarProvider, R: Responder> SchedulingOrchestrator<C, R> {
    pub fn new(
        hours: WorkingHours,
        policy: SchedulingConfig,
        calendar: Arc<C>,
        responder: Arc<R>,
    ) -> Self {
        Self {
            extractor: TemporalExtractor::new(),
            classifier: IntentClassifier::new(),
            hours,
            policy,
            calendar,
            responder,
        }
    }

    /// Build an orchestrator from validated configuration.
    pub fn from_config(config: &Config, calendar: Arc<C>, responder: Arc<R>) -> Result<Self> {
        let timezone = config.working_hours.timezone()?;
        let hours = WorkingHours::from_hours(
            config.working_hours.start_hour,
            config.working_hours.end_hour,
            timezone,
        );
        Ok(Self::new(
            hours,
            config.scheduling.clone(),
            calendar,
            responder,
        ))
    }

    /// Handle one message and produce the reply text. `now` anchors
    /// relative date expressions.
    pub async fn handle(&self, message: &str, now: DateTime<Utc>) -> String {
        let today = now.with_timezone(&self.hours.timezone).date_naive();
        let temporal = self.extractor.extract(message, today);
        let intent = self.classifier.classify(message, temporal.is_some());
        tracing::debug!(?intent, temporal = temporal.is_some(), "classified message");

        match intent {
            Intent::Book => self.handle_book(temporal).await,
            Intent::Fetch => self.handle_fetch(message, temporal, today).await,
            Intent::Chat | Intent::Unknown => self.handle_chat(message).await,
        }
    }

    // ========================================================================
    // Book path
    // ========================================================================

    async fn handle_book(&self, temporal: Option<TemporalReference>) -> String {
        let Some(temporal) = temporal else {
            return "I'd be happy to set that up. When would you like to meet? \
                    Try something like \"tomorrow at 3pm\"."
                .to_string();
        };

        // A date without a time is not bookable; offer that day's free
        // slots instead of booking at midnight.
        if !temporal.has_time() {
            return self.suggest_slots(temporal.date).await;
        }

        let start = temporal.resolve(self.hours.timezone);
        let end = start + Duration::minutes(self.policy.default_event_minutes);

        let busy = match self.busy_for_day(temporal.date).await {
            Ok(busy) => busy,
            Err(e) => {
                tracing::warn!(error = %e, "calendar fetch failed during booking");
                return CALENDAR_UNAVAILABLE.to_string();
            }
        };

        if busy.iter().any(|b| b.overlaps(start, end)) {
            return format!(
                "You already have something around {}. Want to try another time?",
                self.format_datetime(start)
            );
        }

        let request = BookingRequest {
            start,
            end,
            summary: self.policy.default_summary.clone(),
            timezone: self.hours.timezone,
        };
        match self.calendar.create_event(&request).await {
            Ok(created) => {
                tracing::info!(event_id = %created.id, "booked event");
                format!(
                    "Booked '{}' on {}.",
                    created.summary,
                    self.format_datetime(start)
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "event creation failed");
                CALENDAR_UNAVAILABLE.to_string()
            }
        }
    }

    /// Free-slot suggestions for a day, used when a Book request lacks a
    /// time of day.
    async fn suggest_slots(&self, day: NaiveDate) -> String {
        let busy = match self.busy_for_day(day).await {
            Ok(busy) => busy,
            Err(e) => {
                tracing::warn!(error = %e, "calendar fetch failed during slot suggestion");
                return CALENDAR_UNAVAILABLE.to_string();
            }
        };

        let window = self.hours.window_for(day);
        let slots = find_free(&window, &busy, self.policy.min_slot_minutes);
        if slots.is_empty() {
            return format!(
                "You're fully booked on {}. Want to try another day?",
                day.format("%A, %d %B %Y")
            );
        }

        let lines: Vec<String> = slots
            .iter()
            .map(|s| format!("- {} to {}", self.format_time(s.start), self.format_time(s.end)))
            .collect();
        format!(
            "What time works for you on {}? You're free at:\n{}",
            day.format("%A, %d %B %Y"),
            lines.join("\n")
        )
    }

    // ========================================================================
    // Fetch path
    // ========================================================================

    async fn handle_fetch(
        &self,
        message: &str,
        temporal: Option<TemporalReference>,
        today: NaiveDate,
    ) -> String {
        let day = temporal.map(|t| t.date).unwrap_or(today);
        let message = message.to_lowercase();
        let wants_slots = ["free", "available", "availability", "slot", "khali"]
            .iter()
            .any(|t| message.contains(t));

        if wants_slots {
            return self.render_free_slots(day).await;
        }
        self.render_events(day).await
    }

    async fn render_events(&self, day: NaiveDate) -> String {
        let (start, end) = self.hours.day_bounds(day);
        let events = match self.calendar.list_events(start, end).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "calendar fetch failed");
                return CALENDAR_UNAVAILABLE.to_string();
            }
        };

        if events.is_empty() {
            return format!("You have no meetings on {}.", day.format("%A, %d %B %Y"));
        }

        let lines: Vec<String> = events
            .iter()
            .map(|e| match e.start {
                Some(start) => format!("- {} at {}", e.summary, self.format_time(start)),
                None => format!("- {} (all day)", e.summary),
            })
            .collect();
        format!(
            "Your meetings on {}:\n{}",
            day.format("%A, %d %B %Y"),
            lines.join("\n")
        )
    }

    async fn render_free_slots(&self, day: NaiveDate) -> String {
        let busy = match self.busy_for_day(day).await {
            Ok(busy) => busy,
            Err(e) => {
                tracing::warn!(error = %e, "calendar fetch failed");
                return CALENDAR_UNAVAILABLE.to_string();
            }
        };

        let window = self.hours.window_for(day);
        let slots = find_free(&window, &busy, self.policy.min_slot_minutes);
        if slots.is_empty() {
            return format!(
                "No free slots on {} within working hours.",
                day.format("%A, %d %B %Y")
            );
        }

        let lines: Vec<String> = slots
            .iter()
            .map(|s| {
                format!(
                    "- {} to {} ({} min)",
                    self.format_time(s.start),
                    self.format_time(s.end),
                    s.duration_minutes
                )
            })
            .collect();
        format!(
            "Free slots on {}:\n{}",
            day.format("%A, %d %B %Y"),
            lines.join("\n")
        )
    }

    // ========================================================================
    // Chat path
    // ========================================================================

    async fn handle_chat(&self, message: &str) -> String {
        match self.responder.complete(message).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "responder call failed");
                RESPONDER_UNAVAILABLE.to_string()
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// The day's busy intervals: timed events only, all-day excluded.
    async fn busy_for_day(&self, day: NaiveDate) -> Result<Vec<BusyInterval>> {
        let (start, end) = self.hours.day_bounds(day);
        let events = self.calendar.list_events(start, end).await?;
        Ok(events.iter().filter_map(|e| e.busy_interval()).collect())
    }

    fn format_datetime(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.hours.timezone)
            .format("%A, %d %B %Y at %I:%M %p")
            .to_string()
    }

    fn format_time(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.hours.timezone)
            .format("%I:%M %p")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarEvent, InMemoryCalendar};
    use crate::error::CalendarError;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct EchoResponder;

    #[async_trait]
    impl Responder for EchoResponder {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {}", prompt))
        }
    }

    struct DownCalendar;

    #[async_trait]
    impl CalendarProvider for DownCalendar {
        async fn list_events(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<CalendarEvent>> {
            Err(CalendarError::Unavailable("connection refused".to_string()).into())
        }

        async fn create_event(
            &self,
            _request: &BookingRequest,
        ) -> Result<crate::calendar::CreatedEvent> {
            Err(CalendarError::Unavailable("connection refused".to_string()).into())
        }
    }

    fn orchestrator(
        calendar: Arc<InMemoryCalendar>,
    ) -> SchedulingOrchestrator<InMemoryCalendar, EchoResponder> {
        let hours = WorkingHours::from_hours(9, 17, chrono_tz::UTC);
        SchedulingOrchestrator::new(
            hours,
            SchedulingConfig::default(),
            calendar,
            Arc::new(EchoResponder),
        )
    }

    fn now() -> DateTime<Utc> {
        // Wednesday 08:00 UTC.
        Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_book_happy_path() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let orch = orchestrator(calendar.clone());

        let reply = orch.handle("Let's meet tomorrow at 3pm", now()).await;
        assert!(reply.contains("Booked 'Meeting with user'"), "got: {reply}");
        assert!(reply.contains("Thursday, 11 January 2024 at 03:00 PM"), "got: {reply}");
        assert_eq!(calendar.len().await, 1);
    }

    #[tokio::test]
    async fn test_book_conflict_not_booked() {
        let calendar = Arc::new(InMemoryCalendar::new());
        calendar
            .insert(CalendarEvent::timed(
                "Existing",
                Utc.with_ymd_and_hms(2024, 1, 11, 15, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 11, 16, 0, 0).unwrap(),
            ))
            .await;
        let orch = orchestrator(calendar.clone());

        let reply = orch.handle("Let's meet tomorrow at 3pm", now()).await;
        assert!(reply.contains("already have something"), "got: {reply}");
        assert_eq!(calendar.len().await, 1);
    }

    #[tokio::test]
    async fn test_book_without_temporal_asks_for_clarification() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let orch = orchestrator(calendar);

        let reply = orch.handle("please book a meeting", now()).await;
        assert!(reply.contains("When would you like to meet"), "got: {reply}");
    }

    #[tokio::test]
    async fn test_book_date_only_suggests_slots() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let orch = orchestrator(calendar.clone());

        let reply = orch.handle("book a meeting tomorrow", now()).await;
        assert!(reply.contains("What time works"), "got: {reply}");
        assert!(reply.contains("09:00 AM to 05:00 PM"), "got: {reply}");
        assert_eq!(calendar.len().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_lists_events() {
        let calendar = Arc::new(InMemoryCalendar::new());
        calendar
            .insert(CalendarEvent::timed(
                "Standup",
                Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 10, 10, 30, 0).unwrap(),
            ))
            .await;
        let orch = orchestrator(calendar);

        let reply = orch.handle("What meetings do I have today?", now()).await;
        assert!(reply.contains("Standup at 10:00 AM"), "got: {reply}");
    }

    #[tokio::test]
    async fn test_fetch_no_meetings_message() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let orch = orchestrator(calendar);

        let reply = orch.handle("show my meetings today", now()).await;
        assert!(reply.contains("no meetings"), "got: {reply}");
    }

    #[tokio::test]
    async fn test_fetch_free_slots_excludes_all_day() {
        let calendar = Arc::new(InMemoryCalendar::new());
        calendar.insert(CalendarEvent::all_day("Holiday")).await;
        calendar
            .insert(CalendarEvent::timed(
                "Standup",
                Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 10, 10, 30, 0).unwrap(),
            ))
            .await;
        let orch = orchestrator(calendar);

        let reply = orch.handle("am I free today?", now()).await;
        assert!(reply.contains("Free slots"), "got: {reply}");
        // The all-day holiday does not consume the window.
        assert!(reply.contains("10:30 AM to 05:00 PM"), "got: {reply}");
    }

    #[tokio::test]
    async fn test_chat_goes_to_responder() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let orch = orchestrator(calendar);

        let reply = orch.handle("hi", now()).await;
        assert_eq!(reply, "echo: hi");
    }

    #[tokio::test]
    async fn test_calendar_failure_degrades_to_text() {
        let hours = WorkingHours::from_hours(9, 17, chrono_tz::UTC);
        let orch = SchedulingOrchestrator::new(
            hours,
            SchedulingConfig::default(),
            Arc::new(DownCalendar),
            Arc::new(EchoResponder),
        );

        let reply = orch.handle("Let's meet tomorrow at 3pm", now()).await;
        assert_eq!(reply, CALENDAR_UNAVAILABLE);

        let reply = orch.handle("show my meetings today", now()).await;
        assert_eq!(reply, CALENDAR_UNAVAILABLE);
    }
}
