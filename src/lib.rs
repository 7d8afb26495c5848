//! Sahayak: conversational appointment-scheduling assistant.
//!
//! Accepts free-text messages, classifies intent (book a meeting, list
//! meetings, or casual chat), extracts a date/time when present, and
//! either books or queries events on a calendar backend, falling back to
//! a conversational reply otherwise.

pub mod calendar;
pub mod config;
pub mod error;
pub mod intent;
pub mod orchestrator;
pub mod responder;
pub mod temporal;

pub use calendar::{
    find_free, BookingRequest, BusyInterval, CalendarEvent, CalendarProvider, CreatedEvent,
    FreeInterval, InMemoryCalendar, WorkingHours, WorkingWindow,
};
pub use config::Config;
pub use error::{CalendarError, ConfigError, ResponderError, Result, SahayakError};
pub use intent::{Intent, IntentClassifier};
pub use orchestrator::SchedulingOrchestrator;
pub use responder::{GroqResponder, Responder};
pub use temporal::{TemporalExtractor, TemporalReference};
