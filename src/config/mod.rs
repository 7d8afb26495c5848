//! Configuration for the scheduling assistant.

mod settings;

pub use settings::{Config, ResponderConfig, SchedulingConfig, WorkingHoursConfig};
