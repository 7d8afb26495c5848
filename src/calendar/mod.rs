//! Calendar data types, the external-provider seam, and free-slot
//! computation.

mod provider;
mod slots;
mod types;

pub use provider::{CalendarProvider, InMemoryCalendar};
pub use slots::find_free;
pub use types::{
    BookingRequest, BusyInterval, CalendarEvent, CreatedEvent, FreeInterval, WorkingHours,
    WorkingWindow,
};
