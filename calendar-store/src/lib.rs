mod error;
mod store;
mod structs;

pub use error::{Error, Result};
pub use store::Store;
pub use structs::{
    Calendar, CalendarInput, CalendarPatch, Entry, EntryInput, EntryPatch, NewCalendar, NewEntry,
    TimePolicy,
};
