pub mod calculations;
pub mod classify;
pub mod filters;
pub mod ics;
pub mod inspections;
pub mod prefs;
pub mod store;
