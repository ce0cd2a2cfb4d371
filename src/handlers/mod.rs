pub mod error;
pub mod inspections;
pub mod listings;
pub mod prefs;
pub mod suburbs;
pub mod trends;
