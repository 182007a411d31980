//! Photo organization module.
//!
//! Files photos into a `YYYY/MM/DD` folder structure using their capture date.

mod organizer;
mod types;

pub use organizer::{day_folder, FileOrganizer};
pub use types::*;
