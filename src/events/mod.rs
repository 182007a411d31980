//! # Events Module
//!
//! Typed reporting from the pipeline to whatever is driving it.
//!
//! ## Design
//! The pipeline emits events through channels, so a CLI, a GUI or a test can
//! subscribe without the core knowing which. Every file that enters the
//! pipeline produces exactly one [`Event::Ingest`] carrying its outcome.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Ingest(IngestOutcome::Organized { source, destination }) = event {
//!             println!("{} -> {}", source.display(), destination.display());
//!         }
//!     }
//! });
//!
//! coordinator.organize_directory(&source, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
