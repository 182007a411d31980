//! # photo-ingest CLI
//!
//! Command-line interface for the photo ingester.
//!
//! ## Usage
//! ```bash
//! photo-ingest watch ~/Drop --dest ~/Photos
//! photo-ingest organize ~/Drop --output json
//! ```

mod cli;

use photo_ingest::Result;

fn main() -> Result<()> {
    photo_ingest::init_tracing();
    cli::run()
}
