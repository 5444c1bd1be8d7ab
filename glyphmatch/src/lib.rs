//! glyphmatch - Glyph recognition for screenshots
//!
//! Finds the characters near a point of a screenshot by comparing their
//! pixel shapes against reference glyphs rendered from fonts.
//!
//! # Overview
//!
//! - [`area`]: segmentation into reading-order columns of character areas
//! - [`corpus`]: building, storing and loading the reference glyphs
//! - [`align`]: registration search and halo-graded scoring
//! - [`sched`]: the worker pool running one alignment per character
//!
//! [`Recognizer`] ties them together:
//!
//! ```no_run
//! use glyphmatch::{Point, Recognizer, RecognizerOptions};
//!
//! # fn main() -> glyphmatch::Result<()> {
//! let recognizer = Recognizer::new(RecognizerOptions::default())?;
//! recognizer.load_corpus()?;
//! let image = image::open("screenshot.png").expect("image").to_rgba8();
//! recognizer.set_target_image(&image)?;
//! if let Some(results) = recognizer.run_near(Point::new(120, 48))? {
//!     println!("{}", results.best_match());
//! }
//! recognizer.shutdown()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod options;
mod recognizer;
mod results;

pub use error::{Error, Result};
pub use options::RecognizerOptions;
pub use recognizer::Recognizer;
pub use results::RecognitionResults;

// Re-export core types (primary data structures used everywhere)
pub use glyphmatch_core::*;

// Re-export subsystem crates as modules to avoid name conflicts
pub use glyphmatch_align as align;
pub use glyphmatch_area as area;
pub use glyphmatch_corpus as corpus;
pub use glyphmatch_sched as sched;
