//! hero-narrator: narrated HTML rosters of Marvel characters.
//!
//! Pipeline for one starting letter:
//! - `catalog`: GET the character listing from the Marvel API
//! - `record`: normalise the listing into [`record::CharacterRecord`]s
//! - `narrator`: synthesize each description to MP3 via Google Text-to-Speech
//! - `report`: render the HTML page linking the audio files

pub mod catalog;
pub mod config;
pub mod error;
pub mod narrator;
pub mod pipeline;
pub mod record;
pub mod report;

pub use error::{Error, Result};
