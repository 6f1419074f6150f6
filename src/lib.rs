//! Batch downloader for fuckingfast.co landing pages.
//!
//! A batch runs in two stages: every landing page is resolved concurrently
//! into a [`downloader::Descriptor`], then every resolved file is downloaded
//! concurrently. Per-item failures are collected and reported at the end;
//! they never stop the rest of the batch.

pub mod config;
pub mod downloader;
pub mod error;
pub mod html;
pub mod input;
pub mod progress;
pub mod utils;

pub use config::ServiceConfig;
pub use downloader::{BatchOutcome, OutcomeStatus, download};
pub use error::{BatchError, ItemError};
