//! Star visibility and cloud coverage from all-sky camera frames.
//!
//! A frame goes through these stages:
//!
//! 1. [`celestial`] places the catalog stars, planets, sun, moon and points of
//!    interest on the sky for the frame's timestamp and filters them by
//!    altitude, magnitude, moon distance and crop mask.
//! 2. [`detection`] filters the image with the configured response function
//!    and finds each star's peak near its projected pixel.
//! 3. [`atmosphere`] and [`visibility`] correct the peak for extinction and
//!    turn it into a visibility in `[0, 1]`.
//! 4. [`cloud`] aggregates visibilities into regional percentages and a
//!    cloud map.
//!
//! [`pipeline::Pipeline`] wires the stages together.

pub mod acquisition;
pub mod atmosphere;
pub mod catalog;
pub mod celestial;
pub mod cloud;
pub mod config;
pub mod crop;
pub mod detection;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod positioning;
pub mod projection;
pub mod ratescan;
pub mod visibility;

pub use config::Config;
pub use error::SkycamError;
pub use frame::Frame;
pub use pipeline::{FrameResult, Pipeline, PipelineOptions};
