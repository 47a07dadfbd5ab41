//! Spatial Survey - spatial reasoning survey service
//!
//! Participants give informed consent, answer a demographic intake, and work
//! through one randomly assigned booklet of spatial questions. Responses are
//! persisted through a fallback chain so participation never blocks on
//! storage.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
