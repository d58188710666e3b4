//! Tubely HTTP API
//!
//! Axum server exposing video drafts, the upload endpoint that drives the ingestion
//! pipeline, signed playback reads and the local asset route.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
