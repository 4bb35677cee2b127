//! Sketch-to-render generation orchestrator.
//!
//! Submits sketch images plus a prompt to several image-generation
//! providers behind the Kie.ai job API, tracks each job through a
//! webhook.site notification inbox, and reconciles asynchronous results
//! into a partial or complete gallery.

pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod gallery;
pub mod kie;
pub mod orchestrator;
pub mod providers;
pub mod reconciler;
pub mod registry;
pub mod ui;
pub mod upload;
