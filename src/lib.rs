//! Redub - Simulated Movie Audio Translation Pipeline
//!
//! Walks a video through transcription, translation, voice synthesis, mixing
//! and export. Every stage is a timed simulation backed by canned output;
//! the providers sit behind traits so real engines can replace them.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod media;
pub mod mix;
pub mod pipeline;
pub mod project;
pub mod server;
pub mod stage;
pub mod synthesize;
pub mod transcribe;
pub mod translate;
