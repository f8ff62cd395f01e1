#![forbid(unsafe_code)]

//! Core: waveform sample store, geometry primitives, and index search.

pub mod color;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod sample;
pub mod text;
pub mod units;
pub mod voltage;
