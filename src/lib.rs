//! Pianola: compiles analyzed piano notes into timed key events and plays
//! them in real time through a pluggable output backend.

pub mod backend;
pub mod compile;
pub mod config;
pub mod humanize;
pub mod model;
pub mod playback;
pub mod score;
