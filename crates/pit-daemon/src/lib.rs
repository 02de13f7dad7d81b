#![forbid(unsafe_code)]

//! Pit tracker daemon: HTTP control surface, upload store and the drain loop.

pub mod clock;
pub mod config;
pub mod drain;
pub mod http;
pub mod recognizer;
pub mod service;
pub mod uploads;
