#![cfg_attr(not(test), no_std)]

//! Hardware-free state machine for the accept button: link supervision,
//! press debouncing, the accept request and the status display sequence.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod input;
pub mod network;
pub mod render;

#[cfg(test)]
mod testing;
