#![cfg_attr(not(test), no_std)]

//! Board adapters for the AtomS3: button input, status rendering and the
//! panel surface used by `accept-core`.

pub mod input;
pub mod platform;
pub mod render;
