//! Starter select - a party-building screen over a species catalog and save data
//!
//! The library exposes the selection state machine and its collaborators for testing.

pub mod action;
pub mod audio;
pub mod bonus;
pub mod detail;
pub mod dex;
pub mod effect;
pub mod persist;
pub mod reducer;
pub mod species;
pub mod sprite;
pub mod state;
pub mod ui;
