//! Test fixtures for delivery-planner.
//!
//! Provides realistic test data:
//! - Real Fortaleza-area customer locations
//! - `stops_for` to turn a location list into one vehicle's stop records

pub mod fortaleza_locations;

pub use fortaleza_locations::*;
