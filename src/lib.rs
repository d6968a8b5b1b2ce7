//! # Hilal Rust
//!
//! Young lunar crescent visibility engine.
//!
//! This crate computes first-crescent sighting prospects for an observing
//! site on a given evening: it locates sunset, evaluates the sun/moon
//! geometry at that instant, scores the crescent with Yallop's q-test, and
//! aggregates a network of stations into a single sighting recommendation.
//! The engine is exposed both as a library and as a REST API via Axum.
//!
//! ## Features
//!
//! - **Event Location**: Sunset, moonset, and preceding-conjunction searches
//! - **Crescent Geometry**: Topocentric altitudes, ARCV, DAZ, elongation,
//!   illumination, and crescent width at the sunset instant
//! - **Yallop q-test**: Continuous score and A..F visibility categories
//! - **Station Sweep**: Per-station reports with failure isolation and
//!   lowest-elevation site selection
//! - **HTTP API**: RESTful endpoints for single-site and network requests
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) shared by library and HTTP callers
//! - [`ephemeris`]: Positional astronomy providers behind the [`ephemeris::Ephemeris`] trait
//! - [`services`]: Sunset location, crescent scoring, and station aggregation
//! - [`models`]: Time wrappers and the observing-station network
//! - [`config`]: File and environment configuration for the server
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;

pub mod config;
pub mod ephemeris;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
