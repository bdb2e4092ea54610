//! Print-job cost estimation.
//!
//! Finds the cheapest way to produce a requested piece size and quantity from a
//! catalog of priced press-sheet offerings, classifies the fit as standard or
//! custom cut and proposes nearby sizes and quantity tiers.

pub mod api;
pub mod catalog;
pub mod config;
pub mod estimator;
pub mod geometry;
pub mod grouping;
pub mod layout;
pub mod model;
pub mod pricing;
pub mod suggestions;
pub mod types;
