//! Listings EDA - Airbnb Listings CSV Analysis & Chart Generator
//!
//! A five-stage pipeline over a listings dataset: load a delimited file,
//! filter to one city, impute missing host registration dates, compute
//! grouped price aggregates, and render charts. Each stage takes the
//! previous table and returns a new one; nothing is mutated in place.

pub mod charts;
pub mod data;
pub mod report;
pub mod stats;
