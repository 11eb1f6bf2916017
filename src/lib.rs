//! Emergency-department CT scan dashboard.
//!
//! The pipeline is pure and one-way: [`data::loader`] reads the working
//! sheet into a [`data::model::RecordSet`], [`data::filter`] narrows it with
//! the user's selections and [`report`] turns both sets into the metrics and
//! summary tables the UI draws.

pub mod color;
pub mod config;
pub mod data;
pub mod export;
pub mod report;
pub mod state;
