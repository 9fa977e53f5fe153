//! spend-monitor: Partner Spend Monitoring
//!
//! Keeps the partner and advertiser configuration tables of a workbook, creates a spend
//! report for every partner that lacks one and registers both tables as external tables in
//! the data warehouse.

pub mod cli;
pub mod config;
pub mod error;
pub mod interpolate;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod rest;
pub mod services;
pub mod sheet;
pub mod tables;
