//! DashMigrate - guided migration of BI dashboards to Power BI
//!
//! The wizard walks through eight steps, keeps every artifact in a small
//! JSON store on disk and calls an external multimodal model for the
//! extraction, analysis, script and comparison steps.

pub mod app;
pub mod config;
pub mod datasource;
pub mod gateway;
pub mod logging;
pub mod report;
pub mod steps;
pub mod store;
pub mod types;
pub mod ui;
pub mod wizard;

pub use wizard::{Wizard, WizardSettings};
