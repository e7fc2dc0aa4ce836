//! Core library for the lingo-tools command line application.
//!
//! The library converts localization tables between spreadsheets and XML
//! and reconciles two key/value spreadsheets. Spreadsheet and XML adapters
//! live under [`lingo::tools::io`], record types inside
//! [`lingo::tools::model`], tree reconstruction in
//! [`lingo::tools::hierarchy`], table reconciliation in
//! [`lingo::tools::reconcile`], and the operations a front end calls under
//! [`lingo::tools::sync`].

pub mod lingo;

pub use lingo::tools::{
    Result, ToolError, config, error, flatten, hierarchy, io, model, reconcile, sync,
};
