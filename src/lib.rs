//! Core library for the rd-ledger command line application.
//!
//! The library turns monthly attendance workbooks into the derived payroll
//! workbooks used for R&D expense claims. Spreadsheet adapters live under
//! [`io`] and [`table`], typed records in [`model`], the random day
//! allocation in [`allocate`], one module per derived table
//! ([`timesheet`], [`merge`], [`wages`], [`statistics`], [`distribute`]),
//! and the file-to-file orchestration in [`pipeline`].

pub mod allocate;
pub mod distribute;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod statistics;
pub mod table;
pub mod timesheet;
pub mod wages;

pub use error::{Result, ToolError};
