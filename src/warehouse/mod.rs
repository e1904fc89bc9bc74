//! Execution of generated SQL
//!
//! Statements returned by the analyst are run on demand against the
//! application's database and schema. The rows can be printed as a table or
//! exported as CSV.

pub mod client;
pub mod results;

pub use client::{SqlStatementsClient, StatementContext, StatementRunner};
pub use results::{export_csv, write_csv, Column, ResultSet};
