//! # drivefs-cli
//!
//! Command-line front end for a Drive folder seen as a flat key-value store.
//!
//! ```bash
//! export DRIVEFS_FOLDER=https://drive.google.com/drive/folders/FOLDER_ID
//! drivefs ls
//! drivefs put reports/q1.csv ./q1.csv
//! drivefs cat reports/q1.csv
//! drivefs share reports/q1.csv --type anyone --role reader
//! drivefs rm reports/q1.csv
//! drivefs get https://drive.google.com/file/d/FILE_ID/view --cache --out q1.csv
//! ```

pub mod args;
pub mod commands;

pub use args::{Args, Command};
pub use commands::{run, CliError};
