//
// lib.rs
// bids-batch
//
// Module list plus a re-export of the CLI entry point, so the binary stays a
// thin shim and tests can drive everything through the library.
//

// One module per CLI verb or shared concern.
pub mod check;
pub mod cli;
pub mod convert;
pub mod copy_source;
pub mod error;
pub mod identity;
pub mod models;
pub mod plan;
pub mod roster;
pub mod runlog;

pub use cli::{run as run_cli, Cli, Commands};
