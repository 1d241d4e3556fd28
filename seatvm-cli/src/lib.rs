//! Library half of the `seatvm` command: subcommand implementations, the
//! progress ledger and the completion sink that feeds it.

pub mod commands;
pub mod ledger;
pub mod sink;
