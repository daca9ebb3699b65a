//! Library side of the `tradesignal` binary: bar loading and the
//! subcommand bodies, kept here so they can be tested without a process.

pub mod commands;
pub mod data;
