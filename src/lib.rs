//! borg runs paxos acceptors behind a line protocol.
//!
//! Every wire message is routed by its instance id to the acceptor of that
//! instance; replies are stamped with this node's id and written back to peers.

#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate slog_scope;

pub mod conf;
pub mod dispatch;
pub mod server;
pub mod setup;

pub use conf::*;
pub use dispatch::*;
pub use server::*;
