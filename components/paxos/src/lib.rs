//! paxos implements the acceptor role of single-decree paxos:
//! the colon-delimited message codec and the per-instance acceptor state machine.

#[macro_use]
extern crate quick_error;

pub mod acceptor;
pub mod message;

pub use acceptor::*;
pub use message::*;
