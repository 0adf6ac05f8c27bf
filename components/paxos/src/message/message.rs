//! Wire representation of the acceptor's message vocabulary.
//!
//! A message travels as one colon-delimited line:
//!
//! ```text
//! <Seqn>:<From>:<Command>:<Body>
//! ```
//!
//! The destination is not part of the line. It is carried next to the message
//! and interpreted by the transport.

use std::fmt;
use std::str::FromStr;

use super::errors::MessageError;

#[cfg(test)]
#[path = "./tests/message_tests.rs"]
mod tests;

/// Seqn identifies the consensus instance a message belongs to.
pub type Seqn = u64;

/// NodeId is the identity of a node in the cluster.
pub type NodeId = u64;

/// Round is a proposal epoch. A higher round takes precedence.
pub type Round = u64;

/// The delimiter between fields on the wire.
pub const DELIM: char = ':';

/// Peer is the sender of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Peer {
    /// Unspecified sender, written as `*`. Used by tests and locally originated messages.
    Any,
    Node(NodeId),
}

/// Dest is where a message should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dest {
    /// Every node in the cluster.
    All,
    Peer(Peer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Invite,
    Rsvp,
    Nominate,
    Vote,
}

/// Message is an immutable envelope exchanged between nodes.
/// `body` is the command specific payload, see [`Proto`](crate::Proto) for its typed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    pub seqn: Seqn,
    pub from: Peer,
    pub to: Dest,
    pub cmd: Command,
    pub body: String,
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::Any => write!(f, "*"),
            Peer::Node(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Peer {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(Peer::Any);
        }
        parse_u64(s, "sender")
            .map(Peer::Node)
            .map_err(|_| MessageError::BadPeer(s.into()))
    }
}

impl From<NodeId> for Peer {
    fn from(id: NodeId) -> Self {
        Peer::Node(id)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dest::All => write!(f, "all"),
            Dest::Peer(p) => write!(f, "{}", p),
        }
    }
}

impl From<Peer> for Dest {
    fn from(p: Peer) -> Self {
        Dest::Peer(p)
    }
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Invite => "INVITE",
            Command::Rsvp => "RSVP",
            Command::Nominate => "NOMINATE",
            Command::Vote => "VOTE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INVITE" => Ok(Command::Invite),
            "RSVP" => Ok(Command::Rsvp),
            "NOMINATE" => Ok(Command::Nominate),
            "VOTE" => Ok(Command::Vote),
            _ => Err(MessageError::UnknownCommand(s.into())),
        }
    }
}

impl Message {
    /// new builds a message with an unspecified sender and destination.
    /// The sink that transmits it is responsible for stamping `from`.
    pub fn new(seqn: Seqn, cmd: Command, body: String) -> Self {
        Message {
            seqn,
            from: Peer::Any,
            to: Dest::Peer(Peer::Any),
            cmd,
            body,
        }
    }

    pub fn invite(seqn: Seqn, rnd: Round) -> Self {
        Message::new(seqn, Command::Invite, format!("{}", rnd))
    }

    pub fn rsvp(seqn: Seqn, rnd: Round, vrnd: Round, vval: &str) -> Self {
        Message::new(
            seqn,
            Command::Rsvp,
            format!("{}{}{}{}{}", rnd, DELIM, vrnd, DELIM, vval),
        )
    }

    pub fn nominate(seqn: Seqn, rnd: Round, val: &str) -> Self {
        Message::new(seqn, Command::Nominate, format!("{}{}{}", rnd, DELIM, val))
    }

    pub fn vote(seqn: Seqn, rnd: Round, val: &str) -> Self {
        Message::new(seqn, Command::Vote, format!("{}{}{}", rnd, DELIM, val))
    }

    pub fn with_from(mut self, node_id: NodeId) -> Self {
        self.from = Peer::Node(node_id);
        self
    }

    pub fn with_to<D: Into<Dest>>(mut self, to: D) -> Self {
        self.to = to.into();
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.seqn,
            self.from,
            self.cmd,
            self.body,
            d = DELIM
        )
    }
}

impl FromStr for Message {
    type Err = MessageError;

    /// Decodes a wire line. The destination of a decoded message is unspecified.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_exactly(s, 4, "message")?;

        Ok(Message {
            seqn: parse_u64(parts[0], "seqn")?,
            from: parts[1].parse()?,
            to: Dest::Peer(Peer::Any),
            cmd: parts[2].parse()?,
            body: parts[3].into(),
        })
    }
}

/// split_exactly splits `s` into exactly `n` parts on `DELIM`.
/// The last part is the remainder and may contain more delimiters.
pub fn split_exactly<'a>(
    s: &'a str,
    n: usize,
    field: &'static str,
) -> Result<Vec<&'a str>, MessageError> {
    let parts: Vec<&str> = s.splitn(n, DELIM).collect();
    if parts.len() != n {
        return Err(MessageError::PartCount(field, n, parts.len()));
    }
    Ok(parts)
}

/// parse_u64 parses a decimal unsigned integer field.
/// Only ascii digits are accepted: no sign, no whitespace.
pub fn parse_u64(s: &str, field: &'static str) -> Result<u64, MessageError> {
    let bad = || MessageError::BadInt(field, s.into());

    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    s.parse::<u64>().map_err(|_| bad())
}
