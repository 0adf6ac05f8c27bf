use crate::acceptor::Putter;
use crate::message::{Dest, Message, MessageError, Proto, Round};

#[cfg(test)]
#[path = "./tests/acceptor_tests.rs"]
mod tests;

/// Acceptor is the state of the acceptor role for one consensus instance.
///
/// It is owned by exactly one processing loop. Every field starts at zero and
/// `vrnd <= rnd` holds after every update.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Acceptor {
    /// The highest round promised. Nothing below it will be voted for.
    pub rnd: Round,

    /// The highest round voted in, 0 if never voted.
    pub vrnd: Round,

    /// The value voted for in `vrnd`.
    pub vval: String,
}

/// Outcome describes what `Acceptor::handle` did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An INVITE raised the promise and an RSVP was put.
    Promised(Round),

    /// A NOMINATE was voted for and a VOTE was put.
    Voted(Round),

    /// The round is below what has been promised.
    Stale { rnd: Round, promised: Round },

    /// A vote has already been cast in this round.
    Duplicate(Round),

    /// The command is not addressed to an acceptor.
    Ignored,

    Malformed(MessageError),
}

impl Acceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// handle applies one incoming message and puts 0 or 1 replies to `outs`.
    ///
    /// A malformed message or an unexpected command leaves the state untouched
    /// and puts nothing.
    pub fn handle<P: Putter + ?Sized>(&mut self, msg: &Message, outs: &mut P) -> Outcome {
        let proto = match msg.proto() {
            Ok(p) => p,
            Err(e) => return Outcome::Malformed(e),
        };

        match proto {
            Proto::Invite { rnd } => {
                if rnd <= self.rnd {
                    return Outcome::Stale {
                        rnd,
                        promised: self.rnd,
                    };
                }

                self.rnd = rnd;

                let reply = Message::rsvp(msg.seqn, rnd, self.vrnd, &self.vval)
                    .with_to(Dest::Peer(msg.from));
                outs.put(reply);

                Outcome::Promised(rnd)
            }
            Proto::Nominate { rnd, val } => {
                if rnd < self.rnd {
                    return Outcome::Stale {
                        rnd,
                        promised: self.rnd,
                    };
                }

                // Vote at most once per round. A round promised but not yet voted
                // in is still nominate-able.
                if rnd == self.vrnd {
                    return Outcome::Duplicate(rnd);
                }

                self.rnd = rnd;
                self.vrnd = rnd;
                self.vval = val;

                let vote = Message::vote(msg.seqn, rnd, &self.vval).with_to(Dest::All);
                outs.put(vote);

                Outcome::Voted(rnd)
            }
            Proto::Rsvp { .. } | Proto::Vote { .. } => Outcome::Ignored,
        }
    }
}

/// run drives a fresh acceptor with every message from `ins`, in order,
/// putting replies to `outs`.
///
/// It returns only when `ins` is exhausted, with the final state.
pub fn run<I, P>(ins: I, mut outs: P) -> Acceptor
where
    I: IntoIterator<Item = Message>,
    P: Putter,
{
    let mut acc = Acceptor::new();
    for msg in ins {
        acc.handle(&msg, &mut outs);
    }
    acc
}
