use super::errors::MessageError;
use super::message::{parse_u64, split_exactly, Command, Message, Round};

/// Proto is the decoded body of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proto {
    /// phase 1a: a proposer asks for a promise not to accept anything below `rnd`.
    Invite { rnd: Round },

    /// phase 1b: the promise, reporting the last vote of the acceptor.
    Rsvp {
        rnd: Round,
        vrnd: Round,
        vval: String,
    },

    /// phase 2a: a proposer asks acceptors to vote for `val` in `rnd`.
    Nominate { rnd: Round, val: String },

    /// phase 2b: an acceptor voted for `val` in `rnd`.
    Vote { rnd: Round, val: String },
}

impl Message {
    /// proto decodes the body according to the command.
    /// Nothing is mutated if the body is malformed.
    pub fn proto(&self) -> Result<Proto, MessageError> {
        let body = self.body.as_str();

        let p = match self.cmd {
            Command::Invite => {
                let parts = split_exactly(body, 1, "INVITE body")?;
                Proto::Invite {
                    rnd: parse_u64(parts[0], "INVITE round")?,
                }
            }
            Command::Rsvp => {
                let parts = split_exactly(body, 3, "RSVP body")?;
                Proto::Rsvp {
                    rnd: parse_u64(parts[0], "RSVP round")?,
                    vrnd: parse_u64(parts[1], "RSVP voted round")?,
                    vval: parts[2].into(),
                }
            }
            Command::Nominate => {
                let parts = split_exactly(body, 2, "NOMINATE body")?;
                Proto::Nominate {
                    rnd: parse_u64(parts[0], "NOMINATE round")?,
                    val: parts[1].into(),
                }
            }
            Command::Vote => {
                let parts = split_exactly(body, 2, "VOTE body")?;
                Proto::Vote {
                    rnd: parse_u64(parts[0], "VOTE round")?,
                    val: parts[1].into(),
                }
            }
        };

        Ok(p)
    }
}
