use std::collections::{BTreeMap, HashMap};

use slog::{debug, error, info, o, warn, Logger};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use paxos::{serve, Acceptor, Message, MessageError, NodeId, Outcome, Seqn};

use crate::conf::NodeConf;

/// Dispatcher routes every inbound message to the acceptor of its instance.
///
/// Each instance owns a bounded mailbox drained by its own task. The mailbox
/// and the acceptor are created when the first message of an instance
/// arrives. Replies of all instances go to one shared outbox, stamped with
/// this node's id.
///
/// Instances are never retired: every distinct `Seqn` a peer sends keeps a
/// task and a mailbox alive until `close()`. A long running node therefore
/// grows with the number of instances it has seen.
pub struct Dispatcher {
    node_id: NodeId,
    logger: Logger,
    mailbox: usize,
    outbox: mpsc::Sender<Message>,
    mailboxes: HashMap<Seqn, mpsc::Sender<Message>>,
    loops: Vec<(Seqn, JoinHandle<Acceptor>)>,
}

impl Dispatcher {
    pub fn new(node_id: NodeId, mailbox: usize, outbox: mpsc::Sender<Message>) -> Dispatcher {
        Dispatcher {
            node_id,
            logger: slog_scope::logger().new(o!("node" => node_id)),
            mailbox,
            outbox,
            mailboxes: HashMap::new(),
            loops: Vec::new(),
        }
    }

    pub fn from_conf(conf: &NodeConf, outbox: mpsc::Sender<Message>) -> Dispatcher {
        Dispatcher::new(conf.node_id, conf.mailbox, outbox)
    }

    /// instances returns the number of instances seen so far.
    pub fn instances(&self) -> usize {
        self.mailboxes.len()
    }

    /// deliver hands `msg` to its instance, waiting if the mailbox is full.
    pub async fn deliver(&mut self, msg: Message) {
        let seqn = msg.seqn;

        let tx = match self.mailboxes.get(&seqn) {
            Some(tx) => tx.clone(),
            None => self.spawn_instance(seqn),
        };

        if tx.send(msg).await.is_err() {
            // only a panicked loop drops its receiver
            error!(self.logger, "instance loop is gone, message dropped: "; "seqn" => seqn);
        }
    }

    /// deliver_line decodes a wire line and delivers it.
    /// A malformed line is dropped and nothing else is affected.
    pub async fn deliver_line(&mut self, line: &str) -> Result<(), MessageError> {
        let msg = match line.trim_end().parse::<Message>() {
            Ok(m) => m,
            Err(e) => {
                warn!(self.logger, "drop malformed line: "; "line" => line, "err" => %e);
                return Err(e);
            }
        };

        self.deliver(msg).await;
        Ok(())
    }

    fn spawn_instance(&mut self, seqn: Seqn) -> mpsc::Sender<Message> {
        let logger = self.logger.new(o!("seqn" => seqn));
        info!(logger, "new instance");

        let (tx, rx) = mpsc::channel(self.mailbox);
        let h = tokio::spawn(serve(self.node_id, rx, self.outbox.clone(), move |m, o| {
            log_outcome(&logger, m, o)
        }));

        self.loops.push((seqn, h));
        self.mailboxes.insert(seqn, tx.clone());
        tx
    }

    /// close closes every mailbox, waits for the instance loops to drain them
    /// and returns the final acceptor state of each instance.
    pub async fn close(self) -> BTreeMap<Seqn, Acceptor> {
        let Dispatcher {
            logger,
            mailboxes,
            loops,
            ..
        } = self;

        drop(mailboxes);

        let mut states = BTreeMap::new();
        for (seqn, h) in loops {
            match h.await {
                Ok(acc) => {
                    states.insert(seqn, acc);
                }
                Err(e) => {
                    error!(logger, "instance loop failed: "; "seqn" => seqn, "err" => %e);
                }
            }
        }
        info!(logger, "dispatcher closed: "; "instances" => states.len());
        states
    }
}

fn log_outcome(logger: &Logger, msg: &Message, outcome: &Outcome) {
    match outcome {
        Outcome::Malformed(e) => {
            warn!(logger, "drop malformed message: "; "msg" => %msg, "err" => %e);
        }
        _ => {
            debug!(logger, "handled: "; "msg" => %msg, "outcome" => ?outcome);
        }
    }
}
