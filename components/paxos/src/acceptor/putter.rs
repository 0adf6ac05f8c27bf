use std::sync::mpsc;

use crate::message::{Message, NodeId, Peer};

/// Putter is the sink an acceptor emits messages to.
///
/// Unicast replies and broadcasts share this one call; the destination is
/// already set in `msg.to` and fan-out is up to the implementation.
/// `put` may block to apply backpressure but it never fails: a message that
/// can not be delivered is dropped.
pub trait Putter {
    fn put(&mut self, msg: Message);
}

impl Putter for Vec<Message> {
    fn put(&mut self, msg: Message) {
        self.push(msg);
    }
}

impl Putter for mpsc::Sender<Message> {
    fn put(&mut self, msg: Message) {
        let _ = self.send(msg);
    }
}

impl Putter for mpsc::SyncSender<Message> {
    fn put(&mut self, msg: Message) {
        let _ = self.send(msg);
    }
}

impl<P: Putter + ?Sized> Putter for &mut P {
    fn put(&mut self, msg: Message) {
        (**self).put(msg);
    }
}

/// Stamp sets `from` of every message to the identity of this node before
/// handing it to the inner sink.
///
/// The acceptor does not know who it is; it is wrapped in a `Stamp` by
/// whoever owns the node identity.
#[derive(Debug, Clone)]
pub struct Stamp<P> {
    pub node_id: NodeId,
    pub outs: P,
}

impl<P> Stamp<P> {
    pub fn new(node_id: NodeId, outs: P) -> Self {
        Stamp { node_id, outs }
    }

    pub fn into_inner(self) -> P {
        self.outs
    }
}

impl<P: Putter> Putter for Stamp<P> {
    fn put(&mut self, mut msg: Message) {
        msg.from = Peer::Node(self.node_id);
        self.outs.put(msg);
    }
}
