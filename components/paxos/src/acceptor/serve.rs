use tokio::sync::mpsc;

use crate::acceptor::{Acceptor, Outcome, Stamp};
use crate::message::{Message, NodeId};

/// serve is the asynchronous processing loop of one consensus instance.
///
/// It handles messages from `rx` strictly one at a time and sends replies,
/// stamped with `node_id`, to `tx`. Sending awaits a full `tx`, so a slow
/// consumer stalls this instance. `on_outcome` is called once per handled
/// message.
///
/// The loop ends only when `rx` is closed and drained. A closed `tx` does not
/// stop it: replies are dropped and messages keep being handled.
pub async fn serve<F>(
    node_id: NodeId,
    mut rx: mpsc::Receiver<Message>,
    tx: mpsc::Sender<Message>,
    mut on_outcome: F,
) -> Acceptor
where
    F: FnMut(&Message, &Outcome),
{
    let mut acc = Acceptor::new();
    let mut outs = Stamp::new(node_id, Vec::with_capacity(1));

    while let Some(msg) = rx.recv().await {
        let outcome = acc.handle(&msg, &mut outs);
        on_outcome(&msg, &outcome);

        for reply in outs.outs.drain(..) {
            let _ = tx.send(reply).await;
        }
    }

    acc
}
