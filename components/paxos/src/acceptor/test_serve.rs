use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::acceptor::{serve, Acceptor, Outcome};
use crate::message::{Dest, Message, Peer};

#[cfg(test)]
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_serve() {
    let (in_tx, in_rx) = mpsc::channel(4);
    let (out_tx, mut out_rx) = mpsc::channel(4);

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let o = outcomes.clone();

    let h = tokio::spawn(serve(2, in_rx, out_tx, move |_m: &Message, outcome: &Outcome| {
        o.lock().unwrap().push(outcome.clone());
    }));

    in_tx.send(Message::invite(5, 11).with_from(1)).await.unwrap();
    assert_eq!(
        Some(Message::rsvp(5, 11, 0, "").with_from(2).with_to(Peer::Node(1))),
        out_rx.recv().await
    );

    let bad: Message = "5:1:NOMINATE:x".parse().unwrap();
    in_tx.send(bad).await.unwrap();
    in_tx.send(Message::invite(5, 1).with_from(1)).await.unwrap();
    in_tx.send(Message::nominate(5, 11, "v").with_from(1)).await.unwrap();
    drop(in_tx);

    let acc = h.await.unwrap();
    assert_eq!(
        Acceptor {
            rnd: 11,
            vrnd: 11,
            vval: "v".into()
        },
        acc
    );

    assert_eq!(
        Some(Message::vote(5, 11, "v").with_from(2).with_to(Dest::All)),
        out_rx.recv().await
    );
    // the loop ended and dropped its sender
    assert_eq!(None, out_rx.recv().await);

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(4, outcomes.len());
    assert_eq!(Outcome::Promised(11), outcomes[0]);
    match &outcomes[1] {
        Outcome::Malformed(_) => {}
        o => panic!("expect Malformed but: {:?}", o),
    }
    assert_eq!(
        Outcome::Stale {
            rnd: 1,
            promised: 11
        },
        outcomes[2]
    );
    assert_eq!(Outcome::Voted(11), outcomes[3]);
}

#[tokio::test]
async fn test_serve_survives_closed_outbox() {
    let (in_tx, in_rx) = mpsc::channel(4);
    let (out_tx, out_rx) = mpsc::channel(1);
    drop(out_rx);

    let h = tokio::spawn(serve(2, in_rx, out_tx, |_: &Message, _: &Outcome| {}));

    in_tx.send(Message::invite(1, 3)).await.unwrap();
    in_tx.send(Message::invite(1, 4)).await.unwrap();
    drop(in_tx);

    let acc = h.await.unwrap();
    assert_eq!(4, acc.rnd);
}
