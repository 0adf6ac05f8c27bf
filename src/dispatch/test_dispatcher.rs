use tokio::sync::mpsc;

use paxos::{Acceptor, Dest, Message, MessageError, Peer};

use crate::dispatch::Dispatcher;

#[cfg(test)]
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_dispatcher_routes_by_instance() {
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut d = Dispatcher::new(2, 4, out_tx);

    d.deliver_line("1:1:INVITE:11").await.unwrap();
    d.deliver_line("2:1:NOMINATE:3:foo\n").await.unwrap();
    assert_eq!(2, d.instances());

    // instance 1 promised 11; instance 2 is unaffected and still takes round 3
    let mut got = vec![out_rx.recv().await.unwrap(), out_rx.recv().await.unwrap()];
    got.sort_by_key(|m| m.seqn);

    assert_eq!(
        vec![
            Message::rsvp(1, 11, 0, "").with_from(2).with_to(Peer::Node(1)),
            Message::vote(2, 3, "foo").with_from(2).with_to(Dest::All),
        ],
        got
    );

    // same instance, lower round: no reply
    d.deliver_line("1:1:INVITE:1").await.unwrap();
    d.deliver_line("1:1:INVITE:12").await.unwrap();
    assert_eq!(
        Some(Message::rsvp(1, 12, 0, "").with_from(2).with_to(Peer::Node(1))),
        out_rx.recv().await
    );
    assert_eq!(2, d.instances());

    let states = d.close().await;
    assert_eq!(
        Some(&Acceptor {
            rnd: 12,
            vrnd: 0,
            vval: "".into()
        }),
        states.get(&1)
    );
    assert_eq!(
        Some(&Acceptor {
            rnd: 3,
            vrnd: 3,
            vval: "foo".into()
        }),
        states.get(&2)
    );

    // every sender of the outbox is dropped once closed
    assert_eq!(None, out_rx.recv().await);
}

#[tokio::test]
async fn test_dispatcher_drops_malformed() {
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut d = Dispatcher::new(2, 4, out_tx);

    let rst = d.deliver_line("1:*:x:1").await;
    assert_eq!(Err(MessageError::UnknownCommand("x".into())), rst);

    let rst = d.deliver_line("garbage").await;
    assert_eq!(Err(MessageError::PartCount("message", 4, 1)), rst);
    assert_eq!(0, d.instances());

    // a malformed body reaches the instance and is dropped there
    d.deliver_line("1:*:NOMINATE:x").await.unwrap();
    d.deliver_line("1:*:NOMINATE:1:v").await.unwrap();

    assert_eq!(
        Some(Message::vote(1, 1, "v").with_from(2).with_to(Dest::All)),
        out_rx.recv().await
    );

    let states = d.close().await;
    assert_eq!(1, states.len());
    assert_eq!(None, out_rx.recv().await);
}

#[tokio::test]
async fn test_dispatcher_full_outbox_stalls_only_until_drained() {
    // an outbox of 1 forces every instance loop to wait for the consumer
    let (out_tx, mut out_rx) = mpsc::channel(1);
    let mut d = Dispatcher::new(5, 1, out_tx);

    let consumer = tokio::spawn(async move {
        let mut n = 0;
        while let Some(m) = out_rx.recv().await {
            assert_eq!(Peer::Node(5), m.from);
            n += 1;
        }
        n
    });

    for seqn in 1..=20u64 {
        for rnd in 1..=3u64 {
            d.deliver(Message::invite(seqn, rnd)).await;
        }
    }

    let states = d.close().await;
    assert_eq!(20, states.len());
    for acc in states.values() {
        assert_eq!(3, acc.rnd);
    }

    assert_eq!(60, consumer.await.unwrap());
}

#[tokio::test]
async fn test_dispatcher_keeps_instances_until_closed() {
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let mut d = Dispatcher::new(2, 4, out_tx);

    for seqn in 1..=5u64 {
        d.deliver(Message::nominate(seqn, 1, "v")).await;
        assert_eq!(
            Some(Message::vote(seqn, 1, "v").with_from(2).with_to(Dest::All)),
            out_rx.recv().await
        );
    }

    // a decided instance is not retired
    assert_eq!(5, d.instances());
    d.deliver(Message::nominate(1, 1, "v")).await;
    assert_eq!(5, d.instances());

    let states = d.close().await;
    assert_eq!(vec![1, 2, 3, 4, 5], states.keys().cloned().collect::<Vec<_>>());
}
