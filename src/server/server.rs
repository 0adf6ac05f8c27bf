use std::mem::replace;
use std::net::SocketAddr;
use std::str::from_utf8;
use std::time::Duration;

// for boxed()
use futures::future::FutureExt;
use futures::Future;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::sync::oneshot::Sender;
use tokio::task::JoinHandle;

use paxos::Message;

use crate::conf::NodeConf;
use crate::dispatch::Dispatcher;
use crate::ServerError;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Server speaks a line protocol over tcp.
///
/// A peer sends one wire message per line. Every message this node emits is
/// written to every connected peer as `<dest> <wire message>`, where dest is a
/// node id, `*` for an unspecified peer, or `all`. Peers pick what is meant
/// for them.
pub struct Server {
    conf: NodeConf,
    stop_txs: Vec<(&'static str, Sender<()>)>,
    join_handle: Option<JoinHandle<Result<(), ServerError>>>,
}

impl Server {
    pub fn new(conf: NodeConf) -> Server {
        Server {
            conf,
            stop_txs: Vec::new(),
            join_handle: None,
        }
    }

    /// Binds the listen address and starts serving in background.
    /// It returns the bound address, which differs from the configured one if
    /// the configured port is 0.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        let lis = TcpListener::bind(self.conf.listen).await?;
        let addr = lis.local_addr()?;

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let fut = serve_with_shutdown(lis, self.conf.clone(), async move {
            rx.await.ok();
        });
        self.join_handle = Some(tokio::spawn(fut));
        self.stop_txs.push(("line", tx));

        info!("serving: "; "addr" => %addr, "node_id" => self.conf.node_id);
        Ok(addr)
    }

    pub fn stop(&mut self) -> Result<(), ServerError> {
        while let Some((name, tx)) = self.stop_txs.pop() {
            tx.send(()).or(Err(ServerError::RxClosed))?;
            info!("stop signal sent: "; "server" => name);
        }
        Ok(())
    }

    pub async fn join(&mut self) -> Result<(), ServerError> {
        let j = replace(&mut self.join_handle, None);
        j.ok_or(ServerError::NotStarted)?.await?
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// encode_line formats an outgoing message as one line of the line protocol.
pub fn encode_line(msg: &Message) -> String {
    format!("{} {}\n", msg.to, msg)
}

/// utf8_line returns `buf` as a str without its line ending.
/// A line that is not utf-8 is dropped with a warning.
pub fn utf8_line(buf: &[u8]) -> Option<&str> {
    match from_utf8(buf) {
        Ok(s) => Some(s.trim_end_matches(&['\n', '\r'][..])),
        Err(e) => {
            let lossy = String::from_utf8_lossy(buf);
            warn!("drop non utf-8 line: "; "line" => %lossy, "err" => %e);
            None
        }
    }
}

/// serve_with_shutdown accepts peers on `lis` until `signal` resolves, then
/// closes every instance and waits for their replies to be flushed.
pub async fn serve_with_shutdown<F>(
    lis: TcpListener,
    conf: NodeConf,
    signal: F,
) -> Result<(), ServerError>
where
    F: Future + Send + 'static,
{
    // impl Unpin
    let mut sig = signal.boxed();

    let (out_tx, out_rx) = mpsc::channel::<Message>(conf.outbox);
    let (line_tx, mut line_rx) = mpsc::channel::<String>(conf.mailbox);
    let (bcast_tx, _) = broadcast::channel::<String>(conf.outbox);

    let mut dispatcher = Dispatcher::from_conf(&conf, out_tx);
    let fan = tokio::spawn(fan_out(out_rx, bcast_tx.clone()));

    loop {
        tokio::select! {
            _v = (&mut sig) => {
                break;
            },
            inc = lis.accept() => {
                match inc {
                    Ok((sock, peer)) => {
                        info!("new connection: "; "peer" => %peer);
                        tokio::spawn(handle_conn(sock, line_tx.clone(), bcast_tx.subscribe()));
                    }
                    Err(e) => {
                        // e.g. too many open files: back off instead of spinning
                        warn!("accept failed: "; "err" => %e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            },
            Some(line) = line_rx.recv() => {
                let _ = dispatcher.deliver_line(&line).await;
            },
        }
    }

    drop(lis);
    let states = dispatcher.close().await;
    fan.await?;

    info!("server stopped: "; "instances" => states.len());
    Ok(())
}

/// fan_out copies every outgoing message to every connection.
async fn fan_out(mut out_rx: mpsc::Receiver<Message>, bcast: broadcast::Sender<String>) {
    while let Some(msg) = out_rx.recv().await {
        // no connection at all: nobody to deliver to
        let _ = bcast.send(encode_line(&msg));
    }
}

async fn handle_conn(
    sock: TcpStream,
    lines: mpsc::Sender<String>,
    mut outs: broadcast::Receiver<String>,
) {
    let (rd, mut wr) = sock.into_split();

    let writer = tokio::spawn(async move {
        loop {
            match outs.recv().await {
                Ok(l) => {
                    if let Err(e) = wr.write_all(l.as_bytes()).await {
                        warn!("write to peer failed: "; "err" => %e);
                        return;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!("slow peer, outgoing messages dropped: "; "n" => n);
                }
                Err(RecvError::Closed) => return,
            }
        }
    });

    let mut rd = BufReader::new(rd);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match rd.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = match utf8_line(&buf) {
                    Some(l) => l,
                    None => continue,
                };
                if lines.send(line.to_string()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("read from peer failed: "; "err" => %e);
                break;
            }
        }
    }

    info!("connection closed");
    writer.abort();
}
