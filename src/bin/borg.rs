#[macro_use]
extern crate slog_scope;

use clap::{App, Arg, ArgMatches};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use borg::setup::{init_logger, init_term_logger};
use borg::{
    encode_line, parse_node_id, utf8_line, ConfError, Dispatcher, NodeConf, Server, DEFAULT_LISTEN,
};

fn build_conf(matches: &ArgMatches) -> Result<NodeConf, ConfError> {
    let mut conf = match matches.value_of("conf") {
        Some(path) => NodeConf::from_file(path)?,
        None => {
            // without a conf file the node id must be given
            let id = matches.value_of("id").unwrap_or("");
            NodeConf::new(parse_node_id(id)?)
        }
    };

    if let Some(id) = matches.value_of("id") {
        conf.node_id = parse_node_id(id)?;
    }
    if let Some(addr) = matches.value_of("listen") {
        conf.listen = addr.parse()?;
    }
    if let Some(path) = matches.value_of("log") {
        conf.log_path = path.into();
    }

    conf.check()?;
    Ok(conf)
}

/// run_stdio reads wire messages from stdin and writes outgoing messages to
/// stdout until stdin is closed.
async fn run_stdio(conf: NodeConf) -> std::io::Result<()> {
    let (out_tx, mut out_rx) = mpsc::channel(conf.outbox);
    let mut dispatcher = Dispatcher::from_conf(&conf, out_tx);

    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = out_rx.recv().await {
            stdout.write_all(encode_line(&msg).as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match stdin.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("read stdin failed: "; "err" => %e);
                break;
            }
        }

        match utf8_line(&buf) {
            Some(line) if !line.is_empty() => {
                let _ = dispatcher.deliver_line(line).await;
            }
            _ => {}
        }
    }

    dispatcher.close().await;
    printer.await??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listen_help = format!("address to serve the line protocol, default {}", DEFAULT_LISTEN);

    let matches = App::new("borg")
        .version("0.1.0")
        .about("paxos acceptor node")
        .arg(
            Arg::with_name("conf")
                .long("conf")
                .takes_value(true)
                .help("node config in yaml"),
        )
        .arg(
            Arg::with_name("id")
                .long("id")
                .takes_value(true)
                .help("node id of this node, a positive integer. It overrides node_id in conf"),
        )
        .arg(
            Arg::with_name("listen")
                .long("listen")
                .takes_value(true)
                .help(listen_help.as_str()),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .takes_value(true)
                .help("path of log file"),
        )
        .arg(
            Arg::with_name("stdio")
                .long("stdio")
                .help("read messages from stdin and write replies to stdout instead of serving tcp"),
        )
        .get_matches();

    let conf = build_conf(&matches)?;

    if matches.is_present("stdio") {
        let _guard = init_term_logger();
        run_stdio(conf).await?;
        return Ok(());
    }

    let _guard = init_logger(&conf.log_path)?;

    let mut server = Server::new(conf);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    server.stop()?;
    server.join().await?;

    Ok(())
}
