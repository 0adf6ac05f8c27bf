use std::cell::RefCell;
use std::io::{self, Write};
use std::str::from_utf8;

use chrono::DateTime;
use slog::{slog_debug, slog_info, slog_warn, Drain};

use super::log_format::BorgFormat;
use super::log_format::TIMESTAMP_FORMAT;

#[cfg(test)]
use pretty_assertions::assert_eq;

thread_local! {
    static BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::new());
}

struct TestWriter;

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BUFFER.with(|buffer| buffer.borrow_mut().write(buf))
    }
    fn flush(&mut self) -> io::Result<()> {
        BUFFER.with(|buffer| buffer.borrow_mut().flush())
    }
}

/// split_line splits `[<timestamp>] [<level>] [<file>:<line>] <rest>`.
fn split_line(line: &str) -> (&str, &str, &str, &str) {
    let ts_end = line.find("] [").unwrap();
    let ts = &line[1..ts_end];

    let line = &line[ts_end + 3..];
    let lvl_end = line.find("] [").unwrap();
    let lvl = &line[..lvl_end];

    let line = &line[lvl_end + 3..];
    let loc_end = line.find("] ").unwrap();

    (ts, lvl, &line[..loc_end], &line[loc_end + 2..])
}

fn take_output() -> String {
    BUFFER.with(|buffer| {
        let mut buffer = buffer.borrow_mut();
        let s = from_utf8(&*buffer).unwrap().to_string();
        buffer.clear();
        s
    })
}

#[test]
fn test_borg_format() {
    let decorator = slog_term::PlainSyncDecorator::new(TestWriter);
    let drain = BorgFormat::new(decorator).fuse();
    let root = slog::Logger::root(drain, slog::o!());

    let node = root.new(slog::o!("node" => 2));
    let inst = node.new(slog::o!("seqn" => 3));

    slog_info!(root, "logger ready");
    slog_warn!(node, "drop malformed line: "; "line" => "1:*:x:1");
    slog_info!(inst, "new instance");
    slog_debug!(inst, "handled: "; "msg" => "3:1:INVITE:5", "outcome" => ?"Promised(5)");

    let expect = vec![
        ("INFO", "logger ready"),
        ("WARN", "[node=2] drop malformed line: line: 1:*:x:1"),
        ("INFO", "[node=2 seqn=3] new instance"),
        (
            "DEBG",
            "[node=2 seqn=3] handled: msg: 3:1:INVITE:5, outcome: \"Promised(5)\"",
        ),
    ];

    let output = take_output();
    assert_eq!(expect.len(), output.lines().count());

    for (line, (level, rest)) in output.lines().zip(expect.iter()) {
        let (ts, lvl, loc, got) = split_line(line);

        assert!(
            DateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok(),
            "bad timestamp: {}",
            line
        );
        assert_eq!(*level, lvl);
        assert!(loc.starts_with("src/setup/test_format.rs:"), "{}", line);
        assert_eq!(*rest, got);
    }
}
