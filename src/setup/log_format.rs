use std::fmt;
use std::{io, result};

use slog::{Drain, Key, OwnedKVList, Record, KV};
use slog_term::{Decorator, RecordDecorator, Serializer};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

/// BorgFormat writes one line per record. Logger kvs, such as the node and
/// the instance a record comes from, are rendered as a bracketed context
/// before the message. Record kvs follow the message:
///
/// ```text
/// [2020/05/03 10:13:55.035 +08:00] [DEBG] [src/dispatch/dispatcher.rs:42] [node=2 seqn=3] handled: msg: 3:1:INVITE:5
/// ```
pub struct BorgFormat<D>
where
    D: Decorator,
{
    decorator: D,
}

impl<D> BorgFormat<D>
where
    D: Decorator,
{
    pub fn new(d: D) -> BorgFormat<D> {
        BorgFormat { decorator: d }
    }
}

impl<D> Drain for BorgFormat<D>
where
    D: Decorator,
{
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> result::Result<Self::Ok, Self::Err> {
        let mut ctx = Context::default();
        values.serialize(record, &mut ctx)?;

        self.decorator.with_record(record, values, |rd| {
            write_header(rd, record)?;
            ctx.write_to(rd)?;

            rd.start_whitespace()?;
            write!(rd, " ")?;
            rd.start_msg()?;
            write!(rd, "{}", record.msg())?;

            let mut serializer = Serializer::new(rd, false, true);
            record.kv().serialize(record, &mut serializer)?;
            serializer.finish()?;

            rd.start_whitespace()?;
            writeln!(rd)?;
            rd.flush()
        })
    }
}

/// write timestamp, level and source location
fn write_header(rd: &mut dyn RecordDecorator, record: &Record) -> io::Result<()> {
    rd.start_timestamp()?;
    write!(rd, "[{}]", chrono::Local::now().format(TIMESTAMP_FORMAT))?;

    rd.start_whitespace()?;
    write!(rd, " ")?;

    rd.start_level()?;
    write!(rd, "[{}]", record.level().as_short_str())?;

    rd.start_whitespace()?;
    write!(rd, " ")?;

    // there is no `start_location()`
    rd.start_msg()?;
    write!(rd, "[{}:{}]", record.file(), record.line())
}

/// Context collects logger kvs as `key=value`.
#[derive(Default)]
struct Context {
    kvs: Vec<(Key, String)>,
}

impl Context {
    /// write_to writes ` [k1=v1 k2=v2]`, outermost logger first.
    /// Nothing is written for a logger without kvs.
    fn write_to(&self, rd: &mut dyn RecordDecorator) -> io::Result<()> {
        if self.kvs.is_empty() {
            return Ok(());
        }

        rd.start_whitespace()?;
        write!(rd, " ")?;

        rd.start_key()?;
        write!(rd, "[")?;
        // a child logger's kvs are serialized before its parent's
        for (i, (k, v)) in self.kvs.iter().rev().enumerate() {
            if i > 0 {
                write!(rd, " ")?;
            }
            write!(rd, "{}={}", k, v)?;
        }
        write!(rd, "]")
    }
}

impl slog::Serializer for Context {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        self.kvs.push((key, format!("{}", val)));
        Ok(())
    }
}
