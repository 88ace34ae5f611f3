//! Chrome trace output, enabled with `-d trace`.
//!
//! Scopes may be entered from rayon workers, so events carry a thread id and
//! the writer sits behind a mutex.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::time::Instant;

static TRACE: Mutex<Option<Trace>> = Mutex::new(None);

struct Event {
    name: &'static str,
    tid: usize,
    start: Instant,
    end: Instant,
}

struct Trace {
    start: Instant,
    w: BufWriter<File>,
    /// First failed write; reported by close().
    err: Option<std::io::Error>,
}

impl Trace {
    fn new(path: &str) -> std::io::Result<Self> {
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "[")?;
        Ok(Trace {
            start: Instant::now(),
            w,
            err: None,
        })
    }

    fn write_event(&mut self, event: &Event) -> std::io::Result<()> {
        write!(
            self.w,
            "{{ \"pid\": 0, \"tid\": {}, \"name\": {:?}, \"ts\": {}, \"ph\": \"X\", \"dur\": {} }}",
            event.tid,
            event.name,
            event.start.duration_since(self.start).as_micros(),
            event.end.duration_since(event.start).as_micros(),
        )
    }

    fn write(&mut self, event: &Event) {
        if self.err.is_some() {
            return;
        }
        let res = self.write_event(event).and_then(|()| writeln!(self.w, ","));
        if let Err(err) = res {
            self.err = Some(err);
        }
    }

    fn close(&mut self) -> std::io::Result<()> {
        if let Some(err) = self.err.take() {
            return Err(err);
        }
        self.write_event(&Event {
            name: "main",
            tid: 0,
            start: self.start,
            end: Instant::now(),
        })?;
        writeln!(self.w, "]")?;
        self.w.flush()
    }
}

fn lock() -> std::sync::MutexGuard<'static, Option<Trace>> {
    // A panic while tracing shouldn't take tracing down with it.
    TRACE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn open(path: &str) -> std::io::Result<()> {
    let trace = Trace::new(path)?;
    *lock() = Some(trace);
    Ok(())
}

#[inline]
pub fn scope<T>(name: &'static str, f: impl FnOnce() -> T) -> T {
    if lock().is_none() {
        return f();
    }
    let start = Instant::now();
    let result = f();
    let event = Event {
        name,
        tid: rayon::current_thread_index().map_or(0, |i| i + 1),
        start,
        end: Instant::now(),
    };
    if let Some(t) = lock().as_mut() {
        t.write(&event);
    }
    result
}

pub fn close() -> std::io::Result<()> {
    if let Some(mut t) = lock().take() {
        return t.close();
    }
    Ok(())
}
