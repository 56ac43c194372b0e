use std::{
    cell::RefCell,
    marker::PhantomData,
    sync::{Mutex, Once, PoisonError},
};

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use log::{Level, LevelFilter, Log, Metadata, Record};
use timebox_proto::ports::time::TimeSource;

/// Build an unambiguous local timestamp.
pub fn local(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .expect("unambiguous local timestamp")
}

#[derive(Debug)]
struct ScriptState {
    next: DateTime<Local>,
    readings: Vec<DateTime<Local>>,
}

/// [`TimeSource`] that starts at a fixed moment and moves by `step` on
/// every reading.
#[derive(Debug)]
pub struct ScriptedClock {
    step: TimeDelta,
    state: Mutex<ScriptState>,
}

impl ScriptedClock {
    pub fn starting_at(start: DateTime<Local>, step: TimeDelta) -> Self {
        Self {
            step,
            state: Mutex::new(ScriptState {
                next: start,
                readings: Vec::new(),
            }),
        }
    }

    /// Clock frozen at `moment`.
    pub fn fixed(moment: DateTime<Local>) -> Self {
        Self::starting_at(moment, TimeDelta::zero())
    }

    /// Every moment handed out so far, in order.
    pub fn readings(&self) -> Vec<DateTime<Local>> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .readings
            .clone()
    }
}

impl TimeSource for ScriptedClock {
    fn now(&self) -> DateTime<Local> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = state.next;
        state.next = now + self.step;
        state.readings.push(now);
        now
    }
}

/// Log record seen by [`LogCapture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub message: String,
}

thread_local! {
    static RECORDS: RefCell<Option<Vec<CapturedRecord>>> = const { RefCell::new(None) };
}

struct CaptureLogger;

static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.with_borrow_mut(|records| {
            if let Some(records) = records {
                records.push(CapturedRecord {
                    level: record.level(),
                    message: record.args().to_string(),
                });
            }
        });
    }

    fn flush(&self) {}
}

/// Collects log records emitted on the current thread while alive.
///
/// A current-thread tokio runtime polls spawned tasks on the test thread, so
/// their records are collected too.
#[derive(Debug)]
pub struct LogCapture {
    _thread_bound: PhantomData<*const ()>,
}

impl LogCapture {
    pub fn start() -> Self {
        static INSTALL: Once = Once::new();
        INSTALL.call_once(|| {
            if log::set_logger(&CAPTURE_LOGGER).is_ok() {
                log::set_max_level(LevelFilter::Trace);
            }
        });

        RECORDS.with_borrow_mut(|records| *records = Some(Vec::new()));
        Self {
            _thread_bound: PhantomData,
        }
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        RECORDS.with_borrow(|records| records.clone().unwrap_or_default())
    }

    pub fn count(&self, level: Level) -> usize {
        self.records()
            .iter()
            .filter(|record| record.level == level)
            .count()
    }
}

impl Drop for LogCapture {
    fn drop(&mut self) {
        RECORDS.with_borrow_mut(|records| *records = None);
    }
}
