// gigflow/src/core/clock.rs

//! Time source for the workflow. Transitions read "today" from here so the
//! state machine itself stays a pure function of its inputs.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

/// Calendar day and instant at which a transition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
  pub today: NaiveDate,
  pub now: DateTime<Utc>,
}

impl Stamp {
  pub fn at(now: DateTime<Utc>) -> Self {
    Self {
      today: now.date_naive(),
      now,
    }
  }
}

pub trait Clock: Send + Sync + 'static {
  fn now(&self) -> DateTime<Utc>;

  fn stamp(&self) -> Stamp {
    Stamp::at(self.now())
  }

  fn today(&self) -> NaiveDate {
    self.now().date_naive()
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to. Used by tests and replays.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
  pub fn new(now: DateTime<Utc>) -> Self {
    FixedClock(Mutex::new(now))
  }

  pub fn set(&self, now: DateTime<Utc>) {
    *self.0.lock() = now;
  }

  pub fn advance(&self, by: chrono::Duration) {
    let mut guard = self.0.lock();
    *guard += by;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    *self.0.lock()
  }
}
