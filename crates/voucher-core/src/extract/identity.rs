//! Record identity: id generation and extraction timestamps.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Source of unique record ids.
pub trait IdGenerator: Send + Sync {
    /// Produce the next id. Must never repeat within one generator.
    fn next_id(&self) -> String;
}

/// Default generator: wall-clock milliseconds plus a monotonically
/// increasing counter, e.g. `acc_1718000000000_7`.
///
/// The counter keeps ids distinct when many blocks open within the same
/// millisecond.
#[derive(Debug, Default)]
pub struct CounterIdGenerator {
    counter: AtomicU64,
}

impl CounterIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for CounterIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("acc_{}_{}", Utc::now().timestamp_millis(), n)
    }
}

/// Deterministic generator producing `<prefix>1`, `<prefix>2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("acc_")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

/// Source of extraction timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_counter_ids_unique_within_same_millisecond() {
        let ids = CounterIdGenerator::new();
        let generated: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 1000);
        assert!(generated.iter().all(|id| id.starts_with("acc_")));
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new("t");
        assert_eq!(ids.next_id(), "t1");
        assert_eq!(ids.next_id(), "t2");
        assert_eq!(SequentialIdGenerator::default().next_id(), "acc_1");
    }

    #[test]
    fn test_fixed_clock() {
        let instant = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }
}
