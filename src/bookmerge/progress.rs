//! Progress accounting for the long-running pipelines.
//!
//! Every pipeline step emits exactly one [`ProgressEvent`] to the observer passed
//! into the pipeline call, in processing order. The event carries the counter
//! snapshot, so observers never need to reach back into the engine.
//!
//! Ratios are `processed / total` as floats. A zero total gives `NaN`; callers
//! decide how to render that.

use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressKind {
    Import,
    Clear,
    Dedup,
}

impl ProgressKind {
    /// Notification name, as seen by UI layers.
    pub fn name(&self) -> &'static str {
        match self {
            ProgressKind::Import => "import-progress",
            ProgressKind::Clear => "clear-progress",
            ProgressKind::Dedup => "dedup-progress",
        }
    }
}

impl std::fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Processed/total pair for one pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub processed: usize,
    pub total: usize,
}

impl Counter {
    pub fn new(total: usize) -> Self {
        Self { processed: 0, total }
    }

    pub fn step(&mut self) {
        self.processed += 1;
    }

    pub fn ratio(&self) -> f64 {
        self.processed as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    pub processed: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn new(kind: ProgressKind, counter: Counter) -> Self {
        Self {
            kind,
            processed: counter.processed,
            total: counter.total,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.processed as f64 / self.total as f64
    }
}

/// Receives one notification per unit of pipeline work.
pub trait ProgressObserver {
    fn notify(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressObserver for F {
    fn notify(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Observer that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn notify(&mut self, _event: ProgressEvent) {}
}

/// Forwards events into a tokio channel so another task can poll them.
/// A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelProgress(pub UnboundedSender<ProgressEvent>);

impl ProgressObserver for ChannelProgress {
    fn notify(&mut self, event: ProgressEvent) {
        let _ = self.0.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_ratio() {
        let mut counter = Counter::new(4);
        counter.step();
        assert_eq!(counter.ratio(), 0.25);
    }

    #[test]
    fn test_zero_total_is_nan() {
        assert!(Counter::new(0).ratio().is_nan());
        assert!(Counter::default().ratio().is_nan());
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: ProgressEvent| seen.push(event.processed);
            let mut counter = Counter::new(2);
            for _ in 0..2 {
                counter.step();
                observer.notify(ProgressEvent::new(ProgressKind::Clear, counter));
            }
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_channel_observer() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut observer = ChannelProgress(tx);
        observer.notify(ProgressEvent::new(
            ProgressKind::Import,
            Counter {
                processed: 1,
                total: 3,
            },
        ));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind.name(), "import-progress");
        assert!((event.ratio() - 1.0 / 3.0).abs() < f64::EPSILON);
    }
}
