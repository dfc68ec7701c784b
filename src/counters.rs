use std::io::{self, Write};

/// Observer for records processed by the differ.
pub trait RecordCounters {
    /// Called once for every row written without a diff failure.
    fn record_processed(&mut self) -> io::Result<()>;
}

impl<C: RecordCounters + ?Sized> RecordCounters for &mut C {
    fn record_processed(&mut self) -> io::Result<()> {
        (**self).record_processed()
    }
}

/// `None` disables counting.
impl<C: RecordCounters> RecordCounters for Option<C> {
    fn record_processed(&mut self) -> io::Result<()> {
        match self {
            Some(counters) => counters.record_processed(),
            None => Ok(()),
        }
    }
}

/// Hadoop streaming counters: one `reporter:counter:<group>,<name>,1` line
/// per record, written to the task's stderr.
#[derive(Debug)]
pub struct StreamingCounters<W> {
    out: W,
    line: String,
}

impl<W: Write> StreamingCounters<W> {
    pub fn new(out: W, group: &str, name: &str) -> Self {
        Self {
            out,
            line: format!("reporter:counter:{group},{name},1\n"),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordCounters for StreamingCounters<W> {
    fn record_processed(&mut self) -> io::Result<()> {
        self.out.write_all(self.line.as_bytes())
    }
}

/// In-memory tally, for callers that report counts themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterTally {
    pub processed: u64,
}

impl RecordCounters for CounterTally {
    fn record_processed(&mut self) -> io::Result<()> {
        self.processed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_counter_lines() {
        let mut counters =
            StreamingCounters::new(Vec::new(), "SkippingTaskCounters", "MapProcessedRecords");
        counters.record_processed().unwrap();
        counters.record_processed().unwrap();
        let text = String::from_utf8(counters.into_inner()).unwrap();
        assert_eq!(
            text,
            "reporter:counter:SkippingTaskCounters,MapProcessedRecords,1\n".repeat(2)
        );
    }

    #[test]
    fn disabled_and_borrowed_counters() {
        let mut off: Option<CounterTally> = None;
        off.record_processed().unwrap();

        fn bump(mut counters: impl RecordCounters) {
            counters.record_processed().unwrap();
        }
        let mut tally = CounterTally::default();
        bump(&mut tally);
        let mut on = Some(tally);
        on.record_processed().unwrap();
        assert_eq!(on.map(|t| t.processed), Some(2));
    }
}
