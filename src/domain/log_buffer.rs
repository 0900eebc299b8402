// Log buffer - scrolling window of log lines with mark/clear semantics
use std::collections::VecDeque;

pub const MARK_LINE: &str = "-- MARK --";
pub const CLEARED_LINE: &str = "-- LOG CLEARED --";
pub const CONNECTION_UP_LINE: &str = "-- CONNECTION UP --";
pub const CONNECTION_LOST_LINE: &str = "-- CONNECTION LOST --";
pub const NOT_CONNECTED_LINE: &str = "-- NOT CONNECTED --";

#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
    /// Running count of appends; never reset, so readers can resume after a clear.
    appended: u64,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity + 1),
            capacity,
            appended: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Sequence number the next appended line will get.
    pub fn next_seq(&self) -> u64 {
        self.appended
    }

    /// Lines still held whose sequence number is `seq` or later.
    pub fn lines_since(&self, seq: u64) -> impl Iterator<Item = &str> {
        let first = self.appended - self.lines.len() as u64;
        let skip = usize::try_from(seq.saturating_sub(first)).unwrap_or(usize::MAX);
        self.lines.iter().skip(skip).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Append a line, then evict from the head until back within capacity.
    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        self.appended += 1;
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Appends the mark line, unless the most recent line already is one, in
    /// which case the buffer is cleared instead.
    pub fn mark(&mut self) {
        if self.last() == Some(MARK_LINE) {
            self.clear();
        } else {
            self.append(MARK_LINE);
        }
    }

    /// Empties the buffer, leaving only the cleared notice.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.append(CLEARED_LINE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_append_keeps_last_m_lines() {
        let mut log = LogBuffer::new(3);
        for i in 0..5 {
            log.append(format!("line {}", i));
        }
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_lines_since_tracks_repeated_lines() {
        let mut log = LogBuffer::new(2);
        let mut seen = Vec::new();
        let mut next = log.next_seq();
        for _ in 0..3 {
            log.append(NOT_CONNECTED_LINE);
            seen.extend(log.lines_since(next).map(str::to_string));
            next = log.next_seq();
        }
        assert_eq!(seen, vec![NOT_CONNECTED_LINE; 3]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_lines_since_survives_clear() {
        let mut log = LogBuffer::new(5);
        log.append("a");
        log.append("b");
        let next = log.next_seq();
        log.clear();
        assert_eq!(log.lines_since(next).collect::<Vec<_>>(), vec![CLEARED_LINE]);
        assert_eq!(log.lines_since(0).collect::<Vec<_>>(), vec![CLEARED_LINE]);
        assert_eq!(log.lines_since(log.next_seq()).count(), 0);
    }

    #[test]
    fn test_mark_appends_sentinel() {
        let mut log = LogBuffer::new(10);
        log.append("hello");
        log.mark();
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(MARK_LINE));
    }

    #[test]
    fn test_double_mark_clears() {
        let mut log = LogBuffer::new(10);
        log.append("a");
        log.append("b");
        log.mark();
        log.mark();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines, vec![CLEARED_LINE]);
    }

    #[test]
    fn test_mark_compares_exact_line() {
        let mut log = LogBuffer::new(10);
        log.append("-- MARK -- ");
        log.mark();
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(MARK_LINE));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut once = LogBuffer::new(5);
        once.append("x");
        once.clear();

        let mut twice = LogBuffer::new(5);
        twice.append("x");
        twice.clear();
        twice.clear();

        assert_eq!(once.lines().collect::<Vec<_>>(), twice.lines().collect::<Vec<_>>());
        assert_eq!(twice.lines().collect::<Vec<_>>(), vec![CLEARED_LINE]);
    }

    #[test]
    fn test_clear_then_append_counts_from_notice() {
        let mut log = LogBuffer::new(2);
        log.append("a");
        log.append("b");
        log.clear();
        log.append("c");
        assert_eq!(log.lines().collect::<Vec<_>>(), vec![CLEARED_LINE, "c"]);
        log.append("d");
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["c", "d"]);
    }

    proptest! {
        #[test]
        fn append_keeps_exactly_last_m(capacity in 1usize..50, extra in 1usize..100) {
            let mut log = LogBuffer::new(capacity);
            let total = capacity + extra;
            for i in 0..total {
                log.append(i.to_string());
            }
            prop_assert_eq!(log.len(), capacity);
            let expected: Vec<String> = ((total - capacity)..total).map(|i| i.to_string()).collect();
            let actual: Vec<String> = log.lines().map(str::to_string).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
