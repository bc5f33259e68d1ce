use std::collections::VecDeque;

const MAX_LOGS: usize = 200;

/// Bounded log of `[INFO]` / `[WARN]` lines attached to parse and analysis
/// results. Oldest lines are dropped first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Logbook {
    lines: VecDeque<String>,
}

impl Logbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.lines.push_back(msg.into());
        while self.lines.len() > MAX_LOGS {
            self.lines.pop_front();
        }
    }

    pub fn info(&mut self, msg: impl AsRef<str>) {
        self.push_log(format!("[INFO] {}", msg.as_ref()));
    }

    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.push_log(format!("[WARN] {}", msg.as_ref()));
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.lines.iter().any(|l| l.starts_with("[WARN]"))
    }
}

#[cfg(test)]
mod tests {
    use super::{Logbook, MAX_LOGS};

    #[test]
    fn drops_oldest_past_capacity() {
        let mut log = Logbook::new();
        for i in 0..(MAX_LOGS + 5) {
            log.info(format!("line {i}"));
        }
        assert_eq!(log.len(), MAX_LOGS);
        assert_eq!(log.lines().next(), Some("[INFO] line 5"));
        assert!(!log.has_warnings());
        log.warn("late");
        assert!(log.has_warnings());
    }
}
