use std::iter::FusedIterator;

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+\S").expect("block start pattern"));

/// Does this line open a new runner block (`"3. Name ..."`)?
pub fn is_block_start(line: &str) -> bool {
    BLOCK_START.is_match(line.trim())
}

/// Split a race-card blob into one borrowed block per runner, in source order.
///
/// A block runs from a `"N. Name"` line up to (not including) the next such
/// line. Lines before the first marker are dropped.
pub fn runner_blocks(text: &str) -> RunnerBlocks<'_> {
    RunnerBlocks {
        text,
        cursor: 0,
        open: None,
    }
}

#[derive(Debug, Clone)]
pub struct RunnerBlocks<'a> {
    text: &'a str,
    cursor: usize,
    open: Option<usize>,
}

impl<'a> Iterator for RunnerBlocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor >= self.text.len() {
                let start = self.open.take()?;
                return Some(strip_line_end(&self.text[start..]));
            }

            let line_start = self.cursor;
            let line_end = self.text[line_start..]
                .find('\n')
                .map(|i| line_start + i + 1)
                .unwrap_or(self.text.len());
            self.cursor = line_end;

            if !is_block_start(&self.text[line_start..line_end]) {
                continue;
            }
            if let Some(start) = self.open.replace(line_start) {
                return Some(strip_line_end(&self.text[start..line_start]));
            }
        }
    }
}

impl FusedIterator for RunnerBlocks<'_> {}

fn strip_line_end(block: &str) -> &str {
    let block = block.strip_suffix('\n').unwrap_or(block);
    block.strip_suffix('\r').unwrap_or(block)
}

#[cfg(test)]
mod tests {
    use super::{is_block_start, runner_blocks};

    #[test]
    fn block_start_needs_space_and_name() {
        assert!(is_block_start("1. Liberami (NZ) (6)"));
        assert!(is_block_start("  12.  Sabaj (13)"));
        assert!(!is_block_start("1.5 lengths"));
        assert!(!is_block_start("2-843"));
        assert!(!is_block_start("3."));
    }

    #[test]
    fn preamble_is_dropped_and_blanks_kept() {
        let text = "Race 4 - 1200m\nGood 4\n1. Alpha (2)\nT: Smith\n\n2. Beta (5)\nW $4.00\n";
        let blocks: Vec<&str> = runner_blocks(text).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "1. Alpha (2)\nT: Smith\n");
        assert_eq!(blocks[1], "2. Beta (5)\nW $4.00");
    }

    #[test]
    fn no_marker_means_no_blocks() {
        assert_eq!(runner_blocks("just some text\nmore").count(), 0);
        assert_eq!(runner_blocks("").count(), 0);
    }

    #[test]
    fn exhausted_iterator_stays_exhausted() {
        let mut blocks = runner_blocks("1. Solo (1)");
        assert_eq!(blocks.next(), Some("1. Solo (1)"));
        assert_eq!(blocks.next(), None);
        assert_eq!(blocks.next(), None);
    }
}
