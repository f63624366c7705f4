use std::collections::VecDeque;

use bracket_terminal::prelude::{RGB, WHITE};
use serde::{Deserialize, Serialize};

use crate::config::{MSG_HEIGHT, MSG_WIDTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    Dead,
    Won,
}

#[derive(Clone, Debug)]
pub struct LogLine {
    pub text: String,
    pub color: RGB,
}

/// Recent messages, oldest first. Long messages are wrapped and every
/// wrapped line counts against the capacity.
#[derive(Clone, Debug)]
pub struct MessageLog {
    lines: VecDeque<LogLine>,
    capacity: usize,
    width: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(MSG_HEIGHT, MSG_WIDTH)
    }
}

impl MessageLog {
    pub fn new(capacity: usize, width: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            width,
        }
    }

    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.push_color(entry, RGB::named(WHITE));
    }

    pub fn push_color<S: Into<String>>(&mut self, entry: S, color: RGB) {
        for text in wrap(&entry.into(), self.width) {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(LogLine { text, color });
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }

    pub(crate) fn replace_lines(&mut self, lines: impl IntoIterator<Item = LogLine>) {
        self.lines.clear();
        for line in lines {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(line);
        }
    }
}

/// Greedy word wrap; words longer than the width are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_lines_are_evicted() {
        let mut log = MessageLog::new(3, 40);
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        let texts: Vec<&str> = log.lines().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn long_messages_wrap_into_several_lines() {
        let mut log = MessageLog::new(6, 10);
        log.push("the quick brown fox jumps");
        let texts: Vec<&str> = log.lines().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn oversized_words_are_split() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("", 4).is_empty());
    }
}
