//! Final scores and the high-score table kept between runs.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::GameResult;

/// Entries kept on the high-score table.
pub const HIGH_SCORE_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: i32,
    pub name: String,
    pub killed_by: String,
    pub depth: i32,
    pub date: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(name: String, killed_by: String, depth: i32, score: i32) -> Self {
        Self {
            score,
            name,
            killed_by,
            depth,
            date: Utc::now(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{:>6}  {} - killed by {} on level {} ({})",
            self.score,
            self.name,
            self.killed_by,
            self.depth,
            self.date.format("%Y-%m-%d")
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    records: Vec<ScoreRecord>,
}

impl HighScores {
    /// Reads the table, treating a missing file as empty.
    pub fn load(path: &Path) -> GameResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut scores: Self = serde_json::from_reader(reader)?;
        scores.normalize();
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> GameResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("saved {} high scores to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Inserts a record and returns its rank (0-based) if it made the table.
    pub fn add(&mut self, record: ScoreRecord) -> Option<usize> {
        self.records.push(record.clone());
        self.normalize();
        let rank = self.records.iter().position(|r| *r == record);
        if rank.is_none() {
            warn!("score {} did not make the table", record.score);
        }
        rank
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    fn normalize(&mut self) {
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        self.records.truncate(HIGH_SCORE_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: i32) -> ScoreRecord {
        ScoreRecord::new("Ash".into(), "felix".into(), 2, score)
    }

    #[test]
    fn table_keeps_best_scores_in_order() {
        let mut scores = HighScores::default();
        for score in 0..15 {
            scores.add(record(score * 10));
        }
        assert_eq!(scores.records().len(), HIGH_SCORE_LIMIT);
        assert_eq!(scores.records()[0].score, 140);
        assert_eq!(scores.records()[9].score, 50);
        assert_eq!(scores.add(record(0)), None);
        assert_eq!(scores.add(record(1000)), Some(0));
    }

    #[test]
    fn missing_file_is_an_empty_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scores = HighScores::load(&dir.path().join("scores.json")).expect("load");
        assert!(scores.records().is_empty());
    }

    #[test]
    fn table_survives_a_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.json");
        let mut scores = HighScores::default();
        scores.add(record(42));
        scores.save(&path).expect("save");
        assert_eq!(HighScores::load(&path).expect("load"), scores);
    }
}
