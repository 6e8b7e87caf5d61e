//! The high-score file: one `name:score` record per line.

use std::{
    fmt, fs, io,
    num::ParseIntError,
    path::Path,
    str::FromStr,
};

use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidNameError {
    #[display("player name must not be empty")]
    Empty,
    #[display("player name must not contain ':' or line breaks")]
    ForbiddenCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseScoreRecordError {
    #[display("missing ':' between name and score")]
    MissingSeparator,
    #[display("invalid name: {_0}")]
    InvalidName(InvalidNameError),
    #[display("invalid score: {_0}")]
    InvalidScore(ParseIntError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    name: String,
    score: usize,
}

impl ScoreRecord {
    pub fn new(name: impl Into<String>, score: usize) -> Result<Self, InvalidNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }
        if name.contains([':', '\n', '\r']) {
            return Err(InvalidNameError::ForbiddenCharacter);
        }
        Ok(Self { name, score })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> usize {
        self.score
    }
}

impl FromStr for ScoreRecord {
    type Err = ParseScoreRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, score) = s
            .split_once(':')
            .ok_or(ParseScoreRecordError::MissingSeparator)?;
        let score = score
            .trim()
            .parse()
            .map_err(ParseScoreRecordError::InvalidScore)?;
        Self::new(name, score).map_err(ParseScoreRecordError::InvalidName)
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.score)
    }
}

/// A line that could not be read as a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub error: ParseScoreRecordError,
}

/// Records ordered by descending score. Equal scores keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTable {
    records: Vec<ScoreRecord>,
}

impl ScoreTable {
    /// Parses file contents. Blank lines are ignored; malformed lines are returned
    /// separately and do not affect the others.
    pub fn parse(text: &str) -> (Self, Vec<SkippedLine>) {
        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse() {
                Ok(record) => records.push(record),
                Err(error) => skipped.push(SkippedLine {
                    line_number: index + 1,
                    error,
                }),
            }
        }
        (Self::from_records(records), skipped)
    }

    pub fn from_records(mut records: Vec<ScoreRecord>) -> Self {
        // sort_by is stable
        records.sort_by(|a, b| b.score.cmp(&a.score));
        Self { records }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn top_score(&self) -> Option<usize> {
        self.records.first().map(ScoreRecord::score)
    }

    /// Inserts `record` after every record with an equal or higher score. Returns its
    /// zero-based rank.
    pub fn insert(&mut self, record: ScoreRecord) -> usize {
        let rank = self
            .records
            .partition_point(|existing| existing.score >= record.score);
        self.records.insert(rank, record);
        rank
    }

    /// File contents: one record per line, newline terminated.
    pub fn to_file_string(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{record}\n"))
            .collect()
    }

    /// Loads the table from `path`. A missing file is an empty table.
    ///
    /// Malformed lines are reported on stderr and skipped.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read score file: {}", path.display()));
            }
        };
        let (table, skipped) = Self::parse(&text);
        for SkippedLine { line_number, error } in skipped {
            eprintln!(
                "Skipping malformed score record at {}:{line_number}: {error}",
                path.display()
            );
        }
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create score directory: {}", parent.display())
            })?;
        }
        fs::write(path, self.to_file_string())
            .with_context(|| format!("Failed to write score file: {}", path.display()))
    }
}

/// Loads the table at `path`, inserts `record` and writes it back. Returns the rank.
pub fn append_score(path: &Path, record: ScoreRecord) -> anyhow::Result<usize> {
    let mut table = ScoreTable::load(path)?;
    let rank = table.insert(record);
    table.save(path)?;
    Ok(rank)
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn record(name: &str, score: usize) -> ScoreRecord {
        ScoreRecord::new(name, score).unwrap()
    }

    fn unique_temp_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tetrecs_test_{label}_{nanos}/scores.txt"))
    }

    #[test]
    fn test_parse_record() {
        assert_eq!("alice:1200".parse::<ScoreRecord>(), Ok(record("alice", 1200)));
        assert_eq!("bob: 30\r".parse::<ScoreRecord>(), Ok(record("bob", 30)));
        assert_eq!(record("carol", 7).to_string(), "carol:7");
    }

    #[test]
    fn test_parse_record_errors() {
        assert_eq!(
            "alice 1200".parse::<ScoreRecord>(),
            Err(ParseScoreRecordError::MissingSeparator)
        );
        assert!(matches!(
            "alice:lots".parse::<ScoreRecord>(),
            Err(ParseScoreRecordError::InvalidScore(_))
        ));
        assert!(matches!(
            "alice:-5".parse::<ScoreRecord>(),
            Err(ParseScoreRecordError::InvalidScore(_))
        ));
        assert!(matches!(
            "a:b:5".parse::<ScoreRecord>(),
            Err(ParseScoreRecordError::InvalidScore(_))
        ));
        assert_eq!(
            ":5".parse::<ScoreRecord>(),
            Err(ParseScoreRecordError::InvalidName(InvalidNameError::Empty))
        );
    }

    #[test]
    fn test_name_validation() {
        assert_eq!(ScoreRecord::new("", 1), Err(InvalidNameError::Empty));
        assert_eq!(
            ScoreRecord::new("a:b", 1),
            Err(InvalidNameError::ForbiddenCharacter)
        );
        assert_eq!(
            ScoreRecord::new("a\nb", 1),
            Err(InvalidNameError::ForbiddenCharacter)
        );
        assert!(ScoreRecord::new("Player One", 1).is_ok());
    }

    #[test]
    fn test_parse_sorts_descending_and_keeps_ties_in_order() {
        let text = "low:10\nfirst:50\nhigh:90\nsecond:50\n\nthird:50\n";
        let (table, skipped) = ScoreTable::parse(text);
        assert!(skipped.is_empty());

        let names: Vec<_> = table.records().iter().map(ScoreRecord::name).collect();
        assert_eq!(names, ["high", "first", "second", "third", "low"]);
        assert_eq!(table.top_score(), Some(90));
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let text = "good:5\nbroken\nbad:x\nfine:8\n";
        let (table, skipped) = ScoreTable::parse(text);

        assert_eq!(table.records(), &[record("fine", 8), record("good", 5)]);
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].line_number, 2);
        assert_eq!(skipped[0].error, ParseScoreRecordError::MissingSeparator);
        assert_eq!(skipped[1].line_number, 3);
    }

    #[test]
    fn test_insert_goes_after_equal_scores() {
        let mut table = ScoreTable::from_records(vec![record("a", 30), record("b", 20)]);
        assert_eq!(table.insert(record("c", 20)), 2);
        assert_eq!(table.insert(record("d", 100)), 0);
        assert_eq!(table.insert(record("e", 0)), 4);

        let names: Vec<_> = table.records().iter().map(ScoreRecord::name).collect();
        assert_eq!(names, ["d", "a", "b", "c", "e"]);
    }

    #[test]
    fn test_empty_table() {
        let table = ScoreTable::default();
        assert_eq!(table.top_score(), None);
        assert_eq!(table.to_file_string(), "");
    }

    #[test]
    fn test_file_format() {
        let table = ScoreTable::from_records(vec![record("x", 1), record("y", 2)]);
        assert_eq!(table.to_file_string(), "y:2\nx:1\n");
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let path = unique_temp_path("missing");
        assert_eq!(ScoreTable::load(&path).unwrap(), ScoreTable::default());
    }

    #[test]
    fn test_append_score_round_trips_through_file() {
        let path = unique_temp_path("append");
        assert_eq!(append_score(&path, record("first", 100)).unwrap(), 0);
        assert_eq!(append_score(&path, record("second", 300)).unwrap(), 0);
        assert_eq!(append_score(&path, record("third", 100)).unwrap(), 2);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "second:300\nfirst:100\nthird:100\n"
        );
        let table = ScoreTable::load(&path).unwrap();
        assert_eq!(table.top_score(), Some(300));

        if let Some(dir) = path.parent() {
            fs::remove_dir_all(dir).unwrap();
        }
    }
}
