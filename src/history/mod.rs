//! Flat channel-history store
//!
//! The history store is an append-only UTF-8 text file where each line is
//! one chat message:
//!
//! ```text
//! {channel_name} [{YYYY-MM-DD HH:MM}] {author}: {text}
//! ```
//!
//! The transport appends signal-channel messages as they arrive; the
//! summary pipeline reads the file back, bucketed per tier by channel-name
//! substring match and filtered by `[{date}` substring match.
//!
//! ## Normalization
//!
//! Free-form signal text is normalized before extraction in one isolated
//! stage. Current rules:
//! - `EOD <TICKER> @ <PRICE>` is rewritten to `Entry <TICKER> @ <PRICE>`
//!   (end-of-day recap lines are entry signals in disguise).
//!
//! `resync()` applies the same rules to the stored file and rewrites it
//! atomically, reporting per-tier line counts.

use crate::config::{with_config, TierConfig};
use crate::logger::{self, LogTag};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::PathBuf;

/// End-of-day recap lines are entry signals: "EOD NVDA @ $1.17"
static EOD_ENTRY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bEOD\b(\s+[A-Z]{1,6}\s*@)").expect("Invalid EOD pattern regex")
});

/// Lines from the dump belonging to one tier, in file order
#[derive(Debug, Clone)]
pub struct TierLines {
    pub tier: TierConfig,
    pub lines: Vec<String>,
}

/// Handle on the flat history dump and its snapshot directory
pub struct HistoryStore {
    path: PathBuf,
    snapshot_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot_dir: snapshot_dir.into(),
        }
    }

    /// Build the store from the loaded configuration
    pub fn from_config() -> Self {
        with_config(|c| Self::new(&c.signals.history_file, &c.signals.snapshot_dir))
    }

    /// Read the dump and bucket lines per tier, preserving config order
    ///
    /// Each line lands in the first tier whose channel name it contains.
    /// Lines are normalized on the way in. A missing dump file is an error
    /// for this run; the caller reports it and keeps serving commands.
    pub fn load_tier_lines(&self, tiers: &[TierConfig]) -> Result<Vec<TierLines>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Channel dump file not found: {}", self.path.display()))?;

        let mut buckets: Vec<TierLines> = tiers
            .iter()
            .map(|tier| TierLines {
                tier: tier.clone(),
                lines: Vec::new(),
            })
            .collect();

        for line in contents.lines() {
            for bucket in buckets.iter_mut() {
                if line.contains(&bucket.tier.channel) {
                    bucket.lines.push(normalize_signal_line(line));
                    break;
                }
            }
        }

        Ok(buckets)
    }

    /// Append one observed chat message in dump-line format
    pub fn append_line(
        &self,
        channel: &str,
        timestamp: NaiveDateTime,
        author: &str,
        text: &str,
    ) -> Result<()> {
        use std::io::Write;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open dump file: {}", self.path.display()))?;

        writeln!(
            file,
            "{} [{}] {}: {}",
            channel,
            timestamp.format("%Y-%m-%d %H:%M"),
            author,
            text
        )
        .context("Failed to append to dump file")?;

        Ok(())
    }

    /// Write the filtered per-run snapshot for auditing
    ///
    /// File name is `{MMDDYYYY}_{mode}_signals.txt` in the snapshot dir.
    pub fn write_snapshot(&self, lines: &[String], mode: &str, date: NaiveDate) -> Result<PathBuf> {
        fs::create_dir_all(&self.snapshot_dir)
            .with_context(|| format!("Failed to create {}", self.snapshot_dir.display()))?;

        let file_name = format!("{}_{}_signals.txt", date.format("%m%d%Y"), mode);
        let path = self.snapshot_dir.join(file_name);

        let mut body = lines.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        fs::write(&path, body)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;

        Ok(path)
    }

    /// Re-read the dump, apply normalization rules, rewrite atomically
    ///
    /// Returns per-tier line counts for the user-facing resync report.
    pub fn resync(&self, tiers: &[TierConfig]) -> Result<Vec<(String, usize)>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Channel dump file not found: {}", self.path.display()))?;

        let mut counts: Vec<(String, usize)> =
            tiers.iter().map(|t| (t.key.clone(), 0)).collect();
        let mut normalized = String::with_capacity(contents.len());

        for line in contents.lines() {
            let line = normalize_signal_line(line);
            for (i, tier) in tiers.iter().enumerate() {
                if line.contains(&tier.channel) {
                    counts[i].1 += 1;
                    break;
                }
            }
            normalized.push_str(&line);
            normalized.push('\n');
        }

        // Atomic replace: write sibling temp file, then rename over
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, normalized)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        logger::info(
            LogTag::History,
            &format!(
                "Resynced dump: {}",
                counts
                    .iter()
                    .map(|(k, n)| format!("{}={}", k, n))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
        );

        Ok(counts)
    }
}

/// Filter lines down to those carrying one of the requested dates
///
/// Matches the `[{date}` prefix of the timestamp field, same as the
/// historical tooling around this dump format.
pub fn filter_by_dates(lines: &[String], dates: &[NaiveDate]) -> Vec<String> {
    let markers: Vec<String> = dates
        .iter()
        .map(|d| format!("[{}", d.format("%Y-%m-%d")))
        .collect();

    lines
        .iter()
        .filter(|line| markers.iter().any(|m| line.contains(m)))
        .cloned()
        .collect()
}

/// Apply the documented signal-text normalization rules to one line
pub fn normalize_signal_line(line: &str) -> String {
    EOD_ENTRY_PATTERN.replace_all(line, "Entry$1").into_owned()
}
