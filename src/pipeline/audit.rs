// src/pipeline/audit.rs

//! Format audit of captured races.
//!
//! The site occasionally changes its markup in ways that still match the
//! selectors but put the wrong text in a field. The audit checks each field
//! against the shape the site normally produces and reports deviations as
//! warnings; it never rejects a record.

use std::fmt;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{PositionCodes, RaceRecord};

/// One field that does not have its expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatIssue {
    pub race_id: String,
    /// Index of the starter in finish order, `None` for race-level fields
    pub horse: Option<usize>,
    pub field: &'static str,
    pub value: Option<String>,
    pub expected: &'static str,
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.horse {
            Some(i) => write!(f, "race {} horse #{} ", self.race_id, i + 1)?,
            None => write!(f, "race {} ", self.race_id)?,
        }
        write!(
            f,
            "field {} = {:?}, expected {}",
            self.field, self.value, self.expected
        )
    }
}

/// Compiled field shapes.
pub struct FormatAuditor {
    positions: PositionCodes,
    url: Regex,
    time: Regex,
    prize_rank: Regex,
    amount: Regex,
    digits: Regex,
    saddle_cloth: Regex,
    rating: Regex,
    object_url: Regex,
}

impl FormatAuditor {
    pub fn new(positions: PositionCodes) -> Result<Self> {
        Ok(Self {
            positions,
            url: compile(r"^https?://")?,
            time: compile(r"^\d{1,2}:\d{2}$")?,
            prize_rank: compile(r"^\d*(1st|2nd|3rd|th)$")?,
            amount: compile(r"^[0-9][0-9,.]*$")?,
            digits: compile(r"^\d+$")?,
            saddle_cloth: compile(r"^\d+\.$")?,
            rating: compile(r"^[\d–-]+$")?,
            object_url: compile(r"^https?://s3-")?,
        })
    }

    /// Check every field of a race and its starters.
    pub fn audit(&self, race: &RaceRecord) -> Vec<FormatIssue> {
        let mut issues = Vec::new();
        let mut report = |horse: Option<usize>, field, value: Option<&str>, expected| {
            issues.push(FormatIssue {
                race_id: race.race_id.clone(),
                horse,
                field,
                value: value.map(str::to_string),
                expected,
            });
        };

        if !self.url.is_match(&race.url) {
            report(None, "url", Some(&race.url), "http(s) URL");
        }
        if race.race_id.is_empty() {
            report(None, "race_id", None, "identifier");
        }
        if !required(race.time.as_deref(), &self.time) {
            report(None, "time", race.time.as_deref(), "H:MM");
        }
        for (field, value) in [
            ("date", &race.date),
            ("title", &race.title),
            ("course", &race.course),
        ] {
            if !non_empty(value.as_deref()) {
                report(None, field, value.as_deref(), "non-empty text");
            }
        }

        for (rank, prize) in race.prize.iter() {
            if !self.prize_rank.is_match(rank) {
                report(None, "prize.rank", Some(rank), "ordinal like 1st");
            }
            // Skip the currency sign.
            let amount: String = prize.chars().skip(1).collect();
            if !self.amount.is_match(&amount) {
                report(None, "prize.prize", Some(prize), "currency amount");
            }
        }

        for (i, horse) in race.horses.iter().enumerate() {
            let h = Some(i);
            match horse.position.as_deref() {
                Some(code) if self.positions.is_known(code) => {}
                other => report(h, "horse_rank", other, "place or abnormal-finish code"),
            }
            if !non_empty(horse.name.as_deref()) {
                report(h, "horse_name", horse.name.as_deref(), "non-empty text");
            }

            let optional_checks = [
                ("horse_draw", &horse.draw, &self.digits, "digits"),
                ("horse_no", &horse.number, &self.saddle_cloth, "N."),
                ("horse_age", &horse.age, &self.digits, "digits"),
                ("horse_st", &horse.stones, &self.digits, "digits"),
                ("horse_lb", &horse.pounds, &self.digits, "digits"),
                ("horse_or", &horse.official_rating, &self.rating, "digits or –"),
                ("horse_ts", &horse.topspeed, &self.rating, "digits or –"),
                ("horse_rpr", &horse.racing_post_rating, &self.rating, "digits or –"),
                ("horse_mr", &horse.master_rating, &self.rating, "digits or –"),
                ("horse_silk_url", &horse.silk_url, &self.url, "http(s) URL"),
                ("horse_silk_url_s3", &horse.silk_object_url, &self.object_url, "S3 URL"),
            ];
            for (field, value, pattern, expected) in optional_checks {
                if !optional(value.as_deref(), pattern) {
                    report(h, field, value.as_deref(), expected);
                }
            }
        }

        issues
    }

    /// Audit races and log every issue. Returns the number of issues found.
    pub fn audit_and_log(&self, races: &[RaceRecord]) -> usize {
        let mut count = 0;
        for race in races {
            for issue in self.audit(race) {
                log::warn!("Format check: {}", issue);
                count += 1;
            }
        }
        count
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AppError::validation(format!("bad pattern {}: {}", pattern, e)))
}

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn required(value: Option<&str>, pattern: &Regex) -> bool {
    value.is_some_and(|v| pattern.is_match(v.trim()))
}

/// Empty or absent is fine; otherwise the value must match.
fn optional(value: Option<&str>, pattern: &Regex) -> bool {
    match value.map(str::trim) {
        None | Some("") => true,
        Some(v) => pattern.is_match(v),
    }
}
