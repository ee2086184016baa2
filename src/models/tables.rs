// src/models/tables.rs

//! Relational form of captured races.
//!
//! A race sequence flattens into three tables:
//!
//! ```text
//! race_info     (race_id)                          one row per race
//! prize_info    (race_id, rank)                    one row per prize tier
//! horse_record  (race_id, horse_rank, horse_name)  one row per starter
//! ```
//!
//! Column names follow the document keys, so a row serializes to the same
//! field names as the raw data file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{HorseRecord, RaceRecord};

/// A row type that can be stored as a flat table of nullable text columns.
pub trait TableRow: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Column names in storage order.
    const COLUMNS: &'static [&'static str];

    /// Columns identifying a row within its table.
    const KEY: &'static [&'static str];

    /// Identifier of the race this row belongs to.
    fn race_id(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceInfoRow {
    pub race_id: String,
    pub url: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub race_class: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub race_info_comment: Option<String>,
    #[serde(default)]
    pub race_extra_info: Option<String>,
}

impl From<&RaceRecord> for RaceInfoRow {
    fn from(race: &RaceRecord) -> Self {
        Self {
            race_id: race.race_id.clone(),
            url: race.url.clone(),
            time: race.time.clone(),
            date: race.date.clone(),
            title: race.title.clone(),
            course: race.course.clone(),
            race_class: race.race_class.clone(),
            rating: race.rating.clone(),
            distance: race.distance.clone(),
            condition: race.condition.clone(),
            race_info_comment: race.race_info_comment.clone(),
            race_extra_info: race.race_extra_info.clone(),
        }
    }
}

impl TableRow for RaceInfoRow {
    const COLUMNS: &'static [&'static str] = &[
        "race_id",
        "url",
        "time",
        "date",
        "title",
        "course",
        "race_class",
        "rating",
        "distance",
        "condition",
        "race_info_comment",
        "race_extra_info",
    ];
    const KEY: &'static [&'static str] = &["race_id"];

    fn race_id(&self) -> &str {
        &self.race_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeInfoRow {
    pub race_id: String,
    pub rank: String,
    pub prize: String,
}

impl TableRow for PrizeInfoRow {
    const COLUMNS: &'static [&'static str] = &["race_id", "rank", "prize"];
    const KEY: &'static [&'static str] = &["race_id", "rank"];

    fn race_id(&self) -> &str {
        &self.race_id
    }
}

/// A starter together with the race it ran in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseRecordRow {
    pub race_id: String,
    #[serde(flatten)]
    pub horse: HorseRecord,
}

impl TableRow for HorseRecordRow {
    const COLUMNS: &'static [&'static str] = &[
        "race_id",
        "horse_rank",
        "horse_draw",
        "horse_length",
        "horse_no",
        "horse_name",
        "horse_country",
        "horse_odd",
        "horse_silk_url",
        "horse_jockey",
        "horse_trainer",
        "horse_age",
        "horse_st",
        "horse_extra_weight",
        "horse_head_gear",
        "horse_lb",
        "horse_or",
        "horse_ts",
        "horse_rpr",
        "horse_mr",
        "horse_comment",
        "horse_silk",
        "horse_silk_url_s3",
    ];
    const KEY: &'static [&'static str] = &["race_id", "horse_rank", "horse_name"];

    fn race_id(&self) -> &str {
        &self.race_id
    }
}

/// The three tables of a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub race_info: Vec<RaceInfoRow>,
    pub prize_info: Vec<PrizeInfoRow>,
    pub horse_record: Vec<HorseRecordRow>,
}

impl Tables {
    pub fn is_empty(&self) -> bool {
        self.race_info.is_empty() && self.prize_info.is_empty() && self.horse_record.is_empty()
    }

    /// Append every row of `other`.
    pub fn extend(&mut self, other: Tables) {
        self.race_info.extend(other.race_info);
        self.prize_info.extend(other.prize_info);
        self.horse_record.extend(other.horse_record);
    }

    /// Remove a race and every row keyed by its identifier.
    ///
    /// Returns the removed rows so the caller can put them back.
    pub fn take_race(&mut self, race_id: &str) -> Tables {
        Tables {
            race_info: take_rows(&mut self.race_info, race_id),
            prize_info: take_rows(&mut self.prize_info, race_id),
            horse_record: take_rows(&mut self.horse_record, race_id),
        }
    }

    pub fn row_count(&self) -> usize {
        self.race_info.len() + self.prize_info.len() + self.horse_record.len()
    }
}

fn take_rows<T: TableRow>(rows: &mut Vec<T>, race_id: &str) -> Vec<T> {
    let (taken, kept) = std::mem::take(rows)
        .into_iter()
        .partition(|row| row.race_id() == race_id);
    *rows = kept;
    taken
}

/// Flatten races into their three tables, in race order.
pub fn normalize(races: &[RaceRecord]) -> Tables {
    let mut tables = Tables::default();

    for race in races {
        tables.race_info.push(RaceInfoRow::from(race));

        tables
            .prize_info
            .extend(race.prize.iter().map(|(rank, prize)| PrizeInfoRow {
                race_id: race.race_id.clone(),
                rank: rank.to_string(),
                prize: prize.to_string(),
            }));

        tables
            .horse_record
            .extend(race.horses.iter().map(|horse| HorseRecordRow {
                race_id: race.race_id.clone(),
                horse: horse.clone(),
            }));
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(url: &str, runners: &[&str]) -> RaceRecord {
        let mut race = RaceRecord::new(url);
        race.time = Some("7:30".into());
        race.prize = [("1st", "£3,942"), ("2nd", "£1,850.55")].into_iter().collect();
        race.horses = runners
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut horse = HorseRecord::new(Some((i + 1).to_string()), None, None);
                horse.name = Some(name.to_string());
                horse
            })
            .collect();
        race
    }

    #[test]
    fn test_normalize_counts() {
        let races = vec![
            race("https://example.com/r/1", &["A", "B", "C"]),
            race("https://example.com/r/2", &["D"]),
        ];
        let tables = normalize(&races);
        assert_eq!(tables.race_info.len(), 2);
        assert_eq!(tables.prize_info.len(), 4);
        assert_eq!(tables.horse_record.len(), 4);
        assert_eq!(tables.prize_info[1].rank, "2nd");
        assert_eq!(tables.horse_record[3].race_id, races[1].race_id);
    }

    #[test]
    fn test_take_race_removes_dependent_rows() {
        let races = vec![
            race("https://example.com/r/1", &["A", "B"]),
            race("https://example.com/r/2", &["C"]),
        ];
        let mut tables = normalize(&races);
        let taken = tables.take_race(&races[0].race_id);
        assert_eq!(taken.row_count(), 1 + 2 + 2);
        assert_eq!(taken.horse_record[1].horse.name.as_deref(), Some("B"));
        assert_eq!(tables.race_info.len(), 1);
        assert!(tables.prize_info.iter().all(|r| r.race_id == races[1].race_id));
        assert!(tables.horse_record.iter().all(|r| r.race_id == races[1].race_id));

        tables.extend(taken);
        assert_eq!(tables.row_count(), 2 * (1 + 2) + 3);
        assert!(tables.take_race("missing").is_empty());
    }

    #[test]
    fn test_horse_row_uses_document_columns() {
        let tables = normalize(&[race("https://example.com/r/1", &["Red How"])]);
        let value = serde_json::to_value(&tables.horse_record[0]).unwrap();
        let object = value.as_object().unwrap();
        for column in HorseRecordRow::COLUMNS {
            assert!(object.contains_key(*column), "missing column {column}");
        }
        assert_eq!(object.len(), HorseRecordRow::COLUMNS.len());
        assert_eq!(value["horse_name"], "Red How");
    }

    #[test]
    fn test_race_info_columns_match_serialized_form() {
        let row = RaceInfoRow::from(&race("https://example.com/r/1", &[]));
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value.as_object().unwrap().len(), RaceInfoRow::COLUMNS.len());
        for column in RaceInfoRow::COLUMNS {
            assert!(value.get(*column).is_some(), "missing column {column}");
        }
    }
}
