// src/models/race.rs

//! Race, prize and horse records.
//!
//! The serialized form uses the document keys of the published raw data
//! files (`horse_rank` for the runner list, `prize` as a rank → amount map),
//! so documents written by earlier captures load unchanged. Unknown keys are
//! ignored on load rather than stored.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Derive the stable identifier of a race from its detail page URL.
///
/// UUIDv5 in the RFC 4122 URL namespace, rendered as 32 lowercase hex
/// digits. Changing this function orphans every stored record.
pub fn race_id_for(url: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes())
        .simple()
        .to_string()
}

/// Prize money per finishing tier, in finish order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrizeRecord {
    rank: Vec<String>,
    prize: Vec<String>,
}

impl PrizeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tier. A rank that is already present is ignored.
    ///
    /// Returns whether the tier was added.
    pub fn push(&mut self, rank: impl Into<String>, prize: impl Into<String>) -> bool {
        let rank = rank.into();
        if self.rank.contains(&rank) {
            log::debug!("Duplicate prize rank '{}' ignored", rank);
            return false;
        }
        self.rank.push(rank);
        self.prize.push(prize.into());
        true
    }

    /// Rank labels ("1st", "2nd", ...).
    pub fn ranks(&self) -> &[String] {
        &self.rank
    }

    /// Currency formatted amounts, index-aligned with [`ranks`](Self::ranks).
    pub fn prizes(&self) -> &[String] {
        &self.prize
    }

    pub fn len(&self) -> usize {
        self.rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    /// Iterate over `(rank, prize)` pairs in finish order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rank
            .iter()
            .zip(self.prize.iter())
            .map(|(r, p)| (r.as_str(), p.as_str()))
    }
}

impl<R: Into<String>, P: Into<String>> FromIterator<(R, P)> for PrizeRecord {
    fn from_iter<I: IntoIterator<Item = (R, P)>>(iter: I) -> Self {
        let mut record = PrizeRecord::new();
        for (rank, prize) in iter {
            record.push(rank, prize);
        }
        record
    }
}

impl Serialize for PrizeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (rank, prize) in self.iter() {
            map.serialize_entry(rank, prize)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PrizeRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PrizeVisitor;

        impl<'de> Visitor<'de> for PrizeVisitor {
            type Value = PrizeRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of prize rank to amount")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = PrizeRecord::new();
                while let Some((rank, prize)) = access.next_entry::<String, String>()? {
                    record.push(rank, prize);
                }
                Ok(record)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(PrizeRecord::new())
            }
        }

        deserializer.deserialize_any(PrizeVisitor)
    }
}

/// One starter in a race result.
///
/// Every field is optional: the site omits cells freely and a missing cell
/// is recorded as `None`, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseRecord {
    /// Finishing position code ("1", "2", ... or an abnormal-finish code)
    #[serde(rename = "horse_rank", default)]
    pub position: Option<String>,

    /// Starting stall
    #[serde(rename = "horse_draw", default)]
    pub draw: Option<String>,

    /// Beaten distance
    #[serde(rename = "horse_length", default)]
    pub length: Option<String>,

    /// Saddle-cloth number, as printed ("7.")
    #[serde(rename = "horse_no", default)]
    pub number: Option<String>,

    #[serde(rename = "horse_name", default)]
    pub name: Option<String>,

    /// Country suffix ("(IRE)")
    #[serde(rename = "horse_country", default)]
    pub country: Option<String>,

    /// Starting price, fractional ("20/1")
    #[serde(rename = "horse_odd", default)]
    pub odds: Option<String>,

    /// Remote silk image URL
    #[serde(rename = "horse_silk_url", default)]
    pub silk_url: Option<String>,

    #[serde(rename = "horse_jockey", default)]
    pub jockey: Option<String>,

    #[serde(rename = "horse_trainer", default)]
    pub trainer: Option<String>,

    #[serde(rename = "horse_age", default)]
    pub age: Option<String>,

    /// Weight carried, stones component
    #[serde(rename = "horse_st", default)]
    pub stones: Option<String>,

    /// Overweight/claim annotation
    #[serde(rename = "horse_extra_weight", default)]
    pub extra_weight: Option<String>,

    #[serde(rename = "horse_head_gear", default)]
    pub head_gear: Option<String>,

    /// Weight carried, pounds component
    #[serde(rename = "horse_lb", default)]
    pub pounds: Option<String>,

    /// Official rating
    #[serde(rename = "horse_or", default)]
    pub official_rating: Option<String>,

    /// Topspeed figure
    #[serde(rename = "horse_ts", default)]
    pub topspeed: Option<String>,

    /// Racing Post rating
    #[serde(rename = "horse_rpr", default)]
    pub racing_post_rating: Option<String>,

    /// Master rating
    #[serde(rename = "horse_mr", default)]
    pub master_rating: Option<String>,

    /// In-running comment
    #[serde(rename = "horse_comment", default)]
    pub comment: Option<String>,

    /// Local silk file, relative to the image directory
    #[serde(rename = "horse_silk", default)]
    pub silk_file: Option<String>,

    /// Uploaded silk object URL
    #[serde(rename = "horse_silk_url_s3", default)]
    pub silk_object_url: Option<String>,
}

impl HorseRecord {
    /// Start a record for a new main row. The finishing position is fixed here.
    pub fn new(position: Option<String>, draw: Option<String>, length: Option<String>) -> Self {
        Self {
            position,
            draw,
            length,
            ..Self::default()
        }
    }

    /// Whether this horse won the race.
    pub fn is_winner(&self) -> bool {
        self.position.as_deref() == Some("1")
    }
}

/// One race result page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    /// Detail page URL (business key)
    #[serde(default)]
    pub url: String,

    /// Off time ("7:30")
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

    /// Rating band / ages allowed
    #[serde(default)]
    pub rating: Option<String>,

    #[serde(default)]
    pub distance: Option<String>,

    /// Going
    #[serde(default)]
    pub condition: Option<String>,

    #[serde(default)]
    pub prize: PrizeRecord,

    /// Runners in finish order
    #[serde(rename = "horse_rank", default)]
    pub horses: Vec<HorseRecord>,

    /// Identifier derived from `url`, see [`race_id_for`]
    #[serde(default)]
    pub race_id: String,

    /// Analysis paragraph under the result
    #[serde(default)]
    pub race_info_comment: Option<String>,

    /// Footnotes (non-runners, times, tote, owners), newline separated
    #[serde(default)]
    pub race_extra_info: Option<String>,
}

impl RaceRecord {
    /// Create an empty record for a detail page, identifier already assigned.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            race_id: race_id_for(&url),
            url,
            ..Self::default()
        }
    }

    /// The winning horse, if the result lists one.
    pub fn winner(&self) -> Option<&HorseRecord> {
        self.horses.iter().find(|h| h.is_winner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_race() -> RaceRecord {
        let mut race = RaceRecord::new("https://www.racingpost.com/results/1/newcastle/2022-02-21/801234");
        race.time = Some("7:30".to_string());
        race.course = Some("Newcastle (AW)".to_string());
        race.prize = [("1st", "£3,942"), ("2nd", "£1,850.55")].into_iter().collect();

        let mut winner = HorseRecord::new(Some("1".into()), Some("2".into()), None);
        winner.name = Some("High Velocity".into());
        winner.silk_url = Some("https://images.example.com/silks/1234.png".into());
        winner.comment = Some("Made all".into());

        let mut third = HorseRecord::new(Some("3".into()), Some("7".into()), Some("½ [4¼]".into()));
        third.name = Some("Red How".into());
        third.official_rating = Some("–".into());

        race.horses = vec![winner, third];
        race.race_extra_info = Some("6 ran\nNon-runners: Flaming Dawn".into());
        race
    }

    #[test]
    fn test_race_id_is_deterministic() {
        let url = "https://www.racingpost.com/results/1/newcastle/2022-02-21/801234";
        assert_eq!(race_id_for(url), race_id_for(url));
        assert_eq!(race_id_for(url).len(), 32);
        assert_ne!(race_id_for(url), race_id_for("https://www.racingpost.com/results/other"));
    }

    #[test]
    fn test_race_id_matches_uuid5_url_namespace() {
        assert_eq!(
            race_id_for("http://python.org/"),
            "4c565f0d3f5a5890b41b20cf47701c5e"
        );
    }

    #[test]
    fn test_new_race_assigns_identifier() {
        let race = RaceRecord::new("https://example.com/race/1");
        assert_eq!(race.race_id, race_id_for("https://example.com/race/1"));
    }

    #[test]
    fn test_prize_rejects_duplicate_rank() {
        let mut prize = PrizeRecord::new();
        assert!(prize.push("1st", "£100"));
        assert!(!prize.push("1st", "£200"));
        assert_eq!(prize.len(), 1);
        assert_eq!(prize.prizes(), ["£100".to_string()]);
    }

    #[test]
    fn test_document_round_trip() {
        let race = sample_race();
        let json = serde_json::to_string(&race).unwrap();
        let restored: RaceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, race);
    }

    #[test]
    fn test_document_keys() {
        let value = serde_json::to_value(sample_race()).unwrap();
        assert_eq!(value["prize"]["1st"], "£3,942");
        assert_eq!(value["horse_rank"][1]["horse_name"], "Red How");
        assert_eq!(value["horse_rank"][1]["horse_or"], "–");
        assert!(value["horse_rank"][1]["horse_silk"].is_null());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let json = r#"{"url": "https://example.com/r", "race_id": "abc", "prize": {"1st": "£5"},
                       "horse_rank": [{"horse_rank": "1", "horse_weight_kg": "500"}], "surface": "AW"}"#;
        let race: RaceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(race.horses[0].position.as_deref(), Some("1"));
        assert_eq!(race.prize.ranks(), ["1st".to_string()]);
    }

    #[test]
    fn test_null_prize_loads_as_empty() {
        let race: RaceRecord = serde_json::from_str(r#"{"url": "u", "prize": null}"#).unwrap();
        assert!(race.prize.is_empty());
    }

    #[test]
    fn test_winner() {
        let race = sample_race();
        assert_eq!(race.winner().and_then(|h| h.name.as_deref()), Some("High Velocity"));
    }
}
