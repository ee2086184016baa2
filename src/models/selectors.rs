// src/models/selectors.rs

//! CSS selectors and row/cell markers for the results pages.
//!
//! Defaults describe the Racing Post results markup. Every value can be
//! overridden from the `[selectors]` section of the config file when the
//! site changes its class names.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors for listing and detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    // Listing page
    pub time_list: String,
    pub time_item: String,
    pub result_link: String,

    // Detail page header
    pub result_section: String,
    pub race_header: String,
    pub race_time: String,
    pub race_course: String,
    pub race_date: String,
    pub race_detail: String,
    pub race_title: String,
    pub race_detail_container: String,
    pub race_rating: String,
    pub race_distance: String,
    pub race_class: String,
    pub race_condition: String,
    pub prize_money: String,

    // Horse table
    pub horse_table: String,
    pub horse_row: String,
    pub position_block: String,
    pub position: String,
    pub draw: String,
    pub length: String,
    pub horse_container: String,
    pub horse_info: String,
    pub saddle_cloth: String,
    pub horse_name: String,
    pub country: String,
    pub odds: String,
    pub silk: String,
    pub human: String,
    pub human_wrapper: String,
    pub human_link: String,
    pub extra_weight_value: String,
    pub comment_cell: String,

    // Footer
    pub footnotes: String,
    pub analysis: String,

    /// Class and attribute markers used to dispatch rows and cells
    pub markers: RowMarkers,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            time_list: "div.rp-timeView__list".into(),
            time_item: "div.rp-timeView__listItem:not(.rp-emptyResult)".into(),
            result_link: "a".into(),

            result_section: "section.rp-resultsWrapper__section".into(),
            race_header: "div.rp-raceTimeCourseName".into(),
            race_time: "h1 > span.rp-raceTimeCourseName__time".into(),
            race_course: "h1 > a.rp-raceTimeCourseName__name".into(),
            race_date: "h1 > span.rp-raceTimeCourseName__date".into(),
            race_detail: "div.rp-raceTimeCourseName__info".into(),
            race_title: "h2.rp-raceTimeCourseName__title".into(),
            race_detail_container: "span.rp-raceTimeCourseName__info_container".into(),
            race_rating: "span.rp-raceTimeCourseName_ratingBandAndAgesAllowed".into(),
            race_distance: "span.rp-raceTimeCourseName_distance".into(),
            race_class: "span.rp-raceTimeCourseName_class".into(),
            race_condition: "span.rp-raceTimeCourseName_condition".into(),
            prize_money: r#"div[data-test-selector="text-prizeMoney"]"#.into(),

            horse_table: "table.rp-horseTable__table".into(),
            horse_row: "tbody > tr".into(),
            position_block: "div.rp-horseTable__pos".into(),
            position: "span.rp-horseTable__pos__number".into(),
            draw: "sup.rp-horseTable__pos__draw".into(),
            length: "span.rp-horseTable__pos__length".into(),
            horse_container: "div.rp-horseTable__horseContainer".into(),
            horse_info: "div.rp-horseTable__info".into(),
            saddle_cloth: "span.rp-horseTable__saddleClothNo".into(),
            horse_name: "a.rp-horseTable__horse__name".into(),
            country: "span.rp-horseTable__horse__country".into(),
            odds: "span.rp-horseTable__horse__price".into(),
            silk: "img.rp-horseTable__silk".into(),
            human: "div.rp-horseTable__human".into(),
            human_wrapper: "span.rp-horseTable__human__wrapper".into(),
            human_link: "a.rp-horseTable__human__link".into(),
            extra_weight_value: "span".into(),
            comment_cell: "td".into(),

            footnotes: "div.rp-raceInfo > ul > li".into(),
            analysis: "span.rp-raceInfo__comments".into(),

            markers: RowMarkers::default(),
        }
    }
}

/// Markers that identify row kinds and cell kinds inside the horse table.
///
/// Class markers are matched as substrings of the `class` attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RowMarkers {
    pub main_row: String,
    pub comment_row: String,

    pub horse_cell: String,
    pub age_cell: String,
    pub weight_cell: String,

    pub stones: String,
    pub head_gear: String,
    pub extra_weight: String,
    pub pounds_attr: String,
    pub pounds_value: String,

    pub rating_attr: String,
    pub official_rating: String,
    pub topspeed: String,
    pub racing_post_rating: String,
    pub master_rating: String,

    pub human_prefix_attr: String,
    pub jockey_prefix: String,
    pub trainer_prefix: String,

    /// Tag of the inline icons whose text leaks into footnotes
    pub icon_tag: String,
}

impl Default for RowMarkers {
    fn default() -> Self {
        Self {
            main_row: "rp-horseTable__mainRow".into(),
            comment_row: "rp-horseTable__commentRow".into(),

            horse_cell: "rp-horseTable__horseCell".into(),
            age_cell: "rp-horseTable__spanNarrow_age".into(),
            weight_cell: "rp-horseTable__wgt".into(),

            stones: "rp-horseTable__st".into(),
            head_gear: "rp-horseTable__headGear".into(),
            extra_weight: "rp-horseTable__extraData".into(),
            pounds_attr: "data-test-selector".into(),
            pounds_value: "horse-weight-lb".into(),

            rating_attr: "data-ending".into(),
            official_rating: "OR".into(),
            topspeed: "TS".into(),
            racing_post_rating: "RPR".into(),
            master_rating: "MR".into(),

            human_prefix_attr: "data-prefix".into(),
            jockey_prefix: "J:".into(),
            trainer_prefix: "T:".into(),

            icon_tag: "svg".into(),
        }
    }
}

/// Parsed form of [`PageSelectors`], built once per run.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub time_list: Selector,
    pub time_item: Selector,
    pub result_link: Selector,

    pub result_section: Selector,
    pub race_header: Selector,
    pub race_time: Selector,
    pub race_course: Selector,
    pub race_date: Selector,
    pub race_detail: Selector,
    pub race_title: Selector,
    pub race_detail_container: Selector,
    pub race_rating: Selector,
    pub race_distance: Selector,
    pub race_class: Selector,
    pub race_condition: Selector,
    pub prize_money: Selector,

    pub horse_table: Selector,
    pub horse_row: Selector,
    pub position_block: Selector,
    pub position: Selector,
    pub draw: Selector,
    pub length: Selector,
    pub horse_container: Selector,
    pub horse_info: Selector,
    pub saddle_cloth: Selector,
    pub horse_name: Selector,
    pub country: Selector,
    pub odds: Selector,
    pub silk: Selector,
    pub human: Selector,
    pub human_wrapper: Selector,
    pub human_link: Selector,
    pub extra_weight_value: Selector,
    pub comment_cell: Selector,

    pub footnotes: Selector,
    pub analysis: Selector,

    pub markers: RowMarkers,
}

impl CompiledSelectors {
    /// Parse every configured selector, failing on the first invalid one.
    pub fn compile(s: &PageSelectors) -> Result<Self> {
        Ok(Self {
            time_list: parse_selector(&s.time_list)?,
            time_item: parse_selector(&s.time_item)?,
            result_link: parse_selector(&s.result_link)?,

            result_section: parse_selector(&s.result_section)?,
            race_header: parse_selector(&s.race_header)?,
            race_time: parse_selector(&s.race_time)?,
            race_course: parse_selector(&s.race_course)?,
            race_date: parse_selector(&s.race_date)?,
            race_detail: parse_selector(&s.race_detail)?,
            race_title: parse_selector(&s.race_title)?,
            race_detail_container: parse_selector(&s.race_detail_container)?,
            race_rating: parse_selector(&s.race_rating)?,
            race_distance: parse_selector(&s.race_distance)?,
            race_class: parse_selector(&s.race_class)?,
            race_condition: parse_selector(&s.race_condition)?,
            prize_money: parse_selector(&s.prize_money)?,

            horse_table: parse_selector(&s.horse_table)?,
            horse_row: parse_selector(&s.horse_row)?,
            position_block: parse_selector(&s.position_block)?,
            position: parse_selector(&s.position)?,
            draw: parse_selector(&s.draw)?,
            length: parse_selector(&s.length)?,
            horse_container: parse_selector(&s.horse_container)?,
            horse_info: parse_selector(&s.horse_info)?,
            saddle_cloth: parse_selector(&s.saddle_cloth)?,
            horse_name: parse_selector(&s.horse_name)?,
            country: parse_selector(&s.country)?,
            odds: parse_selector(&s.odds)?,
            silk: parse_selector(&s.silk)?,
            human: parse_selector(&s.human)?,
            human_wrapper: parse_selector(&s.human_wrapper)?,
            human_link: parse_selector(&s.human_link)?,
            extra_weight_value: parse_selector(&s.extra_weight_value)?,
            comment_cell: parse_selector(&s.comment_cell)?,

            footnotes: parse_selector(&s.footnotes)?,
            analysis: parse_selector(&s.analysis)?,

            markers: s.markers.clone(),
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_compile() {
        assert!(CompiledSelectors::compile(&PageSelectors::default()).is_ok());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let selectors = PageSelectors {
            horse_table: "[[invalid".into(),
            ..PageSelectors::default()
        };
        match CompiledSelectors::compile(&selectors) {
            Err(AppError::Selector { selector, .. }) => assert_eq!(selector, "[[invalid"),
            other => panic!("expected selector error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_override_from_toml() {
        let selectors: PageSelectors = toml::from_str(
            r#"
            horse_table = "table.results"

            [markers]
            main_row = "row-main"
            "#,
        )
        .unwrap();
        assert_eq!(selectors.horse_table, "table.results");
        assert_eq!(selectors.race_header, PageSelectors::default().race_header);
        assert_eq!(selectors.markers.main_row, "row-main");
        assert_eq!(selectors.markers.comment_row, "rp-horseTable__commentRow");
    }
}
