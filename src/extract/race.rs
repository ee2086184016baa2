// src/extract/race.rs

//! Race detail page extraction.

use crate::dom::Page;
use crate::error::{AppError, Result};
use crate::extract::fields::{footnote_block, parse_prize, text_of};
use crate::extract::rows::{reduce_rows, row_event};
use crate::models::{CompiledSelectors, PrizeRecord, RaceRecord};

/// Check that the structure every result page carries is present.
///
/// A page without the results section or the horse table is not a result
/// page (or has not finished rendering).
pub fn check_anchors(page: &Page, s: &CompiledSelectors) -> Result<()> {
    if page.find_one(None, &s.result_section).is_none() {
        return Err(AppError::missing_anchor(page.url(), "results section"));
    }
    if page.find_one(None, &s.horse_table).is_none() {
        return Err(AppError::missing_anchor(page.url(), "horse table"));
    }
    Ok(())
}

/// Walk a rendered detail page into a [`RaceRecord`].
///
/// Every section is optional apart from the anchors checked by
/// [`check_anchors`]; a missing section leaves its fields empty.
pub fn extract_race(page: &Page, s: &CompiledSelectors) -> Result<RaceRecord> {
    check_anchors(page, s)?;

    let mut race = RaceRecord::new(page.url());

    let header = page.find_one(None, &s.race_header);
    race.time = text_of(header.and_then(|h| h.find_one(&s.race_time)));
    race.course = text_of(header.and_then(|h| h.find_one(&s.race_course)));
    race.date = text_of(header.and_then(|h| h.find_one(&s.race_date)));

    let detail = header.and_then(|h| h.find_one(&s.race_detail));
    race.title = text_of(detail.and_then(|d| d.find_one(&s.race_title)));

    let container = detail.and_then(|d| d.find_one(&s.race_detail_container));
    race.rating = text_of(container.and_then(|c| c.find_one(&s.race_rating)));
    race.distance = text_of(container.and_then(|c| c.find_one(&s.race_distance)));
    race.race_class = text_of(container.and_then(|c| c.find_one(&s.race_class)));
    race.condition = text_of(container.and_then(|c| c.find_one(&s.race_condition)));

    race.prize = container
        .and_then(|c| c.find_one(&s.prize_money))
        .map(|p| parse_prize(&p.text()))
        .unwrap_or_else(PrizeRecord::new);

    let table = page.find_one(None, &s.horse_table);
    let rows = page.find_many(table, &s.horse_row);
    race.horses = reduce_rows(rows.into_iter().map(|row| row_event(row, s, page.url())));

    let footnotes = page.find_many(None, &s.footnotes);
    race.race_extra_info = footnote_block(&footnotes, &s.markers.icon_tag);
    race.race_info_comment = text_of(page.find_one(None, &s.analysis));

    log::debug!(
        "Extracted {} runners and {} prize tiers from {}",
        race.horses.len(),
        race.prize.len(),
        page.url()
    );

    Ok(race)
}
