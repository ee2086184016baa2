// src/extract/rows.rs

//! Horse table rows.
//!
//! The table interleaves two row kinds as siblings: a main row per starter,
//! optionally followed by a comment row holding the in-running comment for
//! that starter. [`reduce_rows`] folds the row sequence into one
//! [`HorseRecord`] per main row with a one-record lookback.

use crate::dom::Node;
use crate::extract::fields::{
    HumanRole, WeightPart, apply_rating, clean_name, human_role, split_position_draw, text_of,
    weight_part,
};
use crate::models::{CompiledSelectors, HorseRecord, RowMarkers};
use crate::utils::resolve;

/// Kind of a horse table row, read from its class attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Main,
    Comment,
    Other,
}

impl RowKind {
    pub fn of(row: Node<'_>, markers: &RowMarkers) -> Self {
        if row.has_class_marker(&markers.main_row) {
            Self::Main
        } else if row.has_class_marker(&markers.comment_row) {
            Self::Comment
        } else {
            Self::Other
        }
    }
}

/// A row after cell extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum RowEvent {
    /// Starts a new starter
    Main(HorseRecord),
    /// Comment for the current starter
    Comment(Option<String>),
    /// Separator or anything else
    Other,
}

#[derive(Debug)]
enum ReducerState {
    NoActiveRecord,
    Accumulating(HorseRecord),
}

/// Group main rows with their trailing comment rows.
///
/// Records come out in main-row order. A comment row before any main row is
/// dropped.
pub fn reduce_rows(events: impl IntoIterator<Item = RowEvent>) -> Vec<HorseRecord> {
    let mut horses = Vec::new();
    let mut state = ReducerState::NoActiveRecord;

    for event in events {
        state = match (state, event) {
            (ReducerState::Accumulating(current), RowEvent::Main(next)) => {
                horses.push(current);
                ReducerState::Accumulating(next)
            }
            (ReducerState::NoActiveRecord, RowEvent::Main(next)) => ReducerState::Accumulating(next),
            (ReducerState::Accumulating(mut current), RowEvent::Comment(comment)) => {
                current.comment = comment;
                ReducerState::Accumulating(current)
            }
            (ReducerState::NoActiveRecord, RowEvent::Comment(_)) => {
                log::debug!("Comment row without a preceding main row dropped");
                ReducerState::NoActiveRecord
            }
            (state, RowEvent::Other) => state,
        };
    }

    if let ReducerState::Accumulating(current) = state {
        horses.push(current);
    }
    horses
}

/// Extract the cells of one row.
pub fn row_event(row: Node<'_>, selectors: &CompiledSelectors, page_url: &str) -> RowEvent {
    match RowKind::of(row, &selectors.markers) {
        RowKind::Main => RowEvent::Main(parse_main_row(row, selectors, page_url)),
        RowKind::Comment => RowEvent::Comment(text_of(row.find_one(&selectors.comment_cell))),
        RowKind::Other => RowEvent::Other,
    }
}

/// Build a starter from a main row.
///
/// The position block is read first; the remaining cells are dispatched by
/// class marker, falling back to the rating attribute.
pub fn parse_main_row(row: Node<'_>, s: &CompiledSelectors, page_url: &str) -> HorseRecord {
    let markers = &s.markers;

    let block = row.find_one(&s.position_block);
    let position = block.and_then(|b| b.find_one(&s.position)).map(|n| n.text());
    let draw = block.and_then(|b| b.find_one(&s.draw)).map(|n| n.text());
    let (position, draw) = split_position_draw(position.as_deref(), draw.as_deref());
    let length = text_of(block.and_then(|b| b.find_one(&s.length)));

    let mut horse = HorseRecord::new(position, draw, length);

    for cell in row.children().into_iter().filter(|c| c.tag_name() == "td") {
        if cell.has_class_marker(&markers.horse_cell) {
            fill_horse_cell(&mut horse, cell, s, page_url);
        } else if cell.has_class_marker(&markers.age_cell) {
            horse.age = Some(cell.text());
        } else if cell.has_class_marker(&markers.weight_cell) {
            fill_weight_cell(&mut horse, cell, s);
        } else {
            apply_rating(&mut horse, markers, cell.attr(&markers.rating_attr), cell.text());
        }
    }

    horse
}

fn fill_horse_cell(horse: &mut HorseRecord, cell: Node<'_>, s: &CompiledSelectors, page_url: &str) {
    let container = cell.find_one(&s.horse_container);
    let info = container.and_then(|c| c.find_one(&s.horse_info));

    horse.number = text_of(info.and_then(|i| i.find_one(&s.saddle_cloth)));
    horse.name = info.and_then(|i| i.find_one(&s.horse_name)).map(clean_name);
    horse.country = text_of(info.and_then(|i| i.find_one(&s.country)));
    horse.odds = text_of(info.and_then(|i| i.find_one(&s.odds)));

    // Silks are kept for the winner only.
    if horse.is_winner() {
        horse.silk_url = container
            .and_then(|c| c.find_one(&s.silk))
            .and_then(|img| img.attr("src"))
            .map(|src| resolve(page_url, src).unwrap_or_else(|| src.to_string()));
    }

    let wrappers = info
        .and_then(|i| i.find_one(&s.human))
        .map(|h| h.find_many(&s.human_wrapper))
        .unwrap_or_default();
    for wrapper in wrappers {
        match human_role(wrapper, &s.markers) {
            Some(HumanRole::Jockey) => horse.jockey = text_of(wrapper.find_one(&s.human_link)),
            Some(HumanRole::Trainer) => horse.trainer = text_of(wrapper.find_one(&s.human_link)),
            None => {}
        }
    }
}

fn fill_weight_cell(horse: &mut HorseRecord, cell: Node<'_>, s: &CompiledSelectors) {
    for span in cell.children().into_iter().filter(|c| c.tag_name() == "span") {
        match weight_part(span, &s.markers) {
            Some(WeightPart::Stones) => horse.stones = Some(span.text()),
            Some(WeightPart::ExtraWeight) => {
                horse.extra_weight = text_of(span.find_one(&s.extra_weight_value))
            }
            Some(WeightPart::HeadGear) => horse.head_gear = Some(span.text()),
            Some(WeightPart::Pounds) => horse.pounds = Some(span.text()),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;
    use crate::models::PageSelectors;
    use scraper::Selector;

    fn main(name: &str) -> RowEvent {
        RowEvent::Main(HorseRecord {
            name: Some(name.to_string()),
            ..HorseRecord::default()
        })
    }

    #[test]
    fn test_main_comment_main_main() {
        let horses = reduce_rows(vec![
            main("A"),
            RowEvent::Comment(Some("Led, kept on".into())),
            main("B"),
            main("C"),
        ]);
        assert_eq!(horses.len(), 3);
        assert_eq!(horses[0].name.as_deref(), Some("A"));
        assert_eq!(horses[0].comment.as_deref(), Some("Led, kept on"));
        assert_eq!(horses[1].name.as_deref(), Some("B"));
        assert_eq!(horses[1].comment, None);
        assert_eq!(horses[2].name.as_deref(), Some("C"));
    }

    #[test]
    fn test_leading_comment_is_dropped() {
        let horses = reduce_rows(vec![
            RowEvent::Comment(Some("orphan".into())),
            RowEvent::Other,
            main("A"),
            RowEvent::Other,
            RowEvent::Comment(Some("Prominent".into())),
        ]);
        assert_eq!(horses.len(), 1);
        assert_eq!(horses[0].comment.as_deref(), Some("Prominent"));
    }

    #[test]
    fn test_empty_table() {
        assert!(reduce_rows(Vec::new()).is_empty());
        assert!(reduce_rows(vec![RowEvent::Other]).is_empty());
    }

    const ROW: &str = r#"
      <table><tbody>
        <tr class="rp-horseTable__mainRow" data-test-selector="table-row">
          <td>
            <div class="rp-horseTable__pos">
              <div><span class="rp-horseTable__pos__number">1 <sup class="rp-horseTable__pos__draw">(2)</sup></span></div>
              <div><span class="rp-horseTable__pos__length"></span></div>
            </div>
          </td>
          <td class="rp-horseTable__horseCell">
            <div class="rp-horseTable__horseContainer">
              <img class="rp-horseTable__silk" src="/silks/1234.png">
              <div class="rp-horseTable__info">
                <span class="rp-horseTable__saddleClothNo">4.</span>
                <a class="rp-horseTable__horse__name" href="/profile/horse/1">High Velocity<span class="ui-hidden">Horse profile</span></a>
                <span class="rp-horseTable__horse__country">(IRE)</span>
                <span class="rp-horseTable__horse__price">9/4F</span>
                <div class="rp-horseTable__human">
                  <span class="rp-horseTable__human__wrapper" data-prefix="J:"><a class="rp-horseTable__human__link">P Mulrennan</a></span>
                  <span class="rp-horseTable__human__wrapper" data-prefix="T:"><a class="rp-horseTable__human__link">M Dods</a></span>
                </div>
              </div>
            </div>
          </td>
          <td class="rp-horseTable__spanNarrow rp-horseTable__spanNarrow_age">4</td>
          <td class="rp-horseTable__wgt">
            <span class="rp-horseTable__st">9</span>
            <span data-test-selector="horse-weight-lb">7</span>
            <span class="rp-horseTable__extraData"><span>3</span></span>
            <span class="rp-horseTable__headGear">t</span>
          </td>
          <td data-ending="OR">71</td>
          <td data-ending="TS">52</td>
          <td data-ending="RPR">78</td>
          <td data-ending="MR">–</td>
        </tr>
        <tr class="rp-horseTable__commentRow"><td colspan="10">Made all, ridden clear</td></tr>
      </tbody></table>
    "#;

    #[test]
    fn test_parse_main_row_cells() {
        let selectors = CompiledSelectors::compile(&PageSelectors::default()).unwrap();
        let page = Page::parse("https://www.racingpost.com/results/1/2", ROW);
        let rows = page.find_many(None, &Selector::parse("tbody > tr").unwrap());
        let events: Vec<_> = rows
            .iter()
            .map(|r| row_event(*r, &selectors, page.url()))
            .collect();
        let horses = reduce_rows(events);

        assert_eq!(horses.len(), 1);
        let horse = &horses[0];
        assert_eq!(horse.position.as_deref(), Some("1"));
        assert_eq!(horse.draw.as_deref(), Some("2"));
        assert_eq!(horse.length.as_deref(), Some(""));
        assert_eq!(horse.number.as_deref(), Some("4."));
        assert_eq!(horse.name.as_deref(), Some("High Velocity"));
        assert_eq!(horse.country.as_deref(), Some("(IRE)"));
        assert_eq!(horse.odds.as_deref(), Some("9/4F"));
        assert_eq!(
            horse.silk_url.as_deref(),
            Some("https://www.racingpost.com/silks/1234.png")
        );
        assert_eq!(horse.jockey.as_deref(), Some("P Mulrennan"));
        assert_eq!(horse.trainer.as_deref(), Some("M Dods"));
        assert_eq!(horse.age.as_deref(), Some("4"));
        assert_eq!(horse.stones.as_deref(), Some("9"));
        assert_eq!(horse.pounds.as_deref(), Some("7"));
        assert_eq!(horse.extra_weight.as_deref(), Some("3"));
        assert_eq!(horse.head_gear.as_deref(), Some("t"));
        assert_eq!(horse.official_rating.as_deref(), Some("71"));
        assert_eq!(horse.topspeed.as_deref(), Some("52"));
        assert_eq!(horse.racing_post_rating.as_deref(), Some("78"));
        assert_eq!(horse.master_rating.as_deref(), Some("–"));
        assert_eq!(horse.comment.as_deref(), Some("Made all, ridden clear"));
    }

    #[test]
    fn test_silk_skipped_for_placed_horse() {
        let selectors = CompiledSelectors::compile(&PageSelectors::default()).unwrap();
        let html = ROW.replace(">1 <sup", ">2 <sup");
        let page = Page::parse("https://www.racingpost.com/results/1/2", &html);
        let row = page
            .find_one(None, &Selector::parse("tr.rp-horseTable__mainRow").unwrap())
            .unwrap();
        let horse = parse_main_row(row, &selectors, page.url());
        assert_eq!(horse.position.as_deref(), Some("2"));
        assert_eq!(horse.silk_url, None);
    }
}
