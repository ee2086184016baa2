// tests/extraction.rs
use racing_results::dom::Page;
use racing_results::extract::{extract_listing, extract_race};
use racing_results::models::{CompiledSelectors, PageSelectors, PositionCodes, race_id_for};
use racing_results::pipeline::FormatAuditor;

const LISTING_URL: &str = "https://www.racingpost.com/results/2022-02-21/time-order/";
const NEWCASTLE_URL: &str = "https://www.racingpost.com/results/1/newcastle-aw/2022-02-21/801";

fn selectors() -> CompiledSelectors {
    CompiledSelectors::compile(&PageSelectors::default()).unwrap()
}

fn newcastle() -> racing_results::models::RaceRecord {
    let page = Page::parse(NEWCASTLE_URL, include_str!("fixtures/detail_newcastle.html"));
    extract_race(&page, &selectors()).unwrap()
}

#[test]
fn race_header_fields() {
    let race = newcastle();

    assert_eq!(race.url, NEWCASTLE_URL);
    assert_eq!(race.race_id, race_id_for(NEWCASTLE_URL));
    assert_eq!(race.time.as_deref(), Some("7:30"));
    assert_eq!(race.course.as_deref(), Some("Newcastle (AW)"));
    assert_eq!(race.date.as_deref(), Some("21 Feb 2022"));
    assert_eq!(race.title.as_deref(), Some("Betway Novice Stakes (GBB Race)"));
    assert_eq!(race.rating.as_deref(), Some("(3yo+)"));
    assert_eq!(race.condition.as_deref(), Some("Standard To Slow"));
    assert_eq!(race.race_class.as_deref(), Some("(Class 5)"));
    assert_eq!(race.distance.as_deref(), Some("5f"));
}

#[test]
fn prize_money_tiers() {
    let race = newcastle();

    assert_eq!(race.prize.ranks(), ["1st", "2nd", "3rd", "4th"]);
    assert_eq!(race.prize.prizes(), ["£3,942", "£1,850.55", "£925.64", "£462.82"]);
}

#[test]
fn horse_rows_fold_with_comments() {
    let race = newcastle();
    assert_eq!(race.horses.len(), 6);

    let names: Vec<_> = race.horses.iter().map(|h| h.name.as_deref().unwrap()).collect();
    assert_eq!(
        names,
        [
            "High Velocity",
            "Kodiak Blue",
            "Red How",
            "Bonny Lass",
            "Lord Of Misrule",
            "Northern Gem"
        ]
    );

    // The fifth starter has no comment row.
    assert_eq!(race.horses[4].comment, None);
    assert_eq!(
        race.horses[5].comment.as_deref(),
        Some("Always behind, pulled up over 1f out")
    );
}

#[test]
fn third_placed_horse() {
    let race = newcastle();
    let horse = &race.horses[2];

    assert_eq!(horse.position.as_deref(), Some("3"));
    assert_eq!(horse.draw.as_deref(), Some("7"));
    assert_eq!(horse.length.as_deref(), Some("½ [4¼]"));
    assert_eq!(horse.number.as_deref(), Some("7."));
    assert_eq!(horse.name.as_deref(), Some("Red How"));
    assert_eq!(horse.country.as_deref(), Some(""));
    assert_eq!(horse.odds.as_deref(), Some("20/1"));
    assert_eq!(horse.jockey.as_deref(), Some("Joanna Mason"));
    assert_eq!(horse.trainer.as_deref(), Some("Julie Camacho"));
    assert_eq!(horse.age.as_deref(), Some("3"));
    assert_eq!(horse.stones.as_deref(), Some("8"));
    assert_eq!(horse.pounds.as_deref(), Some("6"));
    assert_eq!(horse.extra_weight, None);
    assert_eq!(horse.head_gear, None);
    assert_eq!(horse.official_rating.as_deref(), Some("–"));
    assert_eq!(horse.topspeed.as_deref(), Some("16"));
    assert_eq!(horse.racing_post_rating.as_deref(), Some("44"));
    assert_eq!(horse.master_rating.as_deref(), Some("–"));
    assert_eq!(horse.silk_url, None);
    assert_eq!(
        horse.comment.as_deref(),
        Some(
            "Slowly away, in rear, shaken up 2f out, ridden and headway over 1f out, \
             kept on inside final furlong, not pace to challenge (op 16/1)"
        )
    );
}

#[test]
fn winner_and_abnormal_finish() {
    let race = newcastle();

    let winner = race.winner().unwrap();
    assert_eq!(winner.name.as_deref(), Some("High Velocity"));
    assert_eq!(
        winner.silk_url.as_deref(),
        Some("https://images.racingpost.com/svg/382915.svg")
    );
    assert_eq!(winner.head_gear.as_deref(), Some("t"));
    assert_eq!(winner.length.as_deref(), Some(""));

    assert_eq!(race.horses[3].extra_weight.as_deref(), Some("3"));

    let pulled_up = &race.horses[5];
    assert_eq!(pulled_up.position.as_deref(), Some("PU"));
    assert_eq!(pulled_up.draw.as_deref(), Some("2"));
    assert_eq!(pulled_up.country.as_deref(), Some("(FR)"));
    assert_eq!(pulled_up.silk_url, None);
}

#[test]
fn footnotes_without_icon_titles() {
    let race = newcastle();
    let extra = race.race_extra_info.unwrap();
    let lines: Vec<_> = extra.lines().collect();

    assert_eq!(
        lines,
        [
            "Non-runners: Flaming Dawn (self certificate)",
            "1st owner: Saeed Manana (High Velocity) 1st breeder: Mountarmstrong Stud",
            "Tote win: £1.19 PL: £1.10 £3.70 Ex: £4.30 CSF: £4.16 Trifecta: £17.30",
            "Off time: 7:30:34 Winning time: 1m 1.27s (slow by 3.67s) Total SP: 114%",
        ]
    );
    assert!(race.race_info_comment.unwrap().starts_with("High Velocity"));
}

#[test]
fn fixture_passes_format_audit() {
    let auditor = FormatAuditor::new(PositionCodes::default()).unwrap();
    assert_eq!(auditor.audit(&newcastle()), Vec::new());
}

#[test]
fn listing_links_in_page_order() {
    let page = Page::parse(LISTING_URL, include_str!("fixtures/listing.html"));
    let entries = extract_listing(&page, &selectors(), "Full result");

    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries[0].url.as_deref(),
        Some("https://www.racingpost.com/results/513/wolverhampton-aw/2022-02-21/802")
    );
    assert_eq!(entries[1].url, None);
    assert_eq!(entries[2].url.as_deref(), Some(NEWCASTLE_URL));
    assert_eq!(entries[2].index, 2);
}
