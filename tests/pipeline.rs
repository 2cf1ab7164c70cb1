// Integration tests for the archive -> layer -> statistics -> map state pipeline
mod common;

use std::{fs, sync::Arc, time::Duration};

use precinctmap::{
    MapConfig, MapView, PrecinctId,
    feed::{ContactMessage, DirFeed, ElectionFeed, FetchWorker},
    geometry::{GeometryLoader, GeometrySource},
    layer::{PointerEvent, VisualState},
    render::{Legend, Popup},
    scale::{NEUTRAL_GRAY, Rgb},
    state::FilterState,
};
use tempfile::TempDir;

const PRIMARY: &str = "2024-08-06";
const GENERAL: &str = "2024-11-05";
const SENATE: &str = "U.S. Senator";

fn id(n: &str) -> PrecinctId {
    PrecinctId::new(n)
}

/// Boundary archive plus a data directory the feed reads from.
fn fixture() -> (TempDir, MapView, Arc<DirFeed>) {
    let dir = tempfile::tempdir().unwrap();
    let shapes = dir.path().join("shapes");
    fs::create_dir_all(&shapes).unwrap();
    let archive = dir.path().join("precincts.zip");
    fs::write(&archive, common::archive_bytes(&shapes, &common::lewis_precincts())).unwrap();

    let data = dir.path().join("data");
    common::write_file(&data, "catalog.json", &format!(
        r#"{{ "elections": ["{PRIMARY}", "{GENERAL}"],
             "races": [{{ "election_date": "{GENERAL}", "race_name": "{SENATE}" }}] }}"#
    ));
    common::write_file(&data, "precincts.json", r#"[
        { "number": "0", "name": "Unassigned" },
        { "number": 2, "name": "Bunker Creek" }
    ]"#);
    common::write_file(&data, &format!("votes/{PRIMARY}.json"), r#"{
        "1": { "votes": 100, "active_voters": 400, "inactive_voters": 20 },
        "2": { "votes": 50, "active_voters": 300, "inactive_voters": 10 }
    }"#);
    common::write_file(&data, &format!("votes/{GENERAL}.json"), r#"{
        "-1": { "votes": 999, "active_voters": 0, "inactive_voters": 0 },
        "0": { "votes": 7, "active_voters": 7, "inactive_voters": 0 },
        "1": { "votes": 300, "active_voters": 400, "inactive_voters": 20 },
        "2": { "votes": 200, "active_voters": 300, "inactive_voters": 10 },
        "3": { "votes": 40, "active_voters": 90, "inactive_voters": 5 }
    }"#);
    common::write_file(&data, &format!("results/{GENERAL}/{SENATE}.json"), r#"{
        "-1": { "candidates": [
            { "name": "Ann Alder", "party": "Democrat", "votes": 1000 },
            { "name": "Bob Birch", "party": "Republican", "votes": 1500 }
        ] },
        "1": { "precinct_name": "Adna", "registered_voters": 420, "candidates": [
            { "name": "Ann Alder", "party": "Democrat", "votes": 120 },
            { "name": "Bob Birch", "party": "Republican", "votes": 180 }
        ] },
        "2": { "precinct_name": "Bunker", "registered_voters": 310, "candidates": [
            { "name": "Ann Alder", "party": "Democrat", "votes": 90 },
            { "name": "Bob Birch", "party": "Republican", "votes": 60 }
        ] }
    }"#);

    let mut config = MapConfig::default();
    config.auto_select_latest = false;
    config.party_colors.insert("Democrat".into(), Rgb::new(0x1f, 0x77, 0xb4));
    config.party_colors.insert("Republican".into(), Rgb::new(0xd6, 0x27, 0x28));

    let mut view = MapView::new(config);
    let ticket = view.begin_geometry_load();
    let event = GeometryLoader::spawn(GeometrySource::parse(archive.to_str().unwrap())).wait();
    assert!(view.on_geometry(ticket, event));

    (dir, view, Arc::new(DirFeed::new(data)))
}

#[test]
fn archive_becomes_district_colored_layer() {
    let (_dir, view, _feed) = fixture();

    assert_eq!(view.layer().len(), 3);
    assert!(!view.layer().contains(&id("0")));
    let labels: Vec<&str> = view.sidebar().entries().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["#1 Adna", "#2 Bunker", "#3 Cinebar"]);

    let fill = |n: &str| view.layer().get(&id(n)).unwrap().current_style().fill_color;
    assert_eq!(fill("1"), Rgb::new(0x37, 0x7e, 0xb8));
    assert_eq!(fill("2"), Rgb::new(0xff, 0x7f, 0x00));
    assert_eq!(fill("3"), Rgb::new(0x4d, 0xaf, 0x4a));
    assert!(matches!(view.legend(), Legend::Districts { entries } if entries.len() == 3));
}

#[test]
fn precinct_list_from_the_feed_labels_the_sidebar() {
    let (_dir, mut view, feed) = fixture();
    view.set_precinct_list(feed.fetch_precinct_list().unwrap());

    let labels: Vec<&str> = view.sidebar().entries().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["#1 Adna", "#2 Bunker Creek", "#3 Cinebar"]);
}

#[test]
fn broken_archive_leaves_map_empty_with_notice() {
    let mut view = MapView::new(MapConfig::default());
    let ticket = view.begin_geometry_load();
    view.on_geometry(ticket, GeometryLoader::load(&GeometrySource::Bytes(b"not a zip".to_vec().into())));
    assert!(view.layer().is_empty());
    assert_eq!(view.notices().len(), 1);
}

#[test]
fn older_archive_landing_last_does_not_replace_newer_layer() {
    let (dir, mut view, _feed) = fixture();
    let stale_shapes = dir.path().join("stale");
    fs::create_dir_all(&stale_shapes).unwrap();
    let lone = common::Precinct { number: 9, name: "Toledo", district: 20, population: 10, origin: (-122.9, 46.4) };
    let stale = common::archive_bytes(&stale_shapes, &[lone]);

    let older = view.begin_geometry_load();
    let newer = view.begin_geometry_load();
    let fresh = dir.path().join("precincts.zip");
    let newer_event = GeometryLoader::spawn(GeometrySource::parse(fresh.to_str().unwrap())).wait();
    let older_event = GeometryLoader::spawn(GeometrySource::Bytes(stale.into())).wait();

    assert!(view.on_geometry(newer, newer_event));
    assert!(!view.on_geometry(older, older_event));
    let ids: Vec<&str> = view.layer().ids().map(PrecinctId::as_str).collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn slower_earlier_election_never_overwrites_later_one() {
    let (_dir, mut view, feed) = fixture();
    view.set_catalog(feed.fetch_catalog().unwrap());
    let worker = FetchWorker::new(feed);

    let first = view.select_election(PRIMARY).unwrap();
    let second = view.select_election(GENERAL).unwrap();
    worker.submit(first);
    worker.submit(second);

    let mut applied = 0;
    for _ in 0..2 {
        let completion = worker.recv_timeout(Duration::from_secs(10)).expect("completion");
        if view.apply_completion(completion) {
            applied += 1;
        }
    }

    assert_eq!(applied, 1);
    assert_eq!(view.filter(), &FilterState::ElectionSelected { date: GENERAL.into() });
    assert_eq!(view.joined().unwrap().get(&id("1")).unwrap().votes, 300);
    match view.legend() {
        Legend::Votes { election_date, totals, .. } => {
            assert_eq!(election_date, GENERAL);
            assert_eq!(totals.votes, 999);
            assert!(totals.official);
            // the sentinel row never counts
            assert_eq!(totals.active_voters, 790);
        }
        other => panic!("expected votes legend, got {other:?}"),
    }
}

#[test]
fn filter_changes_rebind_exactly_one_handler_per_event() {
    let (_dir, mut view, feed) = fixture();
    view.set_catalog(feed.fetch_catalog().unwrap());
    let worker = FetchWorker::new(feed);

    let pending = view.select_election(GENERAL).unwrap();
    view.apply_completion(worker.run(pending));
    let pending = view.select_race(SENATE).unwrap();
    view.apply_completion(worker.run(pending));
    let pending = view.clear_race().unwrap();
    view.apply_completion(worker.run(pending));
    view.clear_election();

    for n in ["1", "2", "3"] {
        for event in [PointerEvent::HoverEnter, PointerEvent::HoverLeave, PointerEvent::Click] {
            assert_eq!(view.layer().handler_count(&id(n), event), 1, "precinct {n} {event:?}");
        }
    }
    assert_eq!(view.sidebar_hover(&id("2")).len(), 1);
}

#[test]
fn race_view_colors_winners_and_grays_out_precincts_without_results() {
    let (_dir, mut view, feed) = fixture();
    view.set_catalog(feed.fetch_catalog().unwrap());
    let worker = FetchWorker::new(feed);

    view.select_election(GENERAL).unwrap();
    let pending = view.select_race(SENATE).unwrap();
    assert!(view.apply_completion(worker.run(pending)));

    let style = |n: &str| *view.layer().get(&id(n)).unwrap().current_style();
    assert_eq!(style("1").fill_color, Rgb::new(0xd6, 0x27, 0x28));
    assert_eq!(style("2").fill_color, Rgb::new(0x1f, 0x77, 0xb4));
    // no results row: zero-filled, no winner, faintest opacity
    assert_eq!(view.joined().unwrap().get(&id("3")).unwrap().votes, 0);
    assert_eq!(style("3").fill_color, NEUTRAL_GRAY);
    assert_eq!(style("3").fill_opacity, 0.3);

    match view.legend() {
        Legend::Race { race, votes, official, population, candidates, .. } => {
            assert_eq!(race, SENATE);
            assert_eq!(votes, 2500);
            assert!(official);
            assert_eq!(population, 730);
            assert_eq!(candidates[0].name, "Bob Birch");
            assert_eq!(candidates[1].party, "Democrat");
        }
        other => panic!("expected race legend, got {other:?}"),
    }
}

#[test]
fn failed_fetch_keeps_previous_view_and_reports() {
    let (_dir, mut view, feed) = fixture();
    let worker = FetchWorker::new(feed);

    let pending = view.select_election(GENERAL).unwrap();
    assert!(view.apply_completion(worker.run(pending)));
    let pending = view.select_election("2020-11-03").unwrap();
    assert!(!view.apply_completion(worker.run(pending)));

    assert_eq!(view.table().unwrap().total().unwrap().votes, 999);
    assert_eq!(view.take_notices().len(), 1);
}

#[test]
fn deselect_restores_default_style_and_view() {
    let (_dir, mut view, feed) = fixture();
    let worker = FetchWorker::new(feed);
    let pending = view.select_election(GENERAL).unwrap();
    view.apply_completion(worker.run(pending));
    let default_view = view.config().default_view;

    view.dispatch(PointerEvent::Click, &id("1"));
    assert_eq!(view.layer().get(&id("1")).unwrap().state(), VisualState::Selected);
    assert_ne!(view.viewport(), default_view);
    assert!(view.sidebar().entry(&id("1")).unwrap().active);
    match view.popup() {
        Some(Popup::Precinct(summary)) => {
            assert_eq!(summary.title, "Adna (#1)");
            assert_eq!(summary.votes, 300);
        }
        other => panic!("expected precinct popup, got {other:?}"),
    }

    // clicking the selected precinct again deselects it
    view.dispatch(PointerEvent::Click, &id("1"));
    let feature = view.layer().get(&id("1")).unwrap();
    assert_eq!(feature.state(), VisualState::Base);
    assert_eq!(feature.current_style(), &feature.styles().base);
    assert_eq!(view.viewport(), default_view);
    assert!(view.popup().is_none());
    assert!(view.sidebar().entries().iter().all(|e| !e.active));
}

#[test]
fn map_and_sidebar_hover_stay_in_step() {
    let (_dir, mut view, _feed) = fixture();

    // center of precinct 2
    view.hover_at(-122.75, 46.55);
    assert_eq!(view.selection().hovered(), Some(&id("2")));
    assert!(view.sidebar().entry(&id("2")).unwrap().hovered);
    assert!(view.info_panel().to_string().contains("Bunker"));

    view.sidebar_leave(&id("2"));
    assert_eq!(view.selection().hovered(), None);
    assert!(view.sidebar().entries().iter().all(|e| !e.hovered));

    view.click_at(-122.85, 46.55);
    assert_eq!(view.selection().selected(), Some(&id("1")));
    view.click_at(10.0, 10.0);
    assert_eq!(view.selection().selected(), None);
}

#[test]
fn contact_messages_are_validated_and_queued() {
    let (_dir, _view, feed) = fixture();
    let message = ContactMessage {
        precinct_number: id("2"),
        sender_name: " Pat ".into(),
        sender_email: "pat@example.org".into(),
        message: "Hello".into(),
        is_become_pco: true,
    }
    .validated()
    .unwrap();
    feed.submit_contact_message(&message).unwrap();

    let outbox = fs::read_to_string(feed.outbox_path()).unwrap();
    assert_eq!(outbox.lines().count(), 1);
    assert!(outbox.contains("\"sender_name\":\"Pat\""));

    let invalid = ContactMessage { sender_email: "not-an-address".into(), ..message };
    assert!(feed.submit_contact_message(&invalid).is_err());
}

#[test]
fn snapshot_svg_draws_every_precinct() {
    let (dir, view, _feed) = fixture();
    let path = dir.path().join("map.svg");
    view.layer().to_svg_with_size(&path, 600, 10).unwrap();

    let svg = fs::read_to_string(path).unwrap();
    assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
    assert_eq!(svg.matches("data-precinct=").count(), 3);
}
