//! Integration tests for the Gazetteer geocoder.
//!
//! These run against the full public API on a small hand-built hierarchy:
//! country "France", region "Île-de-France", locality "Paris", street
//! "Rue de Rivoli" and building "1" on that street.

use std::io::Write;

use gazetteer::{GeoObjectId, Geocoder, Kind, MAX_RESULTS};

const FRANCE: GeoObjectId = GeoObjectId::osm_relation(1);
const ILE_DE_FRANCE: GeoObjectId = GeoObjectId::osm_relation(2);
const PARIS: GeoObjectId = GeoObjectId::osm_relation(3);
const RUE_DE_RIVOLI: GeoObjectId = GeoObjectId::osm_way(4);
const BUILDING_1: GeoObjectId = GeoObjectId::osm_node(5);

fn fixture_json() -> String {
    [
        r#"{"id": "relation:1", "kind": "country", "name": "France"}"#,
        r#"{"id": "relation:2", "kind": "region", "name": "Île-de-France", "ancestors": ["relation:1"]}"#,
        r#"{"id": "relation:3", "kind": "locality", "name": "Paris", "ancestors": ["relation:1", "relation:2"]}"#,
        r#"{"id": "way:4", "kind": "street", "name": "Rue de Rivoli", "ancestors": ["relation:1", "relation:2", "relation:3"]}"#,
        r#"{"id": "node:5", "kind": "building", "name": "1", "ancestors": ["relation:1", "relation:2", "relation:3", "way:4"]}"#,
    ]
    .join("\n")
}

fn fixture() -> Geocoder {
    Geocoder::from_json_reader(fixture_json().as_bytes(), 2).expect("fixture should load")
}

fn assert_result_invariants(geocoder: &Geocoder, query: &str) {
    let results = geocoder.process_query(query);
    assert!(results.len() <= MAX_RESULTS, "query {query:?}");
    if let Some(first) = results.first() {
        assert_eq!(first.certainty, 1.0, "query {query:?}");
    }
    for window in results.windows(2) {
        assert!(
            window[0].certainty >= window[1].certainty,
            "query {query:?} must be sorted"
        );
    }
    for result in &results {
        assert!(
            result.certainty > 0.0 && result.certainty <= 1.0,
            "query {query:?}"
        );
    }
    let mut ids: Vec<_> = results.iter().map(|r| r.osm_id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), results.len(), "query {query:?} has duplicate ids");
}

#[test]
fn country_query_matches_the_country() {
    let geocoder = fixture();
    let results = geocoder.process_query("france");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].osm_id, FRANCE);
    assert_eq!(results[0].certainty, 1.0);
}

#[test]
fn locality_with_country_outranks_the_country() {
    let geocoder = fixture();
    let results = geocoder.process_query("paris france");
    assert!(results.len() >= 2);
    assert_eq!(results[0].osm_id, PARIS);
    assert_eq!(results[0].certainty, 1.0);
    assert_eq!(results[1].osm_id, FRANCE);
    // Raw scores: 13 for paris+france, 10 for france alone.
    assert!((results[1].certainty - 10.0 / 13.0).abs() < 1e-12);
}

#[test]
fn street_with_locality_outranks_the_locality() {
    let geocoder = fixture();
    let results = geocoder.process_query("rivoli paris");
    assert_eq!(results[0].osm_id, RUE_DE_RIVOLI);
    assert_eq!(results[0].certainty, 1.0);
    let paris = results
        .iter()
        .find(|r| r.osm_id == PARIS)
        .expect("paris should appear");
    assert!(paris.certainty < 1.0);
}

#[test]
fn full_address_resolves_to_the_building() {
    let geocoder = fixture();
    let results = geocoder.process_query("1 rue de rivoli paris");
    assert_eq!(results[0].osm_id, BUILDING_1);
    assert_eq!(results[0].certainty, 1.0);
    // The street covers only part of the address once the house number is
    // recognized, so it is suppressed.
    assert!(results.iter().all(|r| r.osm_id != RUE_DE_RIVOLI));
}

#[test]
fn street_address_without_locality_still_resolves() {
    let geocoder = fixture();
    let results = geocoder.process_query("1 rue de rivoli");
    assert_eq!(results[0].osm_id, BUILDING_1);
    assert_eq!(results[0].certainty, 1.0);
}

#[test]
fn house_number_without_street_yields_no_building() {
    let geocoder = fixture();
    let results = geocoder.process_query("42 paris");
    assert!(results.iter().all(|r| r.osm_id != BUILDING_1));
    // Every candidate leaves the "42" unexplained, so the house-number
    // filter drops the lot.
    assert!(results.is_empty());
}

#[test]
fn empty_and_whitespace_queries_yield_nothing() {
    let geocoder = fixture();
    assert!(geocoder.process_query("").is_empty());
    assert!(geocoder.process_query("   \t  ").is_empty());
}

#[test]
fn unknown_tokens_yield_nothing() {
    let geocoder = fixture();
    assert!(geocoder.process_query("xyzzy").is_empty());
}

#[test]
fn known_tokens_among_unknown_ones_still_match() {
    let geocoder = fixture();
    let results = geocoder.process_query("xyzzy paris xyzzy");
    assert_eq!(results[0].osm_id, PARIS);
}

#[test]
fn street_synonym_is_absorbed_into_the_street() {
    let geocoder = fixture();
    let results = geocoder.process_query("rivoli street paris");
    assert_eq!(results[0].osm_id, RUE_DE_RIVOLI);
}

#[test]
fn diacritics_fold_in_both_directions() {
    let geocoder = fixture();
    let results = geocoder.process_query("île-de-france");
    assert_eq!(results[0].osm_id, ILE_DE_FRANCE);
    let results = geocoder.process_query("ile de france");
    assert_eq!(results[0].osm_id, ILE_DE_FRANCE);
}

#[test]
fn queries_are_deterministic() {
    let geocoder = fixture();
    for query in ["france", "paris france", "1 rue de rivoli paris", "rivoli"] {
        let first = geocoder.process_query(query);
        let second = geocoder.process_query(query);
        assert_eq!(first, second, "query {query:?}");
    }
}

#[test]
fn result_invariants_hold_across_queries() {
    let geocoder = fixture();
    for query in [
        "",
        "france",
        "paris",
        "paris france",
        "rivoli paris",
        "1 rue de rivoli paris",
        "rue de rivoli paris france",
        "42 paris",
        "rue rue rue",
        "1 1 1 1",
    ] {
        assert_result_invariants(&geocoder, query);
    }
}

#[test]
fn result_count_is_capped_at_the_beam_width() {
    // 150 localities all named "springfield"; only the first 100 inserted
    // survive the beam.
    let mut data = String::from(r#"{"id": "relation:1", "kind": "country", "name": "USA"}"#);
    data.push('\n');
    for serial in 0..150 {
        data.push_str(&format!(
            r#"{{"id": "node:{}", "kind": "locality", "name": "Springfield", "ancestors": ["relation:1"]}}"#,
            serial + 10
        ));
        data.push('\n');
    }
    let geocoder = Geocoder::from_json_reader(data.as_bytes(), 2).unwrap();
    let results = geocoder.process_query("springfield");
    assert_eq!(results.len(), MAX_RESULTS);
    // Earliest insertion wins among equal scores: load order is kept.
    for (position, result) in results.iter().enumerate() {
        assert_eq!(result.osm_id, GeoObjectId::osm_node(position as u64 + 10));
        assert_eq!(result.certainty, 1.0);
    }
}

#[test]
fn deeper_matches_never_lower_the_top_certainty() {
    let geocoder = fixture();
    let street_only = geocoder.process_query("rue de rivoli paris");
    let with_building = geocoder.process_query("1 rue de rivoli paris");
    // Raw top scores: 6.0 for the street match, 6.1 with the building.
    assert_eq!(street_only[0].osm_id, RUE_DE_RIVOLI);
    assert_eq!(with_building[0].osm_id, BUILDING_1);
}

#[test]
fn loads_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(fixture_json().as_bytes()).unwrap();
    file.flush().unwrap();

    let geocoder = Geocoder::from_json_file(file.path(), 2).unwrap();
    assert_eq!(geocoder.hierarchy().len(), 5);
    assert_eq!(geocoder.index().num_docs(), 5);
    let results = geocoder.process_query("paris");
    assert_eq!(results[0].osm_id, PARIS);

    let paris = geocoder.hierarchy().lookup(PARIS).unwrap();
    assert_eq!(paris.kind, Kind::Locality);
}

#[test]
fn missing_file_fails_construction() {
    let err = Geocoder::from_json_file("/nonexistent/hierarchy.jsonl", 1);
    assert!(err.is_err());
}
