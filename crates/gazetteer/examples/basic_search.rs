//! Basic geocoding over a tiny in-memory hierarchy.
//!
//! Run with: cargo run --example basic_search

use gazetteer::{Geocoder, HierarchyReader};

fn main() -> Result<(), gazetteer::error::GazetteerError> {
    gazetteer::init_logging(tracing::Level::INFO)?;

    let data = r#"
{"id": "relation:1", "kind": "country", "name": "France"}
{"id": "relation:2", "kind": "region", "name": "Île-de-France", "ancestors": ["relation:1"]}
{"id": "relation:3", "kind": "locality", "name": "Paris", "ancestors": ["relation:1", "relation:2"]}
{"id": "way:4", "kind": "street", "name": "Rue de Rivoli", "ancestors": ["relation:1", "relation:2", "relation:3"]}
{"id": "node:5", "kind": "building", "name": "1", "ancestors": ["relation:1", "relation:2", "relation:3", "way:4"]}
"#;

    let hierarchy = HierarchyReader::new(data.as_bytes()).read(1)?;
    let geocoder = Geocoder::new(hierarchy, 1)?;

    for query in [
        "france",
        "paris france",
        "rivoli paris",
        "1 rue de rivoli paris",
        "nowhere at all",
    ] {
        let results = geocoder.process_query(query);
        println!("{query:?} -> {} result(s)", results.len());
        for result in results {
            println!("  {} (certainty {:.3})", result.osm_id, result.certainty);
        }
    }

    Ok(())
}
