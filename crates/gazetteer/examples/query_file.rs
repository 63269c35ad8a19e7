//! Geocode queries against a hierarchy file.
//!
//! Run with: cargo run --example query_file -- <hierarchy.jsonl> <query>...

use gazetteer::Geocoder;

fn main() -> Result<(), gazetteer::error::GazetteerError> {
    gazetteer::init_logging(tracing::Level::INFO)?;

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: query_file <hierarchy.jsonl> <query>...");
        std::process::exit(2);
    };

    let geocoder = Geocoder::from_json_file(&path, 0)?;
    println!(
        "loaded {} entries from {path}",
        geocoder.hierarchy().len()
    );

    for query in args {
        let results = geocoder.process_query(&query);
        println!("{query:?} -> {} result(s)", results.len());
        for result in results.iter().take(5) {
            println!("  {} (certainty {:.3})", result.osm_id, result.certainty);
        }
    }

    Ok(())
}
