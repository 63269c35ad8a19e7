//! Newline-delimited JSON reader for hierarchy files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use itertools::Itertools;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{Entry, Hierarchy, HierarchyError, MultipleNames, NameDictionary};
use crate::error::Result;
use crate::text;
use crate::types::{GeoObjectId, Kind};

/// One entity per line:
///
/// ```json
/// {"id": "way:4", "kind": "street", "name": "Rue de Rivoli",
///  "alt_names": ["R. de Rivoli"], "ancestors": ["relation:1", "relation:3"]}
/// ```
///
/// `ancestors` is the address chain, coarsest first.
#[derive(Debug, Deserialize)]
struct RawEntry {
    id: String,
    kind: String,
    name: String,
    #[serde(default)]
    alt_names: Vec<String>,
    #[serde(default)]
    ancestors: Vec<String>,
}

struct ParsedEntry {
    id: GeoObjectId,
    kind: Kind,
    name: String,
    alt_names: Vec<String>,
    ancestors: Vec<GeoObjectId>,
}

/// Streaming reader producing a validated [`Hierarchy`].
pub struct HierarchyReader<R> {
    reader: R,
}

impl HierarchyReader<BufReader<File>> {
    pub fn from_file(path: impl AsRef<Path>) -> Result<HierarchyReader<BufReader<File>>> {
        Ok(HierarchyReader::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> HierarchyReader<R> {
    pub fn new(reader: R) -> HierarchyReader<R> {
        HierarchyReader { reader }
    }

    /// Reads, normalizes and validates the whole hierarchy.
    ///
    /// Entry records are parsed on a pool of `load_threads` workers (0
    /// picks the pool's default size). Any malformed line, unknown kind
    /// name or id-space violation aborts the load; nothing partial is
    /// returned.
    #[instrument(name = "Read hierarchy", level = "info", skip(self))]
    pub fn read(self, load_threads: usize) -> Result<Hierarchy> {
        let t_load = Instant::now();
        let lines = self.reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        let pool = crate::thread_pool(load_threads)?;
        let parsed = pool.install(|| {
            lines
                .par_iter()
                .filter(|line| !line.trim().is_empty())
                .map(|line| parse_line(line))
                .collect::<std::result::Result<Vec<_>, HierarchyError>>()
        })?;

        let mut dict = NameDictionary::default();
        let entries = parsed
            .into_iter()
            .map(|entry| {
                let mut names = MultipleNames::new(dict.add(&entry.name));
                for alt in &entry.alt_names {
                    names.add_auxiliary(dict.add(alt));
                }
                Entry {
                    id: entry.id,
                    kind: entry.kind,
                    names,
                    ancestors: entry.ancestors,
                }
            })
            .collect();

        let hierarchy = Hierarchy::build(entries, dict)?;
        info!(
            num_entries = hierarchy.len(),
            num_names = hierarchy.name_dictionary().len(),
            elapsed = ?t_load.elapsed(),
            "hierarchy loaded"
        );
        Ok(hierarchy)
    }
}

fn parse_line(line: &str) -> std::result::Result<ParsedEntry, HierarchyError> {
    let raw: RawEntry = serde_json::from_str(line)?;
    let id = parse_object_id(&raw.id)?;
    let kind =
        Kind::from_name(&raw.kind).ok_or_else(|| HierarchyError::UnknownKind(raw.kind.clone()))?;
    let name = text::normalize(&raw.name);
    let alt_names = raw
        .alt_names
        .iter()
        .map(|alt| text::normalize(alt))
        .filter(|alt| !alt.is_empty() && *alt != name)
        .unique()
        .collect();
    let ancestors = raw
        .ancestors
        .iter()
        .map(|ancestor| parse_object_id(ancestor))
        .collect::<std::result::Result<_, _>>()?;
    Ok(ParsedEntry {
        id,
        kind,
        name,
        alt_names,
        ancestors,
    })
}

fn parse_object_id(s: &str) -> std::result::Result<GeoObjectId, HierarchyError> {
    GeoObjectId::parse(s).ok_or_else(|| HierarchyError::BadObjectId(s.to_owned()))
}
