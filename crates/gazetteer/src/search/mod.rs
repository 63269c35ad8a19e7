//! The layered search state machine.
//!
//! A query is decomposed into contiguous token subranges; each subrange is
//! assigned to at most one hierarchy kind, coarse to fine. The enumeration
//! recurses over kinds with backtracking, keeps candidate layers consistent
//! with the hierarchy (each deeper layer must descend from the previous),
//! scores every recorded assignment by a per-kind weight sum, and retains
//! the best candidates in a bounded beam.

use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashSet;
use tracing::{debug, instrument};

use crate::beam::{Beam, BeamKey};
use crate::error::Result;
use crate::hierarchy::{Entry, Hierarchy, HierarchyReader};
use crate::index::{DocId, TokenIndex};
use crate::text::{self, house_numbers};
use crate::types::{GeoObjectId, Kind};

/// Maximum number of results returned by one query; also the beam width.
pub const MAX_RESULTS: usize = 100;

/// One ranked match. The certainty is normalized per query: the top result
/// is exactly 1.0 and everything else falls in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub osm_id: GeoObjectId,
    pub certainty: f64,
}

/// Candidate documents for one kind level within one recursion frame.
#[derive(Debug)]
struct Layer {
    kind: Kind,
    entries: Vec<DocId>,
}

/// Mutable per-query state. Owned by exactly one query invocation and
/// discarded afterwards.
struct Context {
    tokens: Vec<String>,
    token_kinds: Vec<Kind>,
    num_used_tokens: usize,
    layers: Vec<Layer>,
    beam: Beam,
    /// Token positions that ever looked like a house number during this
    /// query. Grows monotonically; never cleared by backtracking.
    house_number_positions: BTreeSet<usize>,
}

impl Context {
    fn new(query: &str) -> Context {
        let tokens = text::tokenize(&text::normalize(query));
        let token_kinds = vec![Kind::Count; tokens.len()];
        Context {
            tokens,
            token_kinds,
            num_used_tokens: 0,
            layers: Vec::new(),
            beam: Beam::new(MAX_RESULTS),
            house_number_positions: BTreeSet::new(),
        }
    }

    fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    fn token(&self, id: usize) -> &str {
        &self.tokens[id]
    }

    fn token_kind(&self, id: usize) -> Kind {
        self.token_kinds[id]
    }

    fn is_token_used(&self, id: usize) -> bool {
        self.token_kinds[id] != Kind::Count
    }

    fn all_tokens_used(&self) -> bool {
        self.num_used_tokens == self.tokens.len()
    }

    fn mark_token(&mut self, id: usize, kind: Kind) {
        let was_used = self.token_kinds[id] != Kind::Count;
        self.token_kinds[id] = kind;
        let now_used = kind != Kind::Count;
        if was_used && !now_used {
            self.num_used_tokens -= 1;
        }
        if !was_used && now_used {
            self.num_used_tokens += 1;
        }
    }

    /// Marks `[l, r)` as `kind`. Every path out of the frame must restore
    /// with [`Context::unmark_range`].
    fn mark_range(&mut self, l: usize, r: usize, kind: Kind) {
        for id in l..r {
            self.mark_token(id, kind);
        }
    }

    fn unmark_range(&mut self, l: usize, r: usize) {
        for id in l..r {
            self.mark_token(id, Kind::Count);
        }
    }

    fn add_result(
        &mut self,
        osm_id: GeoObjectId,
        certainty: f64,
        kind: Kind,
        token_ids: &[usize],
        all_kinds: &[Kind],
    ) {
        let key = BeamKey {
            osm_id,
            kind,
            token_ids: token_ids.to_vec(),
            all_kinds: all_kinds.to_vec(),
        };
        self.beam.add(key, certainty);
    }

    fn mark_house_number_positions(&mut self, token_ids: &[usize]) {
        self.house_number_positions.extend(token_ids.iter().copied());
    }

    /// Drains the beam into the final result list: first-wins dedup by
    /// object id, the house-number filter when the query plausibly held a
    /// house number, then normalization against the best certainty.
    fn fill_results(&self) -> Vec<SearchResult> {
        let mut results = Vec::with_capacity(self.beam.entries().len());
        let mut seen: AHashSet<GeoObjectId> = AHashSet::new();
        let has_potential_house_number = !self.house_number_positions.is_empty();
        for entry in self.beam.entries() {
            if !seen.insert(entry.key.osm_id) {
                continue;
            }
            if has_potential_house_number && !self.is_good_for_potential_house_number(&entry.key) {
                continue;
            }
            results.push(SearchResult {
                osm_id: entry.key.osm_id,
                certainty: entry.certainty,
            });
        }

        if !results.is_empty() {
            let top = results[0].certainty;
            for result in &mut results {
                result.certainty /= top;
            }
        }
        debug_assert!(results.windows(2).all(|w| w[0].certainty >= w[1].certainty));
        debug_assert!(results.len() <= MAX_RESULTS);
        results
    }

    fn is_good_for_potential_house_number(&self, key: &BeamKey) -> bool {
        if key.token_ids.len() == self.tokens.len() {
            return true;
        }
        if is_building_with_address(key) {
            return true;
        }
        // A street, locality or region whose key covers the number tokens
        // still makes a plausible address.
        has_locality_or_region(key) && covers_positions(key, &self.house_number_positions)
    }
}

fn is_building_with_address(key: &BeamKey) -> bool {
    if key.kind != Kind::Building {
        return false;
    }
    let mut got_locality = false;
    let mut got_street = false;
    let mut got_building = false;
    for &kind in &key.all_kinds {
        match kind {
            Kind::Region | Kind::Subregion | Kind::Locality => got_locality = true,
            Kind::Street => got_street = true,
            Kind::Building => got_building = true,
            _ => {}
        }
    }
    got_locality && got_street && got_building
}

fn has_locality_or_region(key: &BeamKey) -> bool {
    key.all_kinds
        .iter()
        .any(|kind| matches!(kind, Kind::Region | Kind::Subregion | Kind::Locality))
}

/// `key.token_ids` ⊇ `positions`; `token_ids` is sorted ascending.
fn covers_positions(key: &BeamKey, positions: &BTreeSet<usize>) -> bool {
    positions
        .iter()
        .all(|position| key.token_ids.binary_search(position).is_ok())
}

/// The hierarchical geocoder.
///
/// Owns the hierarchy and its token index, both immutable after
/// construction; any number of queries may run concurrently on one
/// instance without synchronization.
#[derive(Debug, Clone)]
pub struct Geocoder {
    hierarchy: Arc<Hierarchy>,
    index: Arc<TokenIndex>,
}

impl Geocoder {
    /// Builds a geocoder over an already-constructed hierarchy. The token
    /// index is built on `load_threads` workers (0 picks the default).
    pub fn new(hierarchy: Hierarchy, load_threads: usize) -> Result<Geocoder> {
        let hierarchy = Arc::new(hierarchy);
        let index = Arc::new(TokenIndex::new(Arc::clone(&hierarchy), load_threads)?);
        Ok(Geocoder { hierarchy, index })
    }

    /// Reads a newline-delimited JSON hierarchy from `path`.
    pub fn from_json_file(path: impl AsRef<Path>, load_threads: usize) -> Result<Geocoder> {
        let hierarchy = HierarchyReader::from_file(path)?.read(load_threads)?;
        Geocoder::new(hierarchy, load_threads)
    }

    /// Reads a newline-delimited JSON hierarchy from an open reader.
    pub fn from_json_reader(reader: impl BufRead, load_threads: usize) -> Result<Geocoder> {
        let hierarchy = HierarchyReader::new(reader).read(load_threads)?;
        Geocoder::new(hierarchy, load_threads)
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn index(&self) -> &TokenIndex {
        &self.index
    }

    /// Ranks the geographic objects matching `query`.
    ///
    /// Never fails: queries that tokenize to nothing or match nothing yield
    /// an empty list. Results come sorted by descending certainty with the
    /// top entry at exactly 1.0, hold no duplicate object ids, and number
    /// at most [`MAX_RESULTS`].
    #[instrument(name = "Process query", level = "debug", skip(self))]
    pub fn process_query(&self, query: &str) -> Vec<SearchResult> {
        let t_query = Instant::now();
        let mut ctx = Context::new(query);
        self.go(&mut ctx, Kind::Country);
        let results = ctx.fill_results();
        debug!(
            num_tokens = ctx.num_tokens(),
            num_results = results.len(),
            elapsed = ?t_query.elapsed(),
            "geocoding complete"
        );
        results
    }

    /// One level of the layered enumeration: tries to assign every
    /// contiguous run of unused tokens to `kind`, records the candidates,
    /// and recurses to the next kind both with and without an assignment.
    fn go(&self, ctx: &mut Context, kind: Kind) {
        if ctx.num_tokens() == 0 || ctx.all_tokens_used() || kind == Kind::Count {
            return;
        }

        let num_tokens = ctx.num_tokens();
        let mut subquery: Vec<String> = Vec::new();
        let mut subquery_token_ids: Vec<usize> = Vec::new();
        for i in 0..num_tokens {
            subquery.clear();
            subquery_token_ids.clear();
            for j in i..num_tokens {
                if ctx.is_token_used(j) {
                    break;
                }
                subquery.push(ctx.token(j).to_owned());
                subquery_token_ids.push(j);

                let mut cur_layer = Layer {
                    kind,
                    entries: Vec::new(),
                };
                // Buildings are indexed separately.
                if kind == Kind::Building {
                    self.fill_buildings_layer(ctx, &subquery, &subquery_token_ids, &mut cur_layer);
                } else {
                    self.fill_regular_layer(ctx, kind, &subquery, &mut cur_layer);
                }
                if cur_layer.entries.is_empty() {
                    continue;
                }

                ctx.mark_range(i, j + 1, kind);

                let mut street_synonym_mark: Option<usize> = None;
                let mut certainty = 0.0;
                let mut token_ids = Vec::new();
                let mut all_kinds = Vec::new();
                for tok_id in 0..num_tokens {
                    let t = ctx.token_kind(tok_id);
                    if kind == Kind::Street
                        && t == Kind::Count
                        && street_synonym_mark.is_none()
                        && text::is_street_synonym(ctx.token(tok_id))
                    {
                        ctx.mark_token(tok_id, Kind::Street);
                        street_synonym_mark = Some(tok_id);
                    }
                    // `t` was read before the synonym mark: the synonym
                    // position scores only in deeper frames.
                    certainty += t.weight();
                    if t != Kind::Count {
                        token_ids.push(tok_id);
                        all_kinds.push(t);
                    }
                }

                for &doc_id in &cur_layer.entries {
                    let osm_id = self.index.doc(doc_id).id;
                    ctx.add_result(osm_id, certainty, kind, &token_ids, &all_kinds);
                }

                ctx.layers.push(cur_layer);
                self.go(ctx, kind.next());
                ctx.layers.pop();

                if let Some(tok_id) = street_synonym_mark {
                    ctx.mark_token(tok_id, Kind::Count);
                }
                ctx.unmark_range(i, j + 1);
            }
        }

        // Also try skipping this kind entirely.
        self.go(ctx, kind.next());
    }

    fn fill_regular_layer(&self, ctx: &Context, kind: Kind, subquery: &[String], cur_layer: &mut Layer) {
        self.index.for_each_doc_id(subquery, |doc_id| {
            let doc = self.index.doc(doc_id);
            if doc.kind != kind {
                return;
            }
            if ctx.layers.is_empty() || self.has_parent(&ctx.layers, doc) {
                cur_layer.entries.push(doc_id);
            }
        });
    }

    /// Whether some entry in the current top layer is an ancestor of
    /// `entry`. The relation is inverted: ancestors are stored on the
    /// descendant side, nodes know nothing about their children.
    fn has_parent(&self, layers: &[Layer], entry: &Entry) -> bool {
        let Some(layer) = layers.last() else {
            return false;
        };
        layer
            .entries
            .iter()
            .any(|&doc_id| self.hierarchy.is_parent_to(self.index.doc(doc_id), entry))
    }

    fn fill_buildings_layer(
        &self,
        ctx: &mut Context,
        subquery: &[String],
        subquery_token_ids: &[usize],
        cur_layer: &mut Layer,
    ) {
        if ctx.layers.is_empty() {
            return;
        }

        let subquery_hn = subquery.join(" ");
        if !house_numbers::looks_like_house_number(&subquery_hn, false) {
            return;
        }

        for layer_id in (0..ctx.layers.len()).rev() {
            let layer_kind = ctx.layers[layer_id].kind;
            if layer_kind != Kind::Street && layer_kind != Kind::Locality {
                continue;
            }

            // A street or locality layer is already filled and the subquery
            // resembles a house number. It can still be something else (a
            // zip code, say), so the tokens are only marked as a potential
            // house number.
            ctx.mark_house_number_positions(subquery_token_ids);

            for entry_id in 0..ctx.layers[layer_id].entries.len() {
                let doc_id = ctx.layers[layer_id].entries[entry_id];
                self.index.for_each_related_building(doc_id, |building_doc_id| {
                    let building = self.index.doc(building_doc_id);
                    let main_name = self
                        .hierarchy
                        .name_dictionary()
                        .get(building.names.main());
                    if house_numbers::house_numbers_match(main_name, &subquery_hn, false) {
                        cur_layer.entries.push(building_doc_id);
                    }
                });
            }
        }
    }
}
