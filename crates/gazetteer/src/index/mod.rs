//! Token index over the hierarchy entries.
//!
//! Tokens come from each entry's own normalized names. A containment query
//! enumerates every document whose name tokens include all query tokens,
//! order-insensitively. The index also keeps the street→buildings relation
//! the building layer needs; buildings are related to the streets in their
//! ancestor chains, not to localities.

use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::error::Result;
use crate::hierarchy::{Entry, Hierarchy};
use crate::text;
use crate::types::Kind;

/// Dense 0-based document id: the entry's load-order position, stable for
/// the lifetime of one index.
pub type DocId = usize;

/// Read-only token index, shared freely between concurrent queries.
#[derive(Debug)]
pub struct TokenIndex {
    hierarchy: Arc<Hierarchy>,
    docs_by_token: AHashMap<String, Vec<DocId>>,
    buildings_on_street: AHashMap<DocId, Vec<DocId>>,
}

impl TokenIndex {
    /// Builds the index on a pool of `load_threads` workers (0 picks the
    /// pool's default size). The result is immutable.
    #[instrument(name = "Build token index", level = "info", skip(hierarchy), fields(num_entries = hierarchy.len()))]
    pub fn new(hierarchy: Arc<Hierarchy>, load_threads: usize) -> Result<TokenIndex> {
        let t_build = Instant::now();
        let pool = crate::thread_pool(load_threads)?;

        let per_doc_tokens: Vec<Vec<String>> = pool.install(|| {
            hierarchy
                .entries()
                .par_iter()
                .map(|entry| {
                    let dict = hierarchy.name_dictionary();
                    let mut tokens = Vec::new();
                    for pos in entry.names.iter() {
                        tokens.extend(text::tokenize(dict.get(pos)));
                    }
                    tokens
                })
                .collect()
        });

        let mut docs_by_token: AHashMap<String, Vec<DocId>> = AHashMap::new();
        for (doc_id, tokens) in per_doc_tokens.into_iter().enumerate() {
            for token in tokens {
                docs_by_token.entry(token).or_default().push(doc_id);
            }
        }
        for postings in docs_by_token.values_mut() {
            postings.sort_unstable();
            postings.dedup();
            postings.shrink_to_fit();
        }

        let mut buildings_on_street: AHashMap<DocId, Vec<DocId>> = AHashMap::new();
        for (doc_id, entry) in hierarchy.entries().iter().enumerate() {
            if entry.kind != Kind::Building {
                continue;
            }
            for &ancestor in &entry.ancestors {
                let Some(street_doc) = hierarchy.slot(ancestor) else {
                    continue;
                };
                if hierarchy.entries()[street_doc].kind == Kind::Street {
                    buildings_on_street
                        .entry(street_doc)
                        .or_default()
                        .push(doc_id);
                }
            }
        }

        info!(
            num_docs = hierarchy.len(),
            num_tokens = docs_by_token.len(),
            num_streets_with_buildings = buildings_on_street.len(),
            elapsed = ?t_build.elapsed(),
            "token index built"
        );
        Ok(TokenIndex {
            hierarchy,
            docs_by_token,
            buildings_on_street,
        })
    }

    /// Visits every document whose name tokens contain all of `tokens`,
    /// exactly once, in ascending document order. An empty query visits
    /// nothing.
    pub fn for_each_doc_id<F: FnMut(DocId)>(&self, tokens: &[String], mut visit: F) {
        if tokens.is_empty() {
            return;
        }
        let mut postings = Vec::with_capacity(tokens.len());
        for token in tokens {
            match self.docs_by_token.get(token.as_str()) {
                Some(list) => postings.push(list.as_slice()),
                None => return,
            }
        }
        postings.sort_unstable_by_key(|list| list.len());
        let Some((shortest, rest)) = postings.split_first() else {
            return;
        };
        'docs: for &doc_id in *shortest {
            for list in rest {
                if list.binary_search(&doc_id).is_err() {
                    continue 'docs;
                }
            }
            visit(doc_id);
        }
    }

    /// Visits the buildings related to `street`, in index insertion order.
    /// Documents of other kinds relate to no buildings.
    pub fn for_each_related_building<F: FnMut(DocId)>(&self, street: DocId, mut visit: F) {
        if let Some(buildings) = self.buildings_on_street.get(&street) {
            for &building in buildings {
                visit(building);
            }
        }
    }

    /// O(1) access to the entry behind a document id.
    pub fn doc(&self, doc_id: DocId) -> &Entry {
        &self.hierarchy.entries()[doc_id]
    }

    pub fn num_docs(&self) -> usize {
        self.hierarchy.len()
    }
}
