//! Immutable store of geographic entries and their ancestor chains.
//!
//! Every entry carries its full address as an ordered chain of ancestor
//! ids, root first; nodes hold no information about their children. The
//! parent relation is therefore answered from the descendant side by
//! scanning its chain, which is never longer than the number of kinds.

mod reader;

use ahash::AHashMap;

pub use error::HierarchyError;
pub use reader::HierarchyReader;

use crate::types::{GeoObjectId, Kind};

/// Position of an interned name inside the [`NameDictionary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamePosition(u32);

/// Interning arena for normalized names.
///
/// Entries reference their names by position; each distinct string is
/// stored once, owned by the hierarchy.
#[derive(Debug, Default)]
pub struct NameDictionary {
    names: Vec<String>,
    positions: AHashMap<String, NamePosition>,
}

impl NameDictionary {
    /// Interns `name`, returning the existing position for a known string.
    pub fn add(&mut self, name: &str) -> NamePosition {
        if let Some(&pos) = self.positions.get(name) {
            return pos;
        }
        let pos = NamePosition(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.positions.insert(name.to_owned(), pos);
        pos
    }

    pub fn get(&self, pos: NamePosition) -> &str {
        &self.names[pos.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Main normalized name of an entry plus any auxiliary spellings.
#[derive(Debug, Clone)]
pub struct MultipleNames {
    main: NamePosition,
    auxiliary: Vec<NamePosition>,
}

impl MultipleNames {
    pub fn new(main: NamePosition) -> MultipleNames {
        MultipleNames {
            main,
            auxiliary: Vec::new(),
        }
    }

    pub fn add_auxiliary(&mut self, pos: NamePosition) {
        self.auxiliary.push(pos);
    }

    pub fn main(&self) -> NamePosition {
        self.main
    }

    /// All names, main first.
    pub fn iter(&self) -> impl Iterator<Item = NamePosition> + '_ {
        std::iter::once(self.main).chain(self.auxiliary.iter().copied())
    }
}

/// A single geographic object.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: GeoObjectId,
    pub kind: Kind,
    /// Normalized names of the object itself; for buildings the main name
    /// is the house number.
    pub names: MultipleNames,
    /// Ancestor ids, root (coarsest) first. The entry itself is excluded.
    pub ancestors: Vec<GeoObjectId>,
}

/// Immutable, id-indexed collection of entries plus the shared name
/// dictionary.
#[derive(Debug)]
pub struct Hierarchy {
    entries: Vec<Entry>,
    by_id: AHashMap<GeoObjectId, usize>,
    dict: NameDictionary,
}

impl Hierarchy {
    /// Builds the store, validating the id space.
    ///
    /// Fails when two entries share an id, an entry lists itself as an
    /// ancestor, or an ancestor id does not name a loaded entry. No partial
    /// construction is observable on failure.
    pub fn build(entries: Vec<Entry>, dict: NameDictionary) -> Result<Hierarchy, HierarchyError> {
        let mut by_id = AHashMap::with_capacity(entries.len());
        for (slot, entry) in entries.iter().enumerate() {
            if by_id.insert(entry.id, slot).is_some() {
                return Err(HierarchyError::DuplicateId(entry.id));
            }
        }
        for entry in &entries {
            for &ancestor in &entry.ancestors {
                if ancestor == entry.id {
                    return Err(HierarchyError::SelfAncestor(entry.id));
                }
                if !by_id.contains_key(&ancestor) {
                    return Err(HierarchyError::DanglingAncestor {
                        entry: entry.id,
                        ancestor,
                    });
                }
            }
        }
        Ok(Hierarchy {
            entries,
            by_id,
            dict,
        })
    }

    /// Unknown ids simply return `None`; lookups never fail at runtime.
    pub fn lookup(&self, id: GeoObjectId) -> Option<&Entry> {
        self.by_id.get(&id).map(|&slot| &self.entries[slot])
    }

    /// True iff `ancestor` appears in `descendant`'s address chain.
    pub fn is_parent_to(&self, ancestor: &Entry, descendant: &Entry) -> bool {
        descendant.ancestors.iter().any(|&id| id == ancestor.id)
    }

    pub fn name_dictionary(&self) -> &NameDictionary {
        &self.dict
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in load order; the slice index is the dense document id used
    /// by the token index.
    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn slot(&self, id: GeoObjectId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }
}

mod error {
    use thiserror::Error;

    use crate::types::GeoObjectId;

    /// Validation and decoding failures of the hierarchy input. All are
    /// fatal to construction.
    #[derive(Error, Debug)]
    pub enum HierarchyError {
        #[error("duplicate object id {0}")]
        DuplicateId(GeoObjectId),
        #[error("entry {entry} references unknown ancestor {ancestor}")]
        DanglingAncestor {
            entry: GeoObjectId,
            ancestor: GeoObjectId,
        },
        #[error("entry {0} lists itself as an ancestor")]
        SelfAncestor(GeoObjectId),
        #[error("unknown kind name {0:?}")]
        UnknownKind(String),
        #[error("malformed object id {0:?}")]
        BadObjectId(String),
        #[error("malformed hierarchy entry: {0}")]
        Json(#[from] serde_json::Error),
    }
}
