//! Core identifier and classification types shared by the whole crate.

use std::fmt;

/// Geographic object kinds, ordered coarse to fine.
///
/// The ordinal order drives the layered search: each recursion level tries to
/// assign a contiguous range of query tokens to the next finer kind. `Count`
/// is the one-past-the-end sentinel and doubles as the "unassigned" marker
/// for query tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Country,
    Region,
    Subregion,
    Locality,
    Suburb,
    Sublocality,
    Street,
    Building,
    Count,
}

impl Kind {
    /// The next finer kind; `Building` advances to the `Count` sentinel.
    pub fn next(self) -> Kind {
        match self {
            Kind::Country => Kind::Region,
            Kind::Region => Kind::Subregion,
            Kind::Subregion => Kind::Locality,
            Kind::Locality => Kind::Suburb,
            Kind::Suburb => Kind::Sublocality,
            Kind::Sublocality => Kind::Street,
            Kind::Street => Kind::Building,
            Kind::Building | Kind::Count => Kind::Count,
        }
    }

    /// Contribution of one token of this kind to a candidate's certainty.
    pub(crate) fn weight(self) -> f64 {
        match self {
            Kind::Country => 10.0,
            Kind::Region => 5.0,
            Kind::Subregion => 4.0,
            Kind::Locality => 3.0,
            Kind::Suburb => 3.0,
            Kind::Sublocality => 2.0,
            Kind::Street => 1.0,
            Kind::Building => 0.1,
            Kind::Count => 0.0,
        }
    }

    /// Parses the lowercase kind name used by the hierarchy input.
    pub fn from_name(name: &str) -> Option<Kind> {
        match name {
            "country" => Some(Kind::Country),
            "region" => Some(Kind::Region),
            "subregion" => Some(Kind::Subregion),
            "locality" => Some(Kind::Locality),
            "suburb" => Some(Kind::Suburb),
            "sublocality" => Some(Kind::Sublocality),
            "street" => Some(Kind::Street),
            "building" => Some(Kind::Building),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Country => "country",
            Kind::Region => "region",
            Kind::Subregion => "subregion",
            Kind::Locality => "locality",
            Kind::Suburb => "suburb",
            Kind::Sublocality => "sublocality",
            Kind::Street => "street",
            Kind::Building => "building",
            Kind::Count => "count",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const SERIAL_BITS: u32 = 56;
const SERIAL_MASK: u64 = (1 << SERIAL_BITS) - 1;

/// Provenance tag packed into the top bits of a [`GeoObjectId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Source {
    OsmNode = 1,
    OsmWay = 2,
    OsmRelation = 3,
}

/// Opaque identifier of a geographic object.
///
/// Packs a [`Source`] tag into the top byte and a numeric serial into the
/// low 56 bits. Only equality, ordering and hashing are meaningful to the
/// search core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeoObjectId(u64);

impl GeoObjectId {
    pub const fn new(source: Source, serial: u64) -> GeoObjectId {
        GeoObjectId(((source as u64) << SERIAL_BITS) | (serial & SERIAL_MASK))
    }

    pub const fn osm_node(serial: u64) -> GeoObjectId {
        GeoObjectId::new(Source::OsmNode, serial)
    }

    pub const fn osm_way(serial: u64) -> GeoObjectId {
        GeoObjectId::new(Source::OsmWay, serial)
    }

    pub const fn osm_relation(serial: u64) -> GeoObjectId {
        GeoObjectId::new(Source::OsmRelation, serial)
    }

    pub const fn encoded(self) -> u64 {
        self.0
    }

    pub fn source(self) -> Option<Source> {
        match (self.0 >> SERIAL_BITS) as u8 {
            1 => Some(Source::OsmNode),
            2 => Some(Source::OsmWay),
            3 => Some(Source::OsmRelation),
            _ => None,
        }
    }

    pub const fn serial(self) -> u64 {
        self.0 & SERIAL_MASK
    }

    /// Parses the textual form used by the hierarchy input, e.g.
    /// `"node:123"`, `"way:7"`, `"relation:42"`.
    pub fn parse(s: &str) -> Option<GeoObjectId> {
        let (source, serial) = s.split_once(':')?;
        let serial = serial.parse::<u64>().ok()?;
        if serial > SERIAL_MASK {
            return None;
        }
        match source {
            "node" => Some(GeoObjectId::osm_node(serial)),
            "way" => Some(GeoObjectId::osm_way(serial)),
            "relation" => Some(GeoObjectId::osm_relation(serial)),
            _ => None,
        }
    }
}

impl fmt::Display for GeoObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source() {
            Some(Source::OsmNode) => write!(f, "node:{}", self.serial()),
            Some(Source::OsmWay) => write!(f, "way:{}", self.serial()),
            Some(Source::OsmRelation) => write!(f, "relation:{}", self.serial()),
            None => write!(f, "obj:{}", self.0),
        }
    }
}
