//! Harvard-Oxford label ids of the regions sampled by the pipeline.

use crate::enums::{AtlasKind, Side, Structure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    CaudateLeft,
    CaudateRight,
    PutamenLeft,
    PutamenRight,
    Occipital,
}

impl Region {
    /// Striatal regions in reporting order
    pub const STRIATAL: [Region; 4] = [
        Region::CaudateLeft,
        Region::CaudateRight,
        Region::PutamenLeft,
        Region::PutamenRight,
    ];

    pub const ALL: [Region; 5] = [
        Region::CaudateLeft,
        Region::CaudateRight,
        Region::PutamenLeft,
        Region::PutamenRight,
        Region::Occipital,
    ];

    pub fn striatal(structure: Structure, side: Side) -> Region {
        match (structure, side) {
            (Structure::Caudate, Side::Left) => Region::CaudateLeft,
            (Structure::Caudate, Side::Right) => Region::CaudateRight,
            (Structure::Putamen, Side::Left) => Region::PutamenLeft,
            (Structure::Putamen, Side::Right) => Region::PutamenRight,
        }
    }

    pub fn label(self) -> i32 {
        match self {
            Region::CaudateLeft => 1,
            Region::CaudateRight => 2,
            Region::PutamenLeft => 3,
            Region::PutamenRight => 4,
            Region::Occipital => 41,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::CaudateLeft => "Caudate_L",
            Region::CaudateRight => "Caudate_R",
            Region::PutamenLeft => "Putamen_L",
            Region::PutamenRight => "Putamen_R",
            Region::Occipital => "Occipital",
        }
    }

    pub fn atlas(self) -> AtlasKind {
        match self {
            Region::Occipital => AtlasKind::Cortical,
            _ => AtlasKind::Subcortical,
        }
    }

    pub fn structure(self) -> Option<Structure> {
        match self {
            Region::CaudateLeft | Region::CaudateRight => Some(Structure::Caudate),
            Region::PutamenLeft | Region::PutamenRight => Some(Structure::Putamen),
            Region::Occipital => None,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Region::CaudateLeft | Region::PutamenLeft => Some(Side::Left),
            Region::CaudateRight | Region::PutamenRight => Some(Side::Right),
            Region::Occipital => None,
        }
    }

    /// Position of a striatal region in [`Region::STRIATAL`]
    pub(crate) fn striatal_index(self) -> Option<usize> {
        Self::STRIATAL.iter().position(|&region| region == self)
    }
}
