//! Partitioning of the heir list by relationship and, for the two-marriage
//! scenario, by the marriage each child was born from.

use crate::submission::models::{AhliWaris, Hubungan};

use super::kondisi::Kondisi;

const FIRST_MARRIAGE_MARKERS: [&str; 2] = ["Istri 1", "Suami 1"];
const SECOND_MARRIAGE_MARKERS: [&str; 2] = ["Istri 2", "Suami 2"];

/// Which marriage a tagged heir belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarriageTag {
    First,
    Second,
}

impl MarriageTag {
    /// Read the marriage marker out of an heir's free-text tag.
    ///
    /// Matching is a case-sensitive substring search; a tag carrying both
    /// markers counts as the first marriage.
    pub fn of(ahli: &AhliWaris) -> Option<Self> {
        let tag = ahli.keterangan.as_deref()?;
        if FIRST_MARRIAGE_MARKERS.iter().any(|m| tag.contains(m)) {
            Some(MarriageTag::First)
        } else if SECOND_MARRIAGE_MARKERS.iter().any(|m| tag.contains(m)) {
            Some(MarriageTag::Second)
        } else {
            None
        }
    }
}

/// Children split per marriage; untagged children are in neither list.
#[derive(Debug, Default)]
pub struct MarriageGroups<'a> {
    pub first_marriage_children: Vec<&'a AhliWaris>,
    pub second_marriage_children: Vec<&'a AhliWaris>,
}

/// Heirs grouped by relationship, each group in original list order.
#[derive(Debug, Default)]
pub struct HeirGroups<'a> {
    pub spouses: Vec<&'a AhliWaris>,
    pub children: Vec<&'a AhliWaris>,
    pub grandchildren: Vec<&'a AhliWaris>,
    pub siblings: Vec<&'a AhliWaris>,
    /// Parents and any unrecognized relationship code.
    pub others: Vec<&'a AhliWaris>,
    /// Only present for [`Kondisi::DuaPernikahan`].
    pub marriages: Option<MarriageGroups<'a>>,
}

impl<'a> HeirGroups<'a> {
    pub fn from_heirs(ahli_waris: &'a [AhliWaris], kondisi: Kondisi) -> Self {
        let mut groups = HeirGroups::default();

        for ahli in ahli_waris {
            match ahli.hubungan {
                Hubungan::Suami | Hubungan::Istri => groups.spouses.push(ahli),
                Hubungan::Anak => groups.children.push(ahli),
                Hubungan::Cucu => groups.grandchildren.push(ahli),
                Hubungan::Saudara => groups.siblings.push(ahli),
                Hubungan::OrangTua | Hubungan::Lainnya(_) => groups.others.push(ahli),
            }
        }

        if kondisi == Kondisi::DuaPernikahan {
            let mut marriages = MarriageGroups::default();
            for child in &groups.children {
                match MarriageTag::of(child) {
                    Some(MarriageTag::First) => marriages.first_marriage_children.push(*child),
                    Some(MarriageTag::Second) => marriages.second_marriage_children.push(*child),
                    None => {}
                }
            }
            groups.marriages = Some(marriages);
        }

        groups
    }

    /// Heirs who sign the declaration, in original list order.
    ///
    /// Grandchildren do not sign. Parents do, since they are the only heirs
    /// when the decedent left no spouse, children or siblings.
    pub fn signatories(ahli_waris: &'a [AhliWaris]) -> Vec<&'a AhliWaris> {
        ahli_waris
            .iter()
            .filter(|a| !matches!(a.hubungan, Hubungan::Cucu))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.spouses.len()
            + self.children.len()
            + self.grandchildren.len()
            + self.siblings.len()
            + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spouse of the given marriage: a spouse heir carrying that marker.
    pub fn spouse_for(&self, tag: MarriageTag) -> Option<&'a AhliWaris> {
        self.spouses
            .iter()
            .copied()
            .find(|s| MarriageTag::of(s) == Some(tag))
    }
}
