//! Inheritance scenarios ("kondisi") and the gate that checks a submitter's
//! chosen scenario against the heir list.
//!
//! The scenario is never inferred. The submitter picks one of seven codes and
//! [`classify`] only rejects combinations that cannot be right.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::submission::models::{AhliWaris, Hubungan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Kondisi {
    /// Spouse and children survive the decedent.
    PasanganDanAnak,
    /// Spouse predeceased; only children survive.
    AnakSaja,
    /// A child predeceased; grandchildren inherit in that child's place.
    AhliWarisPengganti,
    /// Decedent married twice; children are grouped per marriage.
    DuaPernikahan,
    /// No descendants; siblings inherit.
    SaudaraKandung,
    /// No descendants and no heirs to enumerate.
    TanpaKeturunan,
    /// No descendants; parents (and possibly a spouse) inherit.
    OrangTua,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidScenarioError {
    #[error("kode kondisi {0} tidak dikenal (harus 1 sampai 7)")]
    UnknownCode(u8),
    #[error("kondisi {0} memerlukan minimal satu ahli waris")]
    MissingHeirs(u8),
    #[error("kondisi 6 (tanpa keturunan) tidak boleh memiliki daftar ahli waris, ditemukan {0}")]
    UnexpectedHeirs(usize),
    #[error("kondisi {code} memerlukan ahli waris dengan hubungan {role}")]
    MissingRole { code: u8, role: &'static str },
}

impl Kondisi {
    pub const ALL: [Kondisi; 7] = [
        Kondisi::PasanganDanAnak,
        Kondisi::AnakSaja,
        Kondisi::AhliWarisPengganti,
        Kondisi::DuaPernikahan,
        Kondisi::SaudaraKandung,
        Kondisi::TanpaKeturunan,
        Kondisi::OrangTua,
    ];

    pub fn code(&self) -> u8 {
        match self {
            Kondisi::PasanganDanAnak => 1,
            Kondisi::AnakSaja => 2,
            Kondisi::AhliWarisPengganti => 3,
            Kondisi::DuaPernikahan => 4,
            Kondisi::SaudaraKandung => 5,
            Kondisi::TanpaKeturunan => 6,
            Kondisi::OrangTua => 7,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, InvalidScenarioError> {
        Kondisi::ALL
            .into_iter()
            .find(|k| k.code() == code)
            .ok_or(InvalidScenarioError::UnknownCode(code))
    }

    /// Role an heir list must contain for this scenario, if any.
    fn required_role(&self) -> Option<&'static str> {
        match self {
            Kondisi::PasanganDanAnak => Some("SUAMI/ISTRI"),
            Kondisi::AnakSaja | Kondisi::DuaPernikahan => Some("ANAK"),
            Kondisi::AhliWarisPengganti => Some("CUCU"),
            Kondisi::SaudaraKandung => Some("SAUDARA"),
            Kondisi::TanpaKeturunan | Kondisi::OrangTua => None,
        }
    }

    fn fills_required_role(&self, hubungan: &Hubungan) -> bool {
        match self {
            Kondisi::PasanganDanAnak => hubungan.is_spouse(),
            Kondisi::AnakSaja | Kondisi::DuaPernikahan => *hubungan == Hubungan::Anak,
            Kondisi::AhliWarisPengganti => *hubungan == Hubungan::Cucu,
            Kondisi::SaudaraKandung => *hubungan == Hubungan::Saudara,
            Kondisi::TanpaKeturunan | Kondisi::OrangTua => true,
        }
    }
}

impl TryFrom<u8> for Kondisi {
    type Error = InvalidScenarioError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Kondisi::from_code(code)
    }
}

impl From<Kondisi> for u8 {
    fn from(kondisi: Kondisi) -> Self {
        kondisi.code()
    }
}

impl std::fmt::Display for Kondisi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "kondisi {}", self.code())
    }
}

/// Check the submitter's scenario code against the heir list.
pub fn classify(code: u8, ahli_waris: &[AhliWaris]) -> Result<Kondisi, InvalidScenarioError> {
    let kondisi = Kondisi::from_code(code)?;

    if kondisi == Kondisi::TanpaKeturunan {
        if !ahli_waris.is_empty() {
            return Err(InvalidScenarioError::UnexpectedHeirs(ahli_waris.len()));
        }
        return Ok(kondisi);
    }

    if ahli_waris.is_empty() {
        return Err(InvalidScenarioError::MissingHeirs(code));
    }

    if let Some(role) = kondisi.required_role() {
        if !ahli_waris.iter().any(|a| kondisi.fills_required_role(&a.hubungan)) {
            return Err(InvalidScenarioError::MissingRole { code, role });
        }
    }

    Ok(kondisi)
}
