//! Narrative composition of the Surat Pernyataan Ahli Waris.
//!
//! [`compose`] turns the decedent, the checked scenario and the heir groups
//! into ordered clause blocks. It is pure: layout and PDF emission happen
//! later in [`super::layout`] and [`super::pdf`].

use chrono::NaiveDate;

use crate::submission::models::{AhliWaris, Hubungan, JenisKelamin, Pewaris, StatusPerkawinan};

use super::common::{format_indonesian_date, format_tanggal, or_placeholder, PLACEHOLDER};
use super::grouping::{HeirGroups, MarriageTag};
use super::kondisi::Kondisi;

pub const DOCUMENT_TITLE: &str = "SURAT PERNYATAAN AHLI WARIS";
pub const NO_DESCENDANTS_SENTENCE: &str =
    "Pewaris tidak meninggalkan keturunan maupun ahli waris lain yang sah.";
pub const STAMP_DUTY_MARKER: &str = "(Materai Rp10.000)";

const SIGNATURE_LEADER: &str = "..............................";
const CHILD_INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Header,
    Opening,
    MaritalHistory,
    Descendants,
    Notes,
    Affidavit,
    Signatures,
}

/// One titled block of the declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseBlock {
    pub kind: ClauseKind,
    pub title: String,
    pub lines: Vec<String>,
}

impl ClauseBlock {
    fn new(kind: ClauseKind, title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            lines,
        }
    }
}

/// Values printed on the document that do not come from the submission data.
#[derive(Debug, Clone)]
pub struct SuratContext {
    pub nomor_surat: String,
    /// Place printed on the closing date line, e.g. "Jakarta".
    pub tempat_surat: String,
    pub kelurahan: String,
    pub tanggal_surat: NaiveDate,
}

fn honorific(jk: JenisKelamin) -> &'static str {
    match jk {
        JenisKelamin::LakiLaki => "Almarhum",
        JenisKelamin::Perempuan => "Almarhumah",
    }
}

fn bin_binti(jk: JenisKelamin) -> &'static str {
    match jk {
        JenisKelamin::LakiLaki => "bin",
        JenisKelamin::Perempuan => "binti",
    }
}

fn full_name(nama: &str, nama_orang_tua: &str, jk: JenisKelamin) -> String {
    let nama = or_placeholder(nama);
    if nama_orang_tua.trim().is_empty() {
        nama.to_string()
    } else {
        format!("{} {} {}", nama, bin_binti(jk), nama_orang_tua.trim())
    }
}

fn roman(n: usize) -> &'static str {
    match n {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        _ => "VI",
    }
}

/// Spreadsheet-style labels: a..z, then aa, ab, ...
fn letter(i: usize) -> String {
    let mut n = i + 1;
    let mut label = Vec::new();
    while n > 0 {
        n -= 1;
        label.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    label.iter().rev().map(|&b| b as char).collect()
}

/// Build the ordered clause blocks for a declaration.
pub fn compose(
    pewaris: &Pewaris,
    kondisi: Kondisi,
    groups: &HeirGroups<'_>,
    signatories: &[&AhliWaris],
    catatan: &str,
    context: &SuratContext,
) -> Vec<ClauseBlock> {
    let mut blocks = vec![
        header_clause(context),
        opening_clause(pewaris, 1),
        marital_history_clause(pewaris, kondisi, groups, 2),
        descendants_clause(kondisi, groups, 3),
    ];

    if !catatan.trim().is_empty() {
        blocks.push(notes_clause(catatan, 4));
    }

    blocks.push(affidavit_clause(context));
    blocks.push(signature_clause(signatories, context));
    blocks
}

fn header_clause(context: &SuratContext) -> ClauseBlock {
    ClauseBlock::new(
        ClauseKind::Header,
        DOCUMENT_TITLE,
        vec![format!("Nomor: {}", or_placeholder(&context.nomor_surat))],
    )
}

fn opening_clause(pewaris: &Pewaris, section: usize) -> ClauseBlock {
    let lines = vec![
        "Yang bertanda tangan di bawah ini menyatakan dengan sebenarnya bahwa:".to_string(),
        format!(
            "Nama: {} {}",
            honorific(pewaris.jenis_kelamin),
            full_name(&pewaris.nama, &pewaris.nama_orang_tua, pewaris.jenis_kelamin)
        ),
        format!(
            "Tempat/Tanggal Lahir: {}, {}",
            or_placeholder(&pewaris.tempat_lahir),
            format_indonesian_date(&pewaris.tanggal_lahir)
        ),
        format!(
            "Meninggal Dunia: {}, {}",
            or_placeholder(&pewaris.tempat_meninggal),
            format_indonesian_date(&pewaris.tanggal_meninggal)
        ),
        format!(
            "Akta Kematian Nomor: {}",
            or_placeholder(&pewaris.nomor_akta_kematian)
        ),
        format!("Alamat Terakhir: {}", or_placeholder(&pewaris.alamat)),
    ];

    ClauseBlock::new(
        ClauseKind::Opening,
        format!("{}. IDENTITAS PEWARIS", roman(section)),
        lines,
    )
}

fn marital_history_clause(
    pewaris: &Pewaris,
    kondisi: Kondisi,
    groups: &HeirGroups<'_>,
    section: usize,
) -> ClauseBlock {
    let subject = format!(
        "{} {}",
        honorific(pewaris.jenis_kelamin),
        or_placeholder(&pewaris.nama)
    );

    let lines = match groups.marriages.as_ref() {
        Some(marriages) if kondisi == Kondisi::DuaPernikahan => {
            // Untagged spouses fill whichever marriage is still unnamed, in
            // list order.
            let mut untagged = groups
                .spouses
                .iter()
                .copied()
                .filter(|s| MarriageTag::of(s).is_none());
            let first_spouse = groups
                .spouse_for(MarriageTag::First)
                .map(|s| s.nama.clone())
                .or_else(|| {
                    pewaris
                        .pernikahan_sebelumnya
                        .as_ref()
                        .map(|p| p.nama_pasangan.trim())
                        .filter(|nama| !nama.is_empty())
                        .map(str::to_string)
                })
                .or_else(|| untagged.next().map(|s| s.nama.clone()))
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            let second_spouse = groups
                .spouse_for(MarriageTag::Second)
                .or_else(|| untagged.next())
                .map(|s| s.nama.clone())
                .unwrap_or_else(|| PLACEHOLDER.to_string());

            let akta = pewaris
                .pernikahan_sebelumnya
                .as_ref()
                .filter(|p| !p.nomor_akta_nikah.trim().is_empty())
                .map(|p| {
                    format!(
                        " berdasarkan Akta Nikah Nomor {} tanggal {} yang diterbitkan oleh {}",
                        p.nomor_akta_nikah.trim(),
                        format_indonesian_date(&p.tanggal_nikah),
                        or_placeholder(&p.kantor_penerbit)
                    )
                })
                .unwrap_or_default();

            let mut lines = vec![format!(
                "Semasa hidupnya {} menikah sebanyak dua kali, yaitu:",
                subject
            )];
            lines.push(format!(
                "1. Pernikahan pertama dengan {}{}, dikaruniai anak:",
                or_placeholder(&first_spouse),
                akta
            ));
            lines.extend(lettered_children(&marriages.first_marriage_children));
            lines.push(format!(
                "2. Pernikahan kedua dengan {}, dikaruniai anak:",
                or_placeholder(&second_spouse)
            ));
            lines.extend(lettered_children(&marriages.second_marriage_children));
            lines
        }
        _ if !groups.spouses.is_empty() => groups
            .spouses
            .iter()
            .map(|spouse| {
                let suffix = if spouse.masih_hidup {
                    ""
                } else {
                    ", yang telah meninggal dunia"
                };
                format!(
                    "Semasa hidupnya {} menikah dengan {} ({}){}.",
                    subject,
                    or_placeholder(&spouse.nama),
                    spouse.hubungan.label(),
                    suffix
                )
            })
            .collect(),
        _ => vec![unmarried_sentence(pewaris, &subject)],
    };

    ClauseBlock::new(
        ClauseKind::MaritalHistory,
        format!("{}. RIWAYAT PERKAWINAN", roman(section)),
        lines,
    )
}

fn lettered_children(children: &[&AhliWaris]) -> Vec<String> {
    if children.is_empty() {
        return vec![format!("{}{}", CHILD_INDENT, PLACEHOLDER)];
    }
    children
        .iter()
        .enumerate()
        .map(|(i, child)| format!("{}{}. {}", CHILD_INDENT, letter(i), or_placeholder(&child.nama)))
        .collect()
}

fn unmarried_sentence(pewaris: &Pewaris, subject: &str) -> String {
    match pewaris.status_perkawinan {
        StatusPerkawinan::BelumKawin => {
            format!("Semasa hidupnya {} belum pernah menikah.", subject)
        }
        StatusPerkawinan::CeraiHidup => {
            format!("Semasa hidupnya {} telah bercerai dengan pasangannya.", subject)
        }
        StatusPerkawinan::Kawin | StatusPerkawinan::CeraiMati => {
            match pewaris.pernikahan_sebelumnya.as_ref() {
                Some(p) if !p.nama_pasangan.trim().is_empty() => format!(
                    "Semasa hidupnya {} menikah dengan {} yang telah meninggal dunia lebih dahulu.",
                    subject,
                    p.nama_pasangan.trim()
                ),
                _ => format!(
                    "Semasa hidupnya {} menikah dan pasangannya telah meninggal dunia lebih dahulu.",
                    subject
                ),
            }
        }
    }
}

fn heir_row(number: usize, ahli: &AhliWaris, note: Option<&str>) -> String {
    let mut row = format!(
        "{}. {}, {}, lahir di {}, {}, NIK {}, pekerjaan {}",
        number,
        full_name(&ahli.nama, &ahli.nama_orang_tua, ahli.jenis_kelamin),
        ahli.hubungan.label(),
        or_placeholder(&ahli.tempat_lahir),
        format_indonesian_date(&ahli.tanggal_lahir),
        or_placeholder(&ahli.nik),
        or_placeholder(&ahli.pekerjaan),
    );
    if let Some(note) = note {
        row.push_str(&format!(" ({})", note));
    }
    row
}

fn living<'a>(list: &[&'a AhliWaris]) -> Vec<&'a AhliWaris> {
    list.iter().copied().filter(|a| a.masih_hidup).collect()
}

fn descendants_clause(kondisi: Kondisi, groups: &HeirGroups<'_>, section: usize) -> ClauseBlock {
    let title = format!("{}. AHLI WARIS", roman(section));

    if kondisi == Kondisi::TanpaKeturunan {
        return ClauseBlock::new(
            ClauseKind::Descendants,
            title,
            vec![NO_DESCENDANTS_SENTENCE.to_string()],
        );
    }

    let mut rows: Vec<(&AhliWaris, Option<&str>)> = Vec::new();
    match kondisi {
        Kondisi::PasanganDanAnak | Kondisi::AnakSaja | Kondisi::DuaPernikahan => {
            rows.extend(living(&groups.children).into_iter().map(|a| (a, None)));
        }
        Kondisi::AhliWarisPengganti => {
            rows.extend(living(&groups.children).into_iter().map(|a| (a, None)));
            rows.extend(
                living(&groups.grandchildren)
                    .into_iter()
                    .map(|a| (a, Some("ahli waris pengganti"))),
            );
        }
        Kondisi::SaudaraKandung => {
            rows.extend(living(&groups.siblings).into_iter().map(|a| (a, None)));
        }
        Kondisi::OrangTua => {
            rows.extend(
                living(&groups.others)
                    .into_iter()
                    .filter(|a| a.hubungan == Hubungan::OrangTua)
                    .map(|a| (a, None)),
            );
        }
        Kondisi::TanpaKeturunan => {}
    }

    let mut lines = vec!["Adapun ahli waris yang ditinggalkan adalah sebagai berikut:".to_string()];
    if rows.is_empty() {
        lines.push(PLACEHOLDER.to_string());
    } else {
        lines.extend(
            rows.iter()
                .enumerate()
                .map(|(i, (ahli, note))| heir_row(i + 1, ahli, *note)),
        );
    }

    ClauseBlock::new(ClauseKind::Descendants, title, lines)
}

fn notes_clause(catatan: &str, section: usize) -> ClauseBlock {
    let lines = catatan
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    ClauseBlock::new(
        ClauseKind::Notes,
        format!("{}. KETERANGAN TAMBAHAN", roman(section)),
        lines,
    )
}

fn affidavit_clause(context: &SuratContext) -> ClauseBlock {
    ClauseBlock::new(
        ClauseKind::Affidavit,
        "PERNYATAAN",
        vec![
            concat!(
                "Demikian surat pernyataan ini kami buat dengan sebenar-benarnya tanpa paksaan ",
                "dari pihak mana pun. Apabila di kemudian hari pernyataan ini terbukti tidak benar, ",
                "kami bersedia dituntut sesuai dengan ketentuan hukum yang berlaku."
            )
            .to_string(),
            format!(
                "{}, {}",
                or_placeholder(&context.tempat_surat),
                format_tanggal(context.tanggal_surat)
            ),
        ],
    )
}

fn signature_clause(signatories: &[&AhliWaris], context: &SuratContext) -> ClauseBlock {
    let mut lines: Vec<String> = if signatories.is_empty() {
        vec![PLACEHOLDER.to_string()]
    } else {
        signatories
            .iter()
            .enumerate()
            .map(|(i, ahli)| {
                let mut line = format!(
                    "{}. {} ({}) {}",
                    i + 1,
                    or_placeholder(&ahli.nama),
                    ahli.hubungan.label(),
                    SIGNATURE_LEADER
                );
                if i == 0 {
                    line.push(' ');
                    line.push_str(STAMP_DUTY_MARKER);
                }
                line
            })
            .collect()
    };

    lines.push(format!(
        "Mengetahui, Lurah {} {}",
        or_placeholder(&context.kelurahan),
        SIGNATURE_LEADER
    ));

    ClauseBlock::new(ClauseKind::Signatures, "YANG MENYATAKAN", lines)
}
