use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::surat::kondisi::Kondisi;
use crate::surat::traits::Validator;
use crate::surat::validation::{
    validate_date, validate_date_order, validate_nik_optional, validate_required,
    ValidationErrors,
};

/// Jenis kelamin, stored as the single-letter KTP code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum JenisKelamin {
    #[serde(rename = "L", alias = "Laki-laki", alias = "LAKI_LAKI")]
    LakiLaki,
    #[serde(rename = "P", alias = "Perempuan", alias = "PEREMPUAN")]
    Perempuan,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusPerkawinan {
    BelumKawin,
    Kawin,
    CeraiHidup,
    CeraiMati,
}

/// Relationship of an heir to the decedent.
///
/// Codes are matched case-sensitively; anything else is kept verbatim in
/// [`Hubungan::Lainnya`] so the heir still appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Hubungan {
    Suami,
    Istri,
    Anak,
    Cucu,
    Saudara,
    OrangTua,
    Lainnya(String),
}

impl Hubungan {
    pub fn code(&self) -> &str {
        match self {
            Hubungan::Suami => "SUAMI",
            Hubungan::Istri => "ISTRI",
            Hubungan::Anak => "ANAK",
            Hubungan::Cucu => "CUCU",
            Hubungan::Saudara => "SAUDARA",
            Hubungan::OrangTua => "ORANG_TUA",
            Hubungan::Lainnya(code) => code,
        }
    }

    /// Label used in the narrative, e.g. "Anak Kandung".
    pub fn label(&self) -> &str {
        match self {
            Hubungan::Suami => "Suami",
            Hubungan::Istri => "Istri",
            Hubungan::Anak => "Anak Kandung",
            Hubungan::Cucu => "Cucu",
            Hubungan::Saudara => "Saudara Kandung",
            Hubungan::OrangTua => "Orang Tua",
            Hubungan::Lainnya(code) => code,
        }
    }

    pub fn is_spouse(&self) -> bool {
        matches!(self, Hubungan::Suami | Hubungan::Istri)
    }
}

impl From<String> for Hubungan {
    fn from(code: String) -> Self {
        match code.as_str() {
            "SUAMI" => Hubungan::Suami,
            "ISTRI" => Hubungan::Istri,
            "ANAK" => Hubungan::Anak,
            "CUCU" => Hubungan::Cucu,
            "SAUDARA" => Hubungan::Saudara,
            "ORANG_TUA" => Hubungan::OrangTua,
            _ => Hubungan::Lainnya(code),
        }
    }
}

impl From<Hubungan> for String {
    fn from(hubungan: Hubungan) -> Self {
        hubungan.code().to_string()
    }
}

/// Details of the decedent's earlier marriage (two-marriage case).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, ToSchema)]
pub struct PernikahanSebelumnya {
    #[schema(example = "Sri Wahyuni")]
    pub nama_pasangan: String,
    #[serde(default)]
    pub nomor_akta_nikah: String,
    #[serde(default)]
    #[schema(example = "1980-03-12")]
    pub tanggal_nikah: String,
    #[serde(default)]
    #[schema(example = "KUA Cakung")]
    pub kantor_penerbit: String,
}

/// Pewaris: the deceased whose estate is being declared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Pewaris {
    #[schema(example = "Budi Santoso")]
    pub nama: String,
    #[serde(default)]
    pub nama_orang_tua: String,
    #[serde(default)]
    pub tempat_lahir: String,
    #[schema(example = "1950-04-02")]
    pub tanggal_lahir: String,
    #[serde(default)]
    pub tempat_meninggal: String,
    #[schema(example = "2024-11-20")]
    pub tanggal_meninggal: String,
    pub nomor_akta_kematian: String,
    pub alamat: String,
    pub jenis_kelamin: JenisKelamin,
    pub status_perkawinan: StatusPerkawinan,
    #[serde(default)]
    pub pernikahan_sebelumnya: Option<PernikahanSebelumnya>,
}

/// Ahli waris: one heir of the decedent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AhliWaris {
    #[schema(example = "Siti Aminah")]
    pub nama: String,
    #[serde(default)]
    pub nama_orang_tua: String,
    #[serde(default)]
    pub tempat_lahir: String,
    #[serde(default)]
    pub tanggal_lahir: String,
    #[serde(default)]
    #[schema(example = "3175011708950001")]
    pub nik: String,
    #[serde(default)]
    pub pekerjaan: String,
    #[serde(default)]
    pub agama: String,
    #[serde(default)]
    pub alamat: String,
    pub jenis_kelamin: JenisKelamin,
    #[schema(value_type = String, example = "ANAK")]
    pub hubungan: Hubungan,
    #[serde(default = "default_true")]
    pub masih_hidup: bool,
    #[serde(default)]
    pub memiliki_keturunan: bool,
    /// Free-text marriage tag, e.g. "Anak dari Istri 1".
    #[serde(default)]
    pub keterangan: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Verified,
    Approved,
    Rejected,
    Archived,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "DRAFT",
            SubmissionStatus::Submitted => "SUBMITTED",
            SubmissionStatus::Verified => "VERIFIED",
            SubmissionStatus::Approved => "APPROVED",
            SubmissionStatus::Rejected => "REJECTED",
            SubmissionStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(SubmissionStatus::Draft),
            "SUBMITTED" => Some(SubmissionStatus::Submitted),
            "VERIFIED" => Some(SubmissionStatus::Verified),
            "APPROVED" => Some(SubmissionStatus::Approved),
            "REJECTED" => Some(SubmissionStatus::Rejected),
            "ARCHIVED" => Some(SubmissionStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The citizen who filed the submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SubmissionOwner {
    pub user_id: String,
    pub nama: String,
    pub email: String,
}

/// Reference to the generated PDF.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DocumentReference {
    pub url: String,
    pub filename: String,
    pub generated_at: DateTime<Utc>,
    pub download_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Submission {
    pub id: Uuid,
    #[schema(example = "SP-20250817-AB12CD")]
    pub nomor_surat: String,
    pub owner: SubmissionOwner,
    pub pewaris: Pewaris,
    pub ahli_waris: Vec<AhliWaris>,
    #[schema(value_type = u8, example = 1)]
    pub kondisi: Kondisi,
    pub catatan: String,
    pub status: SubmissionStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub dokumen: Option<DocumentReference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Created,
    Submitted,
    Verified,
    Approved,
    Rejected,
    Archived,
    Downloaded,
    EmailSent,
    EmailFailed,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Created => "CREATED",
            LogAction::Submitted => "SUBMITTED",
            LogAction::Verified => "VERIFIED",
            LogAction::Approved => "APPROVED",
            LogAction::Rejected => "REJECTED",
            LogAction::Archived => "ARCHIVED",
            LogAction::Downloaded => "DOWNLOADED",
            LogAction::EmailSent => "EMAIL_SENT",
            LogAction::EmailFailed => "EMAIL_FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CREATED" => Some(LogAction::Created),
            "SUBMITTED" => Some(LogAction::Submitted),
            "VERIFIED" => Some(LogAction::Verified),
            "APPROVED" => Some(LogAction::Approved),
            "REJECTED" => Some(LogAction::Rejected),
            "ARCHIVED" => Some(LogAction::Archived),
            "DOWNLOADED" => Some(LogAction::Downloaded),
            "EMAIL_SENT" => Some(LogAction::EmailSent),
            "EMAIL_FAILED" => Some(LogAction::EmailFailed),
            _ => None,
        }
    }
}

/// Append-only audit entry kept alongside a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DocumentLog {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub action: LogAction,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub detail: String,
}

impl DocumentLog {
    pub fn new(
        submission_id: Uuid,
        action: LogAction,
        actor: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            submission_id,
            action,
            actor: actor.into(),
            timestamp: Utc::now(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSubmissionRequest {
    pub pewaris: Pewaris,
    #[serde(default)]
    pub ahli_waris: Vec<AhliWaris>,
    #[schema(example = 1)]
    pub kondisi: u8,
    #[serde(default)]
    pub catatan: Option<String>,
    /// Keep the submission as a draft instead of submitting it right away.
    #[serde(default)]
    pub draft: bool,
}

impl Validator for CreateSubmissionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let p = &self.pewaris;

        validate_required(&p.nama, "pewaris.nama", "Nama Pewaris", &mut errors);
        validate_date(&p.tanggal_lahir, "pewaris.tanggal_lahir", &mut errors);
        validate_date(&p.tanggal_meninggal, "pewaris.tanggal_meninggal", &mut errors);
        validate_date_order(
            &p.tanggal_lahir,
            &p.tanggal_meninggal,
            "pewaris.tanggal_meninggal",
            &mut errors,
        );
        validate_required(
            &p.nomor_akta_kematian,
            "pewaris.nomor_akta_kematian",
            "Nomor Akta Kematian",
            &mut errors,
        );
        validate_required(&p.alamat, "pewaris.alamat", "Alamat Pewaris", &mut errors);

        if let Some(ref nikah) = p.pernikahan_sebelumnya {
            validate_required(
                &nikah.nama_pasangan,
                "pewaris.pernikahan_sebelumnya.nama_pasangan",
                "Nama Pasangan Pernikahan Sebelumnya",
                &mut errors,
            );
        }

        for (i, ahli) in self.ahli_waris.iter().enumerate() {
            validate_required(
                &ahli.nama,
                &format!("ahli_waris[{i}].nama"),
                "Nama Ahli Waris",
                &mut errors,
            );
            validate_nik_optional(&ahli.nik, &format!("ahli_waris[{i}].nik"), &mut errors);
            if !ahli.tanggal_lahir.trim().is_empty() {
                validate_date(
                    &ahli.tanggal_lahir,
                    &format!("ahli_waris[{i}].tanggal_lahir"),
                    &mut errors,
                );
            }
            if ahli.hubungan.code().trim().is_empty() {
                errors.add(crate::surat::validation::ValidationError::empty_field(
                    &format!("ahli_waris[{i}].hubungan"),
                    "Hubungan Keluarga",
                ));
            }
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReviewRequest {
    #[serde(default)]
    pub catatan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectRequest {
    #[schema(example = "Akta kematian tidak terbaca")]
    pub alasan: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    pub status: Option<SubmissionStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionPage {
    pub items: Vec<Submission>,
    pub page: u32,
    pub limit: u32,
}
