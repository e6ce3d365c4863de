#![allow(dead_code)]

use async_trait::async_trait;
use sitalaris_server::auth::{Role, Session};
use sitalaris_server::db::InMemorySubmissionRepository;
use sitalaris_server::mail::{Attachment, DeliveryError, Mailer};
use sitalaris_server::storage::ObjectStorage;
use sitalaris_server::submission::models::{
    AhliWaris, CreateSubmissionRequest, Hubungan, JenisKelamin, Pewaris, StatusPerkawinan,
    Submission,
};
use sitalaris_server::submission::service::SharedGenerator;
use sitalaris_server::surat::{AhliWarisGenerator, GeneratedDocument, Generator, GeneratorError};
use sitalaris_server::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub fn warga() -> Session {
    Session {
        user_id: "warga-1".to_string(),
        name: "Siti Aminah".to_string(),
        email: "siti@example.com".to_string(),
        role: Role::Warga,
    }
}

pub fn other_warga() -> Session {
    Session {
        user_id: "warga-2".to_string(),
        name: "Joko".to_string(),
        email: "joko@example.com".to_string(),
        role: Role::Warga,
    }
}

pub fn admin() -> Session {
    Session {
        user_id: "admin-1".to_string(),
        name: "Petugas Kelurahan".to_string(),
        email: "petugas@example.go.id".to_string(),
        role: Role::Admin,
    }
}

pub fn pewaris(nama: &str) -> Pewaris {
    Pewaris {
        nama: nama.to_string(),
        nama_orang_tua: "Ahmad".to_string(),
        tempat_lahir: "Jakarta".to_string(),
        tanggal_lahir: "1950-04-02".to_string(),
        tempat_meninggal: "Jakarta".to_string(),
        tanggal_meninggal: "2024-11-20".to_string(),
        nomor_akta_kematian: "3175-KM-2024-0001".to_string(),
        alamat: "Jl. Cakung Barat No. 1".to_string(),
        jenis_kelamin: JenisKelamin::LakiLaki,
        status_perkawinan: StatusPerkawinan::Kawin,
        pernikahan_sebelumnya: None,
    }
}

pub fn heir(nama: &str, hubungan: &str) -> AhliWaris {
    AhliWaris {
        nama: nama.to_string(),
        nama_orang_tua: String::new(),
        tempat_lahir: "Jakarta".to_string(),
        tanggal_lahir: "1995-08-17".to_string(),
        nik: "3175011708950001".to_string(),
        pekerjaan: "Karyawan Swasta".to_string(),
        agama: "Islam".to_string(),
        alamat: "Jl. Cakung Barat No. 1".to_string(),
        jenis_kelamin: JenisKelamin::Perempuan,
        hubungan: Hubungan::from(hubungan.to_string()),
        masih_hidup: true,
        memiliki_keturunan: false,
        keterangan: None,
    }
}

pub fn tagged(nama: &str, hubungan: &str, keterangan: &str) -> AhliWaris {
    AhliWaris {
        keterangan: Some(keterangan.to_string()),
        ..heir(nama, hubungan)
    }
}

/// Condition 1: Budi leaves his wife Siti and two children.
pub fn budi_request() -> CreateSubmissionRequest {
    CreateSubmissionRequest {
        pewaris: pewaris("Budi"),
        ahli_waris: vec![
            heir("Siti", "ISTRI"),
            heir("Ani", "ANAK"),
            heir("Budi Jr", "ANAK"),
        ],
        kondisi: 1,
        catatan: None,
        draft: false,
    }
}

/// Storage that keeps files in memory and can be told to fail.
pub struct MockObjectStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    upload_count: AtomicUsize,
    should_fail: bool,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            upload_count: AtomicUsize::new(0),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.upload_count.load(Ordering::SeqCst)
    }

    pub async fn has_file(&self, filename: &str) -> bool {
        self.files.lock().await.contains_key(filename)
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock upload failure".to_string());
        }
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .await
            .insert(filename.to_string(), file_data.to_vec());
        Ok(format!("https://storage.test/{}", filename))
    }

    async fn download_file(&self, filename: &str) -> Result<Vec<u8>, String> {
        self.files
            .lock()
            .await
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", filename))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SentEmail {
    Approval { to: String, attachment: String },
    Rejection { to: String, alasan: String },
}

/// Mailer that records what it was asked to send, optionally failing.
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentEmail>>,
    should_fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_approval_email(
        &self,
        to: &str,
        _nama: &str,
        _nomor_surat: &str,
        attachment: &Attachment,
    ) -> Result<(), DeliveryError> {
        if self.should_fail {
            return Err(DeliveryError::Transport("smtp down".to_string()));
        }
        self.sent.lock().await.push(SentEmail::Approval {
            to: to.to_string(),
            attachment: attachment.filename.clone(),
        });
        Ok(())
    }

    async fn send_rejection_email(
        &self,
        to: &str,
        _nama: &str,
        _nomor_surat: &str,
        alasan: &str,
    ) -> Result<(), DeliveryError> {
        if self.should_fail {
            return Err(DeliveryError::Transport("smtp down".to_string()));
        }
        self.sent.lock().await.push(SentEmail::Rejection {
            to: to.to_string(),
            alasan: alasan.to_string(),
        });
        Ok(())
    }
}

/// Generator that blocks longer than any sensible timeout.
pub struct SlowGenerator {
    pub delay: Duration,
}

impl<'a> Generator<&'a Submission> for SlowGenerator {
    fn generate(&self, submission: &'a Submission) -> Result<GeneratedDocument, GeneratorError> {
        std::thread::sleep(self.delay);
        AhliWarisGenerator::new("Jakarta", "Cakung Barat").generate(submission)
    }
}

pub struct TestApp {
    pub state: AppState,
    pub storage: Arc<MockObjectStorage>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_app_with(
    storage: MockObjectStorage,
    mailer: RecordingMailer,
    generator: SharedGenerator,
    timeout: Duration,
) -> TestApp {
    let storage = Arc::new(storage);
    let mailer = Arc::new(mailer);
    let state = AppState::new_with_components(
        Arc::new(InMemorySubmissionRepository::new()),
        storage.clone(),
        mailer.clone(),
        generator,
        timeout,
    );
    TestApp {
        state,
        storage,
        mailer,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(
        MockObjectStorage::new(),
        RecordingMailer::new(),
        Arc::new(AhliWarisGenerator::new("Jakarta", "Cakung Barat")),
        Duration::from_secs(30),
    )
}

/// Give the email worker a moment to drain its queue.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
