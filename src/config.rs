// src/config.rs

use std::{
    env, fs,
    io::ErrorKind,
    net::UdpSocket,
    path::{Path, PathBuf},
};

use dotenvy::dotenv;
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::question::QuestionKind;

/// Guest search returns at most this many rows.
pub const GUEST_SEARCH_LIMIT: i64 = 20;

/// Default guest session lifetime: four hours.
pub const DEFAULT_SESSION_SECONDS: u64 = 14_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub admin_password: String,
    pub rust_log: String,
    pub bind_addr: String,
    /// Public base URL encoded into QR codes, e.g. `http://192.168.1.20:5000`.
    pub base_url: String,
    pub qr_code_dir: PathBuf,
    pub guests_csv_path: PathBuf,
    pub questions_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/wedding.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_SECONDS);

        let admin_password = env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let base_url = env::var("BASE_URL").unwrap_or_else(|_| {
            let port = bind_addr.rsplit(':').next().unwrap_or("5000");
            format!("http://{}:{}", local_ip(), port)
        });

        let qr_code_dir = env::var("QR_CODE_DIR").unwrap_or_else(|_| "static/qr_codes".to_string());
        let guests_csv_path =
            env::var("GUESTS_CSV_PATH").unwrap_or_else(|_| "data/guests.csv".to_string());
        let questions_path =
            env::var("QUESTIONS_PATH").unwrap_or_else(|_| "config/questions.json".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            admin_password,
            rust_log,
            bind_addr,
            base_url,
            qr_code_dir: qr_code_dir.into(),
            guests_csv_path: guests_csv_path.into(),
            questions_path: questions_path.into(),
        }
    }
}

/// Address of this machine on the local network, so phones scanning a QR
/// code can reach the server. Connecting a UDP socket sends no packets.
fn local_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "localhost".to_string())
}

/// One entry of the question catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionSpec {
    pub text: String,
    #[serde(default)]
    pub short_label: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub unit: String,
    pub order: i64,
    /// Number or `"HH:MM"` string.
    #[serde(default)]
    pub min: Option<serde_json::Value>,
    #[serde(default)]
    pub max: Option<serde_json::Value>,
}

impl QuestionSpec {
    pub fn min_hint(&self) -> Option<String> {
        hint_text(self.min.as_ref())
    }

    pub fn max_hint(&self) -> Option<String> {
        hint_text(self.max.as_ref())
    }
}

fn hint_text(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Load the question catalog from disk, falling back to the built-in set.
pub fn load_catalog(path: &Path) -> Vec<QuestionSpec> {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<Vec<QuestionSpec>>(&contents) {
            Ok(catalog) if !catalog.is_empty() => {
                info!(
                    path = %path.display(),
                    count = catalog.len(),
                    "loaded question catalog"
                );
                catalog
            }
            Ok(_) => {
                warn!(path = %path.display(), "question catalog is empty; using built-in questions");
                default_catalog()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse question catalog; using built-in questions"
                );
                default_catalog()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "question catalog not found; using built-in questions"
            );
            default_catalog()
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read question catalog; using built-in questions"
            );
            default_catalog()
        }
    }
}

fn catalog_entry(
    order: i64,
    text: &str,
    short_label: &str,
    kind: QuestionKind,
    unit: &str,
    min: serde_json::Value,
    max: serde_json::Value,
) -> QuestionSpec {
    QuestionSpec {
        text: text.to_string(),
        short_label: short_label.to_string(),
        kind,
        unit: unit.to_string(),
        order,
        min: Some(min),
        max: Some(max),
    }
}

/// The wedding sweepstake questions used when no catalog file is present.
pub fn default_catalog() -> Vec<QuestionSpec> {
    use serde_json::json;
    use QuestionKind::{Number, Time};

    vec![
        catalog_entry(1, "How many photographs will the photographer(s) take during the entire day?",
            "Total Photos", Number, "photos", json!(100), json!(3000)),
        catalog_entry(2, "What time will the ceremony actually start?",
            "Ceremony Start", Time, "HH:MM", json!("13:00"), json!("14:00")),
        catalog_entry(3, "What is the total combined duration of all speeches in minutes?",
            "Speech Duration", Number, "minutes", json!(10), json!(120)),
        catalog_entry(4, "What time will the first dance begin?",
            "First Dance Time", Time, "HH:MM", json!("18:30"), json!("20:30")),
        catalog_entry(5, "How long will the first dance last in seconds?",
            "First Dance Length", Number, "seconds", json!(60), json!(600)),
        catalog_entry(6, "What time will the bride and groom cut the cake?",
            "Cake Cutting Time", Time, "HH:MM", json!("17:00"), json!("21:00")),
        catalog_entry(7, "How many thank you mentions will be made across all speeches?",
            "Thank You Count", Number, "mentions", json!(5), json!(50)),
    ]
}
