use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_name: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub cloudinary: Option<CloudinaryConfig>,
    pub upload: UploadSettings,
    pub store_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Settings that apply to every upload, whether or not credentials are present.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub api_base: String,
    pub folder: String,
    pub signature_algorithm: SignatureAlgorithm,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_CLOUDINARY_API_BASE.to_string(),
            folder: DEFAULT_UPLOAD_FOLDER.to_string(),
            signature_algorithm: SignatureAlgorithm::Sha1,
            timeout: Duration::from_secs(60),
        }
    }
}

pub const DEFAULT_DATABASE_NAME: &str = "form_builder";
pub const DEFAULT_UPLOAD_FOLDER: &str = "form-submissions";
pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let database_name = env_or("DATABASE_NAME", DEFAULT_DATABASE_NAME);

        let host: IpAddr = env_or("HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid HOST: {e}"))?;

        let port: u16 = env_or("PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        // 100 MiB, large enough for short video clips
        let max_body_size: usize = env_or("MAX_BODY_SIZE", "104857600")
            .parse()
            .map_err(|e| format!("Invalid MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("LOG_LEVEL", "info");

        let cloudinary = cloudinary_from_parts(
            std::env::var("CLOUDINARY_CLOUD_NAME").ok(),
            std::env::var("CLOUDINARY_API_KEY").ok(),
            std::env::var("CLOUDINARY_API_SECRET").ok(),
        );

        let signature_algorithm =
            SignatureAlgorithm::parse(&env_or("CLOUDINARY_SIGNATURE_ALGORITHM", "sha1"))?;

        let upload_timeout: u64 = env_or("UPLOAD_TIMEOUT_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid UPLOAD_TIMEOUT_SECS: {e}"))?;

        let store_timeout: u64 = env_or("STORE_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| format!("Invalid STORE_TIMEOUT_SECS: {e}"))?;

        let upload = UploadSettings {
            api_base: env_or("CLOUDINARY_API_BASE", DEFAULT_CLOUDINARY_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            folder: env_or("CLOUDINARY_FOLDER", DEFAULT_UPLOAD_FOLDER),
            signature_algorithm,
            timeout: Duration::from_secs(upload_timeout),
        };

        Ok(Config {
            database_url,
            database_name,
            host,
            port,
            max_body_size,
            log_level,
            cloudinary,
            upload,
            store_timeout: Duration::from_secs(store_timeout),
        })
    }
}

impl SignatureAlgorithm {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" | "" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(format!("Invalid CLOUDINARY_SIGNATURE_ALGORITHM: {other}")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1",
            SignatureAlgorithm::Sha256 => "sha256",
        }
    }
}

/// Credentials are all-or-nothing; a partial set counts as unconfigured.
fn cloudinary_from_parts(
    cloud_name: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
) -> Option<CloudinaryConfig> {
    match (cloud_name, api_key, api_secret) {
        (Some(cloud_name), Some(api_key), Some(api_secret))
            if !cloud_name.is_empty() && !api_key.is_empty() && !api_secret.is_empty() =>
        {
            Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            })
        }
        _ => None,
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
