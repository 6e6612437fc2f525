use std::env;

pub const DEV_JWT_SECRET: &str = "insecure_dev_secret_change_me";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_port: u16,
    pub frontend_url: Option<String>,
    pub jwt_secret: String,
    pub editor_token_ttl_secs: i64,
    pub storage_dir: String,
    pub dist_dir: String,
    pub public_base_url: Option<String>,
    pub document_server_url: Option<String>,
    pub upload_max_bytes: usize,
    pub callback_require_token: bool,
    pub callback_fetch_timeout_secs: Option<u64>,
    pub is_production: bool,
}

fn http_url(var: &str) -> Option<String> {
    env::var(var).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Some(trimmed.trim_end_matches('/').to_string())
        } else {
            None
        }
    })
}

fn flag(var: &str) -> Option<bool> {
    env::var(var)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_port = env::var("API_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5174);
        let frontend_url = env::var("FRONTEND_URL").ok();
        let jwt_secret =
            env::var("ONLYOFFICE_JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.into());
        let editor_token_ttl_secs = env::var("EDITOR_TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 60);
        let storage_dir = env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".into());
        let dist_dir = env::var("DIST_DIR").unwrap_or_else(|_| "./dist".into());
        let public_base_url = http_url("PUBLIC_BASE_URL");
        let document_server_url = http_url("DOCUMENT_SERVER_URL");
        let upload_max_bytes = env::var("UPLOAD_MAX_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024);
        let callback_fetch_timeout_secs = env::var("CALLBACK_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs: &u64| *secs > 0);
        let is_production = matches!(
            env::var("RUST_ENV").ok().as_deref(),
            Some("production") | Some("prod")
        );
        let callback_require_token = flag("CALLBACK_REQUIRE_TOKEN").unwrap_or(is_production);

        if is_production {
            if jwt_secret == DEV_JWT_SECRET || jwt_secret.len() < 16 {
                anyhow::bail!("ONLYOFFICE_JWT_SECRET must be set to a strong secret in production");
            }
            if !callback_require_token {
                anyhow::bail!("CALLBACK_REQUIRE_TOKEN cannot be disabled in production");
            }
        }

        Ok(Self {
            api_port,
            frontend_url,
            jwt_secret,
            editor_token_ttl_secs,
            storage_dir,
            dist_dir,
            public_base_url,
            document_server_url,
            upload_max_bytes,
            callback_require_token,
            callback_fetch_timeout_secs,
            is_production,
        })
    }

    /// Development defaults rooted at `storage_dir`.
    pub fn local(storage_dir: impl Into<String>) -> Self {
        Self {
            api_port: 5174,
            frontend_url: None,
            jwt_secret: DEV_JWT_SECRET.into(),
            editor_token_ttl_secs: 10 * 60,
            storage_dir: storage_dir.into(),
            dist_dir: "./dist".into(),
            public_base_url: None,
            document_server_url: None,
            upload_max_bytes: 50 * 1024 * 1024,
            callback_require_token: false,
            callback_fetch_timeout_secs: None,
            is_production: false,
        }
    }
}
