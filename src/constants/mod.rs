pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub refresh_token_expiration: u64,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub upload_dir: String,
    pub upload_base_url: String,
    pub fcm_endpoint: String,
    pub fcm_server_key: Option<String>,
    pub smtp_host: String,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub link_preview_timeout_ms: u64,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let access_token_expiration = std::env::var("ACCESS_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");
        let refresh_token_expiration = std::env::var("REFRESH_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<u64>()
            .expect("REFRESH_TOKEN_EXPIRATION must be a valid u64 integer");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let upload_base_url =
            std::env::var("UPLOAD_BASE_URL").unwrap_or_else(|_| "/uploads".to_string());

        let fcm_endpoint = std::env::var("FCM_ENDPOINT")
            .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".to_string());
        let fcm_server_key = std::env::var("FCM_SERVER_KEY").ok();

        let smtp_host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_username = std::env::var("SMTP_USERNAME").ok();
        let smtp_password = std::env::var("SMTP_PASSWORD").ok();
        let smtp_from =
            std::env::var("SMTP_FROM").unwrap_or_else(|_| "no-reply@socialnet.local".to_string());

        let link_preview_timeout_ms = std::env::var("LINK_PREVIEW_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()
            .expect("LINK_PREVIEW_TIMEOUT_MS must be a valid u64 integer");

        Env {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
            database_url,
            redis_url,
            frontend_url,
            ip,
            port,
            upload_dir,
            upload_base_url,
            fcm_endpoint,
            fcm_server_key,
            smtp_host,
            smtp_username,
            smtp_password,
            smtp_from,
            link_preview_timeout_ms,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
