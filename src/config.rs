#[derive(Clone)]
pub struct Config {
    pub port: u16,

    // SMTP relay settings. All optional: the process starts without them and
    // logs a warning, but contact submissions will fail until they are set.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_timeout_seconds: u64,

    pub to_email: Option<String>,
    pub from_email: Option<String>,

    // When set, CORS is restricted to this exact origin; otherwise permissive.
    pub cors_origin: Option<String>,
    pub static_dir: String,
}
