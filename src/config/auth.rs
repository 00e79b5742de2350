use std::env;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl_days: i64,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: 90,
            admin_username: None,
            admin_password: None,
        }
    }
}

impl AuthConfig {
    pub fn init_from_env(&mut self) -> Result<(), String> {
        if let Ok(days) = env::var("SESSION_TTL_DAYS") {
            self.session_ttl_days = days
                .parse::<i64>()
                .map_err(|_| "SESSION_TTL_DAYS is not a valid i64".to_string())?;
            if self.session_ttl_days <= 0 {
                return Err("SESSION_TTL_DAYS must be positive".to_string());
            }
        }

        // Both must be present for the startup seed to run
        self.admin_username = env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty());
        self.admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        Ok(())
    }
}
