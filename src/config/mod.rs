pub mod auth;
pub mod db;
pub mod server;
pub mod tracing;
pub mod upload;
use dotenv::dotenv;

#[derive(Clone, Default, Debug)]
pub struct ServiceConfig {
    pub db: db::DatabaseConfig,
    pub server: server::ServerConfig,
    pub upload: upload::UploadConfig,
    pub auth: auth::AuthConfig,
}
impl ServiceConfig {
    pub fn init_from_env(&mut self) -> Result<(), String> {
        dotenv().ok();
        self.db.init_from_env()?;
        self.server.init_from_env()?;
        self.upload.init_from_env()?;
        self.auth.init_from_env()?;
        Ok(())
    }
}
