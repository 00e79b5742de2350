use std::env;
use std::net::{AddrParseError, SocketAddr};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
    /// Overrides the scheme and host taken from each request when building
    /// absolute upload URLs.
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            public_base_url: None,
        }
    }
}

impl ServerConfig {
    pub fn get_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.get_addr().parse()
    }

    pub fn init_from_env(&mut self) -> Result<(), String> {
        if let Ok(addr) = env::var("SERVER_ADDR") {
            self.addr = addr;
        }

        if let Ok(port) = env::var("PORT") {
            self.port = port
                .parse::<u16>()
                .map_err(|_| "PORT is not a valid u16".to_string())?;
        }

        self.public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(())
    }
}
