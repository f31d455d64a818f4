// Server configuration

#[derive(Clone)]
pub struct ServerConfig {
    pub version: String,
    pub owner: String,
}
