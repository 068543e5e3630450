use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeraldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),
}
