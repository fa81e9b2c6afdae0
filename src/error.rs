use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwisterLangError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, TwisterLangError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_error_display() {
        let err = TwisterLangError::InvalidArguments("no convention matched".to_string());
        assert!(format!("{err}").contains("invalid arguments"));
        let err = TwisterLangError::Decode("bad transport text".to_string());
        assert!(format!("{err}").contains("decode error"));
    }
}
