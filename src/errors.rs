use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Decimal parse error: {0}")]
    ParseDecimal(#[from] bigdecimal::ParseBigDecimalError),

    #[error("Provider error: {0}")]
    Provider(#[from] ethers::providers::ProviderError),

    #[error("Contract error: {0}")]
    Contract(
        #[from]
        ethers::contract::ContractError<ethers::providers::Provider<ethers::providers::Http>>,
    ),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Other: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(raw: &str) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(raw)?)
    }

    #[test]
    fn json_errors_convert_with_question_mark() {
        let err = parse_body("{not json").unwrap_err();
        assert!(matches!(err, AppError::SerdeJson(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn config_error_message() {
        let err = AppError::Config("Set RPC_URL env var".into());
        assert_eq!(err.to_string(), "Configuration error: Set RPC_URL env var");
    }
}
