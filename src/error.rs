use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoffeeMatchError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("사전 오류: {0}")]
    Dictionary(String),

    #[error("매치 계산 오류: {0}")]
    Match(#[from] coffee_match_common::Error),

    #[error("JSON 해석 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoffeeMatchError>;
