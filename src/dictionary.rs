//! 사전の読み込みとフィンガープリント

use crate::config::Config;
use crate::error::{CoffeeMatchError, Result};
use coffee_match_common::FlavorDictionary;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// 設定に従って辞書を用意する（カスタム辞書があれば組み込み辞書に重ねる）
pub fn load_dictionary(config: &Config) -> Result<FlavorDictionary> {
    match config.dictionary_path() {
        Some(path) => {
            let custom = load_custom(&path)?;
            info!("사전 적용: {} ({}개 향미)", path.display(), custom.flavors.len());
            Ok(FlavorDictionary::builtin_with(&custom))
        }
        None => Ok(coffee_match_common::builtin().clone()),
    }
}

/// カスタム辞書ファイルを読み込む
pub fn load_custom(path: &Path) -> Result<FlavorDictionary> {
    if !path.exists() {
        return Err(CoffeeMatchError::FileNotFound(path.display().to_string()));
    }
    FlavorDictionary::from_file(path).map_err(|e| match e {
        coffee_match_common::Error::Dictionary(msg) => CoffeeMatchError::Dictionary(msg),
        other => CoffeeMatchError::Match(other),
    })
}

/// 辞書内容のSHA-256（結果の再現性確認用）
pub fn fingerprint(dictionary: &FlavorDictionary) -> Result<String> {
    let canonical = dictionary.canonical_json()?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
