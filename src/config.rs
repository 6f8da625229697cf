use crate::error::{CoffeeMatchError, Result};
use coffee_match_common::{IntensityScale, MatchOptions, MatchStrategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DICTIONARY_ENV: &str = "COFFEE_MATCH_DICTIONARY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 組み込み辞書に重ねるカスタム辞書
    pub dictionary_path: Option<PathBuf>,
    pub max_flavors: usize,
    pub enhanced: bool,
    pub fuzzy_threshold: f64,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            max_flavors: 8,
            enhanced: false,
            fuzzy_threshold: 0.2,
            scale_min: 1.0,
            scale_max: 5.0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoffeeMatchError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("coffee-match").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_flavors == 0 {
            return Err(CoffeeMatchError::Config("max_flavors는 1 이상이어야 합니다".into()));
        }
        if !(0.0..1.0).contains(&self.fuzzy_threshold) {
            return Err(CoffeeMatchError::Config(format!(
                "fuzzy_threshold는 0 이상 1 미만이어야 합니다: {}",
                self.fuzzy_threshold
            )));
        }
        if self.scale_max <= self.scale_min {
            return Err(CoffeeMatchError::Config(format!(
                "강도 스케일이 올바르지 않습니다: {}..{}",
                self.scale_min, self.scale_max
            )));
        }
        Ok(())
    }

    /// 辞書パス（環境変数を優先）
    pub fn dictionary_path(&self) -> Option<PathBuf> {
        if let Ok(path) = std::env::var(DICTIONARY_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        self.dictionary_path.clone()
    }

    /// `enhanced_override` はCLIフラグ（指定時のみ上書き）
    pub fn match_options(&self, enhanced_override: bool) -> MatchOptions {
        MatchOptions {
            max_flavors: self.max_flavors,
            strategy: MatchStrategy::from_flag(self.enhanced || enhanced_override),
            fuzzy_threshold: self.fuzzy_threshold,
            scale: IntensityScale {
                min: self.scale_min,
                max: self.scale_max,
            },
        }
    }
}
