//! マッチ結果の型定義
//!
//! CLIとライブラリ利用側で共有される型:
//! - FlavorMatch: タグ単位の照合結果
//! - SensoryBreakdown: 感覚評価の内訳（記述語モード/数値モード）
//! - MatchResult: 最終出力

use serde::{Deserialize, Serialize};

/// 照合ティア
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchTier {
    Primary,
    Related,
    Similar,
    Opposite,
    Fuzzy,
    Phonetic,
}

impl MatchTier {
    /// ティアごとの重み（Oppositeは減点）
    pub fn weight(self) -> f64 {
        match self {
            MatchTier::Primary => 1.0,
            MatchTier::Related => 0.8,
            MatchTier::Similar => 0.6,
            MatchTier::Opposite => -0.3,
            MatchTier::Fuzzy => 0.7,
            MatchTier::Phonetic => 0.5,
        }
    }

    /// 表示用の「一致」として数えるティア
    pub fn counts_as_matched(self) -> bool {
        matches!(self, MatchTier::Primary | MatchTier::Related | MatchTier::Fuzzy)
    }

    /// 補助戦略（ファジー/発音）由来かどうか
    pub fn is_fallback(self) -> bool {
        matches!(self, MatchTier::Fuzzy | MatchTier::Phonetic)
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Primary => write!(f, "primary"),
            MatchTier::Related => write!(f, "related"),
            MatchTier::Similar => write!(f, "similar"),
            MatchTier::Opposite => write!(f, "opposite"),
            MatchTier::Fuzzy => write!(f, "fuzzy"),
            MatchTier::Phonetic => write!(f, "phonetic"),
        }
    }
}

/// タグ単位の照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlavorMatch {
    pub tag: String,
    /// 一致したティア（なしの場合None）
    pub tier: Option<MatchTier>,
    /// ノート側で一致した語
    pub matched_term: Option<String>,
    pub weight: f64,
}

impl FlavorMatch {
    pub fn miss(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            tier: None,
            matched_term: None,
            weight: 0.0,
        }
    }

    pub fn hit(tag: &str, tier: MatchTier, term: &str) -> Self {
        Self {
            tag: tag.to_string(),
            tier: Some(tier),
            matched_term: Some(term.to_string()),
            weight: tier.weight(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.tier.map(MatchTier::counts_as_matched).unwrap_or(false)
    }
}

/// 評価レベル
///
/// Level1: 향미のみ（信頼度低）, Level2: 향미 + 감각
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    #[serde(rename = "level1")]
    FlavorOnly,
    #[serde(rename = "level2")]
    FlavorAndSensory,
}

impl MatchLevel {
    pub fn number(self) -> u8 {
        match self {
            MatchLevel::FlavorOnly => 1,
            MatchLevel::FlavorAndSensory => 2,
        }
    }
}

impl std::fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level {}", self.number())
    }
}

/// 記述語モードのカテゴリ別結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMatch {
    pub category: String,
    pub selected: Vec<String>,
    pub matched: Vec<String>,
    pub score: f64,
}

/// 数値モードの属性別差分（user − roaster）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDiff {
    pub attribute: String,
    pub user: f64,
    pub roaster: f64,
    pub diff: f64,
    pub score: f64,
}

/// 感覚評価の内訳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SensoryBreakdown {
    /// 感覚データなし、または比較不能
    None {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Descriptor { categories: Vec<CategoryMatch> },
    Intensity { attributes: Vec<AttributeDiff> },
}

impl Default for SensoryBreakdown {
    fn default() -> Self {
        SensoryBreakdown::None { reason: None }
    }
}

/// マッチスコア計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// 総合スコア（0〜100）
    pub score: u8,
    pub flavor_score: u8,
    /// 感覚スコア（Level1ではNone）
    pub sensory_score: Option<u8>,
    pub matched_flavors: Vec<String>,
    pub matched_expressions: Vec<String>,
    pub level: MatchLevel,
    /// 信頼度（0.0〜1.0）
    pub confidence: f64,
    pub message: String,
    #[serde(default)]
    pub flavor_details: Vec<FlavorMatch>,
    #[serde(default)]
    pub sensory_details: SensoryBreakdown,
    #[serde(default)]
    pub enhanced: bool,
    /// ファジー/発音一致の件数（향미と감각の合計）
    #[serde(default)]
    pub fallback_matches: usize,
}
