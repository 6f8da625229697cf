//! Coffee Match Common Library
//!
//! 테이스팅 노트のマッチスコア計算コア（CLIとライブラリ利用側で共有）
//!
//! 入力の正規化 → 향미照合 → 감각照合 → 重み付け合成 → 説明文生成

pub mod dictionary;
pub mod error;
pub mod explain;
pub mod flavor;
pub mod fuzzy;
pub mod grade;
pub mod normalize;
pub mod scorer;
pub mod sensory;
pub mod types;

pub use dictionary::{builtin, FlavorDictionary, TermTiers};
pub use error::{Error, Result};
pub use explain::generate_match_score_text;
pub use fuzzy::MatchStrategy;
pub use grade::{get_score_grade, ScoreGrade};
pub use scorer::{
    calculate_detailed_match, calculate_match_score, MatchOptions, MatchScorer, RoasterNotes,
    UserSelections, FLAVOR_WEIGHT, SENSORY_WEIGHT,
};
pub use sensory::{IntensityScale, SensoryCategory, SensoryInput, SensoryProfile};
pub use types::{MatchLevel, MatchResult, MatchTier, SensoryBreakdown};
