//! 매치 스코어 合成モジュール
//!
//! 향미スコアと감각スコアを重み付きで合成し、MatchResultを作る。
//!
//! ## 重み
//! - Level 2（감각データあり）: 향미 40% + 감각 60%
//! - Level 1（감각データなし・比較不能）: 향미のみ、信頼度を下げる
//!
//! ロースターノートが空の場合は計算しない（None）。0点とは区別する。

use crate::dictionary::{builtin, FlavorDictionary};
use crate::flavor::{match_flavors, prepare_tags, FlavorOutcome, DEFAULT_MAX_FLAVORS};
use crate::fuzzy::{enhanced_matchers, FallbackMatcher, MatchStrategy};
use crate::grade::get_score_grade;
use crate::normalize::NormalizedNote;
use crate::sensory::{
    categorize, compare_intensities, extract_roaster_profile, match_descriptors, IntensityScale,
    SensoryInput, SensoryOutcome, SensoryProfile,
};
use crate::types::{MatchLevel, MatchResult, SensoryBreakdown};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FLAVOR_WEIGHT: f64 = 0.4;
pub const SENSORY_WEIGHT: f64 = 0.6;

const LEVEL2_CONFIDENCE: f64 = 0.9;
const LEVEL1_CONFIDENCE: f64 = 0.6;
const FALLBACK_CONFIDENCE_FACTOR: f64 = 0.9;
const MIN_CONFIDENCE: f64 = 0.3;

/// 計算オプション
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub max_flavors: usize,
    pub strategy: MatchStrategy,
    /// ファジー照合で許容する編集距離の割合
    pub fuzzy_threshold: f64,
    pub scale: IntensityScale,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_flavors: DEFAULT_MAX_FLAVORS,
            strategy: MatchStrategy::Baseline,
            fuzzy_threshold: 0.2,
            scale: IntensityScale::default(),
        }
    }
}

/// 数値モードのユーザー入力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSelections {
    pub flavors: Vec<String>,
    pub profile: SensoryProfile,
}

/// 数値モードのロースター側データ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoasterNotes {
    pub note: String,
    /// 省略時はノート本文から読み取る
    pub profile: Option<SensoryProfile>,
}

enum SensoryEvaluation {
    Absent,
    Unavailable(String),
    Scored(SensoryOutcome),
}

/// 辞書とオプションを束ねたスコア計算器
pub struct MatchScorer<'a> {
    dictionary: &'a FlavorDictionary,
    options: MatchOptions,
    fallbacks: Vec<Box<dyn FallbackMatcher>>,
}

impl MatchScorer<'static> {
    /// 組み込み辞書で作る
    pub fn builtin(options: MatchOptions) -> Self {
        MatchScorer::new(builtin(), options)
    }
}

impl<'a> MatchScorer<'a> {
    pub fn new(dictionary: &'a FlavorDictionary, options: MatchOptions) -> Self {
        let fallbacks = if options.strategy.is_enhanced() {
            enhanced_matchers(options.fuzzy_threshold)
        } else {
            Vec::new()
        };
        Self {
            dictionary,
            options,
            fallbacks,
        }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// 향미タグ・감각表現・ロースターノートからスコアを計算する
    pub fn calculate_match_score<S: AsRef<str>>(
        &self,
        flavors: &[S],
        expressions: &SensoryInput,
        roaster_note: &str,
    ) -> Option<MatchResult> {
        let note = NormalizedNote::new(roaster_note);
        if note.is_empty() {
            debug!("ロースターノートが空のため計算しない");
            return None;
        }

        let flavor = self.match_flavor_tags(flavors, &note);
        let sensory = self.evaluate_expressions(expressions, roaster_note, &note);
        Some(self.compose(flavor, sensory))
    }

    /// 数値モード: ユーザーとロースターの強度を比較する
    pub fn calculate_detailed_match(
        &self,
        user: &UserSelections,
        roaster: &RoasterNotes,
    ) -> Option<MatchResult> {
        let note = NormalizedNote::new(&roaster.note);
        if note.is_empty() {
            debug!("ロースターノートが空のため計算しない");
            return None;
        }

        let flavor = self.match_flavor_tags(&user.flavors, &note);
        let roaster_profile = roaster
            .profile
            .filter(|p| !p.is_empty())
            .or_else(|| extract_roaster_profile(&roaster.note, &self.options.scale));
        let sensory = self.evaluate_intensities(&user.profile, roaster_profile.as_ref());
        Some(self.compose(flavor, sensory))
    }

    fn match_flavor_tags<S: AsRef<str>>(&self, flavors: &[S], note: &NormalizedNote) -> FlavorOutcome {
        let tags = prepare_tags(flavors, self.options.max_flavors);
        match_flavors(&tags, self.dictionary, note, &self.fallbacks)
    }

    fn evaluate_expressions(
        &self,
        expressions: &SensoryInput,
        raw_note: &str,
        note: &NormalizedNote,
    ) -> SensoryEvaluation {
        if expressions.is_empty() {
            return SensoryEvaluation::Absent;
        }

        match expressions {
            SensoryInput::None => SensoryEvaluation::Absent,
            SensoryInput::Descriptors(tags) => {
                let categorized = categorize(tags, self.dictionary);
                self.evaluate_descriptors(&categorized, note)
            }
            SensoryInput::Categorized(map) => self.evaluate_descriptors(map, note),
            SensoryInput::Intensities(user) => {
                let roaster = extract_roaster_profile(raw_note, &self.options.scale);
                self.evaluate_intensities(user, roaster.as_ref())
            }
        }
    }

    fn evaluate_descriptors(
        &self,
        selections: &std::collections::BTreeMap<String, Vec<String>>,
        note: &NormalizedNote,
    ) -> SensoryEvaluation {
        match match_descriptors(
            selections,
            self.dictionary,
            note,
            &self.fallbacks,
            self.options.max_flavors,
        ) {
            Some(outcome) => SensoryEvaluation::Scored(outcome),
            None => SensoryEvaluation::Absent,
        }
    }

    fn evaluate_intensities(
        &self,
        user: &SensoryProfile,
        roaster: Option<&SensoryProfile>,
    ) -> SensoryEvaluation {
        if user.is_empty() {
            return SensoryEvaluation::Absent;
        }
        let Some(roaster) = roaster else {
            return SensoryEvaluation::Unavailable("로스터의 감각 강도 정보가 없습니다".to_string());
        };
        match compare_intensities(user, roaster, &self.options.scale) {
            Some(outcome) => SensoryEvaluation::Scored(outcome),
            None => SensoryEvaluation::Unavailable("비교할 수 있는 공통 속성이 없습니다".to_string()),
        }
    }

    fn compose(&self, flavor: FlavorOutcome, sensory: SensoryEvaluation) -> MatchResult {
        let flavor_score = to_score(flavor.score);
        let mut fallback_hits = flavor.fallback_hits();

        let (score, sensory_score, level, matched_expressions, sensory_details) = match sensory {
            SensoryEvaluation::Scored(outcome) => {
                let sensory_score = to_score(outcome.score);
                fallback_hits += outcome.fallback_hits;
                let combined = FLAVOR_WEIGHT * f64::from(flavor_score)
                    + SENSORY_WEIGHT * f64::from(sensory_score);
                (
                    to_score(combined),
                    Some(sensory_score),
                    MatchLevel::FlavorAndSensory,
                    outcome.matched,
                    outcome.breakdown,
                )
            }
            SensoryEvaluation::Unavailable(reason) => (
                flavor_score,
                None,
                MatchLevel::FlavorOnly,
                Vec::new(),
                SensoryBreakdown::None { reason: Some(reason) },
            ),
            SensoryEvaluation::Absent => (
                flavor_score,
                None,
                MatchLevel::FlavorOnly,
                Vec::new(),
                SensoryBreakdown::None { reason: None },
            ),
        };

        let base = match level {
            MatchLevel::FlavorAndSensory => LEVEL2_CONFIDENCE,
            MatchLevel::FlavorOnly => LEVEL1_CONFIDENCE,
        };
        let confidence = (base * FALLBACK_CONFIDENCE_FACTOR.powi(fallback_hits as i32))
            .max(MIN_CONFIDENCE);
        let confidence = (confidence * 100.0).round() / 100.0;

        debug!(
            "score={} flavor={} sensory={:?} level={} confidence={}",
            score, flavor_score, sensory_score, level, confidence
        );

        MatchResult {
            score,
            flavor_score,
            sensory_score,
            matched_flavors: flavor.matched,
            matched_expressions,
            level,
            confidence,
            message: summary_message(score, level),
            flavor_details: flavor.details,
            sensory_details,
            enhanced: self.options.strategy.is_enhanced(),
            fallback_matches: fallback_hits,
        }
    }
}

fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

fn summary_message(score: u8, level: MatchLevel) -> String {
    let grade = get_score_grade(i32::from(score));
    match level {
        MatchLevel::FlavorAndSensory => format!(
            "{} {}: 향미와 감각 표현을 모두 반영한 점수입니다",
            grade.emoji, grade.korean_label
        ),
        MatchLevel::FlavorOnly => format!(
            "{} {}: 감각 데이터 없이 향미만으로 평가했습니다 (Level 1)",
            grade.emoji, grade.korean_label
        ),
    }
}

/// 組み込み辞書でスコアを計算する
pub fn calculate_match_score<S: AsRef<str>>(
    user_flavors: &[S],
    user_expressions: &SensoryInput,
    roaster_note: &str,
    use_enhanced: bool,
) -> Option<MatchResult> {
    let options = MatchOptions {
        strategy: MatchStrategy::from_flag(use_enhanced),
        ..Default::default()
    };
    MatchScorer::builtin(options).calculate_match_score(user_flavors, user_expressions, roaster_note)
}

/// 組み込み辞書で数値モードのスコアを計算する
pub fn calculate_detailed_match(
    user_selections: &UserSelections,
    roaster_notes: &RoasterNotes,
) -> Option<MatchResult> {
    MatchScorer::builtin(MatchOptions::default()).calculate_detailed_match(user_selections, roaster_notes)
}
