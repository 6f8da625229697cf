//! 감각 照合モジュール
//!
//! 2つの入力形式に対応する:
//! - 記述語モード: カテゴリ別の韓国語記述語（산미: ["상큼한", "밝은"]）をノート本文と照合
//! - 数値モード: 酸味・甘味・ボディ・余韻の強度（1〜5）をロースター側の強度と比較
//!
//! ロースター側の強度がない場合、数値モードはスコアを出さない（None）。

use crate::dictionary::{FlavorDictionary, TermTiers};
use crate::error::{Error, Result};
use crate::flavor::{match_tag, prepare_tags};
use crate::fuzzy::FallbackMatcher;
use crate::normalize::NormalizedNote;
use crate::types::{AttributeDiff, CategoryMatch, MatchTier, SensoryBreakdown};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 辞書にない記述語のカテゴリ
pub const UNCATEGORIZED: &str = "uncategorized";

/// 感覚カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensoryCategory {
    Acidity,
    Sweetness,
    Bitterness,
    Body,
    Aftertaste,
    Balance,
}

impl SensoryCategory {
    pub const ALL: [SensoryCategory; 6] = [
        SensoryCategory::Acidity,
        SensoryCategory::Sweetness,
        SensoryCategory::Bitterness,
        SensoryCategory::Body,
        SensoryCategory::Aftertaste,
        SensoryCategory::Balance,
    ];

    /// 数値モードで比較する属性
    pub const INTENSITY: [SensoryCategory; 4] = [
        SensoryCategory::Acidity,
        SensoryCategory::Sweetness,
        SensoryCategory::Body,
        SensoryCategory::Aftertaste,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SensoryCategory::Acidity => "acidity",
            SensoryCategory::Sweetness => "sweetness",
            SensoryCategory::Bitterness => "bitterness",
            SensoryCategory::Body => "body",
            SensoryCategory::Aftertaste => "aftertaste",
            SensoryCategory::Balance => "balance",
        }
    }

    pub fn korean_label(self) -> &'static str {
        match self {
            SensoryCategory::Acidity => "산미",
            SensoryCategory::Sweetness => "단맛",
            SensoryCategory::Bitterness => "쓴맛",
            SensoryCategory::Body => "바디",
            SensoryCategory::Aftertaste => "여운",
            SensoryCategory::Balance => "밸런스",
        }
    }

    pub fn keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.key()).collect()
    }
}

impl std::str::FromStr for SensoryCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "acidity" | "acid" | "산미" | "산도" => Ok(SensoryCategory::Acidity),
            "sweetness" | "sweet" | "단맛" | "당도" => Ok(SensoryCategory::Sweetness),
            "bitterness" | "bitter" | "쓴맛" => Ok(SensoryCategory::Bitterness),
            "body" | "바디" | "바디감" | "마우스필" => Ok(SensoryCategory::Body),
            "aftertaste" | "finish" | "여운" | "후미" => Ok(SensoryCategory::Aftertaste),
            "balance" | "밸런스" | "균형" => Ok(SensoryCategory::Balance),
            _ => Err(Error::InvalidInput(format!("不明な感覚カテゴリ: {}", s))),
        }
    }
}

impl std::fmt::Display for SensoryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 強度スケール
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityScale {
    pub min: f64,
    pub max: f64,
}

impl Default for IntensityScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

impl IntensityScale {
    /// 下限・上限（逆順に指定されていても並べ直す）
    pub fn bounds(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    pub fn max_delta(&self) -> f64 {
        let (min, max) = self.bounds();
        (max - min).max(f64::EPSILON)
    }

    /// スケール外の値は範囲内に丸める
    pub fn clamp(&self, attribute: SensoryCategory, value: f64) -> f64 {
        let (min, max) = self.bounds();
        if value.is_nan() {
            warn!("{}: 数値ではないため最小値を使用", attribute);
            return min;
        }
        let clamped = value.max(min).min(max);
        if clamped != value {
            warn!("{}: {} はスケール外のため {} に補正", attribute, value, clamped);
        }
        clamped
    }
}

/// 数値モードの強度プロファイル
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensoryProfile {
    pub acidity: Option<f64>,
    pub sweetness: Option<f64>,
    pub body: Option<f64>,
    pub aftertaste: Option<f64>,
}

impl SensoryProfile {
    pub fn get(&self, attribute: SensoryCategory) -> Option<f64> {
        match attribute {
            SensoryCategory::Acidity => self.acidity,
            SensoryCategory::Sweetness => self.sweetness,
            SensoryCategory::Body => self.body,
            SensoryCategory::Aftertaste => self.aftertaste,
            SensoryCategory::Bitterness | SensoryCategory::Balance => None,
        }
    }

    /// 数値モード対象外の属性は無視してfalseを返す
    pub fn set(&mut self, attribute: SensoryCategory, value: f64) -> bool {
        let slot = match attribute {
            SensoryCategory::Acidity => &mut self.acidity,
            SensoryCategory::Sweetness => &mut self.sweetness,
            SensoryCategory::Body => &mut self.body,
            SensoryCategory::Aftertaste => &mut self.aftertaste,
            SensoryCategory::Bitterness | SensoryCategory::Balance => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn is_empty(&self) -> bool {
        SensoryCategory::INTENSITY.iter().all(|a| self.get(*a).is_none())
    }
}

impl std::str::FromStr for SensoryProfile {
    type Err = Error;

    /// `acidity=5,body=2` 形式（韓国語名も可）
    fn from_str(s: &str) -> Result<Self> {
        let mut profile = SensoryProfile::default();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once(['=', ':'])
                .ok_or_else(|| Error::InvalidInput(format!("`属性=値` 形式ではありません: {}", pair)))?;
            let attribute: SensoryCategory = name.parse()?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| Error::InvalidInput(format!("数値ではありません: {}", pair)))?;
            if !profile.set(attribute, value) {
                warn!("{}: 数値モードでは比較しない属性のため無視", attribute);
            }
        }
        Ok(profile)
    }
}

/// ユーザーの感覚入力
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SensoryInput {
    #[default]
    None,
    /// カテゴリなしの記述語リスト
    Descriptors(Vec<String>),
    /// カテゴリ別の記述語
    Categorized(BTreeMap<String, Vec<String>>),
    /// 数値モード
    Intensities(SensoryProfile),
}

impl SensoryInput {
    pub fn descriptors<S: AsRef<str>>(tags: &[S]) -> Self {
        SensoryInput::Descriptors(tags.iter().map(|t| t.as_ref().to_string()).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SensoryInput::None => true,
            SensoryInput::Descriptors(tags) => tags.iter().all(|t| t.trim().is_empty()),
            SensoryInput::Categorized(map) => map.values().flatten().all(|t| t.trim().is_empty()),
            SensoryInput::Intensities(profile) => profile.is_empty(),
        }
    }

    /// JSON値から読み込む
    ///
    /// 受け付ける形: null, 文字列配列, {カテゴリ: 数値}, {カテゴリ: 文字列配列}。
    /// それ以外はプログラムの誤りとしてエラーにする。
    pub fn from_json_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(SensoryInput::None),
            Value::Array(items) => {
                let tags = string_array(items, "expressions")?;
                Ok(SensoryInput::Descriptors(tags))
            }
            Value::Object(map) if map.is_empty() => Ok(SensoryInput::None),
            Value::Object(map) if map.values().all(Value::is_number) => {
                let mut profile = SensoryProfile::default();
                for (key, v) in map {
                    let number = v.as_f64().unwrap_or(f64::NAN);
                    match key.parse::<SensoryCategory>() {
                        Ok(attribute) => {
                            if !profile.set(attribute, number) {
                                warn!("{}: 数値モードでは比較しない属性のため無視", attribute);
                            }
                        }
                        Err(_) => warn!("不明な属性を無視: {}", key),
                    }
                }
                Ok(SensoryInput::Intensities(profile))
            }
            Value::Object(map) if map.values().all(Value::is_array) => {
                let mut categorized = BTreeMap::new();
                for (key, v) in map {
                    let items = v.as_array().map(Vec::as_slice).unwrap_or(&[]);
                    let category = match key.parse::<SensoryCategory>() {
                        Ok(c) => c.key().to_string(),
                        Err(_) => key.clone(),
                    };
                    categorized
                        .entry(category)
                        .or_insert_with(Vec::new)
                        .extend(string_array(items, key)?);
                }
                Ok(SensoryInput::Categorized(categorized))
            }
            other => Err(Error::InvalidInput(format!(
                "感覚入力の形式が不正です: {}",
                type_name(other)
            ))),
        }
    }
}

fn string_array(items: &[Value], field: &str) -> Result<Vec<String>> {
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::InvalidInput(format!("{}: 文字列以外の要素 ({})", field, type_name(item)))
            })
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 感覚照合の結果
#[derive(Debug, Clone, PartialEq)]
pub struct SensoryOutcome {
    /// 0〜100（丸め前）
    pub score: f64,
    pub matched: Vec<String>,
    pub breakdown: SensoryBreakdown,
    pub fallback_hits: usize,
}

/// 記述語リストを辞書のカテゴリに振り分ける
///
/// 辞書にない語は `uncategorized` に入れ、語自体で照合する。
pub fn categorize(tags: &[String], dictionary: &FlavorDictionary) -> BTreeMap<String, Vec<String>> {
    let order = SensoryCategory::keys();
    let mut categorized: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for tag in tags {
        let category = dictionary
            .find_sensory_category(tag, &order)
            .map(|(category, _)| category.to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        categorized.entry(category).or_default().push(tag.clone());
    }

    categorized
}

/// 記述語モード: カテゴリ別にノートと照合する
///
/// カテゴリスコア = 重み付きヒット合計 / 選択数、全体はカテゴリ平均。
pub fn match_descriptors(
    selections: &BTreeMap<String, Vec<String>>,
    dictionary: &FlavorDictionary,
    note: &NormalizedNote,
    fallbacks: &[Box<dyn FallbackMatcher>],
    max_tags: usize,
) -> Option<SensoryOutcome> {
    let mut categories = Vec::new();
    let mut matched = Vec::new();
    let mut fallback_hits = 0;

    for category in ordered_categories(selections) {
        let tags = prepare_tags(&selections[category], max_tags);
        if tags.is_empty() {
            continue;
        }

        let mut weighted = 0.0;
        let mut category_matched = Vec::new();
        for tag in &tags {
            let detail = match dictionary.lookup_sensory(category, tag) {
                Some(entry) => match_tag(tag, entry.tiers, entry.canonical, note, fallbacks),
                None => match_tag(tag, &TermTiers::self_match(tag), tag, note, fallbacks),
            };
            debug!("{}/{}: tier={:?}", category, tag, detail.tier);
            if detail.tier.map(MatchTier::is_fallback).unwrap_or(false) {
                fallback_hits += 1;
            }
            if detail.is_matched() {
                category_matched.push(tag.clone());
            }
            weighted += detail.weight;
        }

        let score = (weighted.max(0.0) / tags.len() as f64 * 100.0).clamp(0.0, 100.0);
        matched.extend(category_matched.iter().cloned());
        categories.push(CategoryMatch {
            category: category.to_string(),
            selected: tags,
            matched: category_matched,
            score,
        });
    }

    if categories.is_empty() || note.is_empty() {
        return None;
    }

    let score = categories.iter().map(|c| c.score).sum::<f64>() / categories.len() as f64;
    Some(SensoryOutcome {
        score,
        matched,
        breakdown: SensoryBreakdown::Descriptor { categories },
        fallback_hits,
    })
}

fn ordered_categories(selections: &BTreeMap<String, Vec<String>>) -> Vec<&str> {
    let known = SensoryCategory::keys();
    let mut ordered: Vec<&str> = known
        .iter()
        .copied()
        .filter(|k| selections.contains_key(*k))
        .collect();
    ordered.extend(
        selections
            .keys()
            .map(String::as_str)
            .filter(|k| !known.contains(k)),
    );
    ordered
}

/// 数値モード: 強度を比較する
///
/// 属性スコア = 1 − |user − roaster| / (max − min)。両側にある属性のみ平均する。
pub fn compare_intensities(
    user: &SensoryProfile,
    roaster: &SensoryProfile,
    scale: &IntensityScale,
) -> Option<SensoryOutcome> {
    let attributes: Vec<AttributeDiff> = SensoryCategory::INTENSITY
        .iter()
        .filter_map(|&attribute| {
            let u = scale.clamp(attribute, user.get(attribute)?);
            let r = scale.clamp(attribute, roaster.get(attribute)?);
            let diff = u - r;
            let score = ((1.0 - diff.abs() / scale.max_delta()) * 100.0).clamp(0.0, 100.0);
            Some(AttributeDiff {
                attribute: attribute.key().to_string(),
                user: u,
                roaster: r,
                diff,
                score,
            })
        })
        .collect();

    if attributes.is_empty() {
        return None;
    }

    let score = attributes.iter().map(|a| a.score).sum::<f64>() / attributes.len() as f64;
    // 1段階未満の差を「一致」とみなす
    let matched = attributes
        .iter()
        .filter(|a| a.diff.abs() < 1.0)
        .map(|a| a.attribute.clone())
        .collect();

    Some(SensoryOutcome {
        score,
        matched,
        breakdown: SensoryBreakdown::Intensity { attributes },
        fallback_hits: 0,
    })
}

/// ロースターノート中の強度表記を読み取る
///
/// 例: "Acidity 4/5", "산미: 4", "body=3", "여운 8/10"（分母付きはスケールに換算）
pub fn extract_roaster_profile(note: &str, scale: &IntensityScale) -> Option<SensoryProfile> {
    lazy_static::lazy_static! {
        static ref INTENSITY: Regex = Regex::new(
            r"(?i)(acidity|sweetness|aftertaste|finish|body|산미|산도|단맛|당도|바디감|바디|마우스필|여운|후미)\s*[:：=]?\s*(\d+(?:\.\d+)?)\s*(?:/\s*(\d+(?:\.\d+)?))?"
        ).unwrap();
    }

    let mut profile = SensoryProfile::default();
    for caps in INTENSITY.captures_iter(note) {
        let Ok(attribute) = caps[1].parse::<SensoryCategory>() else {
            continue;
        };
        let Ok(mut value) = caps[2].parse::<f64>() else {
            continue;
        };
        if let Some(denominator) = caps.get(3).and_then(|d| d.as_str().parse::<f64>().ok()) {
            let (_, max) = scale.bounds();
            if denominator > 0.0 && denominator != max {
                value = value / denominator * max;
            }
        }
        if profile.get(attribute).is_none() {
            profile.set(attribute, value);
        }
    }

    if profile.is_empty() {
        None
    } else {
        Some(profile)
    }
}
