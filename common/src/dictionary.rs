//! 향미・감각 사전モジュール
//!
//! ユーザー向けタグ（主に韓国語）からロースターノートに現れる語（主に英語）への
//! 対応表をデータとして保持する。分岐ロジックではなく差し替え可能な表として扱う。
//!
//! 組み込み辞書は `data/dictionary.json` を一度だけ読み込む。
//! カスタム辞書はJSONから読み込み、`merge` で上書きできる。

use crate::error::{Error, Result};
use crate::normalize::normalize_text;
use crate::types::MatchTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const BUILTIN_JSON: &str = include_str!("../data/dictionary.json");

lazy_static::lazy_static! {
    static ref BUILTIN: FlavorDictionary =
        FlavorDictionary::from_json(BUILTIN_JSON).unwrap();
}

/// 組み込み辞書を取得
pub fn builtin() -> &'static FlavorDictionary {
    &BUILTIN
}

/// ティア別の照合語リスト
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermTiers {
    /// カテゴリラベル（berry, citrus など）
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    pub primary: Vec<String>,
    pub related: Vec<String>,
    pub similar: Vec<String>,
    pub opposite: Vec<String>,
}

impl TermTiers {
    /// 辞書にないタグ用（タグ自体を唯一のprimary語とする）
    pub fn self_match(tag: &str) -> Self {
        Self {
            primary: vec![tag.to_string()],
            ..Default::default()
        }
    }

    /// ティアに対応する語リスト
    pub fn terms(&self, tier: MatchTier) -> &[String] {
        match tier {
            MatchTier::Primary => &self.primary,
            MatchTier::Related => &self.related,
            MatchTier::Similar => &self.similar,
            MatchTier::Opposite => &self.opposite,
            MatchTier::Fuzzy | MatchTier::Phonetic => &[],
        }
    }

    /// 正規化済みのprimary語（見出し語を含む）
    pub fn primary_terms(&self, canonical: &str) -> Vec<String> {
        let mut terms = vec![normalize_text(canonical)];
        for term in &self.primary {
            let normalized = normalize_text(term);
            if !terms.contains(&normalized) {
                terms.push(normalized);
            }
        }
        terms.retain(|t| !t.is_empty());
        terms
    }

    fn all_terms(&self) -> impl Iterator<Item = &String> {
        self.primary
            .iter()
            .chain(&self.related)
            .chain(&self.similar)
            .chain(&self.opposite)
    }
}

/// 사전のルックアップ結果
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub canonical: &'a str,
    pub tiers: &'a TermTiers,
}

/// 향미・감각 사전
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlavorDictionary {
    #[serde(default)]
    pub version: u32,
    /// 향미タグ → 照合語
    #[serde(default)]
    pub flavors: BTreeMap<String, TermTiers>,
    /// 感覚カテゴリ → 記述語 → 照合語
    #[serde(default)]
    pub sensory: BTreeMap<String, BTreeMap<String, TermTiers>>,
}

/// 辞書の件数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryStats {
    pub flavor_entries: usize,
    pub sensory_categories: usize,
    pub sensory_entries: usize,
    pub total_terms: usize,
}

impl FlavorDictionary {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let dictionary: Self = serde_json::from_str(json)?;
        dictionary.validate()?;
        Ok(dictionary)
    }

    /// JSONファイルから読み込み（非WASM環境のみ）
    #[cfg(not(feature = "wasm"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 組み込み辞書にカスタム辞書を重ねたもの
    pub fn builtin_with(custom: &FlavorDictionary) -> Self {
        let mut dictionary = builtin().clone();
        dictionary.merge(custom);
        dictionary
    }

    /// 辞書をマージ（後から追加した辞書が優先）
    pub fn merge(&mut self, other: &FlavorDictionary) {
        self.version = self.version.max(other.version);
        self.flavors.extend(other.flavors.clone());
        for (category, entries) in &other.sensory {
            self.sensory
                .entry(category.clone())
                .or_default()
                .extend(entries.clone());
        }
    }

    /// 空の見出し語・照合語を検出する
    pub fn validate(&self) -> Result<()> {
        for (tag, tiers) in &self.flavors {
            check_entry("flavors", tag, tiers)?;
        }
        for (category, entries) in &self.sensory {
            if category.trim().is_empty() {
                return Err(Error::Dictionary("感覚カテゴリ名が空です".into()));
            }
            for (tag, tiers) in entries {
                check_entry(category, tag, tiers)?;
            }
        }
        Ok(())
    }

    /// 향미タグを検索する
    ///
    /// 見出し語の完全一致 → 正規化後の一致 → primary語との一致の順。
    pub fn lookup_flavor(&self, tag: &str) -> Option<Entry<'_>> {
        lookup_in(&self.flavors, tag)
    }

    /// 感覚記述語をカテゴリ内で検索する
    pub fn lookup_sensory(&self, category: &str, tag: &str) -> Option<Entry<'_>> {
        self.sensory
            .get(category)
            .and_then(|entries| lookup_in(entries, tag))
    }

    /// 感覚記述語を全カテゴリから検索する（カテゴリ順で最初に見つかったもの）
    pub fn find_sensory_category<'a>(&'a self, tag: &str, order: &[&'a str]) -> Option<(&'a str, Entry<'a>)> {
        let known = order.iter().copied();
        let extra = self
            .sensory
            .keys()
            .map(String::as_str)
            .filter(|c| !order.contains(c));

        known
            .chain(extra)
            .find_map(|category| self.lookup_sensory(category, tag).map(|entry| (category, entry)))
    }

    /// 件数を集計
    pub fn stats(&self) -> DictionaryStats {
        let flavor_terms: usize = self.flavors.values().map(|t| t.all_terms().count()).sum();
        let sensory_terms: usize = self
            .sensory
            .values()
            .flat_map(|entries| entries.values())
            .map(|t| t.all_terms().count())
            .sum();

        DictionaryStats {
            flavor_entries: self.flavors.len(),
            sensory_categories: self.sensory.len(),
            sensory_entries: self.sensory.values().map(BTreeMap::len).sum(),
            total_terms: flavor_terms + sensory_terms,
        }
    }

    /// フィンガープリント計算用の正準JSON
    ///
    /// BTreeMapのためキー順が固定される。
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn lookup_in<'a>(entries: &'a BTreeMap<String, TermTiers>, tag: &str) -> Option<Entry<'a>> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((canonical, tiers)) = entries.get_key_value(trimmed) {
        return Some(Entry { canonical, tiers });
    }

    let normalized = normalize_text(trimmed);
    if normalized.is_empty() {
        return None;
    }

    entries
        .iter()
        .find(|(key, _)| normalize_text(key) == normalized)
        .or_else(|| {
            entries.iter().find(|(_, tiers)| {
                tiers.primary.iter().any(|term| normalize_text(term) == normalized)
            })
        })
        .map(|(canonical, tiers)| Entry { canonical, tiers })
}

fn check_entry(section: &str, tag: &str, tiers: &TermTiers) -> Result<()> {
    if normalize_text(tag).is_empty() {
        return Err(Error::Dictionary(format!("{}: 見出し語が空です", section)));
    }
    if let Some(term) = tiers.all_terms().find(|t| normalize_text(t).is_empty()) {
        return Err(Error::Dictionary(format!(
            "{}: 「{}」に空の照合語があります ({:?})",
            section, tag, term
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let dictionary = builtin();
        assert!(dictionary.flavors.len() > 30);
        assert!(dictionary.sensory.contains_key("acidity"));
        assert!(dictionary.validate().is_ok());
    }

    #[test]
    fn test_lookup_by_canonical() {
        let entry = builtin().lookup_flavor("초콜릿").unwrap();
        assert_eq!(entry.canonical, "초콜릿");
        assert!(entry.tiers.primary.contains(&"chocolate".to_string()));
    }

    #[test]
    fn test_lookup_by_primary_term() {
        let entry = builtin().lookup_flavor("Caramel").unwrap();
        assert_eq!(entry.canonical, "캐러멜");
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(builtin().lookup_flavor("두리안").is_none());
        assert!(builtin().lookup_flavor("  ").is_none());
    }

    #[test]
    fn test_find_sensory_category() {
        let (category, entry) = builtin()
            .find_sensory_category("묵직한", &["acidity", "sweetness", "body"])
            .unwrap();
        assert_eq!(category, "body");
        assert_eq!(entry.canonical, "묵직한");
    }

    #[test]
    fn test_primary_terms_include_canonical() {
        let tiers = TermTiers {
            primary: vec!["Lemon".into(), "lemon".into()],
            ..Default::default()
        };
        assert_eq!(tiers.primary_terms("레몬"), vec!["레몬", "lemon"]);
    }

    #[test]
    fn test_from_json_rejects_empty_term() {
        let json = r#"{ "flavors": { "레몬": { "primary": ["lemon", " "] } } }"#;
        let err = FlavorDictionary::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Dictionary(_)));
    }

    #[test]
    fn test_merge_overrides() {
        let custom = FlavorDictionary::from_json(
            r#"{ "flavors": { "레몬": { "primary": ["meyer lemon"] }, "두리안": { "primary": ["durian"] } },
                 "sensory": { "body": { "쫀득한": { "primary": ["chewy"] } } } }"#,
        )
        .unwrap();

        let merged = FlavorDictionary::builtin_with(&custom);
        assert_eq!(merged.flavors["레몬"].primary, vec!["meyer lemon".to_string()]);
        assert!(merged.lookup_flavor("두리안").is_some());
        assert!(merged.lookup_sensory("body", "쫀득한").is_some());
        assert!(merged.lookup_sensory("body", "묵직한").is_some());
    }

    #[test]
    fn test_stats() {
        let stats = builtin().stats();
        assert_eq!(stats.flavor_entries, builtin().flavors.len());
        assert_eq!(stats.sensory_categories, 6);
        assert!(stats.total_terms > stats.flavor_entries);
    }
}
