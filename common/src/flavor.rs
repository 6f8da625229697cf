//! 향미 照合モジュール
//!
//! ユーザーの향미タグごとに、ロースターノート中の根拠をティア別に探す。
//!
//! ## スコア計算
//! - 適合率 = 重み付きヒット合計 / ユーザータグ数
//! - 再現率 = 重み付きヒット合計 / max(ユーザータグ数, ノート側の推定語数)
//! - スコア = F1（調和平均）× 100

use crate::dictionary::{FlavorDictionary, TermTiers};
use crate::fuzzy::FallbackMatcher;
use crate::normalize::{normalize_text, NormalizedNote};
use crate::types::{FlavorMatch, MatchTier};
use std::collections::HashSet;
use tracing::{debug, warn};

/// 選択できる향미タグの上限（デフォルト）
pub const DEFAULT_MAX_FLAVORS: usize = 8;

/// 향미照合の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlavorOutcome {
    /// 0〜100（丸め前）
    pub score: f64,
    /// 表示用の一致タグ（primary/related/fuzzy）
    pub matched: Vec<String>,
    pub details: Vec<FlavorMatch>,
}

impl FlavorOutcome {
    /// 補助戦略で一致したタグ数
    pub fn fallback_hits(&self) -> usize {
        self.details
            .iter()
            .filter(|d| d.tier.map(MatchTier::is_fallback).unwrap_or(false))
            .count()
    }
}

/// タグを整える（前後空白除去・重複除去・上限で切り詰め）
pub fn prepare_tags<S: AsRef<str>>(tags: &[S], max_tags: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut prepared = Vec::new();

    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(normalize_text(trimmed)) {
            prepared.push(trimmed.to_string());
        }
    }

    if prepared.len() > max_tags {
        warn!(
            "タグが上限を超えています: {}件 → {}件に切り詰め",
            prepared.len(),
            max_tags
        );
        prepared.truncate(max_tags);
    }

    prepared
}

/// 1タグをノートと照合する
///
/// primary → related → similar → 補助戦略 → opposite の順に最初の一致を採用。
pub fn match_tag(
    tag: &str,
    tiers: &TermTiers,
    canonical: &str,
    note: &NormalizedNote,
    fallbacks: &[Box<dyn FallbackMatcher>],
) -> FlavorMatch {
    let primary = tiers.primary_terms(canonical);

    for tier in [MatchTier::Primary, MatchTier::Related, MatchTier::Similar] {
        let terms = match tier {
            MatchTier::Primary => primary.clone(),
            _ => normalized_terms(tiers.terms(tier)),
        };
        if let Some(term) = terms.iter().find(|t| note.contains(t)) {
            return FlavorMatch::hit(tag, tier, term);
        }
    }

    if !fallbacks.is_empty() {
        let candidates: Vec<String> = primary
            .iter()
            .cloned()
            .chain(normalized_terms(&tiers.related))
            .collect();
        for fallback in fallbacks {
            for term in &candidates {
                if let Some(fragment) = fallback.find(term, note) {
                    debug!("{}: 補助一致 {} ({} ~ {})", tag, fallback.tier(), term, fragment);
                    return FlavorMatch::hit(tag, fallback.tier(), &fragment);
                }
            }
        }
    }

    if let Some(term) = normalized_terms(&tiers.opposite)
        .iter()
        .find(|t| note.contains(t))
    {
        return FlavorMatch::hit(tag, MatchTier::Opposite, term);
    }

    FlavorMatch::miss(tag)
}

/// 향미タグ群をノートと照合してスコアを出す
pub fn match_flavors(
    tags: &[String],
    dictionary: &FlavorDictionary,
    note: &NormalizedNote,
    fallbacks: &[Box<dyn FallbackMatcher>],
) -> FlavorOutcome {
    if tags.is_empty() || note.is_empty() {
        return FlavorOutcome::default();
    }

    let details: Vec<FlavorMatch> = tags
        .iter()
        .map(|tag| {
            let detail = match dictionary.lookup_flavor(tag) {
                Some(entry) => match_tag(tag, entry.tiers, entry.canonical, note, fallbacks),
                None => {
                    debug!("{}: 辞書にないためタグ自体で照合", tag);
                    match_tag(tag, &TermTiers::self_match(tag), tag, note, fallbacks)
                }
            };
            debug!("{}: tier={:?} weight={}", tag, detail.tier, detail.weight);
            detail
        })
        .collect();

    let weighted_hits: f64 = details.iter().map(|d| d.weight).sum::<f64>().max(0.0);
    let tag_count = tags.len() as f64;
    let expected = tag_count.max(estimate_note_terms(dictionary, note) as f64);

    let precision = weighted_hits / tag_count;
    let recall = weighted_hits / expected;
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    let matched = details
        .iter()
        .filter(|d| d.is_matched())
        .map(|d| d.tag.clone())
        .collect();

    FlavorOutcome {
        score: (f1 * 100.0).clamp(0.0, 100.0),
        matched,
        details,
    }
}

/// ノートに現れる향미語の数を推定する
///
/// 辞書エントリのうちprimary語がノートに含まれるものを数える。
/// ヒット語がすべて他エントリのより長いヒット語に含まれる場合は数えない
/// （"dark chocolate" 中の "chocolate"）。
pub fn estimate_note_terms(dictionary: &FlavorDictionary, note: &NormalizedNote) -> usize {
    let hits: Vec<Vec<String>> = dictionary
        .flavors
        .iter()
        .map(|(canonical, tiers)| {
            tiers
                .primary_terms(canonical)
                .into_iter()
                .filter(|t| note.contains(t))
                .collect::<Vec<_>>()
        })
        .filter(|terms| !terms.is_empty())
        .collect();

    hits.iter()
        .enumerate()
        .filter(|(i, terms)| {
            !terms.iter().all(|term| {
                hits.iter().enumerate().any(|(j, others)| {
                    j != *i && others.iter().any(|o| o != term && o.contains(term.as_str()))
                })
            })
        })
        .count()
}

fn normalized_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| normalize_text(t))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::builtin;
    use crate::fuzzy::enhanced_matchers;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_prepare_tags_dedup_and_truncate() {
        let prepared = prepare_tags(&[" 초콜릿 ", "초콜릿", "", "Caramel", "caramel"], 8);
        assert_eq!(prepared, vec!["초콜릿", "Caramel"]);

        let many: Vec<String> = (0..12).map(|i| format!("tag{}", i)).collect();
        assert_eq!(prepare_tags(&many, DEFAULT_MAX_FLAVORS).len(), 8);
    }

    #[test]
    fn test_primary_hits() {
        let note = NormalizedNote::new("dark chocolate and caramel sweetness");
        let outcome = match_flavors(&tags(&["초콜릿", "캐러멜"]), builtin(), &note, &[]);
        assert_eq!(outcome.matched, vec!["초콜릿", "캐러멜"]);
        assert!(outcome.score > 80.0);
        assert!(outcome
            .details
            .iter()
            .all(|d| d.tier == Some(MatchTier::Primary)));
    }

    #[test]
    fn test_no_match() {
        let note = NormalizedNote::new("earthy, herbal, tobacco");
        let outcome = match_flavors(&tags(&["레몬"]), builtin(), &note, &[]);
        assert_eq!(outcome.score, 0.0);
        assert!(outcome.matched.is_empty());
    }

    #[test]
    fn test_related_and_similar_tiers() {
        let note = NormalizedNote::new("cocoa nibs with a hint of grapefruit");
        let outcome = match_flavors(&tags(&["초콜릿", "레몬"]), builtin(), &note, &[]);
        assert_eq!(outcome.details[0].tier, Some(MatchTier::Related));
        assert_eq!(outcome.details[1].tier, Some(MatchTier::Similar));
        // similarは表示用の一致に含めない
        assert_eq!(outcome.matched, vec!["초콜릿"]);
    }

    #[test]
    fn test_opposite_penalty_floors_at_zero() {
        let note = NormalizedNote::new("smoky, burnt sugar");
        let outcome = match_flavors(&tags(&["레몬"]), builtin(), &note, &[]);
        assert_eq!(outcome.details[0].tier, Some(MatchTier::Opposite));
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_unknown_tag_self_match() {
        let note = NormalizedNote::new("Durian and jackfruit");
        let outcome = match_flavors(&tags(&["durian"]), builtin(), &note, &[]);
        assert_eq!(outcome.matched, vec!["durian"]);
        assert_eq!(outcome.score, 100.0);
    }

    #[test]
    fn test_empty_inputs() {
        let note = NormalizedNote::new("chocolate");
        let outcome = match_flavors(&[], builtin(), &note, &[]);
        assert_eq!(outcome.score, 0.0);
        assert!(outcome.matched.is_empty());

        let empty = NormalizedNote::new("");
        let outcome = match_flavors(&tags(&["초콜릿"]), builtin(), &empty, &[]);
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_recall_penalizes_unselected_note_terms() {
        let note = NormalizedNote::new("blueberry, jasmine, honey, peach");
        let outcome = match_flavors(&tags(&["블루베리"]), builtin(), &note, &[]);
        // P=1.0, R=0.25 → F1=0.4
        assert!((outcome.score - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_estimate_note_terms_overlap() {
        let note = NormalizedNote::new("dark chocolate and caramel sweetness");
        assert_eq!(estimate_note_terms(builtin(), &note), 2);
    }

    #[test]
    fn test_phonetic_fallback_tier() {
        let tiers = TermTiers {
            primary: vec!["caramel".to_string()],
            ..Default::default()
        };
        let note = NormalizedNote::new("karamell finish");

        let baseline = match_tag("캐러멜", &tiers, "캐러멜", &note, &[]);
        assert_eq!(baseline.tier, None);

        let fallbacks = enhanced_matchers(0.2);
        let hit = match_tag("캐러멜", &tiers, "캐러멜", &note, &fallbacks);
        assert_eq!(hit.tier, Some(MatchTier::Phonetic));
        assert_eq!(hit.weight, 0.5);
        assert_eq!(hit.matched_term.as_deref(), Some("karamell"));
    }

    #[test]
    fn test_enhanced_fuzzy_fallback() {
        let note = NormalizedNote::new("chocolat, blueberies");
        let baseline = match_flavors(&tags(&["블루베리"]), builtin(), &note, &[]);
        assert!(baseline.matched.is_empty());

        let fallbacks = enhanced_matchers(0.2);
        let enhanced = match_flavors(&tags(&["블루베리"]), builtin(), &note, &fallbacks);
        assert_eq!(enhanced.details[0].tier, Some(MatchTier::Fuzzy));
        assert_eq!(enhanced.matched, vec!["블루베리"]);
        assert_eq!(enhanced.fallback_hits(), 1);
    }
}
