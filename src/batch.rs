//! 一括スコア計算モジュール
//!
//! テイスティング記録のJSON配列を並列に計算し、レポートを作る。
//! ロースターノートがない記録は「未計算」として結果を持たない。

use crate::error::Result;
use coffee_match_common::{MatchResult, MatchScorer, RoasterNotes, SensoryInput, SensoryProfile, UserSelections};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 1件のテイスティング記録
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TastingRecord {
    pub id: String,
    pub flavors: Vec<String>,
    /// 文字列配列 / {カテゴリ: 数値} / {カテゴリ: 文字列配列}
    pub expressions: serde_json::Value,
    pub roaster_note: String,
    /// ロースターが公開している強度（数値モード）
    pub roaster_profile: Option<SensoryProfile>,
}

/// 1件分の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub id: String,
    pub result: Option<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 集計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub scored: usize,
    /// ノートなしで未計算
    pub skipped: usize,
    pub failed: usize,
    pub average_score: Option<f64>,
}

/// 一括計算レポート
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub generated_at: String,
    pub dictionary_fingerprint: String,
    pub enhanced: bool,
    pub summary: BatchSummary,
    pub entries: Vec<BatchEntry>,
}

/// 記録ファイルを読み込む
pub fn load_records(path: &Path) -> Result<Vec<TastingRecord>> {
    if !path.exists() {
        return Err(crate::error::CoffeeMatchError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let records: Vec<TastingRecord> = serde_json::from_str(&content)?;
    Ok(records)
}

/// 1件を計算する
pub fn score_record(record: &TastingRecord, scorer: &MatchScorer<'_>) -> BatchEntry {
    let outcome = SensoryInput::from_json_value(&record.expressions).map(|input| match (input, record.roaster_profile) {
        // 数値の強度とロースターの強度が揃ったときだけ詳細計算
        (SensoryInput::Intensities(user_profile), Some(roaster_profile)) => scorer.calculate_detailed_match(
            &UserSelections {
                flavors: record.flavors.clone(),
                profile: user_profile,
            },
            &RoasterNotes {
                note: record.roaster_note.clone(),
                profile: Some(roaster_profile),
            },
        ),
        (input, _) => scorer.calculate_match_score(&record.flavors, &input, &record.roaster_note),
    });

    match outcome {
        Ok(result) => BatchEntry {
            id: record.id.clone(),
            result,
            error: None,
        },
        Err(e) => BatchEntry {
            id: record.id.clone(),
            result: None,
            error: Some(e.to_string()),
        },
    }
}

/// 全件を並列に計算する（入力順を保持）
pub fn score_records(records: &[TastingRecord], scorer: &MatchScorer<'_>, show_progress: bool) -> Vec<BatchEntry> {
    let pb = if show_progress {
        let pb = ProgressBar::new(records.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("█▓▒░ "));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let entries = records
        .par_iter()
        .map(|record| {
            let entry = score_record(record, scorer);
            pb.inc(1);
            entry
        })
        .collect();

    pb.finish_and_clear();
    entries
}

/// 集計を作る
pub fn summarize(entries: &[BatchEntry]) -> BatchSummary {
    let scores: Vec<f64> = entries
        .iter()
        .filter_map(|e| e.result.as_ref())
        .map(|r| f64::from(r.score))
        .collect();
    let failed = entries.iter().filter(|e| e.error.is_some()).count();

    BatchSummary {
        total: entries.len(),
        scored: scores.len(),
        skipped: entries.len() - scores.len() - failed,
        failed,
        average_score: if scores.is_empty() {
            None
        } else {
            Some((scores.iter().sum::<f64>() / scores.len() as f64 * 10.0).round() / 10.0)
        },
    }
}

/// レポートを作る
pub fn run_batch(
    records: &[TastingRecord],
    scorer: &MatchScorer<'_>,
    dictionary_fingerprint: String,
    show_progress: bool,
) -> BatchReport {
    let entries = score_records(records, scorer, show_progress);
    BatchReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        dictionary_fingerprint,
        enhanced: scorer.options().strategy.is_enhanced(),
        summary: summarize(&entries),
        entries,
    }
}
