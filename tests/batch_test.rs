//! 一括計算テスト
//!
//! 記録ファイルの読み込みからレポート生成までを検証

use coffee_match::batch::{self, TastingRecord};
use coffee_match::dictionary::fingerprint;
use coffee_match::error::CoffeeMatchError;
use coffee_match_common::{builtin, MatchLevel, MatchOptions, MatchScorer};
use std::fs;
use tempfile::tempdir;

const RECORDS: &str = r#"[
    {
        "id": "r1",
        "flavors": ["초콜릿", "캐러멜"],
        "roasterNote": "dark chocolate and caramel sweetness"
    },
    {
        "id": "r2",
        "flavors": ["레몬"],
        "expressions": ["상큼한"],
        "roasterNote": "   "
    },
    {
        "id": "r3",
        "flavors": ["레몬"],
        "expressions": 42,
        "roasterNote": "lemon"
    },
    {
        "id": "r4",
        "flavors": ["레몬"],
        "expressions": { "acidity": 5, "단맛": 3 },
        "roasterNote": "Lemon and lime",
        "roasterProfile": { "acidity": 5, "sweetness": 3 }
    }
]"#;

fn write_records(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("records.json");
    fs::write(&path, RECORDS).expect("Failed to write records");
    path
}

/// 記録ファイルを読み込めること
#[test]
fn test_load_records() {
    let dir = tempdir().expect("Failed to create temp dir");
    let records = batch::load_records(&write_records(dir.path())).unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].id, "r1");
    assert!(records[0].expressions.is_null());
    assert!(records[3].roaster_profile.is_some());
}

/// 存在しないファイル
#[test]
fn test_load_records_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = batch::load_records(&dir.path().join("nope.json"));
    assert!(matches!(result, Err(CoffeeMatchError::FileNotFound(_))));
}

/// 壊れたJSON
#[test]
fn test_load_records_invalid_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(batch::load_records(&path), Err(CoffeeMatchError::JsonParse(_))));
}

/// 計算・未計算・失敗が集計に反映されること
#[test]
fn test_run_batch_summary() {
    let dir = tempdir().expect("Failed to create temp dir");
    let records = batch::load_records(&write_records(dir.path())).unwrap();
    let scorer = MatchScorer::builtin(MatchOptions::default());
    let fp = fingerprint(builtin()).unwrap();

    let report = batch::run_batch(&records, &scorer, fp.clone(), false);

    assert_eq!(report.dictionary_fingerprint, fp);
    assert!(!report.enhanced);
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.scored, 2);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.failed, 1);

    // 入力順を保持
    let ids: Vec<&str> = report.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3", "r4"]);

    assert!(report.entries[1].result.is_none());
    assert!(report.entries[1].error.is_none());
    assert!(report.entries[2].error.is_some());

    let detailed = report.entries[3].result.as_ref().unwrap();
    assert_eq!(detailed.level, MatchLevel::FlavorAndSensory);
    assert_eq!(detailed.sensory_score, Some(100));
}

/// レポートがJSONとして書き出せること
#[test]
fn test_report_serializes_camel_case() {
    let records = vec![TastingRecord {
        id: "solo".into(),
        flavors: vec!["초콜릿".into()],
        roaster_note: "chocolate".into(),
        ..Default::default()
    }];
    let scorer = MatchScorer::builtin(MatchOptions::default());
    let report = batch::run_batch(&records, &scorer, "fp".into(), false);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["scored"], 1);
    assert!(json["generatedAt"].is_string());
    assert!(json["entries"][0]["result"]["flavorScore"].is_number());
    assert!(json["entries"][0].get("error").is_none());
}

/// 記録がなければ平均もなし
#[test]
fn test_summarize_empty() {
    let summary = batch::summarize(&[]);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.average_score, None);
}

/// ロースター強度があっても記述語の感覚表現はそのまま評価されること
#[test]
fn test_descriptor_expressions_with_roaster_profile() {
    let records: Vec<TastingRecord> = serde_json::from_str(
        r#"[{
            "id": "mixed",
            "flavors": ["레몬"],
            "expressions": ["상큼한", "밝은"],
            "roasterNote": "lemon, zesty and bright",
            "roasterProfile": { "acidity": 5 }
        }]"#,
    )
    .unwrap();
    let scorer = MatchScorer::builtin(MatchOptions::default());

    let entry = batch::score_record(&records[0], &scorer);
    assert!(entry.error.is_none());

    let result = entry.result.unwrap();
    assert_eq!(result.level, MatchLevel::FlavorAndSensory);
    assert!(result.sensory_score.is_some());
    assert!(!result.matched_expressions.is_empty());
}
