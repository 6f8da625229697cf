//! マッチスコアのシナリオテスト
//!
//! 代表的な入力に対するスコア・一致タグ・評価レベルを検証

use coffee_match_common::{
    calculate_detailed_match, calculate_match_score, get_score_grade, MatchLevel, RoasterNotes,
    SensoryInput, SensoryProfile, UserSelections,
};

fn profile(acidity: f64, sweetness: f64, body: f64, aftertaste: f64) -> SensoryProfile {
    SensoryProfile {
        acidity: Some(acidity),
        sweetness: Some(sweetness),
        body: Some(body),
        aftertaste: Some(aftertaste),
    }
}

/// 초콜릿・캐러멜がprimaryで一致する
#[test]
fn test_chocolate_caramel_primary_hits() {
    let result = calculate_match_score(
        &["초콜릿", "캐러멜"],
        &SensoryInput::None,
        "dark chocolate and caramel sweetness",
        false,
    )
    .expect("ノートがあるので計算される");

    assert_eq!(result.matched_flavors, vec!["초콜릿", "캐러멜"]);
    assert!(result.flavor_score > 80);
}

/// 一致しない향미
#[test]
fn test_lemon_against_earthy_note() {
    let result =
        calculate_match_score(&["레몬"], &SensoryInput::None, "earthy, herbal, tobacco", false).unwrap();

    assert_eq!(result.flavor_score, 0);
    assert!(result.matched_flavors.is_empty());
}

/// 同一強度なら감각スコア100
#[test]
fn test_identical_intensities() {
    let user = UserSelections {
        flavors: vec![],
        profile: profile(5.0, 3.0, 2.0, 4.0),
    };
    let roaster = RoasterNotes {
        note: "balanced cup".to_string(),
        profile: Some(profile(5.0, 3.0, 2.0, 4.0)),
    };

    let result = calculate_detailed_match(&user, &roaster).unwrap();
    assert_eq!(result.sensory_score, Some(100));
    assert_eq!(result.level, MatchLevel::FlavorAndSensory);
}

/// 全属性が最大差なら감각スコア0
#[test]
fn test_max_delta_intensities() {
    let user = UserSelections {
        flavors: vec![],
        profile: profile(5.0, 5.0, 5.0, 5.0),
    };
    let roaster = RoasterNotes {
        note: "balanced cup".to_string(),
        profile: Some(profile(1.0, 1.0, 1.0, 1.0)),
    };

    let result = calculate_detailed_match(&user, &roaster).unwrap();
    assert_eq!(result.sensory_score, Some(0));
}

/// 감각データがなければLevel 1として明示される
#[test]
fn test_missing_sensory_is_level1() {
    let result = calculate_match_score(
        &["초콜릿"],
        &SensoryInput::descriptors::<&str>(&[]),
        "chocolate",
        false,
    )
    .unwrap();

    assert_eq!(result.level, MatchLevel::FlavorOnly);
    assert_eq!(result.sensory_score, None);
    assert_eq!(result.score, result.flavor_score);
    assert!(result.confidence < 0.9);
    assert!(result.message.contains("Level 1"));
}

/// ノートが空なら結果なし（0点ではない）
#[test]
fn test_empty_note_returns_none() {
    for note in ["", "   ", "\n\t"] {
        assert!(calculate_match_score(&["초콜릿"], &SensoryInput::None, note, false).is_none());
    }
    let user = UserSelections::default();
    let roaster = RoasterNotes::default();
    assert!(calculate_detailed_match(&user, &roaster).is_none());
}

/// 향미が空なら0点・一致なし
#[test]
fn test_empty_flavors_score_zero() {
    let result = calculate_match_score::<&str>(&[], &SensoryInput::None, "chocolate", false).unwrap();
    assert_eq!(result.flavor_score, 0);
    assert!(result.matched_flavors.is_empty());
}

/// スコアは常に0〜100、一致タグは入力の部分集合
#[test]
fn test_score_bounds_and_subset() {
    let notes = [
        "Jasmine, bergamot, peach, honey. Acidity 5/5, Body 2/5",
        "smoky, burnt, ashy",
        "blueberies, chocolat, 카라멜",
        "복숭아, 자스민, 밝은 산미",
    ];
    let flavor_sets: [&[&str]; 3] = [&["재스민", "복숭아", "꿀"], &["레몬", "라임", "자몽"], &["블루베리", "캐러멜", "unknown"]];
    let expression_sets = [
        SensoryInput::None,
        SensoryInput::descriptors(&["밝은", "가벼운", "긴 여운"]),
        SensoryInput::Intensities(profile(9.0, -1.0, 3.0, 3.0)),
    ];

    for note in notes {
        for flavors in flavor_sets {
            for expressions in &expression_sets {
                for enhanced in [false, true] {
                    let result = calculate_match_score(flavors, expressions, note, enhanced).unwrap();
                    assert!(result.score <= 100);
                    assert!(result.flavor_score <= 100);
                    assert!(result.sensory_score.map(|s| s <= 100).unwrap_or(true));
                    assert!(result.matched_flavors.iter().all(|m| flavors.contains(&m.as_str())));
                    assert!((0.0..=1.0).contains(&result.confidence));
                }
            }
        }
    }
}

/// 全スコアがちょうど1つの等級に対応する
#[test]
fn test_every_score_has_grade() {
    for score in 0..=100 {
        let grade = get_score_grade(score);
        assert!(grade.min <= score && score <= grade.max);
    }
}

/// 韓国語ノート・表記揺れ（拡張マッチ）
#[test]
fn test_enhanced_korean_transliteration() {
    let baseline = calculate_match_score(&["캐러멜"], &SensoryInput::None, "카라멜, 견과류", false).unwrap();
    // 카라멜 は辞書のprimary語
    assert_eq!(baseline.matched_flavors, vec!["캐러멜"]);

    let baseline = calculate_match_score(&["초콜릿"], &SensoryInput::None, "초콜렛, 견과류", false).unwrap();
    assert!(baseline.matched_flavors.is_empty());

    let enhanced = calculate_match_score(&["초콜릿"], &SensoryInput::None, "초콜렛, 견과류", true).unwrap();
    assert!(enhanced.flavor_score > 0);
    assert!(enhanced.confidence < 0.6);
}
