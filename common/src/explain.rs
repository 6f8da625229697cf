//! 매치 스코어の説明文生成
//!
//! 画面にそのまま表示できる複数行テキストを作る。

use crate::grade::get_score_grade;
use crate::scorer::{FLAVOR_WEIGHT, SENSORY_WEIGHT};
use crate::sensory::SensoryCategory;
use crate::types::{MatchLevel, MatchResult, SensoryBreakdown};

/// 説明文を生成する
pub fn generate_match_score_text(result: &MatchResult) -> String {
    let grade = get_score_grade(i32::from(result.score));
    let mut lines = vec![format!(
        "{} 매치 스코어 {}점 ({} · {})",
        grade.emoji, result.score, grade.label, grade.korean_label
    )];

    match (result.level, result.sensory_score) {
        (MatchLevel::FlavorAndSensory, Some(sensory)) => {
            lines.push("평가 수준: Level 2 (향미 + 감각)".to_string());
            lines.push(format!(
                "향미 일치: {}점 × {}%",
                result.flavor_score,
                percent(FLAVOR_WEIGHT)
            ));
            lines.push(format!("감각 일치: {}점 × {}%", sensory, percent(SENSORY_WEIGHT)));
            lines.push(format!(
                "계산식: {} × {} + {} × {} = {}",
                result.flavor_score, FLAVOR_WEIGHT, sensory, SENSORY_WEIGHT, result.score
            ));
        }
        _ => {
            lines.push("평가 수준: Level 1 (향미만 평가, 신뢰도 낮음)".to_string());
            lines.push(format!("향미 일치: {}점", result.flavor_score));
            let reason = match &result.sensory_details {
                SensoryBreakdown::None { reason: Some(reason) } => reason.as_str(),
                _ => "입력된 감각 표현이 없습니다",
            };
            lines.push(format!("감각 일치: 평가 불가 ({})", reason));
            lines.push(format!("계산식: 향미 {} = {}", result.flavor_score, result.score));
        }
    }

    if !result.matched_flavors.is_empty() {
        lines.push(format!("일치한 향미: {}", result.matched_flavors.join(", ")));
    }
    if !result.matched_expressions.is_empty() {
        let names: Vec<&str> = result
            .matched_expressions
            .iter()
            .map(|m| display_attribute(m))
            .collect();
        lines.push(format!("일치한 감각 표현: {}", names.join(", ")));
    }

    if let SensoryBreakdown::Intensity { attributes } = &result.sensory_details {
        for a in attributes {
            lines.push(format!(
                "  {}: 나 {} / 로스터 {} ({:+})",
                display_attribute(&a.attribute),
                a.user,
                a.roaster,
                a.diff
            ));
        }
    }

    if result.fallback_matches > 0 {
        lines.push(format!("※ 철자·발음 유사 매치 {}건 포함", result.fallback_matches));
    }

    lines.push(format!("신뢰도: {}%", percent(result.confidence)));
    lines.join("\n")
}

fn percent(ratio: f64) -> u32 {
    (ratio * 100.0).round() as u32
}

fn display_attribute(key: &str) -> &str {
    match key.parse::<SensoryCategory>() {
        Ok(category) => category.korean_label(),
        Err(_) => key,
    }
}
