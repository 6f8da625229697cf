//! スコア等級

use serde::Serialize;

/// スコア等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreGrade {
    pub min: i32,
    pub max: i32,
    pub label: &'static str,
    pub korean_label: &'static str,
    pub color: &'static str,
    pub emoji: &'static str,
}

/// 等級表（上から順に判定、最初に一致したものを採用）
pub static GRADES: [ScoreGrade; 5] = [
    ScoreGrade { min: 90, max: 100, label: "Excellent", korean_label: "완벽한 매치", color: "#16A34A", emoji: "🎯" },
    ScoreGrade { min: 80, max: 89, label: "Very Good", korean_label: "아주 좋은 매치", color: "#65A30D", emoji: "✨" },
    ScoreGrade { min: 70, max: 79, label: "Good", korean_label: "좋은 매치", color: "#CA8A04", emoji: "👍" },
    ScoreGrade { min: 60, max: 69, label: "Fair", korean_label: "보통", color: "#EA580C", emoji: "🙂" },
    ScoreGrade { min: 0, max: 59, label: "Poor", korean_label: "다른 해석", color: "#DC2626", emoji: "🤔" },
];

/// スコアから等級を引く
///
/// どの範囲にも入らない値（負数・100超）は最下位の等級。
pub fn get_score_grade(score: i32) -> &'static ScoreGrade {
    GRADES
        .iter()
        .find(|g| (g.min..=g.max).contains(&score))
        .unwrap_or(&GRADES[GRADES.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(get_score_grade(100).label, "Excellent");
        assert_eq!(get_score_grade(90).label, "Excellent");
        assert_eq!(get_score_grade(89).label, "Very Good");
        assert_eq!(get_score_grade(70).label, "Good");
        assert_eq!(get_score_grade(69).label, "Fair");
        assert_eq!(get_score_grade(59).label, "Poor");
        assert_eq!(get_score_grade(0).label, "Poor");
    }

    #[test]
    fn test_grade_total_without_gaps() {
        for score in 0..=100 {
            let hits = GRADES.iter().filter(|g| (g.min..=g.max).contains(&score)).count();
            assert_eq!(hits, 1, "score {} matched {} bands", score, hits);
        }
    }

    #[test]
    fn test_grade_fallback() {
        assert_eq!(get_score_grade(-5).label, "Poor");
        assert_eq!(get_score_grade(150).label, "Poor");
    }
}
