//! 퍼지・発音照合モジュール（拡張マッチ）
//!
//! 辞書の部分一致で見つからなかった語に対する補助戦略。
//! - FuzzyMatcher: 編集距離で綴りの揺れ・タイプミスを許容
//! - PhoneticMatcher: 韓国語は字母キー、英語はDouble Metaphoneで音の近さを判定
//!
//! どちらも通常照合より低い重みで、信頼度を下げる扱い。

use crate::normalize::{detect_script, tokenize, NormalizedNote, Script};
use crate::types::MatchTier;
use rphonetic::DoubleMetaphone;

/// 照合戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// 辞書の部分一致のみ（決定的）
    #[default]
    Baseline,
    /// 部分一致で外れた語に補助戦略を適用
    Enhanced,
}

impl MatchStrategy {
    pub fn from_flag(use_enhanced: bool) -> Self {
        if use_enhanced {
            MatchStrategy::Enhanced
        } else {
            MatchStrategy::Baseline
        }
    }

    pub fn is_enhanced(self) -> bool {
        self == MatchStrategy::Enhanced
    }
}

/// 補助照合のインターフェース
pub trait FallbackMatcher: Send + Sync {
    /// この戦略で一致した場合のティア
    fn tier(&self) -> MatchTier;

    /// 正規化済みの語をノート中から探し、一致したノート側の断片を返す
    fn find(&self, term: &str, note: &NormalizedNote) -> Option<String>;
}

/// 編集距離ベースの照合
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    /// 許容する編集距離（語の文字数に対する割合）
    pub max_distance_ratio: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            max_distance_ratio: 0.2,
        }
    }
}

impl FallbackMatcher for FuzzyMatcher {
    fn tier(&self) -> MatchTier {
        MatchTier::Fuzzy
    }

    fn find(&self, term: &str, note: &NormalizedNote) -> Option<String> {
        let term_len = term.chars().count();
        let allowed = (self.max_distance_ratio * term_len as f64).floor() as usize;
        if allowed == 0 {
            return None;
        }

        let word_count = tokenize(term).len();
        note.windows(word_count)
            .into_iter()
            .map(|window| (levenshtein_distance(term, &window), window))
            .filter(|(distance, _)| *distance <= allowed)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, window)| window)
    }
}

/// 発音の近さによる照合
pub struct PhoneticMatcher {
    encoder: DoubleMetaphone,
    /// 韓国語キー同士で必要な類似度
    pub hangul_min_similarity: f64,
}

impl Default for PhoneticMatcher {
    fn default() -> Self {
        Self {
            encoder: DoubleMetaphone::default(),
            hangul_min_similarity: 0.8,
        }
    }
}

impl PhoneticMatcher {
    /// 英単語の発音コード（primary/alternate）
    pub fn encode(&self, word: &str) -> Vec<String> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return vec![];
        }

        let result = self.encoder.double_metaphone(&word);
        let primary = result.primary();
        let alternate = result.alternate();

        let mut codes = vec![primary.to_string()];
        if !alternate.is_empty() && alternate != primary {
            codes.push(alternate.to_string());
        }
        codes
    }

    fn latin_words_match(&self, a: &str, b: &str) -> bool {
        // 短い語はコードが衝突しやすい
        if a.chars().count() < 4 || b.chars().count() < 4 {
            return a == b;
        }
        let codes_a = self.encode(a);
        let codes_b = self.encode(b);
        codes_a.iter().any(|c| !c.is_empty() && codes_b.contains(c))
    }

    fn window_matches(&self, term: &str, window: &str) -> bool {
        match detect_script(term) {
            Script::Hangul => {
                detect_script(window) == Script::Hangul
                    && similarity(&hangul_phonetic_key(term), &hangul_phonetic_key(window))
                        >= self.hangul_min_similarity
            }
            Script::Latin => {
                let term_words = tokenize(term);
                let window_words = tokenize(window);
                term_words.len() == window_words.len()
                    && term_words
                        .iter()
                        .zip(&window_words)
                        .all(|(a, b)| self.latin_words_match(a, b))
            }
            _ => false,
        }
    }
}

impl FallbackMatcher for PhoneticMatcher {
    fn tier(&self) -> MatchTier {
        MatchTier::Phonetic
    }

    fn find(&self, term: &str, note: &NormalizedNote) -> Option<String> {
        let word_count = tokenize(term).len();
        note.windows(word_count)
            .into_iter()
            .find(|window| self.window_matches(term, window))
    }
}

/// 拡張マッチで使う補助戦略（優先順）
pub fn enhanced_matchers(max_distance_ratio: f64) -> Vec<Box<dyn FallbackMatcher>> {
    vec![
        Box::new(FuzzyMatcher { max_distance_ratio }),
        Box::new(PhoneticMatcher::default()),
    ]
}

/// 類似度を計算（編集距離ベース）
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = levenshtein_distance(a, b);
    let max_len = a.chars().count().max(b.chars().count());

    1.0 - (distance as f64 / max_len as f64)
}

/// レーベンシュタイン距離を計算
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // 2行だけ保持
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

const HANGUL_BASE: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;

// 初声19字: ㄱㄲㄴㄷㄸㄹㅁㅂㅃㅅㅆㅇㅈㅉㅊㅋㅌㅍㅎ
const CHOSEONG_KEY: [&str; 19] = [
    "k", "k", "n", "t", "t", "r", "m", "p", "p", "s", "s", "", "c", "c", "c", "k", "t", "p", "h",
];

// 中声21字: ㅏㅐㅑㅒㅓㅔㅕㅖㅗㅘㅙㅚㅛㅜㅝㅞㅟㅠㅡㅢㅣ
const JUNGSEONG_KEY: [&str; 21] = [
    "a", "a", "a", "a", "e", "e", "e", "e", "o", "a", "e", "e", "o", "u", "e", "e", "i", "u", "",
    "i", "i",
];

// 終声28字（0はなし）。代表音7つに中和
const JONGSEONG_KEY: [&str; 28] = [
    "", "k", "k", "k", "n", "n", "n", "t", "r", "k", "m", "r", "r", "r", "p", "r", "m", "p", "p",
    "t", "t", "g", "t", "t", "k", "t", "p", "t",
];

/// ハングル音節を字母に分解する（初声, 中声, 終声のインデックス）
pub fn decompose_syllable(c: char) -> Option<(usize, usize, usize)> {
    let code = c as u32;
    if !(HANGUL_BASE..=HANGUL_LAST).contains(&code) {
        return None;
    }
    let offset = code - HANGUL_BASE;
    let cho = offset / 588;
    let jung = (offset % 588) / 28;
    let jong = offset % 28;
    Some((cho as usize, jung as usize, jong as usize))
}

/// 韓国語の粗い発音キー
///
/// 平音/激音/濃音と似た母音をまとめ、外来語表記の揺れ（캐러멜/카라멜, 초콜릿/초콜렛）を吸収する。
pub fn hangul_phonetic_key(text: &str) -> String {
    let mut key = String::new();
    for c in text.chars() {
        if let Some((cho, jung, jong)) = decompose_syllable(c) {
            key.push_str(CHOSEONG_KEY[cho]);
            key.push_str(JUNGSEONG_KEY[jung]);
            key.push_str(JONGSEONG_KEY[jong]);
        } else if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        }
    }
    key
}
