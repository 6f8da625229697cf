//! テキスト正規化モジュール
//!
//! タグやロースターノートの断片を比較可能な形に揃える。
//!
//! ## 処理内容
//! 1. 全角スペース → 半角スペース
//! 2. 句読点・記号を区切りとして除去（ASCII/全角/CJK）
//! 3. 連続スペースを単一に、前後の空白を除去
//! 4. ラテン文字を小文字化（ハングルはそのまま）

use regex::Regex;

/// 文字種（言語ヒント）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Hangul,
    Latin,
    Mixed,
    Other,
    Empty,
}

/// ハングル音節・字母かどうか
pub fn is_hangul(c: char) -> bool {
    matches!(c,
        '\u{AC00}'..='\u{D7A3}'
        | '\u{1100}'..='\u{11FF}'
        | '\u{3130}'..='\u{318F}')
}

/// 文字種を判定する
///
/// 数字・記号・空白は判定に使わない。
pub fn detect_script(text: &str) -> Script {
    let mut hangul = false;
    let mut latin = false;
    let mut other = false;

    for c in text.chars() {
        if is_hangul(c) {
            hangul = true;
        } else if c.is_ascii_alphabetic() || matches!(c, '\u{00C0}'..='\u{024F}') {
            latin = true;
        } else if c.is_alphabetic() {
            other = true;
        }
    }

    match (hangul, latin, other) {
        (false, false, false) => Script::Empty,
        (true, false, false) => Script::Hangul,
        (false, true, false) => Script::Latin,
        (false, false, true) => Script::Other,
        _ => Script::Mixed,
    }
}

/// タグ・ノート断片を正規化する
///
/// 空入力には空文字列を返す。エラーにはならない。
pub fn normalize_text(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref PUNCT: Regex = Regex::new(r"[\p{P}\p{S}]+").unwrap();
        static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
    }

    if text.is_empty() {
        return String::new();
    }

    let replaced = text.replace('　', " ");
    let stripped = PUNCT.replace_all(&replaced, " ");
    let collapsed = SPACES.replace_all(&stripped, " ");

    collapsed.trim().to_lowercase()
}

/// 正規化済みテキストを単語に分割する
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}

/// 正規化済みのロースターノート
///
/// 照合のたびに正規化し直さないよう、本文とトークンを保持する。
#[derive(Debug, Clone)]
pub struct NormalizedNote {
    text: String,
    tokens: Vec<String>,
}

impl NormalizedNote {
    pub fn new(raw: &str) -> Self {
        let text = normalize_text(raw);
        let tokens = tokenize(&text).into_iter().map(str::to_string).collect();
        Self { text, tokens }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 正規化済みの語が部分一致で含まれるか
    pub fn contains(&self, normalized_term: &str) -> bool {
        !normalized_term.is_empty() && self.text.contains(normalized_term)
    }

    /// 語数 `n` の連続トークン窓を列挙する
    pub fn windows(&self, n: usize) -> Vec<String> {
        if n == 0 || self.tokens.len() < n {
            return Vec::new();
        }
        self.tokens.windows(n).map(|w| w.join(" ")).collect()
    }
}
