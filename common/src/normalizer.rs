//! ラベル正規化モジュール
//!
//! カテゴリラベルを比較用の形に揃える。
//!
//! ## 処理順
//! 1. 小文字化
//! 2. アクセント除去（NFKD分解して結合文字を捨てる）
//! 3. `&` `+` を ` and ` に、`/` `_` `-` を空白に置換
//! 4. `[a-z0-9 ]` 以外を除去
//! 5. 連続空白を1つにまとめてトリム
//! 6. 綴りの揺れを単語単位で統一（任意）
//!
//! 何度適用しても結果は変わらない。

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 綴りの揺れ（英式→米式など）
pub const SPELLING_VARIANTS: &[(&str, &str)] = &[
    ("centre", "center"),
    ("theatre", "theater"),
    ("tyre", "tire"),
    ("tyres", "tires"),
    ("jewellery", "jewelry"),
    ("behaviour", "behavior"),
    ("barbeque", "barbecue"),
    ("boulangerie", "bakery"),
    ("shoppe", "shop"),
];

/// 既定の正規化（綴り統一あり）
pub fn normalize(label: &str) -> String {
    normalize_with(label, true)
}

/// 欠損値を許す正規化
pub fn normalize_opt(label: Option<&str>) -> String {
    label.map(normalize).unwrap_or_default()
}

/// 正規化（綴り統一の有無を指定）
pub fn normalize_with(label: &str, canonicalize_spelling: bool) -> String {
    if label.trim().is_empty() {
        return String::new();
    }

    lazy_static::lazy_static! {
        static ref NON_ALNUM_RE: Regex = Regex::new(r"[^a-z0-9 ]+").unwrap();
        static ref MULTISPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    }

    let lowered = label.to_lowercase();

    let stripped: String = lowered
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut separated = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '&' | '+' => separated.push_str(" and "),
            '/' | '_' | '-' => separated.push(' '),
            c if c.is_whitespace() => separated.push(' '),
            c => separated.push(c),
        }
    }

    let cleaned = NON_ALNUM_RE.replace_all(&separated, "");
    let collapsed = MULTISPACE_RE.replace_all(cleaned.trim(), " ");

    if !canonicalize_spelling {
        return collapsed.into_owned();
    }

    collapsed
        .split(' ')
        .map(canonical_spelling)
        .collect::<Vec<_>>()
        .join(" ")
}

fn canonical_spelling(token: &str) -> &str {
    SPELLING_VARIANTS
        .iter()
        .find(|(from, _)| *from == token)
        .map(|(_, to)| *to)
        .unwrap_or(token)
}

/// 正規化済み文字列を空白で分割
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

/// 平坦化用のキー（空白を `_` に）
pub fn snake_key(label: &str) -> String {
    normalize(label).replace(' ', "_")
}
