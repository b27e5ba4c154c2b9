//! Text normalization for word and meaning comparison.

/// Normalize whitespace in a string (trim and collapse multiple spaces).
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a word for comparison: trimmed, collapsed and case-folded.
pub fn normalize_word(word: &str) -> String {
    normalize_whitespace(word).to_lowercase()
}

/// Normalize a meaning. Case is preserved.
///
/// Full-width separators are mapped to their ASCII form and list separators
/// (`,` and `;`) are rendered as `", "` / `"; "` so that `苹果，水果`,
/// `苹果,水果` and `苹果 , 水果` all compare equal.
pub fn normalize_meaning(meaning: &str) -> String {
    let mut out = String::with_capacity(meaning.len());

    for c in meaning.chars().map(half_width) {
        match c {
            ',' | ';' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push(c);
                out.push(' ');
            }
            c if c.is_whitespace() => out.push(' '),
            c => out.push(c),
        }
    }

    normalize_whitespace(&out)
}

fn half_width(c: char) -> char {
    match c {
        '，' | '、' => ',',
        '；' => ';',
        '：' => ':',
        '／' => '/',
        '（' => '(',
        '）' => ')',
        '\u{3000}' => ' ',
        c => c,
    }
}
