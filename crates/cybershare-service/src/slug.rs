//! URL slug generation shared by posts, categories and tags.

use std::future::Future;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use cybershare_core::result::AppResult;

/// Slug used when nothing usable remains after normalization.
pub const FALLBACK_SLUG: &str = "post";

/// Turn free text into a URL slug.
///
/// Text is decomposed (NFD) and combining marks are dropped, so accented
/// Latin letters fold to their base letter. Whitespace becomes `-`, anything
/// outside `[A-Za-z0-9_-]` is dropped and the result is lowercased.
pub fn slugify(input: &str) -> String {
    let slug: String = input
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else {
                let folded = fold_stroke(c);
                (folded.is_ascii_alphanumeric() || folded == '_' || folded == '-').then_some(folded)
            }
        })
        .collect::<String>()
        .to_lowercase();

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Append `-1`, `-2`, … to `base` until `exists` reports a free slug.
pub async fn unique_slug<F, Fut>(base: &str, mut exists: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    if !exists(base.to_string()).await? {
        return Ok(base.to_string());
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}-{counter}");
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Letters with a stroke or ligature have no canonical decomposition.
fn fold_stroke(c: char) -> char {
    match c {
        'đ' => 'd',
        'Đ' => 'D',
        'ł' => 'l',
        'Ł' => 'L',
        'ø' => 'o',
        'Ø' => 'O',
        'ħ' => 'h',
        'Ħ' => 'H',
        'ı' => 'i',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust  2024 "), "rust--2024");
    }

    #[test]
    fn test_folds_diacritics() {
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("Tiếng Việt"), "tieng-viet");
        assert_eq!(slugify("Đà Nẵng"), "da-nang");
    }

    #[test]
    fn test_folds_marks_outside_western_europe() {
        assert_eq!(slugify("București Ağaç Třešně"), "bucuresti-agac-tresne");
        assert_eq!(slugify("Łódź Ţară ǎľ"), "lodz-tara-al");
    }

    #[test]
    fn test_drops_punctuation_and_keeps_underscore() {
        assert_eq!(slugify("What's new? (v2)"), "whats-new-v2");
        assert_eq!(slugify("snake_case-title"), "snake_case-title");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("你好"), FALLBACK_SLUG);
    }

    #[tokio::test]
    async fn test_unique_slug_appends_counter() {
        let taken = ["hello", "hello-1"];
        let slug = unique_slug("hello", |s| async move { Ok(taken.contains(&s.as_str())) })
            .await
            .unwrap();
        assert_eq!(slug, "hello-2");
    }

    #[tokio::test]
    async fn test_unique_slug_free_base() {
        let slug = unique_slug("fresh", |_| async { Ok(false) }).await.unwrap();
        assert_eq!(slug, "fresh");
    }
}
