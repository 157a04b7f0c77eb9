//! Text transforms applied when copying an entry back out.
//!
//! All functions are pure; stored entries are never modified.

const URL_PREFIXES: &[&str] = &["https://", "http://", "www."];

/// Characters stripped from the end of a detected URL
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '>', '"', '\''];

pub fn trim_whitespace(text: &str) -> String {
    text.trim().to_string()
}

/// Collapse all whitespace runs (newlines included) into single spaces
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// URLs in order of first appearance, without duplicates.
///
/// Recognizes `http://`, `https://` and bare `www.` links.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        let lower = token.to_ascii_lowercase();
        let Some((start, prefix_len)) = URL_PREFIXES
            .iter()
            .filter_map(|p| lower.find(p).map(|i| (i, p.len())))
            .min()
        else {
            continue;
        };
        let url = token[start..].trim_end_matches(URL_TRAILING_PUNCTUATION);
        if url.len() <= prefix_len {
            continue;
        }
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// [`extract_urls`] joined by newlines
pub fn extract_urls_text(text: &str) -> String {
    extract_urls(text).join("\n")
}

/// The text as a quoted JSON string literal
pub fn json_escape(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// Split into lowercase words on separators and lower-to-upper case changes
fn words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in text.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn to_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, word) in words(text).iter().enumerate() {
        if i == 0 {
            out.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

pub fn to_snake_case(text: &str) -> String {
    words(text).join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_one_line() {
        assert_eq!(trim_whitespace("  hello \n"), "hello");
        assert_eq!(one_line("a\n  b \t c"), "a b c");
        assert_eq!(one_line("   "), "");
    }

    #[test]
    fn test_extract_urls_in_order() {
        let urls = extract_urls("visit https://example.com and http://foo.test/path and www.site.org.");
        assert_eq!(
            urls,
            vec!["https://example.com", "http://foo.test/path", "www.site.org"]
        );
    }

    #[test]
    fn test_extract_urls_dedupes() {
        assert_eq!(
            extract_urls("http://a.com http://a.com https://b.com"),
            vec!["http://a.com", "https://b.com"]
        );
    }

    #[test]
    fn test_extract_urls_inside_punctuation() {
        assert_eq!(extract_urls("(see <https://x.io/a>)"), vec!["https://x.io/a"]);
        assert!(extract_urls("no links here, just http:// and www.").is_empty());
    }

    #[test]
    fn test_extract_urls_text() {
        assert_eq!(extract_urls_text("here: https://x"), "https://x");
        assert_eq!(extract_urls_text("https://a https://b"), "https://a\nhttps://b");
        assert_eq!(extract_urls_text("nothing"), "");
    }

    #[test]
    fn test_json_escape() {
        let escaped = json_escape("He said \"Hi\"\n");
        assert_eq!(escaped, r#""He said \"Hi\"\n""#);
    }

    #[test]
    fn test_casing() {
        assert_eq!(to_camel_case("hello world-test"), "helloWorldTest");
        assert_eq!(to_snake_case("hello world-test"), "hello_world_test");
        assert_eq!(to_camel_case("Hello World_example"), "helloWorldExample");
        assert_eq!(to_snake_case("Hello World_example"), "hello_world_example");
        assert_eq!(to_snake_case("parseJsonResponse"), "parse_json_response");
        assert_eq!(to_camel_case(""), "");
    }
}
