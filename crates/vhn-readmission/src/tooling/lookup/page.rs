use regex::Regex;
use std::sync::OnceLock;

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<h1\b[^>]*\bclass\s*=\s*["'][^"']*\bpageTitle\b[^"']*["'][^>]*>(.*?)</h1>"#)
            .expect("title pattern compiles")
    })
}

fn meta_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<meta\b[^>]*\bname\s*=\s*["']description["'][^>]*>"#)
            .expect("meta pattern compiles")
    })
}

fn content_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("content pattern compiles")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"))
}

/// Pulls a code description out of a lookup page: the page title heading with
/// the code itself removed, else the meta description. A title heading that is
/// present but empty yields `None` without consulting the meta tag.
pub(crate) fn extract_description(html: &str, code: &str) -> Option<String> {
    if let Some(captures) = title_pattern().captures(html) {
        let text = visible_text(&captures[1]);
        let description = text
            .replace(code, "")
            .trim_matches(|c| c == ' ' || c == '-')
            .to_string();
        return Some(description).filter(|value| !value.is_empty());
    }

    let meta = meta_pattern().find(html)?;
    let content = content_pattern().captures(meta.as_str())?;
    let value = content.get(1).or_else(|| content.get(2))?.as_str();
    Some(decode_entities(value.trim())).filter(|value| !value.is_empty())
}

fn visible_text(fragment: &str) -> String {
    let stripped = tag_pattern().replace_all(fragment, " ");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_heading_wins_and_drops_the_code() {
        let html = r#"<html><head><meta name="description" content="fallback"></head>
<body><h1 class="pageTitle">250.01 - Diabetes mellitus &amp; <span>type I</span></h1></body></html>"#;
        assert_eq!(
            extract_description(html, "250.01").as_deref(),
            Some("Diabetes mellitus & type I")
        );
    }

    #[test]
    fn falls_back_to_meta_description() {
        let html = r#"<meta content='Essential hypertension' name="description" />"#;
        assert_eq!(
            extract_description(html, "401").as_deref(),
            Some("Essential hypertension")
        );
    }

    #[test]
    fn empty_title_does_not_fall_back() {
        let html = r#"<h1 class="pageTitle">428 -</h1><meta name="description" content="x">"#;
        assert_eq!(extract_description(html, "428"), None);
    }

    #[test]
    fn page_without_markers_yields_none() {
        assert_eq!(extract_description("<p>nothing</p>", "V57"), None);
        assert_eq!(
            extract_description(r#"<meta name="description" content="  ">"#, "V57"),
            None
        );
    }
}
