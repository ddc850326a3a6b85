//! Input sanitizers applied before validation and before settings are stored

use regex::Regex;

const LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Remove `<script>`/`<style>` blocks with their content, then every tag
fn strip_tags(input: &str) -> String {
    let without_blocks = match Regex::new(r"(?is)<(script|style)[^>]*>.*?</\s*(script|style)\s*>") {
        Ok(re) => re.replace_all(input, "").into_owned(),
        Err(_) => input.to_string(),
    };

    match Regex::new(r"<[^>]*>") {
        Ok(re) => re.replace_all(&without_blocks, "").into_owned(),
        Err(_) => without_blocks,
    }
}

/// Drop percent-encoded octets such as `%0A`
fn strip_octets(input: &str) -> String {
    match Regex::new(r"%[a-fA-F0-9]{2}") {
        Ok(re) => re.replace_all(input, "").into_owned(),
        Err(_) => input.to_string(),
    }
}

fn clean(input: &str) -> String {
    let stripped = strip_octets(&strip_tags(input));
    stripped
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}

/// Single-line text: tags and control characters removed, whitespace collapsed
pub fn sanitize_text_field(input: &str) -> String {
    clean(input).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Like [`sanitize_text_field`] but line breaks survive
pub fn sanitize_textarea_field(input: &str) -> String {
    let cleaned = clean(&input.replace("\r\n", "\n").replace('\r', "\n"));

    cleaned
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Strip characters that cannot appear in an address.
///
/// Returns an empty string when nothing address-shaped is left.
pub fn sanitize_email(input: &str) -> String {
    let email = input.trim();

    let (local, domain) = match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => (local, domain),
        _ => return String::new(),
    };

    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(*c))
        .collect();
    if local.is_empty() {
        return String::new();
    }

    let labels: Vec<String> = domain
        .to_ascii_lowercase()
        .split('.')
        .map(|label| {
            label
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .trim_matches('-')
                .to_string()
        })
        .filter(|label| !label.is_empty())
        .collect();

    if labels.len() < 2 {
        return String::new();
    }

    format!("{}@{}", local, labels.join("."))
}
