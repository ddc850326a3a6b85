//! Template rendering with variable substitution

use chrono::Utc;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Variables every message template may use
pub const KNOWN_VARIABLES: &[&str] = &[
    "name", "email", "phone", "postcode", "site_name", "date", "time", "datetime",
];

/// Renders stored subjects and messages by substituting variables
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Render a string with variable substitution
    ///
    /// # System Variables
    /// - `{{date}}` - Current date (YYYY-MM-DD)
    /// - `{{time}}` - Current time (HH:MM:SS)
    /// - `{{datetime}}` - Current date and time
    ///
    /// Everything else comes from `vars`. Both `{{name}}` and `{{ name }}`
    /// are recognised; unknown placeholders are left untouched.
    pub fn render_string(template_str: &str, vars: &HashMap<String, String>) -> String {
        let now = Utc::now();
        let lookup = |key: &str| -> Option<String> {
            match vars.get(key) {
                Some(value) => Some(value.clone()),
                None => match key {
                    "date" => Some(now.format("%Y-%m-%d").to_string()),
                    "time" => Some(now.format("%H:%M:%S").to_string()),
                    "datetime" => Some(now.format("%Y-%m-%d %H:%M:%S").to_string()),
                    _ => None,
                },
            }
        };

        // One pass over the template; substituted values are never rescanned
        let placeholder = match Regex::new(r"\{\{ ?([A-Za-z0-9_]+) ?\}\}") {
            Ok(re) => re,
            Err(_) => return template_str.to_string(),
        };

        placeholder
            .replace_all(template_str, |caps: &Captures| {
                lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Render a subject line.
    ///
    /// Stored subjects use a printf-style `%s` for the primary value (the
    /// postcode for quote notifications); only the first one is filled.
    pub fn render_subject(subject: &str, value: &str, vars: &HashMap<String, String>) -> String {
        match subject.split_once("%s") {
            Some((before, after)) => format!(
                "{}{}{}",
                Self::render_string(before, vars),
                value,
                Self::render_string(after, vars)
            ),
            None => Self::render_string(subject, vars),
        }
    }

    /// Extract all variable names from a template string
    ///
    /// Returns a list of variable names found (without {{ }} markers)
    pub fn extract_variables(template_str: &str) -> Vec<String> {
        let mut variables = Vec::new();
        let mut chars = template_str.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '{' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                while let Some(ch) = chars.next() {
                    if ch == '}' && chars.peek() == Some(&'}') {
                        chars.next();
                        if !var_name.trim().is_empty() {
                            variables.push(var_name.trim().to_string());
                        }
                        break;
                    } else {
                        var_name.push(ch);
                    }
                }
            }
        }

        variables.sort();
        variables.dedup();
        variables
    }

    /// Placeholders in `template_str` that no message will ever fill
    pub fn unknown_variables(template_str: &str) -> Vec<String> {
        Self::extract_variables(template_str)
            .into_iter()
            .filter(|v| !KNOWN_VARIABLES.contains(&v.as_str()))
            .collect()
    }
}
