use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Parse a codes file content into a deduplicated candidate list.
///
/// Supported formats per line:
/// - single code token: `admin`
/// - comments: everything after `#` is ignored
/// - whitespace and blank lines are ignored
///
/// Order of first appearance is preserved; later duplicates are dropped.
pub fn parse_codes_str(s: &str) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (idx, raw_line) in s.lines().enumerate() {
        let line_no = idx + 1;
        // Strip comments and trim
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }

        let code = parse_code_str(line)
            .with_context(|| format!("line {line_no}: invalid code: {line}"))?;
        if seen.insert(code.clone()) {
            out.push(code);
        }
    }

    Ok(out)
}

/// Load a candidate list from a file path. Errors if the file cannot be read or parsed.
pub fn load_codes_from_path(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read codes file: {}", path.as_ref().display()))?;
    parse_codes_str(&content)
}

/// Load a candidate list from a file, or return the default list if missing or empty.
pub fn load_codes_or_default(path: impl AsRef<Path>) -> Vec<String> {
    match load_codes_from_path(&path) {
        Ok(v) if !v.is_empty() => v,
        _ => default_codes(),
    }
}

/// The built-in hospital-code guesses, ordered roughly by how often such
/// defaults show up in the wild.
pub fn default_codes() -> Vec<String> {
    const DEFAULT: &[&str] = &[
        "1234", "123456", "admin", "root", "hospital", "alcolens", "khaos", "doctor", "test",
        "0000", "secret", "password",
    ];
    DEFAULT.iter().map(|s| s.to_string()).collect()
}

fn parse_code_str(s: &str) -> Result<String> {
    if s.chars().any(char::is_whitespace) {
        bail!("code contains whitespace: {s}");
    }
    if s.len() > 64 {
        bail!("code too long: {} chars (max 64)", s.len());
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_codes() {
        let input = "1234\nadmin\n   root  \n";
        let codes = parse_codes_str(input).unwrap();
        assert_eq!(codes, vec!["1234", "admin", "root"]);
    }

    #[test]
    fn parse_dedups_preserving_first_appearance() {
        let input = "admin\n1234\nadmin\n";
        let codes = parse_codes_str(input).unwrap();
        assert_eq!(codes, vec!["admin", "1234"]);
    }

    #[test]
    fn parse_with_comments_and_whitespace() {
        let input = r#"
            # frequent defaults
            1234  # pin-style
            admin

            # blank lines and spaces should be fine
            khaos # the project codename is always worth a try
        "#;
        let codes = parse_codes_str(input).unwrap();
        assert_eq!(codes, vec!["1234", "admin", "khaos"]);
    }

    #[test]
    fn embedded_whitespace_errors() {
        let input = "not a code\n";
        assert!(parse_codes_str(input).is_err());
    }

    #[test]
    fn overlong_code_errors() {
        let input = "a".repeat(65);
        assert!(parse_codes_str(&input).is_err());
    }

    #[test]
    fn default_has_common_guesses() {
        let d = default_codes();
        assert!(!d.is_empty());
        assert!(d.iter().any(|c| c == "admin") && d.iter().any(|c| c == "password"));
    }
}
