//! Helpers shared by config, models, and the CLI.

/// Trimmed text, or `None` when the input is missing or blank.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some(" \n\t ".to_string())), None);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            normalize_text_option(Some("  calm  ".to_string())),
            Some("calm".to_string())
        );
    }
}
