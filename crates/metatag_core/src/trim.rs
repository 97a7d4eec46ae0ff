use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimMethod {
    #[default]
    BeforeValue,
    AfterValue,
    OnValue,
}

pub fn trim_value(value: &str, max_length: usize, method: TrimMethod) -> String {
    if max_length == 0 || value.chars().count() <= max_length {
        return value.to_string();
    }
    let cut = value
        .char_indices()
        .nth(max_length)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len());
    let trimmed = match method {
        TrimMethod::OnValue => &value[..cut],
        TrimMethod::BeforeValue if value[cut..].starts_with(' ') => &value[..cut],
        TrimMethod::BeforeValue => match value[..cut].rfind(' ') {
            Some(space) if space > 0 => &value[..space],
            _ => &value[..cut],
        },
        TrimMethod::AfterValue => match value[cut..].find(' ') {
            Some(space) => &value[..cut + space],
            None => value,
        },
    };
    trimmed.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The quick brown fox jumps";

    #[test]
    fn short_values_are_untouched() {
        assert_eq!(trim_value("short", 10, TrimMethod::BeforeValue), "short");
        assert_eq!(trim_value(TEXT, 0, TrimMethod::OnValue), TEXT);
    }

    #[test]
    fn trims_before_word_boundary() {
        assert_eq!(trim_value(TEXT, 12, TrimMethod::BeforeValue), "The quick");
        assert_eq!(trim_value(TEXT, 9, TrimMethod::BeforeValue), "The quick");
    }

    #[test]
    fn trims_after_word_boundary() {
        assert_eq!(trim_value(TEXT, 12, TrimMethod::AfterValue), "The quick brown");
        assert_eq!(trim_value(TEXT, 22, TrimMethod::AfterValue), TEXT);
    }

    #[test]
    fn trims_on_value() {
        assert_eq!(trim_value(TEXT, 12, TrimMethod::OnValue), "The quick br");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(trim_value("ééééé", 3, TrimMethod::OnValue), "ééé");
    }
}
