use serde::{Deserialize, Serialize};

/// Count placings 1-4 among the first three digits of a form string.
///
/// Non-digit filler (`x`, `-`, spaces) is skipped, so `"x14"` reads as `1, 4`
/// and `"2-843"` as `2, 8, 4`.
pub fn count_top4_in_last3(form: &str) -> usize {
    form.chars()
        .filter(|c| c.is_ascii_digit())
        .take(3)
        .filter(|c| matches!(c, '1'..='4'))
        .count()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFlags {
    pub up_in_trip: bool,
    pub down_in_class: bool,
    pub forgive: bool,
}

/// Lexical spike-signal detection, case-insensitive.
pub fn extract_form_flags(text: &str) -> FormFlags {
    if text.is_empty() {
        return FormFlags::default();
    }
    let lower = text.to_lowercase();
    FormFlags {
        up_in_trip: lower.contains("up in trip") || lower.contains("step up"),
        down_in_class: lower.contains("down in class") || lower.contains("drop"),
        forgive: lower.contains("forgive") || lower.contains("excuse"),
    }
}

#[cfg(test)]
mod tests {
    use super::{FormFlags, count_top4_in_last3, extract_form_flags};

    #[test]
    fn top4_uses_first_three_digits_only() {
        assert_eq!(count_top4_in_last3("114"), 3);
        assert_eq!(count_top4_in_last3("12x3"), 3);
        assert_eq!(count_top4_in_last3("x14"), 2);
        assert_eq!(count_top4_in_last3("2-843"), 2);
        assert_eq!(count_top4_in_last3("9871"), 0);
        assert_eq!(count_top4_in_last3("First Start"), 0);
        assert_eq!(count_top4_in_last3(""), 0);
    }

    #[test]
    fn flags_are_case_insensitive() {
        let flags = extract_form_flags("Step Up to 1600m, DROP in grade");
        assert!(flags.up_in_trip);
        assert!(flags.down_in_class);
        assert!(!flags.forgive);

        let flags = extract_form_flags("forgive last (held up)");
        assert!(flags.forgive);
        assert!(!flags.up_in_trip && !flags.down_in_class);

        assert_eq!(extract_form_flags("x14"), FormFlags::default());
    }
}
