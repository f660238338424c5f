//! Classification of raw property values.

use crate::discovery::UnitHandle;

/// Marker opening a deferred expression (`$<...>`), which only a later build
/// stage can evaluate.
pub const PLACEHOLDER_SENTINEL: &str = "$<";

/// A raw property value, classified once when it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Scalar(String),
    UnitReference(UnitHandle),
    /// Deferred-expression placeholder, never written out.
    Ignorable,
}

/// True for values such as `$<LINK_ONLY:Foo::bar>` or `$<$<CONFIG:Debug>:-g>`.
pub fn is_placeholder(value: &str) -> bool {
    value
        .strip_prefix(PLACEHOLDER_SENTINEL)
        .is_some_and(|rest| rest.contains('>'))
}

/// Rejoin list items that were split on a `;` inside a deferred expression,
/// so `$<$<CONFIG:Debug>:-g` followed by `-O0>` becomes
/// `$<$<CONFIG:Debug>:-g;-O0>` again. An expression left open at the end is
/// kept as it is.
pub fn rejoin_placeholders(values: Vec<String>) -> Vec<String> {
    let mut joined = Vec::with_capacity(values.len());
    let mut open: Option<String> = None;

    for value in values {
        let current = match open.take() {
            Some(mut head) => {
                head.push(';');
                head.push_str(&value);
                head
            }
            None => value,
        };

        if is_unterminated(&current) {
            open = Some(current);
        } else {
            joined.push(current);
        }
    }

    joined.extend(open);
    joined
}

fn is_unterminated(value: &str) -> bool {
    value.matches(PLACEHOLDER_SENTINEL).count() > value.matches('>').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert!(is_placeholder("$<LINK_ONLY:Foo::bar>"));
        assert!(is_placeholder("$<$<CONFIG:Debug>:-g>"));
        assert!(is_placeholder("$<BUILD_INTERFACE:/src/include>"));
        assert!(is_placeholder("$<>"));
    }

    #[test]
    fn test_not_placeholders() {
        assert!(!is_placeholder("/usr/include"));
        assert!(!is_placeholder("$ENV{HOME}"));
        assert!(!is_placeholder("$<unterminated"));
        assert!(!is_placeholder("-DFOO=$<BAR>"));
        assert!(!is_placeholder(""));
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_rejoin_split_expression() {
        let values = strings(&["$<$<CONFIG:Debug>:-g", "-O0>", "-Wall"]);
        assert_eq!(
            rejoin_placeholders(values),
            strings(&["$<$<CONFIG:Debug>:-g;-O0>", "-Wall"])
        );

        let values = strings(&["$<$<CONFIG:Debug>:a", "b", "c>", "$<LINK_ONLY:m>"]);
        assert_eq!(
            rejoin_placeholders(values),
            strings(&["$<$<CONFIG:Debug>:a;b;c>", "$<LINK_ONLY:m>"])
        );
    }

    #[test]
    fn test_rejoin_leaves_plain_values_alone() {
        let values = strings(&["-Wall", "a->b", "/usr/include"]);
        assert_eq!(rejoin_placeholders(values.clone()), values);

        let values = strings(&["$<unterminated", "tail"]);
        assert_eq!(rejoin_placeholders(values), strings(&["$<unterminated;tail"]));
    }
}
