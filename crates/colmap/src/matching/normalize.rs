//! Canonical comparison form for column names.
//!
//! Spreadsheet headers arrive with inconsistent case, stray whitespace and
//! bilingual labels such as `Name (名称)` or `Email【邮箱】`. The normalized form
//! keeps only the leading label so both sides of a comparison line up, while
//! [`ColumnName`](crate::schema::ColumnName) keeps the raw header for display.

/// Bracket pairs recognised as trailing annotations.
const BRACKETS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('（', '）'),
    ('【', '】'),
];

/// Normalize a raw column name for comparison.
///
/// Lowercases, trims, collapses whitespace runs, and strips trailing bracketed
/// annotations. Empty input gives an empty string. The result is a fixpoint:
/// `normalize(&normalize(x)) == normalize(x)`.
///
/// ```
/// use colmap::normalize;
///
/// assert_eq!(normalize("  Phone   Number "), "phone number");
/// assert_eq!(normalize("Name (名称)"), "name");
/// assert_eq!(normalize("(Remarks)"), "remarks");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut current = collapse_whitespace(&raw.to_lowercase());
    loop {
        match strip_annotation(&current) {
            Some(next) => current = next,
            None => return current,
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove one trailing bracket group. Returns `None` when nothing changes.
///
/// When the group spans the whole string it is unwrapped instead, so a header
/// that is entirely an annotation still has a comparable form.
fn strip_annotation(s: &str) -> Option<String> {
    let close = s.chars().next_back()?;
    let open = BRACKETS
        .iter()
        .find(|(_, c)| *c == close)
        .map(|(o, _)| *o)?;
    let start = matching_open(s, open, close)?;

    let head = s[..start].trim_end();
    if head.is_empty() {
        let inner = &s[start + open.len_utf8()..s.len() - close.len_utf8()];
        Some(collapse_whitespace(inner))
    } else {
        Some(head.to_string())
    }
}

/// Byte offset of the bracket that opens the group closed by the last character.
fn matching_open(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in s.char_indices().rev() {
        if ch == close {
            depth += 1;
        } else if ch == open {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize("Website "), "website");
        assert_eq!(normalize("\tCustomer\u{3000} Name\n"), "customer name");
        assert_eq!(normalize("EMAIL"), "email");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("()"), "");
    }

    #[test]
    fn test_bilingual_annotations() {
        assert_eq!(normalize("Name (名称)"), "name");
        assert_eq!(normalize("Email【邮箱】"), "email");
        assert_eq!(normalize("电话（Phone）"), "电话");
        assert_eq!(normalize("Qty [pcs] (数量)"), "qty");
    }

    #[test]
    fn test_nested_annotation() {
        assert_eq!(normalize("Price (incl. tax (10%))"), "price");
    }

    #[test]
    fn test_whole_string_annotation_is_unwrapped() {
        assert_eq!(normalize("(Remarks)"), "remarks");
        assert_eq!(normalize("(Remarks (备注))"), "remarks");
    }

    #[test]
    fn test_unbalanced_brackets_left_alone() {
        assert_eq!(normalize("Total)"), "total)");
        assert_eq!(normalize("(Total"), "(total");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "Name (名称)",
            "(a) (b)",
            "((a) b)",
            "(x (y))",
            "  Mixed   CASE  ",
            "【】",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }
}
