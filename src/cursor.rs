//! Cursor offsets are counted in chars (Unicode scalar values), never bytes.

/// Clamp a cursor offset into `[0, char count]`.
pub fn clamp(text: &str, cursor: usize) -> usize {
    cursor.min(text.chars().count())
}

/// Byte index of the char at `offset`; the text length when past the end.
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Substring between two char offsets.
pub fn slice(text: &str, start: usize, end: usize) -> &str {
    &text[byte_index(text, start)..byte_index(text, end)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp("abc", 10), 3);
        assert_eq!(clamp("abc", 1), 1);
        assert_eq!(clamp("", 4), 0);
    }

    #[test]
    fn test_slice_counts_chars() {
        let s = "héllo @José";
        assert_eq!(slice(s, 6, 11), "@José");
        assert_eq!(slice(s, 0, 2), "hé");
    }
}
