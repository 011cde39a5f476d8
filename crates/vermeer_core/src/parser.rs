//! Loose `key: value` parsing for generation commands.
//!
//! A key is a run of word characters followed by a colon. Its value runs up
//! to the next `word:` token or the end of the message. Values are not quoted
//! and cannot contain colons: `prompt: a:b cat` splits early into
//! `prompt = ""` and `a = "b cat"`. That is a known limitation of the command
//! syntax and is kept on purpose so existing commands keep their meaning.

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Extracts `key: value` pairs in message order.
///
/// Values are trimmed. Text before the first key is ignored, and a message
/// with no keys yields no pairs.
///
/// # Examples
///
/// ```
/// use vermeer_core::parse_key_values;
///
/// let pairs = parse_key_values("prompt: a cat batch_count: 3");
/// assert_eq!(
///     pairs,
///     vec![
///         ("prompt".to_string(), "a cat".to_string()),
///         ("batch_count".to_string(), "3".to_string()),
///     ]
/// );
/// ```
pub fn parse_key_values(message: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = message.chars().collect();
    let mut pairs = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        match match_pair_at(&chars, pos) {
            Some((key, value, end)) => {
                pairs.push((key, value));
                pos = end;
            }
            None => pos += 1,
        }
    }

    pairs
}

/// Tries to read one pair starting at `start`; returns the pair and the
/// position where scanning resumes.
fn match_pair_at(chars: &[char], start: usize) -> Option<(String, String, usize)> {
    let key_len = chars[start..].iter().take_while(|c| is_word(**c)).count();
    let key_end = start + key_len;
    if key_len == 0 || chars.get(key_end) != Some(&':') {
        return None;
    }

    let value_start = key_end + 1;
    let limit = value_start + chars[value_start..].iter().take_while(|c| **c != ':').count();

    // Longest value that is followed by end of input or by `\s+\w+:`.
    let end = (value_start..=limit)
        .rev()
        .find(|&end| value_may_end_at(chars, end))?;

    let key: String = chars[start..key_end].iter().collect();
    let value: String = chars[value_start..end].iter().collect();
    Some((key, value.trim().to_string(), end))
}

fn value_may_end_at(chars: &[char], end: usize) -> bool {
    if end == chars.len() {
        return true;
    }

    let spaces = chars[end..].iter().take_while(|c| c.is_whitespace()).count();
    if spaces == 0 {
        return false;
    }

    let word_start = end + spaces;
    let word_len = chars[word_start..].iter().take_while(|c| is_word(**c)).count();
    word_len > 0 && chars.get(word_start + word_len) == Some(&':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(message: &str) -> Vec<(String, String)> {
        parse_key_values(message)
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_no_keys_yields_nothing() {
        assert!(pairs("a cat sitting on a mat").is_empty());
        assert!(pairs("").is_empty());
    }

    #[test]
    fn test_values_are_trimmed() {
        assert_eq!(
            pairs("prompt:    a red fox   steps:  30  "),
            vec![pair("prompt", "a red fox"), pair("steps", "30")]
        );
    }

    #[test]
    fn test_leading_text_is_ignored() {
        assert_eq!(
            pairs("please draw prompt: a lighthouse"),
            vec![pair("prompt", "a lighthouse")]
        );
    }

    #[test]
    fn test_colon_inside_value_splits_early() {
        assert_eq!(
            pairs("prompt: a:b cat"),
            vec![pair("prompt", ""), pair("a", "b cat")]
        );
    }

    #[test]
    fn test_key_without_space_after_colon() {
        assert_eq!(
            pairs("seed:42 prompt:moon"),
            vec![pair("seed", "42"), pair("prompt", "moon")]
        );
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(
            pairs("prompt: кот в шляпе steps: 8"),
            vec![pair("prompt", "кот в шляпе"), pair("steps", "8")]
        );
    }

    #[test]
    fn test_multiline_values() {
        assert_eq!(
            pairs("prompt: a cat\nnegative_prompt: blurry"),
            vec![pair("prompt", "a cat"), pair("negative_prompt", "blurry")]
        );
    }
}
