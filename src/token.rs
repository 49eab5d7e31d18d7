//! Tokenizer — uppercases input and splits it into an alternating
//! word/separator byte-string stream, enforcing a sentence-terminal token.
//!
//! Input is treated as raw ASCII bytes, not Unicode text: `isalpha`/`isdigit`
//! classify individual bytes, and uppercasing only touches the ASCII range.
//! This is a deliberate non-goal of the engine (see crate docs), not an
//! oversight.

#[inline]
fn is_alpha(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

#[inline]
fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn uppercase_ascii(text: &str) -> Vec<u8> {
    text.bytes().map(|b| b.to_ascii_uppercase()).collect()
}

/// Boundary positions in `bytes`, always including `0` and `bytes.len()`.
fn compute_boundaries(bytes: &[u8]) -> Vec<usize> {
    let len = bytes.len();
    let mut boundaries = vec![0usize];

    for p in 1..len {
        let cur = bytes[p];
        let prev = bytes[p - 1];

        // DON'T / I'M / YOU'RE: an apostrophe between two letters never
        // splits, from either side of the apostrophe.
        let apostrophe_before = cur == b'\'' && is_alpha(prev) && p + 1 < len && is_alpha(bytes[p + 1]);
        let apostrophe_after = prev == b'\'' && p >= 2 && is_alpha(bytes[p - 2]) && is_alpha(cur);
        if apostrophe_before || apostrophe_after {
            continue;
        }

        let alpha_edge = is_alpha(cur) != is_alpha(prev);
        let digit_edge = is_digit(cur) != is_digit(prev);
        if alpha_edge || digit_edge {
            boundaries.push(p);
        }
    }

    boundaries.push(len);
    boundaries
}

/// Replace or extend the last token so the stream always ends on a
/// sentence-terminal token.
fn apply_sentence_terminal(tokens: &mut Vec<Vec<u8>>) {
    let Some(last) = tokens.last() else {
        tokens.push(b".".to_vec());
        return;
    };
    let first_byte = last[0];
    if first_byte.is_ascii_alphanumeric() {
        tokens.push(b".".to_vec());
        return;
    }
    let last_byte = *last.last().unwrap();
    if !matches!(last_byte, b'!' | b'.' | b'?') {
        *tokens.last_mut().unwrap() = b".".to_vec();
    }
}

/// Uppercase and segment `text` into word/separator byte-string tokens.
///
/// Total and infallible: empty input yields `["."]`.
pub fn tokenize(text: &str) -> Vec<Vec<u8>> {
    let bytes = uppercase_ascii(text);
    if bytes.is_empty() {
        return vec![b".".to_vec()];
    }

    let boundaries = compute_boundaries(&bytes);
    let mut tokens: Vec<Vec<u8>> = boundaries
        .windows(2)
        .map(|w| bytes[w[0]..w[1]].to_vec())
        .collect();

    apply_sentence_terminal(&mut tokens);
    tokens
}
