use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("valid regex"));

/// Split text into batches of at most `max_chars` characters.
///
/// Prefers sentence boundaries, then word boundaries, and only cuts inside a
/// word when a single word is longer than `max_chars`.
pub fn split_into_batches(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current = String::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        push_segment(&mut batches, &mut current, &text[last_end..mat.end()], max_chars);
        last_end = mat.end();
    }

    // Remaining text after the last sentence boundary
    if last_end < text.len() {
        push_segment(&mut batches, &mut current, &text[last_end..], max_chars);
    }

    flush(&mut batches, &mut current);
    batches
}

fn push_segment(batches: &mut Vec<String>, current: &mut String, segment: &str, max_chars: usize) {
    if char_len(segment) <= max_chars {
        append(batches, current, segment, max_chars);
        return;
    }

    for word in segment.split_inclusive(char::is_whitespace) {
        if char_len(word) <= max_chars {
            append(batches, current, word, max_chars);
            continue;
        }

        flush(batches, current);
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(max_chars) {
            let piece: String = chunk.iter().collect();
            let piece = piece.trim();
            if !piece.is_empty() {
                batches.push(piece.to_string());
            }
        }
    }
}

fn append(batches: &mut Vec<String>, current: &mut String, piece: &str, max_chars: usize) {
    if !current.is_empty() && char_len(current) + char_len(piece) > max_chars {
        flush(batches, current);
    }
    current.push_str(piece);
}

fn flush(batches: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        batches.push(trimmed.to_string());
    }
    current.clear();
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
