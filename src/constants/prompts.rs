/// Source text longer than this is truncated before prompting; the model
/// does not need the whole document to produce a handful of questions.
pub const MAX_SOURCE_CHARS: usize = 3000;

/// Builds the quiz-generation prompt. The strict output template is what
/// the question parser's textual path expects.
pub fn build_quiz_prompt(source_text: &str, question_count: usize) -> String {
    let excerpt = truncate_chars(source_text, MAX_SOURCE_CHARS);
    format!(
        "Generate {question_count} multiple-choice questions (A-D) from the following text.\n\
         Only create questions relevant to the main topics and lessons.\n\n\
         Use this strict format:\n\
         Question?\nA) ...\nB) ...\nC) ...\nD) ...\nAnswer: <LETTER>\n\n\
         Text:\n{excerpt}"
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_count_and_text() {
        let prompt = build_quiz_prompt("Photosynthesis basics", 5);
        assert!(prompt.contains("Generate 5 multiple-choice questions"));
        assert!(prompt.contains("Photosynthesis basics"));
        assert!(prompt.contains("Answer: <LETTER>"));
    }

    #[test]
    fn long_source_text_is_truncated() {
        let source = "word ".repeat(2000);
        let prompt = build_quiz_prompt(&source, 7);
        assert!(prompt.len() < source.len());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let source = "é".repeat(MAX_SOURCE_CHARS + 10);
        // Must not panic on a multi-byte boundary.
        let prompt = build_quiz_prompt(&source, 7);
        assert!(prompt.contains('é'));
    }
}
