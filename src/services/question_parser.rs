use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::models::domain::question::{MAX_OPTIONS, MIN_OPTIONS};
use crate::models::domain::{Question, LABELS};

static BLOCK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:\d+[).:]|Question\b)").expect("block start regex is invalid")
});
static FIRST_OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*A[).]").expect("first option regex is invalid"));
static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*([A-D])[).]\s*(.+)$").expect("option line regex is invalid"));
static ANSWER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)answer\s*:\s*([A-D])").expect("answer line regex is invalid"));
static LEADING_NUMBERING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:Question\s*\d*\s*[:.)]?|\d+\s*[).:])\s*")
        .expect("leading numbering regex is invalid")
});

/// Raw shape of one element in the JSON variant of model output.
#[derive(Debug, Deserialize)]
struct RawQuizItem {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    answer_index: Option<usize>,
}

/// Turns raw model output into validated questions. The model's format is
/// not contractually guaranteed, so this is the compatibility boundary:
/// both the strict textual template and a JSON array are accepted, and
/// anything malformed is dropped rather than surfaced to the caller.
pub struct QuestionParser;

impl QuestionParser {
    /// Never fails; malformed input yields an empty list. Callers must
    /// treat an empty result as "no quiz could be generated".
    pub fn parse(raw: &str) -> Vec<Question> {
        let cleaned = strip_code_fences(raw);
        if cleaned.trim_start().starts_with('[') {
            match serde_json::from_str::<Vec<RawQuizItem>>(cleaned) {
                Ok(items) => return Self::from_json_items(items),
                Err(err) => {
                    log::debug!("model output looked like JSON but failed to parse: {}", err);
                }
            }
        }
        Self::from_template(cleaned)
    }

    /// Template format: repeated blocks of
    /// `Prompt \n A) .. \n B) .. \n C) .. \n D) .. \n Answer: <letter>`.
    /// A block is accepted only with all four of A-D and an answer letter.
    fn from_template(raw: &str) -> Vec<Question> {
        split_blocks(raw)
            .into_iter()
            .filter_map(parse_template_block)
            .collect()
    }

    fn from_json_items(items: Vec<RawQuizItem>) -> Vec<Question> {
        items.into_iter().filter_map(normalize_json_item).collect()
    }
}

/// Splits raw text into candidate question blocks. A block starts at a new
/// numbered item or the literal word "Question" at the beginning of a line.
fn split_blocks(raw: &str) -> Vec<&str> {
    let starts: Vec<usize> = BLOCK_START.find_iter(raw).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![raw];
    }

    let mut blocks = Vec::with_capacity(starts.len() + 1);
    if starts[0] > 0 {
        blocks.push(&raw[..starts[0]]);
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(raw.len());
        blocks.push(&raw[start..end]);
    }
    blocks
}

fn parse_template_block(block: &str) -> Option<Question> {
    let first_option = FIRST_OPTION.find(block)?;
    let prompt_raw = block[..first_option.start()].trim();
    let prompt = LEADING_NUMBERING.replace(prompt_raw, "").trim().to_string();
    if prompt.is_empty() {
        return None;
    }

    let mut options: Vec<(char, String)> = Vec::new();
    for caps in OPTION_LINE.captures_iter(block) {
        let label = caps[1].chars().next()?;
        if options.iter().any(|(existing, _)| *existing == label) {
            continue;
        }
        options.push((label, caps[2].trim().to_string()));
    }
    // All four of A-D or the block is dropped.
    if options.len() != 4 {
        return None;
    }
    options.sort_by_key(|(label, _)| *label);

    let answer = ANSWER_LINE
        .captures(block)?
        .get(1)?
        .as_str()
        .chars()
        .next()?
        .to_ascii_uppercase();

    finish(Question::new(&prompt, options, answer))
}

fn normalize_json_item(item: RawQuizItem) -> Option<Question> {
    let texts: Vec<String> = item
        .options
        .iter()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();
    if texts.len() < MIN_OPTIONS || texts.len() > MAX_OPTIONS {
        return None;
    }

    let options: Vec<(char, String)> = LABELS.iter().copied().zip(texts).collect();
    let correct_label = resolve_json_answer(&item, &options)?;
    finish(Question::new(item.question.trim(), options, correct_label))
}

/// The JSON variant may declare its answer as a 0-based index, a bare
/// letter, or the full text of an option.
fn resolve_json_answer(item: &RawQuizItem, options: &[(char, String)]) -> Option<char> {
    if let Some(index) = item.answer_index {
        return options.get(index).map(|(label, _)| *label);
    }

    let answer = item.answer.as_deref()?.trim();
    if answer.is_empty() {
        return None;
    }
    if answer.chars().count() == 1 {
        let letter = answer.chars().next()?.to_ascii_uppercase();
        return options
            .iter()
            .find(|(label, _)| *label == letter)
            .map(|(label, _)| *label);
    }
    options
        .iter()
        .find(|(_, text)| text.eq_ignore_ascii_case(answer))
        .map(|(label, _)| *label)
}

fn finish(question: Question) -> Option<Question> {
    match question.validate() {
        Ok(()) => Some(question),
        Err(reason) => {
            log::debug!("dropping parsed question: {}", reason);
            None
        }
    }
}

/// Models often wrap JSON in markdown code fences; strip them before
/// deciding which format the output is in.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some((_lang, body)) = rest.split_once('\n') else {
        return trimmed;
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_template_block() {
        let raw = "1) What organ?\nA) Heart\nB) Lungs\nC) Kidney\nD) Liver\nAnswer: B\n";
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "What organ?");
        assert_eq!(questions[0].correct_label, 'B');
        assert_eq!(questions[0].option_text('D'), Some("Liver"));
    }

    #[test]
    fn parses_multiple_blocks_and_question_prefix() {
        let raw = "Here are your questions:\n\
                   Question 1: What gas do plants absorb?\n\
                   A) Oxygen\nB) Carbon dioxide\nC) Nitrogen\nD) Helium\nAnswer: b\n\
                   2) Which planet is closest to the sun?\n\
                   A) Venus\nB) Earth\nC) Mercury\nD) Mars\nAnswer: C\n";
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].prompt, "What gas do plants absorb?");
        assert_eq!(questions[0].correct_label, 'B');
        assert_eq!(questions[1].prompt, "Which planet is closest to the sun?");
        assert_eq!(questions[1].correct_label, 'C');
    }

    #[test]
    fn drops_block_missing_an_option() {
        let raw = "1) What organ?\nA) Heart\nB) Lungs\nC) Kidney\nAnswer: B\n";
        assert!(QuestionParser::parse(raw).is_empty());
    }

    #[test]
    fn drops_block_without_answer_line() {
        let raw = "1) What organ?\nA) Heart\nB) Lungs\nC) Kidney\nD) Liver\n";
        assert!(QuestionParser::parse(raw).is_empty());
    }

    #[test]
    fn keeps_valid_blocks_when_one_is_malformed() {
        let raw = "1) Broken question\nA) only option\nAnswer: A\n\
                   2) Good question?\nA) w\nB) x\nC) y\nD) z\nAnswer: D\n";
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "Good question?");
    }

    #[test]
    fn free_text_without_structure_yields_nothing() {
        assert!(QuestionParser::parse("The mitochondria is the powerhouse of the cell.").is_empty());
        assert!(QuestionParser::parse("").is_empty());
    }

    #[test]
    fn parses_json_with_answer_index() {
        let raw = r#"[{"question":"Q1","options":["X","Y","Z"],"answer_index":1}]"#;
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "Q1");
        assert_eq!(questions[0].option_text('A'), Some("X"));
        assert_eq!(questions[0].option_text('B'), Some("Y"));
        assert_eq!(questions[0].option_text('C'), Some("Z"));
        assert_eq!(questions[0].correct_label, 'B');
    }

    #[test]
    fn parses_json_with_letter_answer() {
        let raw = r#"[{"question":"Q1","options":["X","Y","Z","W"],"answer":"c"}]"#;
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_label, 'C');
    }

    #[test]
    fn parses_json_with_answer_text() {
        let raw = r#"[{"question":"Q1","options":["Red","Green","Blue"],"answer":"green"}]"#;
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_label, 'B');
    }

    #[test]
    fn json_answer_index_out_of_range_drops_element() {
        let raw = r#"[
            {"question":"Q1","options":["X","Y"],"answer_index":5},
            {"question":"Q2","options":["X","Y"],"answer_index":0}
        ]"#;
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "Q2");
    }

    #[test]
    fn json_inside_code_fence_is_accepted() {
        let raw = "```json\n[{\"question\":\"Q1\",\"options\":[\"X\",\"Y\"],\"answer\":\"A\"}]\n```";
        let questions = QuestionParser::parse(raw);

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_label, 'A');
    }

    #[test]
    fn unparsable_json_yields_nothing() {
        assert!(QuestionParser::parse("[{not valid json").is_empty());
    }

    #[test]
    fn all_parsed_questions_satisfy_the_key_invariant() {
        let raw = "1) Q?\nA) a\nB) b\nC) c\nD) d\nAnswer: D\n";
        for question in QuestionParser::parse(raw) {
            assert!(question
                .options
                .iter()
                .any(|o| o.label == question.correct_label));
        }
    }
}
