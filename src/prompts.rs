//! Prompts for form filling and question answering.
//!
//! Kept together so the wording can be tuned in one place and inspected by
//! tests without a live endpoint. Both prompts embed the caller's text
//! verbatim between fixed marker lines.

/// Marker line opening the form in the fill prompt.
pub const FORM_START: &str = "--- FORM START ---";

/// Marker line closing the form in the fill prompt.
pub const FORM_END: &str = "--- FORM END ---";

/// Reply the model is told to give when the form does not hold the answer.
pub const NOT_IN_FORM: &str = "Not available in the form.";

/// Build the prompt asking the model to replace placeholder values.
pub fn fill_prompt(form_text: &str) -> String {
    format!(
        "\nYou are an expert form assistant. The scanned form text below has missing values \
like 'N/A', 'nan', or '---'.\n\
Please fill missing values realistically, preserving original formatting.\n\
\n\
{FORM_START}\n\
{form_text}\n\
{FORM_END}\n"
    )
}

/// Build the prompt asking the model to answer from the form only.
pub fn answer_prompt(form_text: &str, question: &str) -> String {
    format!(
        "\nYou are a professional document analyst.\n\
Answer based ONLY on the given form content.\n\
If the answer is missing in the form, reply with \"{NOT_IN_FORM}\"\n\
\n\
--- FORM CONTENT ---\n\
{form_text}\n\
---------------------\n\
\n\
Now answer this question briefly and accurately:\n\
Q: {question}\n\
A:\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_prompt_wraps_text_between_markers() {
        let p = fill_prompt("Name: N/A\nAge: ---");
        let start = p.find(FORM_START).unwrap();
        let end = p.find(FORM_END).unwrap();
        assert!(start < end);
        assert_eq!(
            &p[start + FORM_START.len()..end],
            "\nName: N/A\nAge: ---\n"
        );
        assert!(p.contains("'N/A', 'nan', or '---'"));
    }

    #[test]
    fn fill_prompt_keeps_text_verbatim() {
        let text = "  Line with   spacing\n\n{braces} and \"quotes\"  ";
        assert!(fill_prompt(text).contains(text));
    }

    #[test]
    fn answer_prompt_includes_question_and_fallback() {
        let p = answer_prompt("Name: John Doe", "What is the name?");
        assert!(p.contains("Name: John Doe"));
        assert!(p.contains("Q: What is the name?\nA:"));
        assert!(p.contains(NOT_IN_FORM));
        assert!(p.contains("ONLY"));
    }
}
