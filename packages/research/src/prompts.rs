//! Instruction templates for the model calls.

/// Free-text triage: "Not relevant" or a titled 3-bullet summary.
pub const CLASSIFY_PROMPT: &str = r#"You are a medical research assistant.
Decide whether the following document contains a conference abstract related to: "{query}".

DOCUMENT TEXT:
{text}

INSTRUCTIONS:
1. If no relevant abstract is found, output exactly "Not relevant".
2. If one is found, extract the title of the abstract or talk.
3. Write a 3-bullet summary of the clinical findings or study design.

FORMAT:
**Title:** [title]
**Summary:**
- [point 1]
- [point 2]
- [point 3]"#;

/// Structured extraction: one sample record plus a generated parsing script.
pub const EXTRACTION_PROMPT: &str = r#"You are a data engineer building parsers for medical congress archives.
The text below was extracted from {source_kind} published at: {source}

DOCUMENT TEXT:
{text}

Return a JSON object with exactly these fields:
{
    "sample_abstract": {
        "title": "title of one abstract found in the text",
        "authors": "its author list as a single string",
        "body": "its body text"
    },
    "parsing_script": "a Python script that parses documents of this shape into CSV rows"
}

Return only the JSON object, no other text."#;

/// Society/domain discovery used to bias query planning.
pub const HINT_DOMAINS_PROMPT: &str = r#"List the official websites of up to 5 medical societies or congress organizers that publish conference abstracts about: {topic}

Respond with one bare domain name per line, for example:
eha.org
Nothing but domain names."#;

/// Fill the classification template.
pub fn format_classify_prompt(text: &str, query: &str) -> String {
    CLASSIFY_PROMPT
        .replace("{query}", query)
        .replace("{text}", text)
}

/// Fill the structured-extraction template.
pub fn format_extraction_prompt(text: &str, source: &str, is_pdf: bool) -> String {
    let source_kind = if is_pdf { "a PDF document" } else { "a web page" };
    EXTRACTION_PROMPT
        .replace("{source_kind}", source_kind)
        .replace("{source}", source)
        .replace("{text}", text)
}

/// Fill the hint-domain template.
pub fn format_hint_domains_prompt(topic: &str) -> String {
    HINT_DOMAINS_PROMPT.replace("{topic}", topic)
}
