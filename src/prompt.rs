//! Fixed prompt text: the system instruction, the canonical field labels, and
//! the default user prompt generated from them.

/// System-role message sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant that processes medical research text and categorizes it into structured JSON format.";

/// The canonical categories, in the order the default prompt lists them.
pub const FIELDS: [&str; 25] = [
    "TITLE",
    "EDMS NO",
    "PRODUCT",
    "PRODUCT CODE",
    "PROTOCOL NO",
    "GENERIC NAME",
    "REGULATORY AGENCY",
    "PREGNANCY OR LACTATION",
    "STUDY START DATE (ACTUAL OR PROJECTED)",
    "STUDY END DATE (ACTUAL OR PROJECTED FINAL REPORT DELIVERY)",
    "FIRST INTERIM REPORT",
    "STUDY DESIGN",
    "SAMPLE SIZE (EXPECTED)",
    "DATA SOURCE TYPE",
    "DATA SOURCE NAME",
    "EXPOSURE",
    "COMPARATOR",
    "PRIMARY OUTCOME",
    "SECONDARY OUTCOME",
    "DATA VALIDITY",
    "INFANT FOLLOW-UP DURATION",
    "DATA ANALYSIS",
    "COUNTRY",
    "AGE RANGE",
    "LIMITATION",
];

const RULES: &str = "\
### Extraction Rules & Formatting Guidelines:
- **Accurate Mapping:** Extract content from the PDF and assign it to the corresponding category based on its meaning.
- **Original Terminology:** Do **not** modify, rephrase, or interpret the extracted content—keep it as found in the document.
- **Preserve Numerical Values & Dates:** Maintain the format of dates, regulatory codes, and numerical values exactly as they appear in the document.
- **Empty Fields:** If a category is missing from the text, return it as an empty string (`\"\"`). Do **not** omit any fields.
- **Strict JSON Compliance:** The output **must** be formatted as valid JSON.
- **No Additional Text:** Do **not** include explanations, introductions, or comments in the output—return **only** the JSON response.
";

/// Returns `true` when `name` is one of [`FIELDS`].
pub fn is_field(name: &str) -> bool {
    FIELDS.contains(&name)
}

/// Build the default user prompt: the numbered field list, the extraction
/// rules, and a JSON template with one entry per field.
pub fn default_prompt() -> String {
    let mut out = String::from(
        "I have extracted text from a PDF containing medical research data. \
         Your task is to extract, categorize, and structure the summarized text \
         into the following format with strict adherence to the provided categories:\n",
    );

    for (i, field) in FIELDS.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, field));
    }

    out.push('\n');
    out.push_str(RULES);
    out.push_str("\n### Output Format (Strictly JSON)\n\n```json\n{\n");

    let last = FIELDS.len() - 1;
    for (i, field) in FIELDS.iter().enumerate() {
        let comma = if i == last { "" } else { "," };
        out.push_str(&format!("    \"{field}\": \"...\"{comma}\n"));
    }
    out.push_str("}\n```\n");
    out
}
