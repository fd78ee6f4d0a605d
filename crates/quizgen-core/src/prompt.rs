use crate::error::{QuizError, QuizResult};

/// Line placed before and after the user's text in the prompt.
pub const INPUT_DELIMITER: &str = "---";

const SCHEMA_INSTRUCTIONS: &str = r#"Based on the following input, generate a VALID JSON string representing an array of objects suitable for a Google Apps Script quiz creator.
Each object in the array must represent a single question and have these exact properties (keys must be double-quoted):
- "questionText": String (The question itself)
- "choices": Array of strings (The answer options)
- "correctAnswers": Array of strings (The exact text of the correct answer(s). One string for Multiple Choice, multiple for Checkbox)
- "points": Number (The point value)

The entire output must be ONLY this JSON array string, starting with '[' and ending with ']'.
Do NOT include any other text, explanations, or markdown backticks (like ```json) around the array.
If the input implies multiple choice, "correctAnswers" should have one item.
If the input implies checkboxes (select multiple), "correctAnswers" can have multiple items.
All string values within the JSON (for questionText, choices, correctAnswers) must be properly escaped if they contain special characters like quotes or backslashes."#;

const WORKED_EXAMPLE: &str = r#"Example of the EXACT desired JSON output format:
[
  {
    "questionText": "Which statement describes the use of powerline networking technology?",
    "choices": [
      "A device connects to an existing home LAN using an adapter and an existing electrical outlet.",
      "New “smart” electrical cabling is used to extend an existing home LAN.",
      "Wireless access points use powerline adapters to distribute data through the home LAN.",
      "A home LAN is installed without the use of physical cabling."
    ],
    "correctAnswers": ["A device connects to an existing home LAN using an adapter and an existing electrical outlet."],
    "points": 5
  },
  {
    "questionText": "Which three steps must be completed to manually connect an Android or IOS device to a secured wireless network?",
    "choices": [
      "Change the MAC address.",
      "Set the IP address.",
      "Enter the network SSID.",
      "Activate the Bluetooth antenna.",
      "Input the authentication password.",
      "Choose the correct security type."
    ],
    "correctAnswers": [
      "Enter the network SSID.",
      "Input the authentication password.",
      "Choose the correct security type."
    ],
    "points": 5
  }
]"#;

const CLOSING_INSTRUCTION: &str = "Generate the QUIZ_DATA JSON array string now:";

/// Wrap the user's text in the fixed quiz-generation template.
///
/// The text is trimmed and interpolated verbatim between two
/// [`INPUT_DELIMITER`] lines. Blank input is rejected before anything else
/// happens.
pub fn build_quiz_prompt(user_text: &str) -> QuizResult<String> {
    let user_text = user_text.trim();
    if user_text.is_empty() {
        return Err(QuizError::EmptyInput);
    }

    let mut prompt = String::with_capacity(
        SCHEMA_INSTRUCTIONS.len() + WORKED_EXAMPLE.len() + user_text.len() + 128,
    );

    prompt.push_str(SCHEMA_INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(WORKED_EXAMPLE);
    prompt.push_str("\n\nUser input:\n");
    prompt.push_str(INPUT_DELIMITER);
    prompt.push('\n');
    prompt.push_str(user_text);
    prompt.push('\n');
    prompt.push_str(INPUT_DELIMITER);
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_INSTRUCTION);

    Ok(prompt)
}
