//! Prompt assembly

use std::fmt::Write as _;

use serde_json::Value;

use super::AgentProfile;
use crate::agent::ValidatedInput;

const GUIDELINES: &[&str] = &[
    "Provide evidence-based, actionable insights",
    "Be supportive and encouraging while being realistic",
    "Consider cultural context and the Indian education and career landscape",
    "Acknowledge limitations and suggest next steps when appropriate",
];

/// Render the full prompt for one agent run
pub fn build_prompt(profile: &AgentProfile, input: &ValidatedInput) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are a {} in a Virtual Career Counselor system.\n",
        profile.role
    );
    let _ = writeln!(prompt, "Agent Information:");
    let _ = writeln!(prompt, "- Agent ID: {}", profile.id);
    let _ = writeln!(prompt, "- Agent Name: {}\n", profile.name);

    let _ = writeln!(prompt, "Guidelines:");
    for line in GUIDELINES.iter().chain(profile.instructions) {
        let _ = writeln!(prompt, "- {line}");
    }

    section(&mut prompt, "Required Data", input.required.iter());
    section(&mut prompt, "Optional Data", input.optional.iter());
    if !input.context.is_empty() {
        section(&mut prompt, "Conversation Context", input.context.iter());
    }

    if !input.previous_outputs.is_empty() {
        let _ = writeln!(prompt, "\nOutputs from earlier agents:");
        for (id, result) in &input.previous_outputs {
            let body = serde_json::to_string(&result.output).unwrap_or_default();
            let _ = writeln!(prompt, "- {id} ({}): {body}", result.agent_name);
        }
    }

    let _ = writeln!(
        prompt,
        "\nRespond with ONLY a JSON object containing these top-level keys: {}.",
        profile.output_schema.join(", ")
    );
    let _ = write!(
        prompt,
        "Do not wrap the JSON in markdown and do not add commentary or comments."
    );

    prompt
}

fn section<'a>(prompt: &mut String, title: &str, fields: impl Iterator<Item = (&'a String, &'a Value)>) {
    let _ = writeln!(prompt, "\n{title}:");
    let mut empty = true;
    for (key, value) in fields {
        empty = false;
        format_field(prompt, key, value);
    }
    if empty {
        let _ = writeln!(prompt, "- None provided");
    }
}

fn format_field(prompt: &mut String, key: &str, value: &Value) {
    let label = title_case(key);
    match value {
        Value::String(s) => {
            let _ = writeln!(prompt, "- {label}: {s}");
        }
        Value::Object(map) => {
            let _ = writeln!(prompt, "- {label}:");
            for (sub_key, sub_value) in map {
                let rendered = match sub_value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let _ = writeln!(prompt, "  - {}: {rendered}", title_case(sub_key));
            }
        }
        other => {
            let _ = writeln!(prompt, "- {label}: {other}");
        }
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
