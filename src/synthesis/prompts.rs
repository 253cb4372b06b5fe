use super::{CaptionOptions, MinutesOptions, OutputLength};

pub const EXTRACTION_SYSTEM: &str =
    "You are an expert analyst. Extract raw meeting data with high precision. No preamble.";

pub const SYNTHESIS_SYSTEM: &str =
    "You are a professional secretary. Format the meeting intelligence into the requested template. No meta-commentary.";

pub const EXPANSION_SYSTEM: &str =
    "You are a professional secretary. Your task is to ELONGATE and EXPAND the existing meeting minutes using the transcript for extra detail. No meta-commentary.";

pub fn length_instruction(length: OutputLength) -> &'static str {
    match length {
        OutputLength::Longer => {
            "Provide extensive detail, capturing nuances, background context for decisions, and comprehensive action item descriptions. Aim for a thorough and lengthy document."
        }
        OutputLength::Normal => {
            "Keep it extremely brief, high-level, and very concise. Focus only on the most critical points. Do NOT provide unnecessary detail."
        }
    }
}

pub fn extraction_prompt(transcript: &str, longer: bool) -> String {
    let detail = if longer {
        "\n[Special Instruction: Extract as much detail as possible for each point.]"
    } else {
        ""
    };
    format!(
        r#"[Task: Extract Meeting Intelligence]
[Transcript]:
{transcript}

[Requirements]:
Identify:
1. Core Agenda & Main Themes
2. Key Decisions Made
3. Action Items with specific Owners (if mentioned)
4. Unresolved Issues/Next Steps

[Format: Bullet points only. No conversational filler.]{detail}"#
    )
}

pub fn synthesis_prompt(options: &MinutesOptions, intelligence: &str) -> String {
    let structure = options
        .template
        .structure
        .as_deref()
        .unwrap_or("Standard Meeting Minutes");
    let title = options.meeting_title.as_deref().unwrap_or("Untitled Meeting");
    let instruction = length_instruction(options.length);
    format!(
        r#"[Instruction: Synthesize professional Meeting Minutes following the Blueprint and Structure.]
[Structure: {structure}]
[Meeting Title: {title}]

[Extracted Intelligence]:
{intelligence}

[Template/Blueprint]:
{content}

[Rules]:
1. Use the Blueprint for formatting.
2. Fill placeholders using the Intelligence.
3. {instruction}
4. Direct Output Only."#,
        content = options.template.content
    )
}

pub fn expansion_prompt(current: &str, transcript: &str) -> String {
    format!(
        r#"[Task: Elongate and Expand Existing Meeting Minutes]
[Current MoM]:
{current}

[Transcript for Reference]:
{transcript}

[Instruction]:
Take the Current MoM and significantly expand upon every section.
- Add more detail to the agenda points.
- Provide background reasoning for decisions made.
- Elaborate on the action items with more context.
- Ensure the tone remains professional.
- DO NOT summarize; ELABORATE.

[Direct Output Only]:"#
    )
}

pub fn caption_prompt(options: &CaptionOptions) -> String {
    let length_rule = if options.platform.eq_ignore_ascii_case("linkedin") {
        "- Long-form, professional, and storytelling style"
    } else {
        "- Platform appropriate length"
    };
    format!(
        r#"You are an expert social media copywriter.

Generate a {tone} caption for {platform}.

Rules:
{length_rule}
- STRICTLY NO EMOJIS (unless explicitly requested)
- Clear and engaging
- No hashtags unless platform supports it
- Output ONLY the caption text

User content:
"{content}""#,
        tone = options.tone,
        platform = options.platform,
        content = options.content
    )
}

pub fn caption_expansion_prompt(current: &str, requirements: &str) -> String {
    format!(
        "Current Content to expand:\n\"\"\"\n{current}\n\"\"\"\n\nOriginal Requirements/Context:\n{requirements}\n\nPlease provide a much more detailed and elongated version of the content above."
    )
}

pub fn caption_system(length: OutputLength, expanding: bool) -> String {
    let mut system = String::from("You are a professional content writer. ");
    match length {
        OutputLength::Longer if expanding => system.push_str(
            "Your task is to ELONGATE and EXPAND the provided text. Keep the same core message and tone, but add significantly more detail, background context, and elaboration. Do NOT replace it entirely; build upon it.",
        ),
        OutputLength::Longer => system.push_str(
            "Provide more detail, elaborate on the points, and increase the word count significantly. Be descriptive and thorough.",
        ),
        OutputLength::Normal => system.push_str(
            "Be extremely brief, direct, and concise. Provide a high-level summary only. Minimal word count.",
        ),
    }
    system.push_str(" Generate only requested content. No preamble, no meta-commentary.");
    system
}

/// Char-boundary-safe prefix used to bound transcript size in prompts.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::MinutesTemplate;

    #[test]
    fn test_caption_prompt_carries_the_request() {
        let options = CaptionOptions {
            platform: "LinkedIn".to_string(),
            tone: "professional".to_string(),
            content: "We shipped the quarterly release.".to_string(),
            length: OutputLength::Normal,
            current_content: None,
        };

        let prompt = caption_prompt(&options);
        assert!(prompt.contains("professional caption for LinkedIn"));
        assert!(prompt.contains("We shipped the quarterly release."));
        assert!(prompt.contains("Long-form, professional, and storytelling style"));
    }

    #[test]
    fn test_synthesis_prompt_defaults() {
        let options = MinutesOptions {
            meeting_title: None,
            length: OutputLength::Normal,
            current_content: None,
            template: MinutesTemplate::default(),
        };

        let prompt = synthesis_prompt(&options, "- decided things");
        assert!(prompt.contains("[Structure: Standard Meeting Minutes]"));
        assert!(prompt.contains("[Meeting Title: Untitled Meeting]"));
        assert!(prompt.contains("- decided things"));
    }

    #[test]
    fn test_extraction_prompt_detail_instruction() {
        assert!(!extraction_prompt("t", false).contains("[Special Instruction"));
        assert!(extraction_prompt("t", true).contains("[Special Instruction"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
