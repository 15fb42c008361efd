//! Minutes Prompt
//!
//! Fixed instruction template for the summarization model. The template
//! encodes the output policy: target language, markdown structure, no
//! placeholder tokens, and explicit call-outs for incomplete source material.

/// System instruction for the minutes-generation model.
pub const MINUTES_SYSTEM: &str = "You are an expert meeting-minutes assistant.";

/// User prompt template: placeholders are replaced with the transcript and
/// the target language.
pub const MINUTES_USER_TEMPLATE: &str = r#"Write meeting minutes in {language} based on the following transcript:

{transcript}

Format the minutes as Markdown bullet points with these sections:
- Discussion summary
- Decisions
- Action items and follow-ups

Do not use placeholder tokens such as [name] or [date]; omit anything the transcript does not state. If the transcript appears incomplete or cut off, say so explicitly in the minutes."#;

/// Build the user prompt for the given transcript and target language.
pub fn minutes_user_prompt(transcript: &str, language: &str) -> String {
    MINUTES_USER_TEMPLATE
        .replace("{language}", language)
        .replace("{transcript}", transcript)
}
