//! Prompt construction for the guidance and summarizer channels.

use super::character::CharacterProfile;
use super::transcript::{Speaker, Transcript};

/// Agent text shown when the opening reply is empty.
pub const DEFAULT_GREETING: &str = "Hello! Let's start brainstorming your plot.";

const OPENING_WITH_CHARACTER: &str = r#"You are a mind map robot helping elementary school students with plot writing. Use simple, kid-friendly language.

Here's the character information the student created:
{character}

Start by asking: "Where does this story take place?" (in Chinese: 这个故事发生在哪呢？) Then end your response with exactly six words related to story settings (like: school, home, forest, park, beach, library). Don't say "Here are six words" or mention "six words" - just put the six words at the end of your response.

Continue guiding the student step by step. Each response should end with exactly six words related to the current topic. When the conversation can fully describe a complete story, say: "The plot is getting clearer! Anything else you'd like to talk about?" (in Chinese: 故事情节已经比较清晰了，还想再聊些什么吗？)

Remember: Always end with exactly six words, use simple language, and guide step by step."#;

const OPENING_WITHOUT_CHARACTER: &str = r#"You are a mind map robot helping elementary school students with plot writing. Use simple, kid-friendly language. Start by asking: "Where does this story take place?" (in Chinese: 这个故事发生在哪呢？) Then end your response with exactly six words related to story settings. Continue guiding step by step, always ending with exactly six words."#;

const SUMMARY_QUERY: &str = r#"Please analyze the following student's answers about creating a story plot, and summarize the Setting, Conflict, and Goal. Only use the student's responses, ignore any AI questions or suggestions.

IMPORTANT REQUIREMENTS:
1. Setting can be a single word or a complete description (e.g., "library" or "a magical library in the clouds" are both acceptable)
2. Conflict should be a complete description of the problem or challenge (e.g., "the main character must save the library from disappearing" not just "fun" or "save")
3. Goal should be a complete description of what the character wants to achieve (e.g., "to become a great wizard and protect the magical world" not just "wizard")
4. If information is not clear or complete, use "unknown" for that field
5. Do NOT extract single words for Conflict and Goal - they must be complete descriptions

Student's answers:
{answers}

Only respond if there is enough information in the student's answers to determine all three (Setting, Conflict, and Goal). Format your response exactly as:
setting: [complete setting description]
conflict: [complete conflict description]
goal: [complete goal description]

If any field cannot be determined from the student's answers, use "unknown" for that field.
When all three parts (setting, conflict, and goal) are clear and complete, you can output "{marker}" on a new line."#;

/// Builds the first guidance utterance.
pub fn opening_prompt(character: Option<&CharacterProfile>) -> String {
    match character {
        Some(character) => OPENING_WITH_CHARACTER.replace("{character}", &character.prompt_block()),
        None => OPENING_WITHOUT_CHARACTER.to_string(),
    }
}

/// Renders transcripts into the summarizer query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPrompt {
    user_turns_only: bool,
    completion_marker: String,
}

impl Default for SummaryPrompt {
    fn default() -> Self {
        Self::new(true, super::reconciler::DEFAULT_COMPLETION_MARKER)
    }
}

impl SummaryPrompt {
    pub fn new(user_turns_only: bool, completion_marker: impl Into<String>) -> Self {
        Self {
            user_turns_only,
            completion_marker: completion_marker.into(),
        }
    }

    /// Renders the transcript as the answers block.
    ///
    /// With `user_turns_only` agent turns are dropped: they end in hint
    /// words, which are not the student's ideas. Otherwise each turn is
    /// prefixed with its speaker.
    pub fn render_transcript(&self, transcript: &Transcript) -> String {
        let parts: Vec<String> = if self.user_turns_only {
            transcript.user_turns().map(|t| t.text.clone()).collect()
        } else {
            transcript
                .turns()
                .iter()
                .map(|t| match t.speaker {
                    Speaker::User => format!("Student: {}", t.text),
                    Speaker::Agent => format!("Guide: {}", t.text),
                })
                .collect()
        };
        parts.join("\n\n")
    }

    /// Builds the full summarizer utterance around rendered answers.
    pub fn query(&self, rendered: &str) -> String {
        SUMMARY_QUERY
            .replace("{answers}", rendered)
            .replace("{marker}", &self.completion_marker)
    }
}
