//! Prompt assembly for the oracle's operations.

/// Maximum words in a poetized manifest.
pub const MANIFEST_MAX_WORDS: usize = 15;

/// Builds the prompts sent to the text and image services.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Persona shared by every text request.
    pub fn system_prompt() -> String {
        "You are the Oracle of Aura. You answer in Portuguese (BR) with ethereal, \
         profound and non-linear language."
            .to_string()
    }

    /// Turn a raw thought into a short manifest.
    pub fn poetize(text: &str) -> String {
        format!(
            "Transform this human vibration into a Sacred Frequency Manifest.\n\
             Keep it extremely brief (max {} words).\n\
             Vibration: \"{}\".\n\
             Output only the manifest, no quotation marks.",
            MANIFEST_MAX_WORDS,
            text.trim()
        )
    }

    /// Ask for the mood/energy/frequency/color analysis as JSON.
    pub fn analyze(text: &str) -> String {
        format!(
            "Analyze this Sacred Frequency: \"{}\".\n\
             Determine:\n\
             1. atmospheric mood (one word)\n\
             2. resonance energy (0.0 to 1.0)\n\
             3. fundamental frequency (432 to 528 Hz)\n\
             4. dominant ethereal color (hex)\n\
             Return ONLY valid JSON: {{ \"mood\": \"string\", \"energy\": number, \"frequency\": number, \"color\": \"string\" }}",
            text.trim()
        )
    }

    /// Ask for a short echo in reply to someone's pulse.
    pub fn echo(content: &str) -> String {
        format!(
            "A soul emitted this pulse: \"{}\".\n\
             Reply with a single short echo (max 20 words) and name the source of \
             its wisdom (a poet, a tradition or a star).\n\
             Return ONLY valid JSON: {{ \"text\": \"string\", \"source\": \"string\" }}",
            content.trim()
        )
    }

    /// Image prompt for a member's symbolic portrait.
    pub fn portrait(traits: &str) -> String {
        format!(
            "Highly detailed, abstract symbolic portrait of consciousness, defined by {}, \
             iridescent textures, bioluminescent organic structures, sacred geometry, cosmic light, \
             deep obsidian background, 8k resolution, ethereal.",
            traits.trim()
        )
    }

    /// Image prompt for a pulse visual.
    pub fn pulse_visual(content: &str, mood: &str) -> String {
        format!(
            "Cosmic bioluminescence manifest: \"{}\". Mood: {}. Style: deep obsidian background, \
             intricate light filaments, sacred geometry, highly detailed, ethereal 8k.",
            content.trim(),
            mood.trim()
        )
    }
}

/// Strip whitespace, surrounding quotes and markdown code fences.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest.trim_start();
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text.trim_matches(|c| c == '"' || c == '“' || c == '”')
        .trim()
        .to_string()
}
