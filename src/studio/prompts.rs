//! Prompt templates for the studio operations

use crate::studio::types::{AdStrategy, Language, Platform};

/// Section marker that opens the ad copy in a generated answer
pub const AD_COPY_MARKER: &str = "[AD COPY]";

/// Section marker that opens the reasoning in a generated answer
pub const REASONING_MARKER: &str = "[STRATEGIC REASONING]";

/// Shown when the model gives no reasoning section
pub const DEFAULT_REASONING: &str = "Analysis based on real-time market signals.";

/// Growth-hacker prompt for a single ad
pub fn advanced_ad_prompt(
    platform: Platform,
    strategy: &AdStrategy,
    user_context: &str,
    language: Language,
) -> String {
    let lang = language.prompt_name();
    format!(
        r#"ROLE: World-Class Growth Hacker & Data Scientist.
TASK: Create a hyper-personalized advertisement for {platform} in {lang}.

STRATEGIC PARAMETERS:
- Objective: {objective}
- Targeted Consumer Sentiment: {sentiment}
- Specific Segment: {segment}
- External Signal Focus: {signal}.

USER CONTEXT:
{user_context}

INSTRUCTIONS:
1. Use Google Search tool to find current Polymarket odds or OSINT data related to "{signal}".
2. Adjust the ad copy's psychological trigger based on those odds.
3. Provide the result in {lang}.

FORMAT:
Return exactly:
{AD_COPY_MARKER}
...content...
{REASONING_MARKER}
...why it works..."#,
        platform = platform,
        lang = lang,
        objective = strategy.objective,
        sentiment = strategy.sentiment,
        segment = strategy.segment,
        signal = strategy.external_signal,
        user_context = user_context,
    )
}

pub fn advanced_ad_instruction(language: Language) -> String {
    format!(
        "You are an AI that masters context-aware advertising. Respond strictly in {}.",
        language.display_name()
    )
}

/// Ask for targeting parameters as a JSON object
pub fn orchestration_prompt(brief: &str) -> String {
    format!(
        r#"Analyze the following advertising brief and suggest the optimal parameters for our targeting engine.
Brief: "{brief}"

Return ONLY a JSON object with these fields:
- objective (must be one of: Conversion, Awareness, Fear of Missing Out, Educational, Political Persuasion, Crisis Mgmt)
- sentiment (must be one of: Anxious, Optimistic, Skeptical, Apathetic, Urgent)
- segment (string, concise target audience)
- externalSignal (string, what specific topic to search in Polymarket or OSINT)"#
    )
}

pub fn live_signal_prompt(topic: &str) -> String {
    format!(
        r#"Search for real-time data on the following topic: "{topic}".
Focus specifically on:
1. Polymarket betting odds (if applicable).
2. Latest OSINT sentiment or news trends.
3. Verifiable economic or political indicators.

Summarize the "Live Signal" in 2 sentences.
Also, suggest the best AdObjective and ConsumerSentiment for this context."#
    )
}

pub fn social_context_prompt(url: &str) -> String {
    format!(
        r#"Analyze the following social media URL: "{url}".
Using your search tools, identify:
1. The core audience or community interacting with this content.
2. The prevailing sentiment and linguistic style (slang, formal, aggressive, etc.).
3. The top 3 recurring themes or pain points discussed.

Summarize this into a "Social Intelligence Report" and suggest a Targeting Segment and Consumer Sentiment.
Return the response in a structured format."#
    )
}

pub fn osint_prompt(query: &str, language: Language) -> String {
    format!(
        r#"Perform a deep open-source intelligence analysis of: "{query}".
Using your search tools, cover:
1. The key actors and what they are saying.
2. Prediction market odds or polling, if they exist.
3. Public sentiment across news and social media.
4. Risks and opportunities for an advertiser entering this conversation.

Write the analysis in {lang}, citing concrete figures where you find them."#,
        lang = language.prompt_name()
    )
}

/// System instruction for the live voice director
pub fn live_director_instruction(language: Language) -> String {
    let lang = match language {
        Language::Es => "ESPAÑOL",
        Language::En => "INGLÉS",
    };
    format!(
        "Eres un director creativo publicitario experto. Responde estrictamente en {}.",
        lang
    )
}
