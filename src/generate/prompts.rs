// src/generate/prompts.rs
//! Prompt templates per category. Wording is content, not logic; only the
//! `SKIP` instruction in the news prompt is relied on by the filter.

use super::PromptContext;
use crate::ingest::truncate_chars;
use crate::ingest::types::Candidate;

pub const SKIP_SENTINEL: &str = "SKIP";

pub fn news_translation(candidate: &Candidate, location: &str, summary_chars: usize) -> PromptContext {
    let system = format!(
        "You are a news translator for expats living in {location}.\n\
         Your audience lives in {location}, in South America, not in Spain or Europe.\n\
         When translating Spanish news, always make clear which country it is about.\n\
         Only pass on news that matters to people living in {location} or Latin America."
    );

    let user = format!(
        "Translate this Spanish news article for expats living in {location}.\n\n\
         RELEVANCE:\n\
         - Respond with only \"{SKIP_SENTINEL}\" if the article is only about Spanish domestic politics, \
         Spanish celebrities, European Union politics, Spain-only business, or is otherwise not relevant \
         to people living in Latin America.\n\
         - Translate it if it is international news affecting several countries, about Latin America, \
         a major world event, globally relevant technology, science or culture, or about immigration and \
         international relations.\n\n\
         WRITING:\n\
         - No preamble; start directly with the post text.\n\
         - 2-3 conversational sentences with 1-2 fitting emojis.\n\
         - Name the country or region the story is about.\n\
         - End with: \"Read more: {link}\"\n\n\
         Spanish article:\n\
         Title: {title}\n\
         Content: {summary}\n\
         Source: {link}\n\n\
         Write only the post text (no preamble, no markdown):",
        link = candidate.link,
        title = candidate.title,
        summary = truncate_chars(&candidate.summary, summary_chars),
    );

    PromptContext { system, user }
}

pub fn local_feature(topic: &str, location: &str) -> PromptContext {
    let system = format!(
        "You are a local expert living in {location}. You share authentic, practical insights \
         about everyday life there with the expat community."
    );
    let user = format!(
        "Write a natural, conversational social media post about: {topic}\n\n\
         - Context: you are in {location}.\n\
         - No preamble; start directly with the post text.\n\
         - 3-4 sentences, specific and actionable, warm and friendly.\n\
         - Include 1-2 emojis naturally.\n\
         - End with a question that invites comments from the local expat community.\n\n\
         Write only the post text, nothing else:"
    );
    PromptContext { system, user }
}

pub fn meme(theme: &str, location: &str) -> PromptContext {
    let system = format!(
        "You are an expat living in {location}. You share funny, relatable moments about expat life there."
    );
    let user = format!(
        "Write a funny, relatable social media post for expats in {location} about: {theme}\n\n\
         - No preamble; start directly with the post text.\n\
         - 2-3 sentences, lighthearted and never mean-spirited.\n\
         - Use emojis naturally.\n\
         - End with something like \"Can you relate? 😂\" or \"Tell me I'm not alone 🤣\".\n\n\
         Write only the post text, nothing else:"
    );
    PromptContext { system, user }
}

pub fn image_query(description: &str, location: &str) -> PromptContext {
    let system = "You write stock-photo search queries.".to_string();
    let user = format!(
        "Generate a specific, descriptive photo search query for: {description}\n\n\
         - Location context: {location}\n\
         - 3-5 keywords in photographic language (e.g. \"aerial view of ...\").\n\
         - Avoid generic terms like news, background, office.\n\n\
         Return ONLY the search query, nothing else:"
    );
    PromptContext { system, user }
}
