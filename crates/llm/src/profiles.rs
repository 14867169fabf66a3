//! Personality generation with a self-critique loop.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tweetvec_core::{strip_code_fence, Personality, PersonalityDocument};

use crate::ai_types::{ChatRequest, Message};
use crate::client::{truncate, LlmClient};
use crate::error::LlmError;

const GENERATOR_SYSTEM_PROMPT: &str =
    "You are a creative personality generator. Output only valid YAML.";
const EVALUATOR_SYSTEM_PROMPT: &str =
    "You are a personality evaluation expert. Be critical and push for uniqueness.";

pub const SEED_INTERESTS: &[&str] = &[
    "Ancient Mesopotamian agriculture",
    "Renaissance puppet shows",
    "1920s miniature golf craze",
    "Victorian street food vendors",
    "Medieval monastery brewing",
    "Tang dynasty tea ceremonies",
    "1950s drive-in culture",
    "Ancient Roman graffiti",
    "18th century sea shanties",
    "Cold War era board games",
    "Edo period Japanese bathhouse culture",
    "Belle Époque café society",
    "Pre-Columbian ball games",
    "Byzantine silk production",
    "Roaring Twenties speakeasy culture",
    "Italian horror B-movies",
    "1970s Japanese game shows",
    "Soviet children's cartoons",
    "Australian soap operas",
    "French new wave cinema",
    "Nordic noir podcasts",
    "Mexican wrestling documentaries",
    "British garden shows",
    "Korean variety shows",
    "Canadian wilderness survival series",
    "Bollywood dance sequences",
    "Turkish soap operas",
    "Eastern European stop-motion animation",
    "Spanish radio dramas",
    "Nigerian Nollywood films",
    "professional tea tasting",
    "urban beekeeping",
    "vintage typewriter repair",
    "competitive dog grooming",
    "historical reenactment",
    "ghost hunting",
    "artisanal cheese aging",
    "umbrella collecting",
    "train spotting",
    "extreme cave diving",
    "competitive cup stacking",
    "book binding restoration",
    "cigar box guitar making",
    "Victorian hair jewelry crafting",
    "seed saving",
    "disco rollerskating",
    "tiki bar culture",
    "underground zine scenes",
    "street food evolution",
    "carnival fortune telling",
    "indie bookstore culture",
    "vinyl record collecting",
    "urban legends",
    "street art movements",
    "food truck revolution",
    "roller derby resurgence",
    "pop-up dinner parties",
    "community seed libraries",
    "guerrilla gardening",
    "speakeasy jazz clubs",
    "antique door hinges",
    "rare postage stamps",
    "vintage soda bottles",
    "historical maps",
    "extinct breakfast cereals",
    "classic movie posters",
    "retro video game consoles",
    "old recipe books",
    "vintage perfume bottles",
    "historical weather records",
    "antique fishing lures",
    "Victorian mourning jewelry",
    "vintage airline memorabilia",
    "obsolete medical devices",
    "military ration packaging",
    "bioluminescent organisms",
    "desert plant adaptation",
    "animal migration patterns",
    "fungi networks",
    "tide pool ecosystems",
    "bird dialects",
    "insect architecture",
    "plant defense mechanisms",
    "animal sleep patterns",
    "weather phenomenon",
    "extremophile bacteria",
    "carnivorous plant biology",
    "animal tool usage",
    "deep sea hydrothermal vents",
    "peat bog preservation",
];

pub const SPEECH_PATTERNS: &[&str] = &[
    "Speaks in overly academic language with unnecessary citations",
    "Always starts sentences with 'According to my research...'",
    "Constantly uses Latin phrases incorrectly",
    "References obscure academic journals in casual conversation",
    "Only speaks in 1920s slang",
    "Communicates as if writing Victorian-era telegrams",
    "Uses exclusively 1980s valley girl speech patterns",
    "Speaks like a film noir detective",
    "Relates everything back to their favorite historical period",
    "Must mention their collection in every sentence",
    "Counts words obsessively and only speaks in prime numbers",
    "Always adds 'but that's just my theory' after statements",
    "Speaks entirely in movie quotes",
    "Ends every sentence with their catchphrase",
    "Narrates everything like a nature documentary",
    "Always speaks in third person",
    "Alternates between extremely formal and internet slang",
    "Randomly switches between different historical eras' dialect",
    "Combines technical jargon with playground rhymes",
    "Mixes metaphors from their various obsessions",
    "Types in ALL CAPS when excited (which is always)",
    "Adds unnecessary hashtags to everything",
    "Speaks exclusively in meme formats",
    "Every response must include an emoji interpretation",
    "Roleplays as a time traveler confused by modern things",
    "Pretends to be an AI pretending to be human (badly)",
    "Acts like a conspiracy theorist who found the 'truth'",
    "Behaves like a tour guide in a very specific museum",
];

const PERSONALITY_TEMPLATE: &str = "personality:
  name: <creative name that reflects personality>
  traits:
    - <trait 1>
    - <trait 2>
    - <trait 3>
  mood: <emotional state>
  interests:
    primary_topics:
      - <specific, unique topic 1>
      - <specific, unique topic 2>
    key_figures:
      - <figure 1 related to their interests>
      - <figure 2 related to their interests>
    specific_focus: <detailed description of their main obsession/interest>
  quirks:
    - <quirk 1>
    - <quirk 2>
  speech_pattern: <how they express themselves>";

/// Random inspiration for one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTraits {
    /// Two or three entries from [`SEED_INTERESTS`]
    pub interests: Vec<&'static str>,
    /// One or two entries from [`SPEECH_PATTERNS`] joined with ` AND `
    pub speech_pattern: String,
}

impl SeedTraits {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let interest_count = rng.gen_range(2..=3);
        let interests = SEED_INTERESTS.choose_multiple(rng, interest_count).copied().collect();
        let pattern_count = rng.gen_range(1..=2);
        let patterns: Vec<&str> = SPEECH_PATTERNS.choose_multiple(rng, pattern_count).copied().collect();
        Self { interests, speech_pattern: patterns.join(" AND ") }
    }
}

/// Critique of a generated personality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub needs_improvement: bool,
    pub suggestions: String,
}

impl Evaluation {
    /// The answer starts with `YES` when the persona should be regenerated; everything after
    /// the first line is kept as suggestions.
    #[must_use]
    pub fn parse(answer: &str) -> Self {
        let answer = answer.trim();
        let needs_improvement = answer.to_uppercase().starts_with("YES");
        let suggestions =
            answer.split_once('\n').map(|(_, rest)| rest.trim().to_owned()).unwrap_or_default();
        Self { needs_improvement, suggestions }
    }
}

/// Parses model output into a personality.
///
/// Accepts the `personality:`-wrapped document or a bare personality mapping, with or without
/// a markdown fence.
///
/// # Errors
/// `YamlParse` when neither form matches, `InvalidOutput` when the name is blank.
pub fn parse_personality_yaml(content: &str) -> Result<Personality, LlmError> {
    let yaml = strip_code_fence(content);
    let personality = match serde_yaml::from_str::<PersonalityDocument>(yaml) {
        Ok(doc) => doc.personality,
        Err(_) => serde_yaml::from_str::<Personality>(yaml).map_err(|e| LlmError::YamlParse {
            context: format!("personality (response: {})", truncate(yaml, 300)),
            source: e,
        })?,
    };
    if personality.name.trim().is_empty() {
        return Err(LlmError::InvalidOutput("personality has no name".to_owned()));
    }
    Ok(personality)
}

/// Generates personalities, asking the model to critique and improve each one.
#[derive(Debug, Clone)]
pub struct ProfileGenerator {
    client: Arc<LlmClient>,
    max_iterations: usize,
    max_retries: usize,
}

impl ProfileGenerator {
    #[must_use]
    pub const fn new(client: Arc<LlmClient>) -> Self {
        Self { client, max_iterations: 3, max_retries: 3 }
    }

    #[must_use]
    pub const fn with_limits(mut self, max_iterations: usize, max_retries: usize) -> Self {
        self.max_iterations = if max_iterations == 0 { 1 } else { max_iterations };
        self.max_retries = if max_retries == 0 { 1 } else { max_retries };
        self
    }

    /// Generates one personality, optionally connected to `field_of_focus`.
    ///
    /// A malformed or failed attempt restarts the refinement loop, up to `max_retries` times.
    ///
    /// # Errors
    /// `RetriesExhausted` wrapping the last failure.
    pub async fn generate(&self, field_of_focus: Option<&str>) -> Result<Personality, LlmError> {
        let mut last_error = None;
        for attempt in 1..=self.max_retries {
            match self.refine(field_of_focus).await {
                Ok(personality) => return Ok(personality),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max = self.max_retries,
                        error = %e,
                        "Personality generation failed"
                    );
                    last_error = Some(e);
                },
            }
        }
        Err(LlmError::RetriesExhausted(Box::new(last_error.unwrap_or(LlmError::EmptyResponse))))
    }

    async fn refine(&self, field_of_focus: Option<&str>) -> Result<Personality, LlmError> {
        let mut suggestions = String::new();
        let mut last = None;
        for iteration in 0..self.max_iterations {
            let seed = SeedTraits::sample(&mut rand::thread_rng());
            let prompt = generation_prompt(&seed, field_of_focus, iteration, &suggestions);
            let request = ChatRequest::new(
                self.client.model(),
                vec![Message::system(GENERATOR_SYSTEM_PROMPT), Message::user(prompt)],
            )
            .temperature(0.9);
            let personality = parse_personality_yaml(&self.client.chat_completion(&request).await?)?;

            let evaluation = self.evaluate(&personality).await?;
            if !evaluation.needs_improvement {
                tracing::info!(
                    name = %personality.name,
                    iterations = iteration + 1,
                    "Generated satisfactory personality"
                );
                return Ok(personality);
            }
            tracing::info!(
                iteration = iteration + 1,
                suggestions = %truncate(&evaluation.suggestions, 200),
                "Personality needs improvement"
            );
            suggestions = evaluation.suggestions;
            last = Some(personality);
        }
        tracing::warn!("Reached maximum iterations, keeping last generated personality");
        last.ok_or(LlmError::EmptyResponse)
    }

    /// Asks the model whether `personality` is distinctive enough.
    ///
    /// # Errors
    /// Any client error.
    pub async fn evaluate(&self, personality: &Personality) -> Result<Evaluation, LlmError> {
        let document = PersonalityDocument { personality: personality.clone() };
        let yaml = serde_yaml::to_string(&document).map_err(|e| LlmError::YamlParse {
            context: "serializing personality for evaluation".to_owned(),
            source: e,
        })?;
        let prompt = format!(
            "Review this AI personality and determine if it could be more interesting or unique:\n\n\
             {yaml}\n\
             Consider:\n\
             1. Are the interests truly unique and specific?\n\
             2. Is the speech pattern distinctive enough?\n\
             3. Are the quirks genuinely unusual?\n\
             4. Could the personality be more engaging?\n\n\
             First answer YES or NO if this personality needs improvement, then provide specific suggestions.\n\
             If YES, provide 2-3 concrete ideas for making it more interesting.\n\
             If NO, explain why this personality is already sufficiently unique."
        );
        let request = ChatRequest::new(
            self.client.model(),
            vec![Message::system(EVALUATOR_SYSTEM_PROMPT), Message::user(prompt)],
        )
        .temperature(0.7);
        let answer = self.client.chat_completion(&request).await?;
        Ok(Evaluation::parse(&answer))
    }
}

fn generation_prompt(
    seed: &SeedTraits,
    field_of_focus: Option<&str>,
    iteration: usize,
    suggestions: &str,
) -> String {
    let interests: Vec<String> = seed.interests.iter().map(|i| format!("- {i}")).collect();
    let mut prompt = format!(
        "Generate a unique and potentially unhinged AI personality in YAML format.\n\
         Use these interests as inspiration (but feel free to expand or modify):\n{}\n\n\
         Speech pattern to incorporate:\n{}\n",
        interests.join("\n"),
        seed.speech_pattern
    );
    if let Some(field) = field_of_focus {
        prompt.push_str(&format!(
            "\nThis personality should have some connection to or interest in {field}.\n\
             Their perspective on {field} should be unique and possibly unconventional.\n\
             They don't need to be an expert - they might view it through the lens of their other interests.\n"
        ));
    }
    if iteration > 0 {
        prompt.push_str(&format!(
            "\nPrevious attempt wasn't unique enough. Suggestions for improvement:\n{suggestions}\n"
        ));
    }
    prompt.push_str(&format!(
        "\nThe YAML must follow this exact structure:\n\n{PERSONALITY_TEMPLATE}\n\n\
         Make it interesting and unique. They should be obsessive about their specific interests.\n\
         Ensure the output follows the exact YAML structure above."
    ));
    prompt
}

#[cfg(test)]
#[path = "profiles_tests.rs"]
mod tests;
