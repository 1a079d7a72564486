//! Prompt builders for the interviewer persona and generation requests.

use crate::domain::profile::{Profile, Role};

/// Fallback reply when the completion service returns an empty message.
pub const FALLBACK_REPLY: &str = "抱歉，我没有听清，请再说一遍。";

/// Opening probe sent when refining an existing profile.
pub const OPENING_PROBE_SEEDED: &str = "Let's deepen the profile.";

/// Opening probe sent when starting from scratch.
pub const OPENING_PROBE_FRESH: &str = "Hi";

/// System instruction for the interviewer persona.
///
/// When a seed profile is given, the instruction biases the assistant
/// toward deepening the existing profile instead of collecting basic facts
/// again.
pub fn interviewer_instruction(role: Role, seed: Option<&Profile>) -> String {
    let context = match seed {
        Some(profile) => format!(
            "\nThe user already has a basic profile:\n\
             Name: {}\n\
             Tagline: {}\n\
             Needs: {}\n\
             Offers: {}\n\n\
             Your goal is to DEEPEN this profile. Do not ask for basic info again.\n\
             Ask about their specific challenges, recent achievements, or specific \
             resource details to make the profile more attractive for matching.\n",
            profile.name, profile.tagline, profile.needs, profile.offers
        ),
        None => String::new(),
    };

    format!(
        "You are an expert startup community manager for \"FounderLink\".\n\
         You are interviewing a user who wants to join as a \"{role}\".\n\
         {context}\
         Your goal is to ask 3-4 short, specific, and high-quality questions to \
         understand their professional profile.\n\
         Do not ask all questions at once. Ask one by one.\n\
         Keep a friendly, professional, and concise tone.\n\n\
         For Founder, ask about: Project one-liner, Field keywords, Current stage, \
         What they need, What they offer.\n\
         For Investor, ask about: Tracks/Sectors, Investment stage/range, What \
         projects they look for, What support they offer.\n\
         For Explorer, ask about: Identity (Student/Media/etc), Who they want to \
         meet, What they offer (skills/volunteering), Interest direction."
    )
}

/// Prompt asking for a structured profile from the five wizard answers.
pub fn wizard_generation_prompt(role: Role, answers: &[String]) -> String {
    let numbered = answers
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {}", i + 1, a))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate a User Profile JSON for a \"{role}\" based on these 5 answers:\n\
         {numbered}\n\n\
         Map these answers to: name/project, tags, description (stage/identity), \
         needs, offers.\n\
         Create a catchy 'tagline'."
    )
}

/// Prompt asking for a structured profile from a flattened transcript.
pub fn history_generation_prompt(role: Role, transcript: &str) -> String {
    format!(
        "Based on the following interview transcript, generate a structured \
         User Profile JSON.\n\
         The user's role is {role}.\n\n\
         Transcript:\n\
         {transcript}\n\n\
         If specific information is missing, infer a reasonable short placeholder \
         or leave it generic based on context.\n\
         The 'tags' should be short keywords (max 4).\n\
         'tagline' should be a catchy one-liner."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_profile() -> Profile {
        Profile {
            name: "PayFlow".to_string(),
            role: Role::Founder,
            tagline: "Payroll without the pain".to_string(),
            tags: vec!["Fintech".to_string()],
            description: "Building payroll for small teams".to_string(),
            needs: "Technical co-founder".to_string(),
            offers: "Industry connections".to_string(),
            avatar_url: None,
            is_verified: false,
        }
    }

    #[test]
    fn instruction_names_the_role() {
        let text = interviewer_instruction(Role::Investor, None);
        assert!(text.contains("join as a \"Investor\""));
        assert!(!text.contains("DEEPEN"));
    }

    #[test]
    fn seeded_instruction_carries_profile_context() {
        let profile = seed_profile();
        let text = interviewer_instruction(Role::Founder, Some(&profile));
        assert!(text.contains("DEEPEN"));
        assert!(text.contains("Name: PayFlow"));
        assert!(text.contains("Needs: Technical co-founder"));
    }

    #[test]
    fn wizard_prompt_numbers_answers_in_order() {
        let answers: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let prompt = wizard_generation_prompt(Role::Founder, &answers);
        assert!(prompt.contains("1. a"));
        assert!(prompt.contains("5. e"));
        assert!(prompt.contains("\"Founder\""));
    }

    #[test]
    fn history_prompt_embeds_transcript_and_role() {
        let prompt = history_generation_prompt(Role::Explorer, "user: hello");
        assert!(prompt.contains("The user's role is Explorer"));
        assert!(prompt.contains("user: hello"));
    }
}
