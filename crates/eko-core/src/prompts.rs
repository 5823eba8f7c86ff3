//! Prompts sent to the completion provider.

use crate::language::Language;

/// Longest chat title kept as-is.
pub const MAX_CHAT_NAME_CHARS: usize = 50;

const COMPANION_EN: &str = "You are EKO, a warm and attentive companion in a psychological \
support app. Listen carefully, answer with empathy, keep replies short and conversational, \
and encourage the user to reach a professional or emergency service when they describe \
being in danger. You are not a therapist and never give medical diagnoses.";

const COMPANION_FR: &str = "Tu es EKO, un compagnon chaleureux et attentif dans une application \
d'assistance psychologique. Écoute attentivement, réponds avec empathie, garde des réponses \
courtes et naturelles, et encourage l'utilisateur à contacter un professionnel ou un service \
d'urgence s'il décrit une situation de danger. Tu n'es pas thérapeute et ne poses jamais de \
diagnostic médical. Réponds toujours en français.";

const CHAT_NAME_SYSTEM: &str = "You are a helpful assistant that generates short, friendly names \
for chat sessions in a psychological support app. Respond with only the chat name, nothing else.";

const CHAT_NAME_EN: &str = "Generate a short, friendly chat session name for a psychological \
assistant app.
The user is starting a new conversation.
Context: Psychological support and guidance
Format: 2-4 words, encouraging and welcoming
Examples: \"New Journey\", \"Fresh Start\", \"Let's Talk\", \"New Beginning\"
Respond with only the chat name, nothing else.";

const CHAT_NAME_FR: &str = "Génère un nom court et amical pour une session de chat dans une \
application d'assistance psychologique.
L'utilisateur commence une nouvelle conversation.
Contexte: Support et guidance psychologique
Format: 2-4 mots, encourageant et accueillant
Exemples: \"Nouveau Départ\", \"Parlons-en\", \"Nouveau Voyage\", \"Nouveau Commencement\"
Réponds seulement avec le nom du chat, rien d'autre.";

/// System prompt for bot replies.
pub fn companion_system_prompt(language: Language) -> &'static str {
    match language {
        Language::English => COMPANION_EN,
        Language::French => COMPANION_FR,
    }
}

pub fn chat_name_system_prompt() -> &'static str {
    CHAT_NAME_SYSTEM
}

/// User prompt asking for a chat title.
pub fn chat_name_prompt(language: Language) -> &'static str {
    match language {
        Language::English => CHAT_NAME_EN,
        Language::French => CHAT_NAME_FR,
    }
}

/// Tidy a generated chat title: trim, drop surrounding quotes, cap the
/// length. Returns `None` when nothing usable remains.
pub fn clean_chat_name(raw: &str) -> Option<String> {
    let name = raw
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim();
    if name.is_empty() {
        return None;
    }
    if name.chars().count() > MAX_CHAT_NAME_CHARS {
        let head: String = name.chars().take(MAX_CHAT_NAME_CHARS - 3).collect();
        return Some(format!("{head}..."));
    }
    Some(name.to_string())
}
