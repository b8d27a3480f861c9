//! Chatbot and content studio built on the hosted generative-AI API.
//!
//! The model is an opaque remote capability (`Generator`). Failures never
//! reach the user: they are logged and replaced by fixed fallback text.

pub mod client;
pub mod error;

pub use client::{GeminiClient, Generator, DEFAULT_MODEL};
pub use error::ApiError;

use tracing::warn;

use crate::models::seed::{PARTY_MOTTO, PARTY_NAME};
use crate::models::Language;

/// Shown when the chat call fails.
pub const CHAT_FALLBACK: &str = "Service indisponible.";

/// Shown when the model answers with no text.
pub const CHAT_EMPTY_REPLY: &str = "Vive le Mali !";

/// Shown in the admin studio when generation fails.
pub const STUDIO_FALLBACK: &str = "Erreur de génération. Vérifiez votre connexion.";

/// Register of content produced by the admin studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioMode {
    /// Official, formal statement.
    Campaign,
    /// Short post for social networks.
    Social,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

pub fn welcome_message(language: Language) -> String {
    match language {
        Language::Fr => format!("Bonjour ! Je suis l'assistant de l'{}. Comment puis-je vous aider ?", PARTY_NAME),
        Language::En => format!("Hello! I am the {} assistant. How can I help you?", PARTY_NAME),
        Language::Es => format!("¡Hola! Soy el asistente de la {}. ¿Cómo puedo ayudarle?", PARTY_NAME),
        Language::Ar => format!("مرحباً! أنا المساعد الذكي لـ {}. كيف يمكنني مساعدتك؟", PARTY_NAME),
    }
}

pub fn chat_instruction(language: Language) -> String {
    format!(
        "Tu es l'assistant officiel de l'ARM (Alliance pour le Rassemblement Malien). \
         Devise: \"{}\". Réponds en {}. Sois courtois et patriote.",
        PARTY_MOTTO,
        language.french_name()
    )
}

pub fn studio_instruction(mode: StudioMode, language: Language) -> String {
    let register = match mode {
        StudioMode::Social => "court pour réseaux sociaux",
        StudioMode::Campaign => "officiel et formel",
    };
    format!(
        "Tu es le stratège de communication de l'ARM Mali (Mali Kura). Devise: {}. \
         Rédige un contenu {}. \
         Mets en avant les 8 objectifs fondamentaux du parti (Unité, Intégrité, Éducation, Santé, Souveraineté alimentaire). \
         Langue : {}.",
        PARTY_MOTTO, register, language
    )
}

pub struct Assistant<G: Generator> {
    generator: G,
}

impl<G: Generator> Assistant<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Answer a visitor's chat message. Blank input is ignored.
    pub async fn reply(&self, language: Language, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let answer = match self.generator.generate(text, &chat_instruction(language)).await {
            Ok(answer) if answer.is_empty() => CHAT_EMPTY_REPLY.to_string(),
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Chat generation failed");
                CHAT_FALLBACK.to_string()
            }
        };
        Some(answer)
    }

    /// Draft content in the admin studio. Blank prompts are ignored.
    pub async fn compose(&self, mode: StudioMode, prompt: &str, language: Language) -> Option<String> {
        if prompt.trim().is_empty() {
            return None;
        }
        let text = match self.generator.generate(prompt, &studio_instruction(mode, language)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, ?mode, "Studio generation failed");
                STUDIO_FALLBACK.to_string()
            }
        };
        Some(text)
    }
}

/// A chat transcript, opened with the welcome message of its language.
#[derive(Debug, Clone)]
pub struct Conversation {
    language: Language,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            messages: vec![ChatMessage {
                speaker: Speaker::Bot,
                text: welcome_message(language),
            }],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switching language restarts the transcript.
    pub fn set_language(&mut self, language: Language) {
        *self = Self::new(language);
    }

    /// Send a message and append both sides. Returns the bot's answer, or
    /// `None` when the message was blank.
    pub async fn send<G: Generator>(&mut self, assistant: &Assistant<G>, text: &str) -> Option<&str> {
        let answer = assistant.reply(self.language, text).await?;
        self.messages.push(ChatMessage {
            speaker: Speaker::User,
            text: text.to_string(),
        });
        self.messages.push(ChatMessage {
            speaker: Speaker::Bot,
            text: answer,
        });
        self.messages.last().map(|m| m.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted generator recording what it was asked.
    struct Scripted {
        answer: Result<String, String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Scripted {
        fn answering(answer: &str) -> Self {
            Self {
                answer: Ok(answer.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err("offline".to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for Scripted {
        async fn generate(&self, prompt: &str, system_instruction: &str) -> anyhow::Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), system_instruction.to_string()));
            self.answer.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[tokio::test]
    async fn test_reply_passes_prompt_and_language() {
        let assistant = Assistant::new(Scripted::answering("Bonjour !"));
        let answer = assistant.reply(Language::Es, "Hola").await;
        assert_eq!(answer.as_deref(), Some("Bonjour !"));

        let seen = assistant.generator.seen.lock().unwrap();
        assert_eq!(seen[0].0, "Hola");
        assert!(seen[0].1.contains("Réponds en espagnol"));
        assert!(seen[0].1.contains(PARTY_MOTTO));
    }

    #[tokio::test]
    async fn test_reply_fallbacks() {
        let failing = Assistant::new(Scripted::failing());
        assert_eq!(failing.reply(Language::Fr, "Bonjour").await.as_deref(), Some(CHAT_FALLBACK));

        let silent = Assistant::new(Scripted::answering(""));
        assert_eq!(silent.reply(Language::Fr, "Bonjour").await.as_deref(), Some(CHAT_EMPTY_REPLY));

        assert_eq!(silent.reply(Language::Fr, "   ").await, None);
        assert!(silent.generator.seen.lock().unwrap().len() == 1);
    }

    #[tokio::test]
    async fn test_compose_modes_and_fallback() {
        let assistant = Assistant::new(Scripted::answering("Communiqué"));
        assistant.compose(StudioMode::Social, "Meeting à Kayes", Language::Fr).await;
        assistant.compose(StudioMode::Campaign, "Programme", Language::Ar).await;
        {
            let seen = assistant.generator.seen.lock().unwrap();
            assert!(seen[0].1.contains("court pour réseaux sociaux"));
            assert!(seen[1].1.contains("officiel et formel"));
            assert!(seen[1].1.contains("Langue : ar."));
        }

        let failing = Assistant::new(Scripted::failing());
        let text = failing.compose(StudioMode::Campaign, "Programme", Language::Fr).await;
        assert_eq!(text.as_deref(), Some(STUDIO_FALLBACK));
        assert_eq!(failing.compose(StudioMode::Social, "", Language::Fr).await, None);
    }

    #[tokio::test]
    async fn test_conversation_transcript() {
        let assistant = Assistant::new(Scripted::answering("Avec plaisir."));
        let mut conversation = Conversation::new(Language::Fr);
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].speaker, Speaker::Bot);

        let answer = conversation.send(&assistant, "Comment adhérer ?").await;
        assert_eq!(answer, Some("Avec plaisir."));
        assert_eq!(conversation.messages().len(), 3);
        assert_eq!(conversation.messages()[1].speaker, Speaker::User);

        assert_eq!(conversation.send(&assistant, "").await, None);
        assert_eq!(conversation.messages().len(), 3);

        conversation.set_language(Language::En);
        assert_eq!(conversation.messages().len(), 1);
        assert!(conversation.messages()[0].text.starts_with("Hello!"));
    }
}
