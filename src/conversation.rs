//! Two-person conversation loop built on top of the generation client.
//!
//! The driver owns the running history and alternates strictly between the
//! host and the guest, one generation call per turn, until cancelled.

use std::io::Write;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Ollama, OllamaError};

/// Pause between turns so the console output stays readable.
const TURN_PAUSE: Duration = Duration::from_secs(1);

/// Marker used in the prompt when the conversation has not started yet.
const HISTORY_START: &str = "(start)";

/// A named conversational role with a fixed personality description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub personality: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: personality.into(),
        }
    }
}

/// The conversation state: topic, participants and the append-only history.
///
/// The host always speaks on even turns, the guest on odd ones. Only the most
/// recent `history_limit` entries are read back into each new prompt.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub topic: String,
    pub language: String,
    pub history_limit: usize,
    participants: [Persona; 2],
    history: Vec<String>,
    turn: usize,
}

impl Conversation {
    pub fn new(
        topic: impl Into<String>,
        language: impl Into<String>,
        host: Persona,
        guest: Persona,
        history_limit: usize,
    ) -> Self {
        Self {
            topic: topic.into(),
            language: language.into(),
            history_limit,
            participants: [host, guest],
            history: Vec::new(),
            turn: 0,
        }
    }

    pub fn host(&self) -> &Persona {
        &self.participants[0]
    }

    pub fn guest(&self) -> &Persona {
        &self.participants[1]
    }

    /// The participant whose turn it is, host first, strictly alternating.
    pub fn speaker(&self) -> &Persona {
        &self.participants[self.turn % 2]
    }

    /// Number of completed turns.
    pub fn turns(&self) -> usize {
        self.turn
    }

    /// The last `history_limit` entries joined with newlines, oldest first,
    /// or the start marker when nothing has been said yet.
    pub fn recent_turns(&self) -> String {
        if self.history.is_empty() {
            return HISTORY_START.to_string();
        }
        let start = self.history.len().saturating_sub(self.history_limit);
        self.history[start..].join("\n")
    }

    /// Builds the prompt for the current speaker, embedding the topic, both
    /// personas and the recent history window.
    pub fn prompt(&self) -> String {
        let host = self.host();
        let guest = self.guest();
        format!(
            "Podcast conversation in {language}. Topic: {topic}. \
             Participants: {host} ({host_personality}) is a host and interviewer, \
             {guest} ({guest_personality}). \
             Recent turns:\n{recent}\n\
             Your turn: {speaker}. Be conversational, ~30 words max. \
             Respond in {language}.",
            language = self.language,
            topic = self.topic,
            host = host.name,
            host_personality = host.personality,
            guest = guest.name,
            guest_personality = guest.personality,
            recent = self.recent_turns(),
            speaker = self.speaker().name,
        )
    }

    /// Appends the current speaker's reply to history and advances the turn.
    pub fn record_reply(&mut self, reply: &str) {
        let entry = format!("{}: {}", self.speaker().name, reply);
        self.history.push(entry);
        self.turn += 1;
    }

    /// Runs the turn loop until the token is cancelled.
    ///
    /// Each turn prints the speaker label, streams the reply to stdout and
    /// records it. The token is checked between turns and during the
    /// inter-turn pause; an in-flight generation is left to finish.
    /// Generation errors are not recovered here, they abort the loop.
    pub async fn run(
        &mut self,
        llm: &Ollama,
        cancel: &CancellationToken,
    ) -> Result<(), OllamaError> {
        while !cancel.is_cancelled() {
            let prompt = self.prompt();
            log::debug!("turn {} prompt:\n{prompt}", self.turn);

            print!("[{}]: ", self.speaker().name);
            std::io::stdout().flush()?;

            let reply = llm.generate(prompt, true).await?;
            self.record_reply(&reply);
            println!();

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(TURN_PAUSE) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_conversation(history_limit: usize) -> Conversation {
        Conversation::new(
            "AI and the future",
            "English",
            Persona::new("Joe", "curious interviewer"),
            Persona::new("Alex", "tech entrepreneur"),
            history_limit,
        )
    }

    #[test]
    fn host_speaks_first_then_strict_alternation() {
        let mut convo = make_conversation(10);
        for turn in 0..7 {
            let expected = if turn % 2 == 0 { "Joe" } else { "Alex" };
            assert_eq!(convo.speaker().name, expected, "turn {turn}");
            convo.record_reply("something");
        }
        assert_eq!(convo.turns(), 7);
    }

    #[test]
    fn empty_history_uses_start_marker() {
        let convo = make_conversation(10);
        assert_eq!(convo.recent_turns(), "(start)");
        assert!(convo.prompt().contains("Recent turns:\n(start)\n"));
    }

    #[test]
    fn recent_turns_window_keeps_chronological_order() {
        let mut convo = make_conversation(2);
        convo.history = vec![
            "A: hi".to_string(),
            "B: hello".to_string(),
            "A: how are you".to_string(),
        ];
        assert_eq!(convo.recent_turns(), "B: hello\nA: how are you");
    }

    #[test]
    fn window_larger_than_history_keeps_everything() {
        let mut convo = make_conversation(10);
        convo.record_reply("hi");
        convo.record_reply("hello");
        assert_eq!(convo.recent_turns(), "Joe: hi\nAlex: hello");
    }

    #[test]
    fn record_reply_formats_speaker_prefix() {
        let mut convo = make_conversation(10);
        convo.record_reply("welcome to the show");
        assert_eq!(convo.history, vec!["Joe: welcome to the show"]);
    }

    #[test]
    fn prompt_names_current_speaker_and_language() {
        let mut convo = make_conversation(10);
        let prompt = convo.prompt();
        assert!(prompt.contains("Your turn: Joe."));
        assert!(prompt.contains("Podcast conversation in English."));
        assert!(prompt.contains("Topic: AI and the future."));
        assert!(prompt.contains("Joe (curious interviewer) is a host and interviewer"));
        assert!(prompt.contains("Alex (tech entrepreneur)"));

        convo.record_reply("hello everyone");
        assert!(convo.prompt().contains("Your turn: Alex."));
    }

    #[tokio::test]
    async fn run_exits_promptly_when_token_already_cancelled() {
        let mut convo = make_conversation(10);
        let llm = Ollama::create_default().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        convo.run(&llm, &cancel).await.unwrap();
        assert_eq!(convo.turns(), 0);
    }
}
