//! The chat room: an append-only, time-ordered message log.
//!
//! Every agent reads it; only the scheduler writes it, and only between
//! ticks. Nothing is ever removed or reordered after it is appended.

use crate::error::Result;
use crate::message::ChatMessage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named room holding the shared message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    room_name: String,

    #[serde(default)]
    messages: Vec<ChatMessage>,
}

impl ChatRoom {
    /// Create an empty room.
    pub fn new(room_name: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            messages: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.room_name
    }

    /// All messages in log order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The `n` most recent messages, oldest first.
    pub fn window(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Append one message at the tail. No ordering check: the caller is
    /// trusted to append in order.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a batch from several producers, sorted by `created_at`
    /// ascending. The sort is stable, so equal timestamps keep batch order.
    pub fn append_batch(&mut self, mut messages: Vec<ChatMessage>) {
        messages.sort_by_key(|m| m.created_at());
        self.messages.extend(messages);
    }

    /// Flat `author: text` transcript, one line per message.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize to a YAML document (`room_name` + ordered `messages`).
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse a document produced by [`ChatRoom::to_yaml`].
    pub fn from_yaml(doc: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(doc)?)
    }

    /// Write the YAML export to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        tracing::debug!(path = %path.display(), messages = self.len(), "Saved chat room");
        Ok(())
    }

    /// Load a room previously written by [`ChatRoom::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let doc = std::fs::read_to_string(path)?;
        Self::from_yaml(&doc)
    }
}

impl std::fmt::Display for ChatRoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(secs: i64, text: &str, author: &str) -> ChatMessage {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        ChatMessage::at(text, author, base + Duration::seconds(secs))
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut room = ChatRoom::new("Test Room");
        room.append(at(5, "late", "a"));
        room.append(at(1, "early", "b"));
        assert_eq!(room.len(), 2);
        assert_eq!(room.messages()[0].text(), "late");
    }

    #[test]
    fn append_batch_sorts_ascending() {
        let mut room = ChatRoom::new("Test Room");
        room.append(at(0, "seed", "user"));
        room.append_batch(vec![at(30, "c", "x"), at(10, "a", "y"), at(20, "b", "z")]);

        let texts: Vec<_> = room.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["seed", "a", "b", "c"]);
        assert!(room.messages()[1..]
            .windows(2)
            .all(|w| w[0].created_at() <= w[1].created_at()));
    }

    #[test]
    fn append_batch_is_stable_on_ties() {
        let mut room = ChatRoom::new("Test Room");
        room.append_batch(vec![at(1, "first", "a"), at(1, "second", "b"), at(0, "zero", "c")]);
        let authors: Vec<_> = room.messages().iter().map(|m| m.author()).collect();
        assert_eq!(authors, vec!["c", "a", "b"]);
    }

    #[test]
    fn window_is_bounded() {
        let mut room = ChatRoom::new("Test Room");
        for i in 0..5 {
            room.append(at(i, &i.to_string(), "a"));
        }
        let texts: Vec<_> = room.window(2).iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["3", "4"]);
        assert_eq!(room.window(50).len(), 5);
        assert!(room.window(0).is_empty());
    }

    #[test]
    fn render_transcript() {
        let mut room = ChatRoom::new("Test Room");
        room.append(at(0, "Hello", "User"));
        room.append(at(1, "Hi!", "bot"));
        assert_eq!(room.render(), "User: Hello\nbot: Hi!");
        assert_eq!(room.to_string(), room.render());
    }

    #[test]
    fn yaml_roundtrip_preserves_messages() {
        let mut room = ChatRoom::new("Test Room");
        room.append(ChatMessage::new("Hello", "User"));
        room.append(ChatMessage::new("multi\nline: text", "bot"));

        let doc = room.to_yaml().unwrap();
        let loaded = ChatRoom::from_yaml(&doc).unwrap();
        assert_eq!(loaded, room);
    }

    #[test]
    fn yaml_roundtrip_survives_awkward_text() {
        let texts = [
            "", "null", "~", "- x", "true", "0x1F", "key: value", "# not a comment",
            "'quoted'", "\"double\"", "tab\there", "bell\u{7}", "\r\n", "  padded  ", "ünïcødé ✓",
        ];

        let mut room = ChatRoom::new("Test Room");
        for (i, text) in texts.iter().enumerate() {
            room.append(at(i as i64, text, "author: odd"));
        }

        let loaded = ChatRoom::from_yaml(&room.to_yaml().unwrap()).unwrap();
        assert_eq!(loaded, room);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_room.yaml");

        let mut room = ChatRoom::new("Test Room");
        room.append(ChatMessage::new("Hello", "User"));
        room.save(&path).unwrap();

        let loaded = ChatRoom::load(&path).unwrap();
        assert_eq!(loaded.name(), "Test Room");
        assert_eq!(loaded.messages(), room.messages());
    }
}
