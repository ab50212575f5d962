//! End-to-end tests: room file on disk → agents → ticks → exported transcript.
//!
//! Backends are scripted, so nothing here touches the network.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use agora_agent::testing::{ScriptedProvider, tool_response};
use agora_agent::{LlmHandle, build_agent};
use agora_config::RoomConfig;
use agora_core::ChatRoom;
use agora_room::Agorama;

const ROOM: &str = r#"
name: Harbour
agents:
  - name: poet
    model_reference: openai/gpt-4o-mini
    system_prompt: Answer in one line.
  - name: critic
    model_reference: openai/gpt-4o-mini
    kind: reasoning
  - name: archivist
    model_reference: openai/gpt-4o-mini
    kind: memory
initial_state:
  - text: Write something about the sea.
    author: User
    created_at: "2024-05-01T10:00:00Z"
"#;

fn write_room(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("room.yaml");
    std::fs::write(&path, ROOM).unwrap();
    path
}

/// Assemble the room from its file with one scripted backend per agent.
fn scripted_room(config: &RoomConfig, scripts: Vec<Arc<ScriptedProvider>>) -> Agorama {
    let mut log = ChatRoom::new(&config.name);
    for message in config.initial_messages() {
        log.append(message);
    }

    let mut room = Agorama::with_log(log);
    for (spec, provider) in config.agents.iter().zip(scripts) {
        room.add_agent(build_agent(spec, LlmHandle::new(provider, "scripted")))
            .unwrap();
    }
    room
}

#[tokio::test]
async fn room_file_to_exported_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let config = RoomConfig::load(&write_room(dir.path())).unwrap();

    let poet = Arc::new(ScriptedProvider::texts(&["The tide keeps time.", "Salt on every line."]));
    let critic = Arc::new(ScriptedProvider::texts(&["no", "yes", "Derivative."]));
    let archivist = Arc::new(ScriptedProvider::new(vec![
        Ok(tool_response("store", serde_json::json!({"key": "topic", "value": "the sea"}))),
        Ok(agora_agent::testing::text_response(r#"{"key_list": ["topic"]}"#)),
        Ok(tool_response("noop", serde_json::json!({}))),
    ]));
    let mut room = scripted_room(&config, vec![poet.clone(), critic.clone(), archivist.clone()]);

    let reports = room.run(2).await;
    assert_eq!(reports[0].appended, 1);
    assert_eq!(reports[1].appended, 2);
    assert_eq!(poet.call_count(), 2);
    assert_eq!(critic.call_count(), 3);
    assert_eq!(archivist.call_count(), 3);

    let transcript = room.log().render();
    assert!(transcript.starts_with("User: Write something about the sea.\npoet: The tide keeps time."));
    assert!(transcript.contains("critic: Derivative."));

    let export = dir.path().join("export.yaml");
    room.log().save(&export).unwrap();
    let reloaded = ChatRoom::load(&export).unwrap();
    assert_eq!(reloaded.name(), "Harbour");
    assert_eq!(reloaded.messages(), room.log().messages());
}

fn agora() -> Command {
    Command::new(env!("CARGO_BIN_EXE_agora"))
}

#[test]
fn validate_reports_agents() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_room(dir.path());

    let output = agora().arg("validate").arg(&path).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Harbour"));
    assert!(stdout.contains("critic"));
    assert!(stdout.contains("gated"));
}

#[test]
fn missing_agents_aborts_naming_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "name: Empty\ninitial_state: []\n").unwrap();

    let output = agora().arg("run").arg(&path).output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.yaml"));
    assert!(stderr.contains("agents"));
}

#[test]
fn malformed_room_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"agents\": [").unwrap();

    let output = agora().arg("validate").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.json"));
}

#[test]
fn init_then_validate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.yaml");

    assert!(agora().arg("init").arg(&path).status().unwrap().success());
    assert!(agora().arg("validate").arg(&path).status().unwrap().success());
}

#[test]
fn show_prints_exported_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.yaml");

    let mut room = ChatRoom::new("Archive");
    room.append(agora_core::ChatMessage::new("hello", "alice"));
    room.append(agora_core::ChatMessage::new("hi alice", "bob"));
    room.save(&export).unwrap();

    let output = agora().arg("show").arg(&export).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Archive (2 messages)"));
    assert!(stdout.contains("alice: hello\nbob: hi alice"));
}
