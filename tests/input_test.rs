//! Console input tests
//!
//! Command parsing plus whole sessions against the bundled question set
//! (no backend configured, so nothing touches the network).

use voxform::form::shell::{RESET_PROMPT, SUBMIT_FAILURE, TITLE};
use voxform::form::FormShell;
use voxform::gateway::{Gateway, GatewayConfig};
use voxform::input::{create_default_commands, parse_line, Command, CommandAction, Console, Flow};
use voxform::speech::{Narrator, SpeechRequest, Synth, VoiceSettings};
use voxform::state::FieldValue;
use voxform::Result;

/// Engine that finishes every utterance instantly
struct InstantSynth;

impl Synth for InstantSynth {
    fn speak(&mut self, _request: &SpeechRequest) -> Result<()> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_speaking(&self) -> Option<bool> {
        Some(false)
    }
}

#[test]
fn test_default_commands() {
    let commands = create_default_commands();
    assert_eq!(commands.get("submit"), Some(&CommandAction::Submit));
    assert_eq!(commands.get("q"), Some(&CommandAction::Quit));
    assert_eq!(commands.get("all"), Some(&CommandAction::SpeakAll));
    assert!(commands.get("dance").is_none());
}

#[test]
fn test_parse_line() {
    let commands = create_default_commands();
    assert_eq!(
        parse_line("   ", &commands),
        Command::Action(CommandAction::NextField)
    );
    assert_eq!(
        parse_line(":stop", &commands),
        Command::Action(CommandAction::Stop)
    );
    assert_eq!(parse_line(":g 4", &commands), Command::Goto(4));
    assert_eq!(
        parse_line("ivan@example.com", &commands),
        Command::Value("ivan@example.com".to_string())
    );
}

fn console() -> Console<Gateway> {
    let gateway = Gateway::new(GatewayConfig::default()).unwrap();
    let narrator = Narrator::silent(VoiceSettings::default());
    Console::new(FormShell::new(gateway, narrator))
}

async fn send(console: &mut Console<Gateway>, line: &str) -> String {
    let (flow, out) = console.handle_line(line).await.unwrap();
    assert_eq!(flow, Flow::Continue);
    out
}

#[tokio::test]
async fn test_start_focuses_first_field() {
    let mut console = console();
    let out = console.start().await.unwrap();
    assert!(out.contains(TITLE));
    assert!(out.contains("Full name *"));
    assert_eq!(console.focused(), Some(0));
}

#[tokio::test]
async fn test_navigation() {
    let mut console = console();
    console.start().await.unwrap();

    send(&mut console, "").await;
    assert_eq!(console.focused(), Some(1));
    send(&mut console, ":prev").await;
    assert_eq!(console.focused(), Some(0));
    assert_eq!(send(&mut console, ":p").await, "First field.");

    send(&mut console, ":9").await;
    assert_eq!(console.focused(), Some(8));
    assert!(send(&mut console, ":next").await.starts_with("Last field."));

    assert_eq!(send(&mut console, ":goto 40").await, "There is no field 40.");
    assert_eq!(console.focused(), Some(8));
}

#[tokio::test]
async fn test_answers_are_stored() {
    let mut console = console();
    console.start().await.unwrap();

    let out = send(&mut console, "Ivan Petrov").await;
    assert!(out.contains("Ivan Petrov"));

    send(&mut console, ":5").await;
    send(&mut console, "2").await;
    send(&mut console, ":8").await;
    send(&mut console, "yes").await;

    let form = console.shell().form();
    assert_eq!(form.get("fullName"), Some(&FieldValue::from("Ivan Petrov")));
    assert_eq!(form.get("disability"), Some(&FieldValue::from("Group II")));
    assert_eq!(form.get("remoteWork"), Some(&FieldValue::Flag(true)));
}

#[tokio::test]
async fn test_bad_answers_are_reported() {
    let mut console = console();
    console.start().await.unwrap();

    send(&mut console, ":5").await;
    assert_eq!(
        send(&mut console, "Group IX").await,
        "Field Disability group has no option Group IX."
    );
    send(&mut console, ":8").await;
    assert_eq!(
        send(&mut console, "perhaps").await,
        "Field Ready for remote work expects yes or no."
    );
}

#[tokio::test]
async fn test_option_keys_only_on_selections() {
    let mut console = console();
    console.start().await.unwrap();

    assert_eq!(
        send(&mut console, ":down").await,
        "The focused field is not a selection."
    );
    send(&mut console, ":5").await;
    send(&mut console, ":down").await;
    send(&mut console, ":down").await;
    assert_eq!(
        console.shell().form().get("disability"),
        Some(&FieldValue::from("Group II"))
    );
}

#[tokio::test]
async fn test_submit_needs_consent() {
    let mut console = console();
    console.start().await.unwrap();

    assert_eq!(
        send(&mut console, ":submit").await,
        "You must accept the personal data processing terms."
    );

    assert_eq!(send(&mut console, ":consent").await, "Consent given.");
    assert_eq!(
        send(&mut console, ":submit").await,
        "Field Full name is required."
    );
}

#[tokio::test]
async fn test_submit_without_backend_keeps_answers() {
    let mut console = console();
    console.start().await.unwrap();

    send(&mut console, "Ivan Petrov").await;
    send(&mut console, ":2").await;
    send(&mut console, "1990-05-01").await;
    send(&mut console, ":3").await;
    send(&mut console, "ivan@example.com").await;
    send(&mut console, ":5").await;
    send(&mut console, "None").await;
    send(&mut console, ":consent").await;

    assert_eq!(send(&mut console, ":submit").await, SUBMIT_FAILURE);
    assert_eq!(
        console.shell().form().get("email"),
        Some(&FieldValue::from("ivan@example.com"))
    );
}

#[tokio::test]
async fn test_reset_asks_first() {
    let mut console = console();
    console.start().await.unwrap();
    send(&mut console, "Ivan Petrov").await;

    let prompt = send(&mut console, ":reset").await;
    assert!(prompt.starts_with(RESET_PROMPT));
    // The answer line is not a field value
    assert_eq!(send(&mut console, "no").await, "Reset cancelled.");
    assert_eq!(
        console.shell().form().get("fullName"),
        Some(&FieldValue::from("Ivan Petrov"))
    );

    send(&mut console, ":reset").await;
    send(&mut console, "y").await;
    assert_eq!(
        console.shell().form().get("fullName"),
        Some(&FieldValue::from(""))
    );
}

#[tokio::test]
async fn test_speech_commands_without_engine() {
    let mut console = console();
    console.start().await.unwrap();

    assert_eq!(send(&mut console, ":all").await, "Speech is unavailable.");
    assert_eq!(send(&mut console, ":stop").await, "Speech stopped.");
    assert_eq!(send(&mut console, ":auto").await, "Automatic speech off.");
    assert_eq!(send(&mut console, ":auto").await, "Automatic speech on.");
    assert!(send(&mut console, ":bogus").await.starts_with("Unknown command"));
}

#[tokio::test]
async fn test_quit() {
    let mut console = console();
    console.start().await.unwrap();
    let (flow, _) = console.handle_line(":quit").await.unwrap();
    assert_eq!(flow, Flow::Quit);
}

#[tokio::test]
async fn test_finished_speech_is_noticed_on_next_line() {
    let gateway = Gateway::new(GatewayConfig::default()).unwrap();
    let narrator = Narrator::new(Box::new(InstantSynth), VoiceSettings::default());
    let mut console = Console::new(FormShell::new(gateway, narrator));

    // Focusing the first field speaks it
    console.start().await.unwrap();
    assert!(console.shell().narrator().is_speaking());

    send(&mut console, ":show").await;
    assert!(!console.shell().narrator().is_speaking());
}
