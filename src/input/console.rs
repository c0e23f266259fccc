//! Line-driven console session
//!
//! Turns input lines into form shell events and returns the text to show.
//! Reset confirmation is modal: while it is pending the next line is the
//! yes/no answer and nothing else.

use super::keymap::{create_default_commands, parse_line, Command, CommandAction, HELP};
use crate::form::shell::RESET_PROMPT;
use crate::form::{Direction, FormShell, QuestionType};
use crate::gateway::FormBackend;
use crate::state::parse_flag;
use crate::Result;
use log::debug;
use std::collections::HashMap;

/// Whether the session should keep reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    ConfirmReset,
}

/// Console front end over a form shell
pub struct Console<B: FormBackend> {
    shell: FormShell<B>,
    commands: HashMap<&'static str, CommandAction>,
    /// Index of the focused widget
    focus: Option<usize>,
    mode: Mode,
}

impl<B: FormBackend> Console<B> {
    pub fn new(shell: FormShell<B>) -> Self {
        Self {
            shell,
            commands: create_default_commands(),
            focus: None,
            mode: Mode::Normal,
        }
    }

    pub fn shell(&self) -> &FormShell<B> {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut FormShell<B> {
        &mut self.shell
    }

    pub fn focused(&self) -> Option<usize> {
        self.focus
    }

    /// Load the form and focus its first field
    pub async fn start(&mut self) -> Result<String> {
        self.shell.load().await;
        let mut out = self.shell.render();
        if self.shell.is_ready() && !self.shell.widgets().is_empty() {
            out.push_str("\nType :help for commands.\n");
            out.push_str(&self.move_focus(0)?);
        }
        Ok(out)
    }

    /// Handle one input line
    pub async fn handle_line(&mut self, line: &str) -> Result<(Flow, String)> {
        // Pick up utterances that ended since the last line
        self.shell.narrator_mut().poll();

        if self.mode == Mode::ConfirmReset {
            self.mode = Mode::Normal;
            let answer = parse_flag(line);
            let cleared = self.shell.reset(|_| answer);
            let out = if cleared {
                self.shell.render()
            } else {
                "Reset cancelled.".to_string()
            };
            return Ok((Flow::Continue, out));
        }

        let command = parse_line(line, &self.commands);
        debug!("Console command {:?}", command);

        let out = match command {
            Command::Action(CommandAction::Quit) => {
                self.shell.stop_speech();
                return Ok((Flow::Quit, "Goodbye.".to_string()));
            }
            Command::Action(CommandAction::Help) => HELP.to_string(),
            Command::Action(CommandAction::Retry) => {
                self.shell.retry().await;
                self.focus = None;
                self.shell.render()
            }
            _ if !self.shell.is_ready() => self.shell.render(),
            Command::Action(action) => self.run_action(action).await?,
            Command::Goto(n) => {
                if n == 0 || n > self.shell.widgets().len() {
                    format!("There is no field {}.", n)
                } else {
                    self.move_focus(n - 1)?
                }
            }
            Command::Value(raw) => self.enter_value(&raw)?,
            Command::Unknown(word) => {
                format!("Unknown command :{}. Type :help for commands.", word)
            }
        };

        Ok((Flow::Continue, out))
    }

    async fn run_action(&mut self, action: CommandAction) -> Result<String> {
        let count = self.shell.widgets().len();
        let focus = self.focus;
        let out = match action {
            CommandAction::NextField => match focus {
                _ if count == 0 => "The form has no fields.".to_string(),
                Some(i) if i + 1 >= count => {
                    "Last field. Type :consent and :submit to send the form.".to_string()
                }
                Some(i) => self.move_focus(i + 1)?,
                None => self.move_focus(0)?,
            },
            CommandAction::PrevField => match focus {
                _ if count == 0 => "The form has no fields.".to_string(),
                Some(0) | None => "First field.".to_string(),
                Some(i) => self.move_focus(i - 1)?,
            },
            CommandAction::WhereAmI => match focus {
                Some(i) => {
                    self.shell.hover(i)?;
                    self.render_field(i)
                }
                None => "No field is focused.".to_string(),
            },
            CommandAction::OptionUp => self.step(Direction::Up)?,
            CommandAction::OptionDown => self.step(Direction::Down)?,
            CommandAction::SpeakAll => {
                self.shell.speak_all();
                self.speech_notice("Reading the form.")
            }
            CommandAction::Stop => {
                self.shell.stop_speech();
                "Speech stopped.".to_string()
            }
            CommandAction::Repeat => {
                self.shell.repeat_current_field();
                match self.shell.narrator().current_field() {
                    Some(name) => self.speech_notice(&format!("Field: {}.", name)),
                    None => "No field to repeat.".to_string(),
                }
            }
            CommandAction::ToggleAutoSpeak => {
                if self.shell.toggle_auto_speak() {
                    "Automatic speech on.".to_string()
                } else {
                    "Automatic speech off.".to_string()
                }
            }
            CommandAction::ToggleConsent => {
                let consent = !self.shell.form().consent();
                self.shell.set_consent(consent);
                if consent {
                    "Consent given.".to_string()
                } else {
                    "Consent withdrawn.".to_string()
                }
            }
            CommandAction::Submit => {
                let status = self.shell.submit().await;
                status.message.clone()
            }
            CommandAction::Reset => {
                self.mode = Mode::ConfirmReset;
                format!("{} [y/N]", RESET_PROMPT)
            }
            CommandAction::Show => self.shell.render(),
            // Handled before readiness is checked
            CommandAction::Help | CommandAction::Retry | CommandAction::Quit => String::new(),
        };
        Ok(out)
    }

    fn move_focus(&mut self, index: usize) -> Result<String> {
        self.focus = Some(index);
        self.shell.focus(index)?;
        Ok(self.render_field(index))
    }

    fn step(&mut self, direction: Direction) -> Result<String> {
        let Some(i) = self.focus else {
            return Ok("No field is focused.".to_string());
        };
        if self.shell.widgets()[i].q_type() != QuestionType::Select {
            return Ok("The focused field is not a selection.".to_string());
        }
        self.shell.step_option(i, direction)?;
        Ok(self.render_field(i))
    }

    fn enter_value(&mut self, raw: &str) -> Result<String> {
        let Some(i) = self.focus else {
            return Ok("No field is focused. Type :next to start.".to_string());
        };
        match self.shell.widgets()[i].parse_input(raw) {
            Ok(value) => {
                self.shell.change(i, value)?;
                Ok(self.render_field(i))
            }
            Err(failure) => {
                let message = failure.to_string();
                self.shell.narrator_mut().speak(&message);
                Ok(message)
            }
        }
    }

    fn render_field(&self, index: usize) -> String {
        let widget = &self.shell.widgets()[index];
        format!(
            "{:>2}. {}",
            index + 1,
            widget.render(self.shell.form().get(&widget.key), 0)
        )
    }

    fn speech_notice(&self, text: &str) -> String {
        if self.shell.narrator().is_available() {
            text.to_string()
        } else {
            "Speech is unavailable.".to_string()
        }
    }
}
