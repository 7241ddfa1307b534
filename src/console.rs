//! Line-oriented control console over a [`ControlSurface`].

use drillbot_fabric::ControlSurface;
use drillbot_protocols::BotMode;

pub(crate) const HELP: &str = "\
Commands:
  start [mode] [--race]   select a mode (optional) and start
  stop                    stop the bot
  mode <mode>             select a mode (ignored while running)
  race on|off             toggle race mode
  anim on|off             toggle the animation skipper
  freeze on|off           toggle the timer freeze
  stealth                 flip the stealth flag
  action <name>           run a privileged action
  status                  show current state
  log                     show the log panel
  help                    show this help
  quit                    exit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConsoleCommand {
    Start { mode: Option<BotMode>, race: bool },
    Stop,
    Mode(BotMode),
    Race(bool),
    Anim(bool),
    Freeze(bool),
    Stealth,
    Action(String),
    Status,
    Log,
    Help,
    Quit,
}

fn parse_switch(arg: Option<&str>) -> Result<bool, String> {
    match arg {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        Some(other) => Err(format!("expected on|off, got '{}'", other)),
        None => Err("expected on|off".to_string()),
    }
}

impl ConsoleCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub(crate) fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };

        let command = match head {
            "start" => {
                let mut mode = None;
                let mut race = false;
                for word in words {
                    if word == "--race" {
                        race = true;
                    } else {
                        mode = Some(word.parse()?);
                    }
                }
                ConsoleCommand::Start { mode, race }
            }
            "stop" => ConsoleCommand::Stop,
            "mode" => {
                let name = words.next().ok_or("expected a mode name")?;
                ConsoleCommand::Mode(name.parse()?)
            }
            "race" => ConsoleCommand::Race(parse_switch(words.next())?),
            "anim" => ConsoleCommand::Anim(parse_switch(words.next())?),
            "freeze" => ConsoleCommand::Freeze(parse_switch(words.next())?),
            "stealth" => ConsoleCommand::Stealth,
            "action" => {
                let name = words.next().ok_or("expected an action name")?;
                ConsoleCommand::Action(name.to_string())
            }
            "status" => ConsoleCommand::Status,
            "log" => ConsoleCommand::Log,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(format!("unknown command '{}' (try 'help')", other)),
        };
        Ok(Some(command))
    }
}

/// Apply a command to the surface and return what to print.
pub(crate) async fn apply(surface: &mut ControlSurface, command: ConsoleCommand) -> Vec<String> {
    let before = surface.log().newest().map(str::to_string);
    match command {
        ConsoleCommand::Start { mode, race } => {
            if surface.view().running {
                return vec!["Already running; stop first".to_string()];
            }
            if let Some(mode) = mode {
                surface.select_mode(mode);
            }
            if race && !surface.view().race_mode {
                surface.set_race_mode(true).await;
            }
            if !surface.view().can_toggle() {
                return vec!["Select a mode first".to_string()];
            }
            surface.toggle_running().await;
        }
        ConsoleCommand::Stop => {
            if !surface.view().running {
                return vec!["Not running".to_string()];
            }
            surface.toggle_running().await;
        }
        ConsoleCommand::Mode(mode) => {
            if !surface.select_mode(mode) {
                return vec!["Mode is locked while running".to_string()];
            }
            return vec![format!("Mode: {}", mode.label())];
        }
        ConsoleCommand::Race(enabled) => surface.set_race_mode(enabled).await,
        ConsoleCommand::Anim(enabled) => surface.set_skip_anim(enabled).await,
        ConsoleCommand::Freeze(enabled) => surface.set_freeze_timer(enabled).await,
        ConsoleCommand::Stealth => {
            surface.toggle_stealth().await;
        }
        ConsoleCommand::Action(name) => {
            let _ = surface.run_privileged(&name).await;
        }
        ConsoleCommand::Status => return status_lines(surface).await,
        ConsoleCommand::Log => return surface.log().lines().map(str::to_string).collect(),
        ConsoleCommand::Help => return vec![HELP.to_string()],
        ConsoleCommand::Quit => return Vec::new(),
    }
    new_log_lines(surface, before.as_deref())
}

/// Log lines newer than `previous`, oldest first.
pub(crate) fn new_log_lines(surface: &ControlSurface, previous: Option<&str>) -> Vec<String> {
    let mut lines: Vec<String> = surface
        .log()
        .lines()
        .take_while(|line| Some(*line) != previous)
        .map(str::to_string)
        .collect();
    lines.reverse();
    lines
}

async fn status_lines(surface: &ControlSurface) -> Vec<String> {
    let view = surface.view();
    let on_off = |b: bool| if b { "on" } else { "off" };
    let mut lines = vec![
        format!("Status: {}", view.badge()),
        format!(
            "Mode: {}",
            view.selected_mode.map(|m| m.label()).unwrap_or("none")
        ),
        format!("Race mode: {}", on_off(view.race_mode)),
        format!("Animation skipper: {}", on_off(view.skip_anim)),
        format!("Timer freeze: {}", on_off(view.freeze_timer)),
        format!("Stealth: {}", on_off(view.stealth_mode)),
        format!(
            "Privileged uses left: {}/{}",
            surface.quota_remaining().await,
            surface.quota().max_uses()
        ),
    ];
    if let Some(answer) = &view.last_answer {
        lines.push(format!("Last answer: {}", answer));
    }
    if view.enter_prompt {
        lines.push("Press ENTER to submit".to_string());
    }
    if let Some(error) = &view.error {
        lines.push(format!("Error: {}", error));
    }
    lines
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
