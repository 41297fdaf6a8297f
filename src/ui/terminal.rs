//! Interactive terminal front-end for the controller

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{
    controller::{Controller, Layout, Update},
    validation::Preset,
};
use crate::state::TimerEvent;

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    /// Replace the minutes input field
    Input(String),
    Preset(Preset),
    /// Start, optionally replacing the input first
    Start(Option<String>),
    Cancel,
    Status,
    Help,
    Quit,
}

/// Parse a line of user input; blank lines yield `None`
pub fn parse_command(line: &str) -> Option<TerminalCommand> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    let rest = words.next();

    let command = match (first.to_ascii_lowercase().as_str(), rest) {
        ("quit" | "exit" | "q", _) => TerminalCommand::Quit,
        ("cancel" | "stop", _) => TerminalCommand::Cancel,
        ("status", _) => TerminalCommand::Status,
        ("help" | "?", _) => TerminalCommand::Help,
        ("start", minutes) => TerminalCommand::Start(minutes.map(str::to_string)),
        ("preset", Some(value)) => match value.parse().ok().and_then(Preset::from_minutes) {
            Some(preset) => TerminalCommand::Preset(preset),
            None => TerminalCommand::Help,
        },
        _ => TerminalCommand::Input(line.trim().to_string()),
    };
    Some(command)
}

const HELP: &str =
    "Commands: <minutes> | preset <5|15|30|60> | start [minutes] | cancel | status | quit";

enum Step {
    Line(Option<String>),
    Update(Option<Update>),
}

/// Drive `controller` from stdin until the user quits or stdin closes
pub async fn run_terminal(mut controller: Controller, has_capability: bool) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Bluetooth Timer");
    println!("{}", HELP);
    if !has_capability {
        println!("Permissions required for app to work");
    }
    print_status(&controller);

    controller.resume();
    loop {
        let step = tokio::select! {
            line = lines.next_line() => Step::Line(line?),
            update = controller.next_update() => Step::Update(update),
        };

        match step {
            Step::Line(None) => break,
            Step::Line(Some(line)) => {
                let Some(command) = parse_command(&line) else {
                    continue;
                };
                if !handle_command(&mut controller, command).await {
                    break;
                }
            }
            Step::Update(None) => {
                debug!("Update sources closed");
                break;
            }
            Step::Update(Some(update)) => render_update(&controller, &update),
        }
        print_messages(&mut controller);
    }
    controller.pause();

    Ok(())
}

/// Returns `false` when the user asked to quit
async fn handle_command(controller: &mut Controller, command: TerminalCommand) -> bool {
    match command {
        TerminalCommand::Quit => return false,
        TerminalCommand::Input(text) => controller.set_input(&text),
        TerminalCommand::Preset(preset) => {
            controller.select_preset(preset);
            println!("Input: {} minutes", controller.view().input);
        }
        TerminalCommand::Start(minutes) => {
            if let Some(minutes) = minutes {
                controller.set_input(&minutes);
            }
            // rejected input has already been queued as a message
            let _ = controller.start().await;
        }
        TerminalCommand::Cancel => {
            if let Err(e) = controller.cancel().await {
                println!("{}", e);
            }
        }
        TerminalCommand::Status => print_status(controller),
        TerminalCommand::Help => println!("{}", HELP),
    }
    true
}

fn render_update(controller: &Controller, update: &Update) {
    match update {
        Update::Timer(TimerEvent::Progress { .. }) => {
            print!("\rTime remaining: {}  ", controller.view().countdown);
            let _ = std::io::stdout().flush();
        }
        Update::Timer(TimerEvent::Finished { .. } | TimerEvent::Cancelled) => println!(),
        Update::Timer(TimerEvent::Started { .. }) => {}
        Update::Adapter(_) => println!("Bluetooth: {}", controller.view().indicator()),
    }
}

fn print_status(controller: &Controller) {
    let view = controller.view();
    match view.layout {
        Layout::Input => println!("Bluetooth: {} | input: {:?}", view.indicator(), view.input),
        Layout::Countdown => println!(
            "Bluetooth: {} | remaining: {}",
            view.indicator(),
            view.countdown
        ),
    }
}

fn print_messages(controller: &mut Controller) {
    for message in controller.take_messages() {
        println!("{}", message);
    }
}
