//! `edumind chat` - Interactive chat.

use std::io::Write;

use edumind_core::model::Capability;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{open_session, print_outcome};

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Attach(&'a str),
    Model(&'a str),
    Models,
    Reset,
    Exit,
    Message(&'a str),
    Unknown(&'a str),
}

fn parse_line(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Message(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match (name, arg) {
        ("attach", path) if !path.is_empty() => ReplCommand::Attach(path),
        ("model", id) if !id.is_empty() => ReplCommand::Model(id),
        ("models", _) => ReplCommand::Models,
        ("reset", _) => ReplCommand::Reset,
        ("exit" | "quit", _) => ReplCommand::Exit,
        _ => ReplCommand::Unknown(line),
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

pub async fn run(model: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let (config, mut session) = open_session(model)?;

    println!();
    println!("  EduMind — Interactive Mode");
    println!();
    println!("  Model:     {}", session.selected_model());
    println!("  Fallback:  {} (used for scanned PDFs)", config.vision_fallback_model);
    println!();
    println!("  /attach <path>  queue a .txt, .png, .jpg, .jpeg, or .pdf file");
    println!("  /model <id>     switch model      /models  list models");
    println!("  /reset          clear history     /exit    quit");
    println!();
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ReplCommand::Exit => break,
            ReplCommand::Attach(path) => match session.attach(path) {
                Ok(attachment) => {
                    let name = attachment.file_name();
                    println!(
                        "  Attached {name} ({} pending)",
                        session.pending_attachments().len()
                    );
                }
                Err(e) => eprintln!("  [Error] {e}"),
            },
            ReplCommand::Model(id) => {
                let capability = session.select_model(id);
                println!("  Model: {id} ({capability})");
            }
            ReplCommand::Models => {
                for model in session.router().registry().list() {
                    let marker = if model.id == session.selected_model() { "*" } else { " " };
                    println!("  {marker} {:<32} {:<8} {}", model.id, model.capability, model.label);
                }
            }
            ReplCommand::Reset => {
                session.reset();
                println!("  History and attachments cleared.");
            }
            ReplCommand::Unknown(input) => eprintln!("  Unknown command: {input}"),
            ReplCommand::Message(text) => {
                if text.is_empty() && session.pending_attachments().is_empty() {
                    prompt()?;
                    continue;
                }
                eprint!("  ...");
                let result = session.send(text).await;
                eprint!("\r     \r");
                match result {
                    Ok(outcome) => {
                        println!();
                        print_outcome(&outcome);
                        if outcome.capability == Capability::Vision {
                            println!("  (image turns are not kept in history)");
                        }
                        println!();
                    }
                    Err(e) => eprintln!("  [Error] {e}"),
                }
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}
