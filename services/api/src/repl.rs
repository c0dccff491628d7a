use crate::infra::{file_chat_store, memory_chat_store, FleetData};
use clap::Args;
use fleet_telematics::assistant::SUGGESTED_QUESTIONS;
use fleet_telematics::chat::{ChatConversation, ChatHistory, ChatRole, ChatSession};
use fleet_telematics::config::AppConfig;
use fleet_telematics::error::AppError;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args, Debug, Default)]
pub(crate) struct ChatArgs {
    /// Directory holding the chat store (overrides FLEET_CHAT_DIR)
    #[arg(long)]
    pub(crate) dir: Option<PathBuf>,
    /// Keep the conversation in memory only
    #[arg(long)]
    pub(crate) memory: bool,
    /// Assistant reply delay in milliseconds (overrides FLEET_CHAT_DELAY_MS)
    #[arg(long)]
    pub(crate) delay_ms: Option<u64>,
}

const REPL_HELP: &str = "Commands: /new, /list, /switch <id>, /delete <id>, /help, /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Message(String),
    New,
    List,
    Switch(u64),
    Delete(u64),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl ReplCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let id = parts.next().map(str::parse::<u64>);
        let surplus = parts.next().is_some();
        match (name.as_str(), id) {
            ("new", None) => Self::New,
            ("list", None) => Self::List,
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("new" | "list" | "help" | "quit" | "exit", Some(_)) => {
                Self::Invalid(format!("/{name} takes no arguments"))
            }
            ("switch" | "delete", Some(Ok(_))) if surplus => {
                Self::Invalid(format!("/{name} takes a single conversation id"))
            }
            ("switch", Some(Ok(id))) => Self::Switch(id),
            ("delete", Some(Ok(id))) => Self::Delete(id),
            ("switch" | "delete", _) => {
                Self::Invalid(format!("/{name} needs a numeric conversation id"))
            }
            _ => Self::Invalid(format!("unknown command '/{name}'")),
        }
    }
}

pub(crate) async fn run_chat(args: ChatArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.dir {
        config.chat.storage_dir = dir;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.chat.reply_delay = Duration::from_millis(delay_ms);
    }

    let store = if args.memory {
        memory_chat_store()
    } else {
        file_chat_store(&config.chat)
    };
    let data = FleetData::sample();
    let history = ChatHistory::load(store)?;
    let chat = ChatSession::new(history, Arc::clone(&data.snapshot), config.chat.reply_delay);

    println!("Fleet AI Assistant");
    match chat.active().await {
        Some(conversation) => {
            println!(
                "Resuming {} ({} messages)",
                conversation.title,
                conversation.messages.len()
            );
            print_transcript(&conversation);
        }
        None => {
            println!("Try asking:");
            for question in SUGGESTED_QUESTIONS {
                println!("  - {question}");
            }
        }
    }
    println!("{REPL_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = ReplCommand::parse(&line);
        if command == ReplCommand::Quit {
            break;
        }
        if let Err(err) = execute(&chat, command).await {
            println!("! {err}");
        }
    }
    Ok(())
}

async fn execute(chat: &ChatSession, command: ReplCommand) -> Result<(), AppError> {
    match command {
        ReplCommand::Message(text) => {
            let ticket = chat.send(&text).await?;
            println!("(thinking...)");
            let reply = ticket.reply().await?;
            println!("{}\n", reply.content);
        }
        ReplCommand::New => {
            let conversation = chat.start_conversation().await?;
            println!("Started {} [{}]", conversation.title, conversation.id);
        }
        ReplCommand::List => {
            let active = chat.active().await.map(|conversation| conversation.id);
            for conversation in chat.conversations().await {
                let marker = if Some(conversation.id) == active { "*" } else { " " };
                println!(
                    "{marker} [{}] {} ({} messages, updated {})",
                    conversation.id,
                    conversation.title,
                    conversation.messages.len(),
                    conversation.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ReplCommand::Switch(id) => {
            let conversation = chat.switch(id).await?;
            print_transcript(&conversation);
        }
        ReplCommand::Delete(id) => {
            let removed = chat.delete(id).await?;
            println!("Deleted {}", removed.title);
        }
        ReplCommand::Help => println!("{REPL_HELP}"),
        ReplCommand::Invalid(reason) => println!("! {reason}"),
        ReplCommand::Quit | ReplCommand::Empty => {}
    }
    Ok(())
}

fn print_transcript(conversation: &ChatConversation) {
    for message in &conversation.messages {
        let speaker = match message.role {
            ChatRole::User => "you",
            ChatRole::Assistant => "assistant",
        };
        println!("[{speaker}] {}\n", message.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_messages() {
        assert_eq!(ReplCommand::parse("  "), ReplCommand::Empty);
        assert_eq!(
            ReplCommand::parse(" Which vehicles need attention? "),
            ReplCommand::Message("Which vehicles need attention?".to_string())
        );
        assert_eq!(ReplCommand::parse("/NEW"), ReplCommand::New);
        assert_eq!(ReplCommand::parse("/switch 1712"), ReplCommand::Switch(1712));
        assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Quit);
        assert!(matches!(
            ReplCommand::parse("/delete soon"),
            ReplCommand::Invalid(_)
        ));
        assert_eq!(
            ReplCommand::parse("/dance"),
            ReplCommand::Invalid("unknown command '/dance'".to_string())
        );
    }

    #[test]
    fn stray_arguments_are_reported_against_the_command() {
        assert_eq!(
            ReplCommand::parse("/new 5"),
            ReplCommand::Invalid("/new takes no arguments".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/list x"),
            ReplCommand::Invalid("/list takes no arguments".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/Quit now"),
            ReplCommand::Invalid("/quit takes no arguments".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/switch 3 4"),
            ReplCommand::Invalid("/switch takes a single conversation id".to_string())
        );
        assert_eq!(ReplCommand::parse("/delete  12 "), ReplCommand::Delete(12));
    }

    #[tokio::test]
    async fn execute_reports_unknown_conversations() {
        let data = FleetData::sample();
        let history = ChatHistory::load(memory_chat_store()).expect("history loads");
        let chat = ChatSession::new(history, data.snapshot, Duration::ZERO);

        let err = execute(&chat, ReplCommand::Switch(9))
            .await
            .expect_err("unknown id");
        assert_eq!(err.to_string(), "chat error: conversation 9 not found");

        execute(&chat, ReplCommand::Message("help".to_string()))
            .await
            .expect("message answered");
        let conversation = chat.active().await.expect("conversation created");
        assert_eq!(conversation.messages.len(), 2);
    }
}
