//! CLI command execution.

use anyhow::{bail, Result};

use crate::chat::ChatController;
use crate::models::{ChatMessage, Reply, Session};
use crate::openrouter::{Client, ClientConfig};
use crate::store::SessionStore;

use super::args::{Cli, Commands};

/// Execute the parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    let store = match cli.data_dir {
        Some(ref dir) => SessionStore::open_at(dir)?,
        None => SessionStore::open()?,
    };

    let mut config = ClientConfig::from_env();
    if let Some(model) = cli.model {
        config.model = model;
    }
    let mut controller = ChatController::new(store, Client::new(config));

    match cli.command {
        Some(Commands::New { message }) => {
            let id = controller.store_mut().create_session();
            println!("Started session {}", short_id(&id));
            let message = message.join(" ");
            if !message.is_empty() {
                send(&mut controller, &message).await;
            }
            Ok(())
        }
        Some(Commands::List) => {
            list_sessions(controller.store());
            Ok(())
        }
        Some(Commands::Switch { id }) => {
            let id = resolve_session_id(controller.store(), &id)?;
            controller.store_mut().switch_session(&id);
            let title = controller
                .store()
                .current_session()
                .map_or_else(String::new, |s| s.title.clone());
            println!("Switched to {} ({title})", short_id(&id));
            Ok(())
        }
        Some(Commands::Delete { id }) => {
            let id = resolve_session_id(controller.store(), &id)?;
            controller.store_mut().delete_session(&id);
            println!("Deleted {}", short_id(&id));
            if let Some(current) = controller.store().current_session() {
                println!("Current session is now: {}", current.title);
            }
            Ok(())
        }
        Some(Commands::Show) => {
            show_session(controller.store());
            Ok(())
        }
        Some(Commands::Clear) => {
            if controller.store().current_session().is_none() {
                bail!("No current session to clear");
            }
            controller.clear_messages();
            println!("Cleared.");
            Ok(())
        }
        None => {
            let message = cli.message.join(" ");
            if message.is_empty() {
                print_usage();
                return Ok(());
            }
            // Match startup behavior: make sure a session exists before
            // the first send.
            if controller.store().current_session().is_none() {
                controller.store_mut().create_session();
            }
            send(&mut controller, &message).await;
            Ok(())
        }
    }
}

/// Send one message on the current session and print the reply.
async fn send(controller: &mut ChatController<Client>, message: &str) {
    controller.send_message(message).await;

    let Some(session) = controller.store().current_session() else {
        return;
    };
    if let Some(reply) = session.messages.last().and_then(ChatMessage::reply) {
        print_reply(reply);
    }
}

/// First eight characters of a session or message id.
fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

/// Find the unique session whose id starts with the given prefix.
fn resolve_session_id(store: &SessionStore, prefix: &str) -> Result<String> {
    let matches: Vec<&Session> = store
        .sessions()
        .iter()
        .filter(|s| s.id.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [] => bail!("No session matches '{prefix}'"),
        [one] => Ok(one.id.clone()),
        _ => bail!("'{prefix}' is ambiguous, matches {} sessions", matches.len()),
    }
}

fn list_sessions(store: &SessionStore) {
    if store.sessions().is_empty() {
        println!("No sessions yet. Send a message or run `palaver new` to start one.");
        return;
    }
    for session in store.sessions() {
        let marker = if store.current_id() == Some(session.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {}  {:<33}  {} messages  updated {}",
            short_id(&session.id),
            session.title,
            session.messages.len(),
            session.updated_at.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn show_session(store: &SessionStore) {
    let Some(session) = store.current_session() else {
        println!("No current session.");
        return;
    };
    println!("{} ({})", session.title, short_id(&session.id));
    for message in &session.messages {
        let stamp = message.timestamp.format("%H:%M");
        match message.user_content() {
            Some(content) => println!("[{stamp}] you: {content}"),
            None => {
                println!("[{stamp}] ai:");
                if let Some(reply) = message.reply() {
                    print_reply(reply);
                }
            }
        }
    }
}

/// Print a parsed reply the way the structured fields deserve: aside,
/// narrative, fenced code, or an error line.
fn print_reply(reply: &Reply) {
    match reply {
        Reply::Structured {
            response,
            small_talk,
            code,
            ..
        } => {
            if let Some(aside) = small_talk {
                println!("({aside})");
            }
            if !response.is_empty() {
                println!("{response}");
            }
            if let Some(code) = code {
                println!("```\n{code}\n```");
            }
        }
        Reply::Plain { text } => println!("{text}"),
        Reply::Error { message } => println!("error: {message}"),
    }
}

fn print_usage() {
    println!("Palaver - chat with an OpenRouter-compatible model from the terminal");
    println!();
    println!("Usage: palaver [OPTIONS] [MESSAGE]...");
    println!("       palaver <COMMAND>");
    println!();
    println!("Commands:");
    println!("  new [MESSAGE]  Start a new chat session");
    println!("  list           List sessions, most recent first");
    println!("  switch <ID>    Switch to another session");
    println!("  delete <ID>    Delete a session");
    println!("  show           Print the current session transcript");
    println!("  clear          Clear the current session's messages");
    println!();
    println!("Options:");
    println!("  -m, --model    Model to use (e.g. openrouter/auto)");
    println!("  -h, --help     Print help");
    println!();
    println!("Set OPENROUTER_API_KEY to authenticate.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn short_id_handles_tiny_ids() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789"), "01234567");
    }

    #[test]
    fn resolve_session_id_by_unique_prefix() {
        let dir = tempdir().unwrap();
        let mut store = SessionStore::open_at(dir.path()).unwrap();
        let id = store.create_session();

        let resolved = resolve_session_id(&store, &id[..8]).unwrap();
        assert_eq!(resolved, id);
    }

    #[test]
    fn resolve_session_id_rejects_unknown_prefix() {
        let dir = tempdir().unwrap();
        let mut store = SessionStore::open_at(dir.path()).unwrap();
        store.create_session();

        assert!(resolve_session_id(&store, "zzzz").is_err());
    }

    #[test]
    fn resolve_session_id_rejects_ambiguous_prefix() {
        let dir = tempdir().unwrap();
        let mut store = SessionStore::open_at(dir.path()).unwrap();
        store.create_session();
        store.create_session();

        // UUIDv7 ids created in the same millisecond share a prefix; the
        // empty prefix is always ambiguous with two sessions present.
        assert!(resolve_session_id(&store, "").is_err());
    }
}
