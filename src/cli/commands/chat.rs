//! Interactive chat command.

use crate::agent::{Agent, ChatTurn, SessionContext};
use crate::backend::{AuthClient, TaskStoreClient};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::openai::OpenAiChatModel;
use console::{style, Term};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

/// Run the interactive chat command.
pub async fn run_chat(
    token: Option<String>,
    email: Option<String>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        return Err(e);
    }

    let auth_token = match token {
        Some(token) => token,
        None => sign_in(email, &settings).await?,
    };

    let model = model.unwrap_or_else(|| settings.agent.model.clone());
    let tasks = TaskStoreClient::new(
        &settings.backend.base_url,
        Duration::from_secs(settings.backend.timeout_seconds),
    )?;

    let mut agent = Agent::new(Arc::new(OpenAiChatModel::new(&model)), tasks);
    if let Some(prompt) = &settings.agent.system_prompt {
        agent = agent.with_system_prompt(prompt);
    }

    let session = SessionContext {
        user_id: "cli".to_string(),
        auth_token: Some(auth_token),
    };
    let mut history: Vec<ChatTurn> = Vec::new();

    println!("\n{}", style("Syssel Chat").bold().cyan());
    println!(
        "{}\n",
        style("Tell me about your tasks, or 'exit' to quit. Use 'clear' to reset conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            history.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let reply = agent.process(input, &history, &session).await;
        spinner.finish_and_clear();

        for tool in &reply.executed_tools {
            Output::tool_marker(&tool.name);
        }
        println!("\n{} {}\n", style("Syssel:").cyan().bold(), reply.text);

        // client-side history; the agent itself stays stateless
        history.push(ChatTurn::user(input));
        history.push(ChatTurn::assistant(reply.text.clone()));
        trim_history(&mut history, settings.agent.max_history_messages);
    }

    Ok(())
}

/// Prompt for credentials and exchange them for a bearer token.
async fn sign_in(email: Option<String>, settings: &Settings) -> Result<String> {
    let term = Term::stdout();

    let email = match email {
        Some(email) => email,
        None => {
            term.write_str("Email: ")?;
            term.read_line()?
        }
    };

    term.write_str("Password: ")?;
    let password = term.read_secure_line()?;

    let auth = AuthClient::new(
        &settings.backend.base_url,
        Duration::from_secs(settings.backend.timeout_seconds),
    )?;
    let token = auth.signin(email.trim(), &password).await?;

    Output::success("Signed in.");
    Ok(token.access_token)
}

/// Keep the most recent messages within the configured window.
fn trim_history(history: &mut Vec<ChatTurn>, max_messages: usize) {
    if history.len() > max_messages {
        let excess = history.len() - max_messages;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_history_keeps_most_recent() {
        let mut history: Vec<ChatTurn> = (0..10)
            .map(|i| ChatTurn::user(format!("message {}", i)))
            .collect();

        trim_history(&mut history, 4);

        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "message 6");
        assert_eq!(history[3].content, "message 9");
    }

    #[test]
    fn test_trim_history_noop_under_limit() {
        let mut history = vec![ChatTurn::user("hi")];
        trim_history(&mut history, 4);
        assert_eq!(history.len(), 1);
    }
}
