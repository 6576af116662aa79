//! Interactive chat loop
//!
//! Simulates the SMS conversation locally: type a location, then use
//! the menu (1-5, WHY, STOP) exactly as a texter would. Stands in for
//! the real transport during development.

use colored::Colorize;
use eyre::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::router::ConversationRouter;

/// Sender id used for the local chat session.
const LOCAL_SENDER: &str = "local";

/// Run the interactive conversation loop until EOF or quit.
pub async fn run(router: &ConversationRouter) -> Result<()> {
    println!("{}", "Agos - flood risk assistant (local chat)".bright_cyan().bold());
    println!("Type a location to get started, or a command (1-5, WHY, STOP).");
    println!("Type 'quit' or 'exit' to leave.\n");

    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

    loop {
        match rl.readline(&format!("{} ", ">".bright_green())) {
            Ok(line) => {
                let input = line.trim();
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
                    println!("Bye!");
                    break;
                }
                let _ = rl.add_history_entry(input);

                let reply = router.handle_message(LOCAL_SENDER, input).await;
                println!("\n{reply}\n");
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Bye!");
                break;
            }
            Err(e) => return Err(eyre::eyre!("readline error: {}", e)),
        }
    }

    Ok(())
}
