// Entrypoint for the search client.
// - Runs the demo queries, then hands over to the interactive loop.
// - A failing query is reported and never ends the session.

use std::io::{self, IsTerminal};

use pinecone_webhook_cli::{
    api::WebhookClient,
    config::{SearchConfig, SEARCH_URL_VAR},
    ui::{self, rule, LinePrompt, TerminalPrompt},
};

fn main() -> anyhow::Result<()> {
    pinecone_webhook_cli::init_logging();

    let config = SearchConfig::from_env();
    println!("Using webhook URL: {}", config.webhook_url);
    println!("   To change it, set: export {SEARCH_URL_VAR}='your-url'");

    let client = WebhookClient::for_search(&config)?;
    let mut stdout = io::stdout().lock();

    println!("\nTesting Pinecone Search API via n8n webhook");
    ui::run_scripted(&client, &ui::DEMO_QUERIES, &mut stdout)?;

    println!("\n\n{}", rule('='));
    println!("Interactive mode (type 'exit' to quit):");
    println!("{}", rule('='));

    if io::stdin().is_terminal() {
        ui::run_interactive(&client, &mut TerminalPrompt, &mut stdout)?;
    } else {
        let mut prompt = LinePrompt::new(io::stdin().lock());
        ui::run_interactive(&client, &mut prompt, &mut stdout)?;
    }
    Ok(())
}
