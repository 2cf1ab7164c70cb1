use anyhow::{Context, Result};
use precinctmap::{PrecinctId, feed::ContactMessage};

use crate::commands::{load_config, open_feed};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ContactArgs) -> Result<()> {
    let config = load_config(cli)?;

    let message = ContactMessage {
        precinct_number: PrecinctId::new(&args.precinct),
        sender_name: args.name.clone(),
        sender_email: args.email.clone(),
        message: args.message.clone(),
        is_become_pco: args.become_pco,
    }
    .validated()
    .context("[contact] Message was not sent")?;

    let feed = open_feed(&args.feed, &config)?;
    feed.submit_contact_message(&message)
        .with_context(|| format!("[contact] Failed to submit message for precinct {}", message.precinct_number))?;

    println!("[contact] message for precinct {} submitted", message.precinct_number);
    Ok(())
}
