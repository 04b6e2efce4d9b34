//! `edumind send` - One-shot send.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::{open_session, print_outcome};

pub async fn run(
    message: String,
    attachments: Vec<PathBuf>,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, mut session) = open_session(model)?;

    for path in attachments {
        let attachment = session.attach(path)?;
        debug!(file = %attachment.file_name(), kind = ?attachment.kind(), "Queued attachment");
    }

    eprint!("  Thinking...");
    let outcome = session.send(&message).await;
    eprint!("\r              \r");

    let outcome = outcome?;
    print_outcome(&outcome);

    if outcome.failed {
        warn!(model = %outcome.model, "Send failed");
        return Err("request failed".into());
    }
    Ok(())
}
