#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,   // /help
    Clear,  // /clear
    Cancel, // /cancel
    Quit,   // /quit or /exit
    Unknown(String),
}

/// Classify a submitted line. `None` means the line is a claim.
///
/// A leading slash alone does not make a command: an unrecognised verb
/// followed by more text ("/r/news says ...") is treated as a claim, while a
/// single unrecognised word ("/hlep") is reported as an unknown command.
pub fn parse_command(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let mut words = trimmed.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let has_more = words.next().is_some();

    let cmd = match verb.as_str() {
        "/help" | "/?" => Command::Help,
        "/clear" => Command::Clear,
        "/cancel" => Command::Cancel,
        "/quit" | "/exit" => Command::Quit,
        _ if has_more => return None,
        _ => Command::Unknown(trimmed.to_string()),
    };
    Some(cmd)
}
