//! Mode header line
//!
//! The first line of the runtime-init artifact is `<marker>: mode=<token>`.
//! It lets a later run recover the mode the artifact was generated under.

const MODE_KEY: &str = ": mode=";

/// Build the header line for `token`
pub fn encode_header(marker: &str, token: &str) -> String {
    format!("{}{}{}", marker, MODE_KEY, token)
}

/// Extract the mode token from a header line.
///
/// Returns `None` when the line does not start with `marker` or carries an
/// empty token. The token is returned as written; validation is up to the
/// caller.
pub fn parse_header(marker: &str, line: &str) -> Option<String> {
    let token = line
        .trim_end()
        .strip_prefix(marker)?
        .strip_prefix(MODE_KEY)?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Parse the header from the first line of `content`
pub fn read_header(marker: &str, content: &str) -> Option<String> {
    let first = content.lines().next()?;
    parse_header(marker, first.trim_start_matches('\u{feff}'))
}
