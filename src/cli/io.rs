//! JSON I/O handling for CLI
//!
//! - `validate` input: one JSON document via stdin
//! - `check` input: newline-delimited JSON requests; a line that is not
//!   JSON is an invalid request, not an I/O failure
//! - Output: one JSON envelope per line on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read one JSON value from the whole of stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

/// Read newline-delimited JSON values from stdin, skipping blank lines
pub fn read_requests() -> impl Iterator<Item = CliResult<Value>> {
    read_requests_from(io::stdin().lock())
}

/// Newline-delimited JSON values from `reader`, skipping blank lines
pub fn read_requests_from<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<Value>> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| parse_request(&line.map_err(CliError::from)?))
}

fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    serde_json::from_str(input)
        .map_err(|e| CliError::invalid_request(format!("Malformed JSON: {}", e)))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let value = parse_request("{\"nome\": \"Rock\"}\n").unwrap();
        assert_eq!(value["nome"], "Rock");
    }

    #[test]
    fn test_parse_request_rejects_empty() {
        let err = parse_request("  \n").unwrap_err();
        assert_eq!(err.code(), "RATO_CLI_IO_ERROR");
    }

    #[test]
    fn test_malformed_line_does_not_stop_reading() {
        let input = "{\"kind\": \"generos\"}\n{not json\n\n{\"kind\": \"produtos\"}\n";
        let requests: Vec<_> = read_requests_from(input.as_bytes()).collect();

        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].as_ref().unwrap()["kind"], "generos");
        let err = requests[1].as_ref().unwrap_err();
        assert_eq!(err.code(), "RATO_CLI_INVALID_REQUEST");
        assert!(err.message().starts_with("Malformed JSON"));
        assert_eq!(requests[2].as_ref().unwrap()["kind"], "produtos");
    }
}
