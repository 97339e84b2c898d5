use std::io::{self, Write};

use mercado_core::ApiError;
use serde_json::{json, Value};

use crate::error::CliError;

pub fn render(payload: &Value, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_json(&mut stdout.lock(), payload, pretty)
}

/// Prints the upstream response carried by a status error, if any.
pub fn render_error(error: &CliError, pretty: bool) -> Result<(), CliError> {
    if let CliError::Api(ApiError::Status {
        status,
        data,
        headers,
    }) = error
    {
        render(
            &json!({ "data": data, "status": status, "headers": headers }),
            pretty,
        )?;
    }
    Ok(())
}

fn write_json(writer: &mut impl Write, payload: &Value, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    writeln!(writer, "{text}")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn writes_one_json_line() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &json!({"status": 200}), false).expect("in-memory write");
        assert_eq!(String::from_utf8(buffer).expect("utf8"), "{\"status\":200}\n");
    }

    #[test]
    fn pretty_output_is_indented() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &json!({"status": 200}), true).expect("in-memory write");
        assert_eq!(
            String::from_utf8(buffer).expect("utf8"),
            "{\n  \"status\": 200\n}\n"
        );
    }

    #[test]
    fn closed_stdout_maps_to_io_exit_code() {
        let error = write_json(&mut ClosedPipe, &json!({"status": 200}), false)
            .expect_err("pipe is closed");
        assert!(matches!(error, CliError::Io(_)), "got {error:?}");
        assert_eq!(error.exit_code(), 10);
    }
}
