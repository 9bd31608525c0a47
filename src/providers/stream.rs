use std::io::{BufRead, Lines};

use reqwest::StatusCode;
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};

/// Lazy, single-pass view over a line-delimited streaming response.
///
/// Each item is one non-empty line of the body, decoded as UTF-8. The stream
/// owns the underlying connection: reading blocks on network I/O, and the
/// connection is released once the stream is exhausted or dropped. It cannot
/// be restarted, so drain or drop it before issuing another request.
pub struct ResponseStream {
    lines: Lines<Box<dyn BufRead + Send>>,
}

impl ResponseStream {
    pub fn new(reader: impl BufRead + Send + 'static) -> Self {
        let reader: Box<dyn BufRead + Send> = Box::new(reader);
        Self {
            lines: reader.lines(),
        }
    }

    /// Parse every line as a generate chunk and yield its `response` text.
    ///
    /// A chunk carrying an `error` key ends the generation with `AgentError::Backend`.
    pub fn text_chunks(self) -> impl Iterator<Item = AgentResult<String>> {
        self.map(|line| -> AgentResult<String> {
            let chunk: Value = serde_json::from_str(&line?)?;
            if let Some(error) = chunk.get("error") {
                return Err(AgentError::Backend {
                    status: StatusCode::OK,
                    body: error.as_str().map_or_else(|| error.to_string(), String::from),
                });
            }
            Ok(chunk
                .get("response")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string())
        })
    }
}

impl Iterator for ResponseStream {
    type Item = AgentResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(Ok(line)),
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

impl std::fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream").finish_non_exhaustive()
    }
}
