use std::{fmt, sync::Arc};

/// Drawing code: a fixed preamble that sets up the sheet, followed by the
/// authored drawing commands. Repairs only ever replace the suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingCode {
    preamble: Arc<str>,
    suffix: String,
}

impl DrawingCode {
    pub fn new(preamble: impl Into<Arc<str>>, suffix: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            suffix: suffix.into(),
        }
    }

    /// Split full code back into preamble and suffix. Code that does not start
    /// with `preamble` (e.g. after a hand edit above the drawing section) is
    /// carried verbatim with an empty preamble.
    pub fn from_full(preamble: impl Into<Arc<str>>, full: impl Into<String>) -> Self {
        let preamble: Arc<str> = preamble.into();
        let full = full.into();

        if !preamble.is_empty() {
            if let Some(suffix) = full
                .strip_prefix(preamble.as_ref())
                .and_then(|rest| rest.strip_prefix('\n'))
            {
                return Self {
                    suffix: suffix.to_string(),
                    preamble,
                };
            }
        }

        Self {
            preamble: Arc::from(""),
            suffix: full,
        }
    }

    #[must_use]
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The code sent for execution.
    #[must_use]
    pub fn full(&self) -> String {
        if self.preamble.is_empty() {
            self.suffix.clone()
        } else {
            format!("{}\n{}", self.preamble, self.suffix)
        }
    }
}

impl fmt::Display for DrawingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

/// Pull code out of an assistant reply: the first fenced block tagged with
/// `language`, else the first fenced block of any kind, else the whole reply.
#[must_use]
pub fn extract_code(response: &str, language: &str) -> String {
    let tagged = format!("```{language}\n");
    if let Some(code) = fenced_body(response, &tagged) {
        return code.to_string();
    }

    if let Some(start) = response.find("```") {
        let after_fence = &response[start + 3..];
        if let Some(line_end) = after_fence.find('\n') {
            let body = &after_fence[line_end + 1..];
            if let Some(end) = body.find("```") {
                return body[..end].to_string();
            }
        }
    }

    response.to_string()
}

fn fenced_body<'a>(response: &'a str, opening: &str) -> Option<&'a str> {
    let start = response.find(opening)? + opening.len();
    let body = &response[start..];
    let end = body.find("```")?;
    Some(&body[..end])
}
