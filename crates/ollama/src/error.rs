/// Errors from talking to an Ollama server.
#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("Ollama server at {url} took too long to respond.")]
    Timeout { url: String },

    #[error("Could not connect to Ollama server at {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Ollama server returned an error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from Ollama: {0}")]
    InvalidResponse(String),
}

impl OllamaError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connection {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}
