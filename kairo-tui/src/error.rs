use thiserror::Error;

/// Errors raised while driving the terminal
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Terminal error: {context}")]
    Terminal {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TuiError {
    pub fn terminal(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Terminal {
            context: context.into(),
            source,
        }
    }
}
