/// Exit code for configuration and file I/O problems (bad flags, export failures).
pub const EXIT_CONFIG: u8 = 2;
/// Exit code when the loaded table has no usable temporal column.
pub const EXIT_SCHEMA: u8 = 3;
/// Exit code when neither the web page nor the local file produced a table.
pub const EXIT_NO_SOURCE: u8 = 4;
/// Exit code for terminal/UI runtime failures.
pub const EXIT_RUNTIME: u8 = 5;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    /// Neither source tier produced a table. `causes` are the per-tier failure notes.
    pub fn all_sources_exhausted(causes: &[String]) -> Self {
        let mut message = String::from("No acquisitions data available: every source failed.");
        for cause in causes {
            message.push_str("\n  - ");
            message.push_str(cause);
        }
        Self::new(EXIT_NO_SOURCE, message)
    }

    pub fn schema_missing(columns: &[String]) -> Self {
        Self::new(
            EXIT_SCHEMA,
            format!(
                "Missing temporal column: expected one of `Date`, `year`, `Year` (found: {}).",
                if columns.is_empty() {
                    "none".to_string()
                } else {
                    columns.join(", ")
                }
            ),
        )
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
