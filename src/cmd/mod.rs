pub mod execute;
pub mod execution_plan;
pub mod jobs;
pub mod launcher;
pub mod pipeline;
pub mod redirect;

/// What a plan or built-in hands back to the dispatcher for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Printed followed by a newline.
    Text(String),
    /// Written as-is, for terminal control sequences.
    Raw(String),
    Silent,
    Exit,
}

impl Outcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}
