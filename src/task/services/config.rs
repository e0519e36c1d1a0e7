//! Tunable limits for task services.

/// Limits applied when tasks are created or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskServiceConfig {
    /// Maximum summary length in characters.
    pub max_summary_length: usize,
    /// Maximum composed task key length in characters.
    pub max_task_key_length: usize,
}

impl Default for TaskServiceConfig {
    fn default() -> Self {
        Self {
            max_summary_length: 1024,
            max_task_key_length: 64,
        }
    }
}
