use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelboxError {
    #[error("No library folder has been selected")]
    NoRootSelected,

    #[error("Access to the library folder was denied")]
    PermissionDenied,

    #[error("Access to the library folder must be granted again")]
    PermissionPromptNeeded,

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Recording not found: {0}")]
    RecordingNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Name already in use: {0}")]
    NameConflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReelboxError {
    /// True for the errors a client should answer by asking the user to pick
    /// or re-grant the library folder, rather than showing a generic failure.
    pub fn needs_root_selection(&self) -> bool {
        matches!(
            self,
            ReelboxError::NoRootSelected
                | ReelboxError::PermissionDenied
                | ReelboxError::PermissionPromptNeeded
        )
    }
}

pub type Result<T> = std::result::Result<T, ReelboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_family_is_classified() {
        assert!(ReelboxError::NoRootSelected.needs_root_selection());
        assert!(ReelboxError::PermissionDenied.needs_root_selection());
        assert!(ReelboxError::PermissionPromptNeeded.needs_root_selection());
        assert!(!ReelboxError::FileNotFound("a.webm".into()).needs_root_selection());
        assert!(!ReelboxError::NameConflict("Kick".into()).needs_root_selection());
    }
}
