use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Control not found: {0}")]
    ControlNotFound(String),

    #[error("Dropdown not found: {0}")]
    DropdownNotFound(String),

    #[error("No matching option: {0}")]
    NoMatchingOption(String),

    #[error("Incomplete row: only found {found} duration inputs")]
    IncompleteRow { found: usize },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Automation boundary error: {0}")]
    BoundaryError(String),
}
