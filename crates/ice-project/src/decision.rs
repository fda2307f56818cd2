//! Questions the store asks the user, and their answers

use std::fmt::{self, Display, Formatter};

/// Answer to a [`Prompt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Go ahead
    Proceed,
    /// Abort the whole operation
    Cancel,
    /// Leave out this one step and continue
    Skip,
}

/// A point where an operation waits for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Document targets another board than the active one
    ConvertBoard {
        /// Board label or id the document was written for
        project_board: String,
        /// Board label or id selected in the shell
        active_board: String,
    },
    /// An imported block's file already exists in the project directory
    OverwriteFile {
        /// File name
        file: String,
    },
}

impl Display for Prompt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConvertBoard {
                project_board,
                active_board,
            } => write!(
                f,
                "this project is designed for the {project_board} board, convert it to {active_board}?"
            ),
            Self::OverwriteFile { file } => write!(
                f,
                "file {file} already exists in the project path, replace it?"
            ),
        }
    }
}
