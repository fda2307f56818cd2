//! Collaborators the store drives but does not own
//!
//! The graph editor, the code generator, the board registry and the
//! file system all live in the application shell. The store talks to them
//! only through these traits, so every operation can run against in-memory
//! fakes.

use ice_doc::{Dependencies, Dependency, DependencyId, Design, Graph, Project, ViewState};
use std::io;
use std::path::Path;

/// Live editor state folded back into the document by
/// [`ProjectStore::update`](crate::ProjectStore::update)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveSnapshot {
    /// Board selected in the editor
    pub board: String,
    /// Current cells
    pub graph: Graph,
    /// Dependencies known to the editor
    pub dependencies: Dependencies,
}

/// How the editor should load a design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Reset I/O pin assignments (after a board change)
    pub reset: bool,
    /// Load read-only
    pub disabled: bool,
}

/// The circuit editor holding the live cells
pub trait GraphEditor {
    /// Current board, cells and dependencies
    fn snapshot(&self) -> LiveSnapshot;

    /// Current pan and zoom
    fn view_state(&self) -> ViewState;

    /// Move the viewport
    fn set_view_state(&mut self, state: ViewState);

    /// Replace the cells with `design`; `false` when the editor refuses it
    fn load_design(
        &mut self,
        design: &Design,
        dependencies: &Dependencies,
        options: LoadOptions,
    ) -> bool;

    /// Remove every cell
    fn clear_all(&mut self);

    /// Forget undo history
    fn reset_command_stack(&mut self);

    /// Instantiate a dependency as a new cell
    fn create_block(&mut self, id: &DependencyId, content: &Dependency);
}

/// Extra inputs for code generation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerateOptions {
    /// Emit board constraint rules along with the source
    pub board_rules: bool,
}

/// HDL code generator
pub trait CodeGenerator {
    /// Generator failure
    type Error: std::fmt::Display;

    /// Generate `target` source text for `project`
    fn generate(
        &self,
        target: &str,
        project: &Project,
        options: &GenerateOptions,
    ) -> Result<String, Self::Error>;
}

/// Known boards
pub trait BoardRegistry {
    /// Human-readable name of `board`, if known
    fn label(&self, board: &str) -> Option<String>;

    /// Whether `board` is a known board
    fn contains(&self, board: &str) -> bool {
        self.label(board).is_some()
    }
}

/// Byte storage for documents and auxiliary files
pub trait Storage {
    /// Read a whole file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace a file's contents
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Whether a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Copy one file, replacing the destination
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
}
