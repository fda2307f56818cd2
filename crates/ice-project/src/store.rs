//! The live project
//!
//! [`ProjectStore`] owns the one mutable [`Project`] of a session. Every
//! operation either completes or leaves the project as it was: documents are
//! parsed and migrated off to the side and only swapped in on success.

use ice_doc::{Addressed, DependencyId, Project, ViewState};
use ice_migrate::{migrate, parse_document, SchemaVersion, VersionMismatch};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collab::{BoardRegistry, CodeGenerator, GenerateOptions, GraphEditor, LoadOptions, Storage};
use crate::config::StoreConfig;
use crate::decision::{Decision, Prompt};
use crate::error::{ProjectError, Result};
use crate::import::{copy_included_files, find_included_files, CopyReport, ImportOutcome};
use crate::prune::{prune_for_save, sort_blocks};

/// A store shared between threads; lock it around each operation
pub type SharedStore = Arc<Mutex<ProjectStore>>;

/// Outcome of a successful [`ProjectStore::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDisposition {
    /// Ready to hand to the editor
    Loaded,
    /// Written for another board than the active one
    BoardMismatch {
        project_board: String,
        active_board: String,
    },
}

impl LoadDisposition {
    /// Question to put to the user before opening the project
    ///
    /// Boards are named by their label in `boards`, or by id when unknown.
    #[must_use]
    pub fn prompt<B>(&self, boards: &B) -> Option<Prompt>
    where
        B: BoardRegistry + ?Sized,
    {
        let name = |board: &str| boards.label(board).unwrap_or_else(|| board.to_string());
        match self {
            Self::Loaded => None,
            Self::BoardMismatch {
                project_board,
                active_board,
            } => Some(Prompt::ConvertBoard {
                project_board: name(project_board),
                active_board: name(active_board),
            }),
        }
    }
}

/// Warnings and disposition of a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Schema the document was written in
    pub from: SchemaVersion,
    /// Set when that schema is not the expected one
    pub version_warning: Option<VersionMismatch>,
    pub disposition: LoadDisposition,
}

/// Owner of the live project
#[derive(Debug, Clone)]
pub struct ProjectStore {
    config: StoreConfig,
    project: Project,
    name: String,
    path: Option<PathBuf>,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ProjectStore {
    /// Create a store holding an empty project
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            project: Project::default(),
            name: String::new(),
            path: None,
        }
    }

    /// Store configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The live project
    #[inline]
    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Project name shown to the user
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the project was last opened from or saved to
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Change the board selected in the shell
    pub fn set_active_board(&mut self, board: impl Into<String>) {
        self.config.active_board = board.into();
    }

    /// Wrap the store for use from several threads
    #[must_use]
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Replace the live project with a parsed and migrated document
    ///
    /// # Errors
    /// Returns [`ProjectError::Migration`] when the document cannot be
    /// brought to the current schema; the live project is left untouched.
    pub fn load(&mut self, bytes: &[u8], name: &str) -> Result<LoadReport> {
        let raw = parse_document(bytes)?;
        let migration = migrate(raw, name)?;

        let version_warning = VersionMismatch::check(&migration.from, &self.config.schema_version);
        if let Some(warning) = &version_warning {
            tracing::warn!(name, "{warning}");
        }

        let project_board = migration.project.board().to_string();
        let active_board = &self.config.active_board;
        let disposition = if active_board.is_empty() || project_board == *active_board {
            LoadDisposition::Loaded
        } else {
            LoadDisposition::BoardMismatch {
                project_board,
                active_board: active_board.clone(),
            }
        };

        self.project = migration.project;
        self.name = name.to_string();
        tracing::info!(
            name,
            from = %migration.from,
            dependencies = self.project.dependencies.len(),
            "project loaded"
        );

        Ok(LoadReport {
            from: migration.from,
            version_warning,
            disposition,
        })
    }

    /// Hand the live project to the editor
    ///
    /// `board_decision` answers a [`Prompt::ConvertBoard`]: `Proceed`
    /// retargets the project to the active board and resets pin
    /// assignments, anything else keeps the project's own board.
    ///
    /// # Errors
    /// - [`ProjectError::UnknownBoard`] when converting to a board `boards`
    ///   does not know
    /// - [`ProjectError::Rejected`] when the editor refuses the design
    pub fn open_in<G, B>(
        &mut self,
        editor: &mut G,
        board_decision: Decision,
        boards: &B,
    ) -> Result<()>
    where
        G: GraphEditor + ?Sized,
        B: BoardRegistry + ?Sized,
    {
        let active_board = self.config.active_board.as_str();
        let mismatch = !active_board.is_empty() && self.project.board() != active_board;
        let convert = mismatch && board_decision == Decision::Proceed;

        if convert {
            if !boards.contains(active_board) {
                return Err(ProjectError::UnknownBoard(active_board.to_string()));
            }
            tracing::info!(
                from = self.project.board(),
                to = active_board,
                "converting project board"
            );
            self.project.design.board = Some(active_board.to_string());
        }

        let options = LoadOptions {
            reset: convert,
            disabled: false,
        };
        if !editor.load_design(&self.project.design, &self.project.dependencies, options) {
            return Err(ProjectError::Rejected {
                name: self.name.clone(),
            });
        }
        editor.set_view_state(self.project.design.state);
        editor.reset_command_stack();
        Ok(())
    }

    /// Fold live editor state back into the project
    pub fn update<G>(&mut self, editor: &G)
    where
        G: GraphEditor + ?Sized,
    {
        let snapshot = editor.snapshot();
        self.project.design.board = Some(snapshot.board);
        self.project.design.graph = snapshot.graph;
        self.project.dependencies = snapshot.dependencies;
        self.project.design.state = editor.view_state().rounded(self.config.state_precision);
    }

    /// Serialize the project as written to disk
    ///
    /// Blocks of the live project are put in position order first; the
    /// serialized copy is pruned of editor-only payloads.
    ///
    /// # Errors
    /// Returns [`ProjectError::Serialize`] if serialization fails.
    pub fn save(&mut self) -> Result<Vec<u8>> {
        sort_blocks(&mut self.project.design.graph.blocks);
        let pruned = prune_for_save(&self.project);
        let bytes = if self.config.pretty {
            serde_json::to_vec_pretty(&pruned)?
        } else {
            serde_json::to_vec(&pruned)?
        };
        tracing::info!(name = %self.name, bytes = bytes.len(), "project saved");
        Ok(bytes)
    }

    /// Add a block-as-file document to the dependency map
    ///
    /// Returns the block's address; adding the same block twice yields the
    /// same address and leaves the map unchanged.
    ///
    /// # Errors
    /// Returns [`ProjectError::Migration`] when the document cannot be
    /// brought to the current schema.
    pub fn add_block(&mut self, bytes: &[u8], name: &str) -> Result<DependencyId> {
        let block = self.migrate_block(bytes, name)?;
        Ok(self.insert_block(block))
    }

    /// Import a block file along with the files its code includes
    ///
    /// Included files are copied from the block's directory into the
    /// project's directory before the block is inserted and placed in the
    /// editor. `decide` answers overwrite prompts.
    ///
    /// # Errors
    /// - [`ProjectError::Io`] when the block file cannot be read
    /// - [`ProjectError::Migration`] when it cannot be migrated
    /// - [`ProjectError::Generation`] when its code cannot be generated
    pub fn import_block<S, G, C, F>(
        &mut self,
        path: &Path,
        storage: &S,
        editor: &mut G,
        generator: &C,
        decide: F,
    ) -> Result<ImportOutcome>
    where
        S: Storage + ?Sized,
        G: GraphEditor + ?Sized,
        C: CodeGenerator + ?Sized,
        F: FnMut(&Prompt) -> Decision,
    {
        let bytes = storage
            .read(path)
            .map_err(|e| ProjectError::io("read", path, e))?;
        let block = self.migrate_block(&bytes, &file_name(path))?;

        let code = generator
            .generate(&self.config.generator_target, &block, &GenerateOptions::default())
            .map_err(|e| ProjectError::Generation(e.to_string()))?;
        let files = find_included_files(&code);

        let report = if files.is_empty() {
            CopyReport::default()
        } else {
            let Some(project_path) = self.path.as_deref() else {
                tracing::info!(files = files.len(), "block import needs a saved project");
                return Ok(ImportOutcome::NeedsProjectPath { files });
            };
            let Some(report) = copy_included_files(
                storage,
                &files,
                parent_dir(path),
                parent_dir(project_path),
                decide,
            ) else {
                return Ok(ImportOutcome::Cancelled);
            };
            report
        };

        let id = self.insert_block(block);
        if let Some(content) = self.project.dependencies.get(&id) {
            editor.create_block(&id, content);
        }
        tracing::info!(
            %id,
            copied = report.copied.len(),
            failed = report.failures.len(),
            "block imported"
        );
        Ok(ImportOutcome::Imported {
            id,
            copied: report.copied,
            skipped: report.skipped,
            failures: report.failures,
        })
    }

    /// Start an empty project
    pub fn new_project<G>(&mut self, name: &str, editor: &mut G)
    where
        G: GraphEditor + ?Sized,
    {
        self.clear(editor);
        self.name = name.to_string();
        self.path = None;
    }

    /// Empty the live project and the editor
    pub fn clear<G>(&mut self, editor: &mut G)
    where
        G: GraphEditor + ?Sized,
    {
        self.project = Project::default();
        editor.clear_all();
        editor.set_view_state(ViewState::default());
        editor.reset_command_stack();
    }

    /// Generate `target` source for the live editor contents
    ///
    /// # Errors
    /// Returns [`ProjectError::Generation`] when the generator fails.
    pub fn export<G, C>(
        &mut self,
        target: &str,
        editor: &G,
        generator: &C,
        options: &GenerateOptions,
    ) -> Result<String>
    where
        G: GraphEditor + ?Sized,
        C: CodeGenerator + ?Sized,
    {
        self.update(editor);
        let pruned = prune_for_save(&self.project);
        let source = generator
            .generate(target, &pruned, options)
            .map_err(|e| ProjectError::Generation(e.to_string()))?;
        tracing::info!(target, bytes = source.len(), "project exported");
        Ok(source)
    }

    /// Read and load a project file
    ///
    /// # Errors
    /// Returns [`ProjectError::Io`] when the file cannot be read, otherwise
    /// as [`load`](Self::load).
    pub fn open<S>(&mut self, storage: &S, path: &Path) -> Result<LoadReport>
    where
        S: Storage + ?Sized,
    {
        let bytes = storage
            .read(path)
            .map_err(|e| ProjectError::io("read", path, e))?;
        let report = self.load(&bytes, &file_name(path))?;
        self.path = Some(path.to_path_buf());
        Ok(report)
    }

    /// Save the project to `path` and remember it
    ///
    /// # Errors
    /// Returns [`ProjectError::Io`] when the file cannot be written.
    pub fn save_to<S>(&mut self, storage: &S, path: &Path) -> Result<()>
    where
        S: Storage + ?Sized,
    {
        let bytes = self.save()?;
        storage
            .write(path, &bytes)
            .map_err(|e| ProjectError::io("write", path, e))?;
        self.path = Some(path.to_path_buf());
        self.name = file_name(path);
        Ok(())
    }

    fn migrate_block(&self, bytes: &[u8], name: &str) -> Result<Project> {
        let raw = parse_document(bytes)?;
        let migration = migrate(raw, name)?;
        if let Some(warning) = VersionMismatch::check(&migration.from, &self.config.schema_version) {
            tracing::warn!(name, "{warning}");
        }
        Ok(migration.project)
    }

    /// Merge a migrated block and the dependencies it carries; existing
    /// entries are never overwritten
    fn insert_block(&mut self, block: Project) -> DependencyId {
        let (content, carried) = block.into_dependency();
        for (id, dependency) in carried {
            self.project.dependencies.entry(id).or_insert(dependency);
        }

        let (id, content) = Addressed::new(&content).into_parts();
        if self.project.dependencies.contains_key(&id) {
            tracing::debug!(%id, "block already present");
        } else {
            self.project.dependencies.insert(id.clone(), content);
        }
        id
    }
}

/// File name without extension
fn file_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}
