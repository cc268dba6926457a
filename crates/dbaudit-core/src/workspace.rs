//! Temporary workspace lifecycle for one invocation.
//!
//! A workspace is a uniquely named directory that stages the analysis
//! tool's script (when the tool ships as embedded content) and receives
//! the reports the tool writes. Each workspace is exclusively owned by one
//! invocation, never shared or reused, and removed on every exit path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AnalysisError, Result};

const WORKSPACE_PREFIX: &str = "dbaudit-ca-";

/// How the analysis tool is supplied.
#[derive(Debug, Clone)]
pub enum Tool {
    /// An externally installed executable, invoked directly.
    Binary(PathBuf),

    /// Script content shipped by the caller, materialized into the
    /// workspace and run through an interpreter.
    EmbeddedScript {
        /// Interpreter executable (e.g. `powershell`, `sh`).
        interpreter: String,
        /// Extension for the staged script file, without the dot.
        file_ext: String,
        /// Full script source.
        contents: String,
    },
}

/// A private temporary directory owned by one invocation.
///
/// Dropping the workspace removes the directory and everything in it,
/// deepest entries first. Individual deletion failures are skipped so one
/// stuck file never blocks the rest of the cleanup.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    program: PathBuf,
    program_args: Vec<PathBuf>,
}

impl Workspace {
    /// Create a workspace under the system temp directory.
    pub fn acquire(tool: &Tool) -> Result<Self> {
        Self::acquire_in(std::env::temp_dir(), tool)
    }

    /// Create a workspace under `root` and stage the tool if embedded.
    ///
    /// Fails fast when the directory or the staged script cannot be
    /// created; whatever was partially created is removed before the
    /// error is returned, and no process is ever spawned.
    pub fn acquire_in(root: impl AsRef<Path>, tool: &Tool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)
            .map_err(AnalysisError::Workspace)?
            .keep();

        let mut workspace = Workspace {
            dir,
            program: PathBuf::new(),
            program_args: Vec::new(),
        };

        match tool {
            Tool::Binary(path) => workspace.program = path.clone(),
            Tool::EmbeddedScript {
                interpreter,
                file_ext,
                contents,
            } => {
                let script = workspace.stage_script(file_ext, contents)?;
                workspace.program = PathBuf::from(interpreter);
                workspace.program_args.push(script);
            }
        }

        debug!(dir = %workspace.dir.display(), "acquired analysis workspace");
        Ok(workspace)
    }

    fn stage_script(&self, file_ext: &str, contents: &str) -> Result<PathBuf> {
        let (mut file, path) = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .suffix(&format!(".{file_ext}"))
            .tempfile_in(&self.dir)
            .map_err(AnalysisError::Workspace)?
            .keep()
            .map_err(|e| AnalysisError::Workspace(e.error))?;

        file.write_all(contents.as_bytes())
            .map_err(AnalysisError::Workspace)?;
        Ok(path)
    }

    /// Directory the tool writes its reports into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Executable to spawn.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Leading arguments: the staged script path for embedded tools,
    /// empty for installed binaries.
    pub fn program_args(&self) -> &[PathBuf] {
        &self.program_args
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        remove_tree(&self.dir);
        debug!(dir = %self.dir.display(), "released analysis workspace");
    }
}

/// Best-effort recursive removal: files first, directories bottom-up,
/// errors skipped without aborting the walk.
fn remove_tree(root: &Path) {
    fn visit(dir: &Path, dirs: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    visit(&path, dirs);
                    dirs.push(path);
                } else {
                    let _ = fs::remove_file(&path);
                }
            }
        }
    }

    let mut dirs = Vec::new();
    visit(root, &mut dirs);
    for dir in &dirs {
        let _ = fs::remove_dir(dir);
    }
    let _ = fs::remove_dir(root);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded_tool() -> Tool {
        Tool::EmbeddedScript {
            interpreter: "sh".to_string(),
            file_ext: "sh".to_string(),
            contents: "echo hello\n".to_string(),
        }
    }

    #[test]
    fn binary_tool_needs_no_staging() {
        let workspace =
            Workspace::acquire(&Tool::Binary(PathBuf::from("/usr/bin/analyzer"))).unwrap();

        assert!(workspace.dir().is_dir());
        assert_eq!(workspace.program(), Path::new("/usr/bin/analyzer"));
        assert!(workspace.program_args().is_empty());
    }

    #[test]
    fn embedded_tool_is_staged_inside_workspace() {
        let workspace = Workspace::acquire(&embedded_tool()).unwrap();

        assert_eq!(workspace.program(), Path::new("sh"));
        let script = &workspace.program_args()[0];
        assert!(script.starts_with(workspace.dir()));
        assert_eq!(script.extension().and_then(|e| e.to_str()), Some("sh"));
        assert_eq!(fs::read_to_string(script).unwrap(), "echo hello\n");
    }

    #[test]
    fn drop_removes_directory() {
        let workspace = Workspace::acquire(&embedded_tool()).unwrap();
        let dir = workspace.dir().to_path_buf();
        assert!(dir.is_dir());

        drop(workspace);
        assert!(!dir.exists(), "workspace must be gone after drop");
    }

    #[test]
    fn drop_removes_nested_content() {
        let workspace = Workspace::acquire(&embedded_tool()).unwrap();
        let dir = workspace.dir().to_path_buf();

        let nested = dir.join("reports").join("archive");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("audit.html"), "<html></html>").unwrap();
        fs::write(dir.join("audit.json"), "{}").unwrap();

        drop(workspace);
        assert!(!dir.exists());
    }

    #[test]
    fn acquire_in_uses_given_root() {
        let root = tempfile::tempdir().unwrap();
        let workspace =
            Workspace::acquire_in(root.path(), &Tool::Binary(PathBuf::from("echo"))).unwrap();

        assert!(workspace.dir().starts_with(root.path()));
        let dir = workspace.dir().to_path_buf();
        drop(workspace);
        assert!(!dir.exists());
        assert!(root.path().is_dir(), "only the workspace itself is removed");
    }

    #[test]
    fn unusable_root_fails_fast() {
        let result = Workspace::acquire_in("/no/such/root", &embedded_tool());
        assert!(matches!(result, Err(AnalysisError::Workspace(_))));
    }

    #[test]
    fn failed_staging_leaves_nothing_behind() {
        let root = tempfile::tempdir().unwrap();
        // A path separator in the extension makes the staging open() fail
        // after the directory has already been created.
        let tool = Tool::EmbeddedScript {
            interpreter: "sh".to_string(),
            file_ext: "sh/../nope".to_string(),
            contents: "echo hello\n".to_string(),
        };

        let result = Workspace::acquire_in(root.path(), &tool);

        assert!(matches!(result, Err(AnalysisError::Workspace(_))));
        assert_eq!(
            fs::read_dir(root.path()).unwrap().count(),
            0,
            "partially created workspace must be removed"
        );
    }

    #[test]
    fn workspaces_never_collide() {
        let a = Workspace::acquire(&embedded_tool()).unwrap();
        let b = Workspace::acquire(&embedded_tool()).unwrap();
        assert_ne!(a.dir(), b.dir());
    }
}
