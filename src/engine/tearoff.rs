//! Detaching a menu into its own persistent process
//!
//! The visible rows of the torn menu (with everything below them) are
//! written as indented text to the stdin of a fresh instance of this
//! program started with `--tearoff-child`.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::error::MenuResult;
use crate::menu::Menu;
use crate::tree::{ItemId, ItemTree};

/// What the new instance should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TearoffRequest {
    pub title: String,
    /// Menu input for the child, in the usual indented format
    pub text: String,
}

impl TearoffRequest {
    pub fn from_menu(tree: &ItemTree, menu: &Menu, default_title: &str) -> Self {
        let mut text = String::new();
        tree.write_items(&menu.visible_items(), &mut text);
        let title = if menu.owner == ItemId::ROOT {
            default_title.to_string()
        } else {
            tree.get(menu.owner)
                .label
                .clone()
                .unwrap_or_else(|| default_title.to_string())
        };
        Self { title, text }
    }
}

/// Starts tear-off children and reaps the ones that exited
#[derive(Debug)]
pub struct Spawner {
    program: PathBuf,
    args: Vec<OsString>,
    children: Vec<Child>,
}

impl Spawner {
    /// `args` go before the title, which is always the last argument
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
            children: Vec::new(),
        }
    }

    /// Spawner re-running the current executable
    pub fn current_exe(args: Vec<OsString>) -> MenuResult<Self> {
        Ok(Self::new(std::env::current_exe()?, args))
    }

    pub fn spawn(&mut self, request: &TearoffRequest) -> MenuResult<u32> {
        self.reap();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&request.title)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request.text.as_bytes())?;
        }
        let pid = child.id();
        tracing::info!(pid, title = %request.title, "tear-off started");
        self.children.push(child);
        Ok(pid)
    }

    /// Forget children that have exited
    pub fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }

    /// Children not yet known to have exited
    pub fn running(&self) -> usize {
        self.children.len()
    }
}
