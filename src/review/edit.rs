//! Edit flows for the interactive reviewer.
//!
//! Known tools get a guided sub-menu (todo list, task delegation, file
//! writes). Everything else, and the "manually edit JSON" choice inside each
//! sub-menu, goes through the generic JSON editor. Any failure or cancel in
//! these flows ends in a rejection, never an error.

use crate::policy::types::ActionKind;
use crate::review::terminal::{pretty_json, TerminalPrompt};
use crate::review::types::{ActionRequest, ReviewDecision};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use similar::{ChangeTag, TextDiff};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;

/// Characters of file content shown before the write_file sub-menu.
const CONTENT_PREVIEW_CHARS: usize = 500;

/// One entry of a `write_todos` plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub task: String,
    #[serde(default = "pending")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Fields we don't edit but must hand back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn pending() -> String {
    "pending".to_string()
}

impl Todo {
    pub fn new(task: impl Into<String>, priority: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            status: pending(),
            priority: Some(priority.into()),
            extra: Map::new(),
        }
    }

    pub fn priority_or_default(&self) -> &str {
        self.priority.as_deref().unwrap_or("medium")
    }
}

/// Replace one key in an action's args, keeping the rest.
fn with_arg(action: &ActionRequest, key: &str, value: Value) -> Value {
    let mut args = match &action.args {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    args.insert(key.to_string(), value);
    Value::Object(args)
}

fn edited(action: &ActionRequest, args: Value) -> ReviewDecision {
    ReviewDecision::edit(ActionRequest::new(action.name.clone(), args))
}

fn parse_index(input: &str, len: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Dispatch to the edit flow for this action's tool.
    pub(crate) fn edit(&mut self, action: &ActionRequest) -> io::Result<ReviewDecision> {
        self.section("EDIT MODE")?;

        match action.kind() {
            Some(ActionKind::WriteTodos) => self.edit_todos(action),
            Some(ActionKind::Task) => self.edit_task(action),
            Some(ActionKind::WriteFile) => self.edit_file_write(action),
            Some(ActionKind::GetDocument)
            | Some(ActionKind::GetDocumentPages)
            | Some(ActionKind::EditFile)
            | None => self.edit_generic(action),
        }
    }

    fn cancel(&mut self) -> io::Result<ReviewDecision> {
        self.error("Editing cancelled, rejecting action")?;
        Ok(ReviewDecision::Reject)
    }

    fn edit_todos(&mut self, action: &ActionRequest) -> io::Result<ReviewDecision> {
        let mut todos: Vec<Todo> = match action.args.get("todos") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(todos) => todos,
                Err(e) => {
                    self.error(&format!("Todo list is not in the expected shape: {}", e))?;
                    return self.edit_generic(action);
                }
            },
        };

        self.line("\nCurrent todos:")?;
        for (i, todo) in todos.iter().enumerate() {
            self.line(&format!("\n  {}. Task: {}", i + 1, todo.task))?;
            self.line(&format!("     Status: {}", todo.status))?;
            self.line(&format!("     Priority: {}", todo.priority_or_default()))?;
        }

        self.menu(
            "Edit options:",
            &[
                "Add a todo",
                "Remove a todo",
                "Change priority",
                "Manually edit JSON",
                "Cancel editing",
            ],
        )?;

        let Some(choice) = self.ask("\nChoice: ")? else {
            return self.cancel();
        };

        match choice.trim() {
            "1" => {
                let Some(task) = self.ask("New task description: ")? else {
                    return self.cancel();
                };
                let priority = self
                    .ask("Priority (low/medium/high/critical): ")?
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| "medium".to_string());
                todos.push(Todo::new(task.trim(), priority));
            }
            "2" => {
                let Some(num) = self.ask("Remove todo number: ")? else {
                    return self.cancel();
                };
                match parse_index(&num, todos.len()) {
                    Some(i) => {
                        todos.remove(i);
                    }
                    None => self.line("  (no such todo, list unchanged)")?,
                }
            }
            "3" => {
                let Some(num) = self.ask("Change priority for todo number: ")? else {
                    return self.cancel();
                };
                match parse_index(&num, todos.len()) {
                    Some(i) => {
                        let priority = self
                            .ask("New priority (low/medium/high/critical): ")?
                            .map(|p| p.trim().to_string())
                            .unwrap_or_default();
                        if !priority.is_empty() {
                            todos[i].priority = Some(priority);
                        }
                    }
                    None => self.line("  (no such todo, list unchanged)")?,
                }
            }
            "4" => return self.edit_generic(action),
            "5" => return self.cancel(),
            _ => {}
        }

        let todos = serde_json::to_value(&todos).map_err(io::Error::other)?;
        Ok(edited(action, with_arg(action, "todos", todos)))
    }

    fn edit_task(&mut self, action: &ActionRequest) -> io::Result<ReviewDecision> {
        let subagent = action.arg_str("name").unwrap_or_default().to_string();
        let task = action.arg_str("task").unwrap_or_default().to_string();

        self.line("\nCurrent delegation:")?;
        self.line(&format!("  Subagent: {}", subagent))?;
        self.line(&format!("  Task: {}", task))?;

        self.menu(
            "What would you like to edit?",
            &[
                "Add context to task description",
                "Change subagent",
                "Manually edit JSON",
                "Cancel editing",
            ],
        )?;

        let Some(choice) = self.ask("\nChoice: ")? else {
            return self.cancel();
        };

        match choice.trim() {
            "1" => {
                let Some(extra) = self.ask("\nEnter additional context to add:\n")? else {
                    return self.cancel();
                };
                let new_task = format!("{}\n\nADDITIONAL CONTEXT:\n{}", task, extra);
                Ok(edited(action, with_arg(action, "task", Value::String(new_task))))
            }
            "2" => {
                self.line("\nAvailable subagents:")?;
                for name in self.options.subagents.clone() {
                    self.line(&format!("  - {}", name))?;
                }
                let new_subagent = self
                    .ask("\nNew subagent: ")?
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();
                if new_subagent.is_empty() {
                    return self.cancel();
                }
                Ok(edited(action, with_arg(action, "name", Value::String(new_subagent))))
            }
            "3" => self.edit_generic(action),
            _ => self.cancel(),
        }
    }

    fn edit_file_write(&mut self, action: &ActionRequest) -> io::Result<ReviewDecision> {
        let path = action.arg_str("file_path").unwrap_or_default().to_string();
        let content = action.arg_str("content").unwrap_or_default().to_string();

        self.line("\nCurrent file write:")?;
        self.line(&format!("  Path: {}", path))?;
        self.line(&format!(
            "  Content length: {} characters",
            content.chars().count()
        ))?;
        self.line(&format!("\nFirst {} characters:", CONTENT_PREVIEW_CHARS))?;
        self.line(&"-".repeat(58))?;
        let preview: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
        self.line(&preview)?;
        if content.chars().count() > CONTENT_PREVIEW_CHARS {
            self.line("\n... (truncated)")?;
        }
        self.line(&"-".repeat(58))?;

        self.menu(
            "Edit options:",
            &[
                "Change file path",
                "Edit content in text editor",
                "Manually edit JSON",
                "Cancel editing",
            ],
        )?;

        let Some(choice) = self.ask("\nChoice: ")? else {
            return self.cancel();
        };

        match choice.trim() {
            "1" => {
                let new_path = self
                    .ask("New file path: ")?
                    .map(|p| p.trim().to_string())
                    .unwrap_or_default();
                if new_path.is_empty() {
                    return self.cancel();
                }
                Ok(edited(action, with_arg(action, "file_path", Value::String(new_path))))
            }
            "2" => match self.edit_in_editor(&content) {
                Ok(new_content) => {
                    self.show_diff_summary(&content, &new_content)?;
                    Ok(edited(action, with_arg(action, "content", Value::String(new_content))))
                }
                Err(e) => {
                    self.error(&format!("Editor failed: {}", e))?;
                    self.cancel()
                }
            },
            "3" => self.edit_generic(action),
            _ => self.cancel(),
        }
    }

    /// Write content to a scratch file, open the editor on it, read it back.
    fn edit_in_editor(&self, content: &str) -> io::Result<String> {
        let scratch = std::env::temp_dir().join(format!("hitlctl-edit-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&scratch, content)?;

        let result = run_editor(&self.options.editor, &scratch)
            .and_then(|()| std::fs::read_to_string(&scratch));

        if let Err(e) = std::fs::remove_file(&scratch) {
            tracing::debug!("Failed to remove editor scratch file {}: {}", scratch.display(), e);
        }
        result
    }

    fn show_diff_summary(&mut self, before: &str, after: &str) -> io::Result<()> {
        let diff = TextDiff::from_lines(before, after);
        let (mut added, mut removed) = (0usize, 0usize);
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => added += 1,
                ChangeTag::Delete => removed += 1,
                ChangeTag::Equal => {}
            }
        }
        if added == 0 && removed == 0 {
            self.line("\n  Content unchanged")
        } else {
            self.line(&format!("\n  Content edited: +{} / -{} lines", added, removed))
        }
    }

    /// Free-form JSON edit of the whole argument object.
    /// Reads until end of input. Invalid JSON rejects the action.
    pub(crate) fn edit_generic(&mut self, action: &ActionRequest) -> io::Result<ReviewDecision> {
        self.line("\nCurrent arguments:")?;
        self.line(&pretty_json(&action.args))?;
        self.line("\nEnter edited arguments as JSON:")?;
        self.line("(Paste JSON and press Ctrl+D when done)")?;

        let raw = self.read_remaining()?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(args) => Ok(edited(action, args)),
            Err(e) => {
                self.error(&format!("Invalid JSON: {}", e))?;
                self.line("Rejecting action")?;
                Ok(ReviewDecision::Reject)
            }
        }
    }
}

/// Run `$EDITOR`-style command (program plus optional flags) on a file.
fn run_editor(editor: &str, file: &Path) -> io::Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no editor configured"))?;

    let status = Command::new(program).args(parts).arg(file).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{} exited with {}", program, status)))
    }
}
