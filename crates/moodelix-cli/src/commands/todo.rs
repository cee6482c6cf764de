use clap::Subcommand;
use moodelix_core::storage::task_progress_pct;
use moodelix_core::{TodoPatch, TodoService, ValidationError};

use super::{load_config, open_backend, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum TodoAction {
    /// List todos, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a todo
    Add {
        /// Todo title
        title: String,
    },
    /// Mark a todo as done
    Done {
        /// Todo ID
        id: String,
    },
    /// Flip a todo between done and open
    Toggle {
        /// Todo ID
        id: String,
    },
    /// Rename a todo
    Rename {
        /// Todo ID
        id: String,
        /// New title
        title: String,
    },
    /// Delete a todo
    Rm {
        /// Todo ID
        id: String,
    },
}

pub fn run(action: TodoAction) -> CliResult {
    runtime()?.block_on(execute(action))
}

async fn execute(action: TodoAction) -> CliResult {
    let mut cfg = load_config()?;
    let backend = open_backend(&mut cfg).await?;
    let todos = TodoService::new(backend.store, backend.token);

    match action {
        TodoAction::List { json } => {
            let list = todos.fetch_todos().await;
            if json {
                print_json(&list)?;
            } else if list.is_empty() {
                println!("No todos.");
            } else {
                for todo in &list {
                    let mark = if todo.completed { "x" } else { " " };
                    println!("[{mark}] {}  {}", todo.id, todo.title);
                }
                println!("{}% complete", task_progress_pct(&list));
            }
        }
        TodoAction::Add { title } => match todos.add_todo(&title).await {
            Some(todo) => print_json(&todo)?,
            None => return Err("todo was not created".into()),
        },
        TodoAction::Done { id } => {
            let todo = todos
                .update_todo(&id, &TodoPatch::completed(true))
                .await
                .ok_or_else(|| format!("todo not updated: {id}"))?;
            print_json(&todo)?;
        }
        TodoAction::Toggle { id } => {
            let todo = todos
                .toggle_todo(&id)
                .await
                .ok_or_else(|| format!("todo not found: {id}"))?;
            print_json(&todo)?;
        }
        TodoAction::Rename { id, title } => {
            let title = title.trim();
            if title.is_empty() {
                return Err(ValidationError::Empty("title").into());
            }
            let patch = TodoPatch {
                title: Some(title.to_string()),
                ..TodoPatch::default()
            };
            let todo = todos
                .update_todo(&id, &patch)
                .await
                .ok_or_else(|| format!("todo not updated: {id}"))?;
            print_json(&todo)?;
        }
        TodoAction::Rm { id } => {
            if !todos.delete_todo(&id).await {
                return Err(format!("todo not deleted: {id}").into());
            }
            println!("deleted {id}");
        }
    }
    Ok(())
}
