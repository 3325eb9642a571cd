//! check-todos: block stopping while todo items remain open

use async_trait::async_trait;

use claudekit_core::Result;
use claudekit_core::transcript::TodoItem;

use crate::hooks::runtime::{Hook, HookContext, Outcome};

pub struct CheckTodos;

#[async_trait]
impl Hook for CheckTodos {
    async fn run(&self, ctx: &HookContext) -> Result<Outcome> {
        let Some(transcript) = ctx.transcript() else {
            return Ok(Outcome::Allow);
        };
        let Some(todos) = transcript.latest_todo_state() else {
            return Ok(Outcome::Allow);
        };
        Ok(summarize_incomplete(&todos)
            .map(Outcome::block)
            .unwrap_or(Outcome::Allow))
    }
}

/// Block message when any item is not completed; `None` when all are done.
pub fn summarize_incomplete(todos: &[TodoItem]) -> Option<String> {
    let open: Vec<&TodoItem> = todos.iter().filter(|t| t.status != "completed").collect();
    if open.is_empty() {
        return None;
    }
    let mut message = format!(
        "{} of {} todo items are not completed:\n",
        open.len(),
        todos.len()
    );
    for todo in &open {
        let status = if todo.status.is_empty() {
            "pending"
        } else {
            &todo.status
        };
        message.push_str(&format!("  [{status}] {}\n", todo.content));
    }
    message.push_str("\nFinish the remaining items or update the todo list before stopping.");
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(content: &str, status: &str) -> TodoItem {
        TodoItem {
            content: content.into(),
            status: status.into(),
        }
    }

    #[test]
    fn test_all_completed_is_quiet() {
        let todos = vec![todo("a", "completed"), todo("b", "completed")];
        assert!(summarize_incomplete(&todos).is_none());
    }

    #[test]
    fn test_open_items_block() {
        let todos = vec![
            todo("write tests", "completed"),
            todo("fix lint", "in_progress"),
            todo("update docs", "pending"),
        ];
        let message = summarize_incomplete(&todos).unwrap();
        assert!(message.contains("2 of 3"));
        assert!(message.contains("fix lint"));
        assert!(message.contains("update docs"));
        assert!(!message.contains("write tests\n"));
    }

    #[test]
    fn test_empty_list_is_quiet() {
        assert!(summarize_incomplete(&[]).is_none());
    }
}
