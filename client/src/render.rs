//! Pure renderers for the mirror.
//!
//! Both take the already-filtered view plus counts, so what is drawn is a
//! function of (mirror, filter) only. [`render_html`] escapes every piece of
//! user text with [`escape_html`] before embedding it.

use crate::state::{Counts, Filter};
use composable_todo_core::Todo;
use std::fmt::Write;

/// Escape `&`, `<`, `>`, `"` and `'` for use in HTML text and attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Message shown when the filtered view is empty.
#[must_use]
pub const fn empty_message(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "No todos yet. Add one above!",
        Filter::Active => "No active todos.",
        Filter::Completed => "No completed todos.",
    }
}

/// `<ul>` fragment for the given view.
#[must_use]
pub fn render_html<'a>(
    todos: impl IntoIterator<Item = &'a Todo>,
    filter: Filter,
    counts: Counts,
) -> String {
    let mut items = String::new();
    for todo in todos {
        let class = if todo.completed { "todo-item completed" } else { "todo-item" };
        let checked = if todo.completed { " checked" } else { "" };
        let _ = write!(
            items,
            "<li class=\"{class}\" data-id=\"{id}\">\
             <input type=\"checkbox\"{checked}>\
             <span class=\"todo-title\">{title}</span>",
            id = todo.id,
            title = escape_html(&todo.title),
        );
        if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(
                items,
                "<p class=\"todo-description\">{}</p>",
                escape_html(description)
            );
        }
        items.push_str("<button class=\"delete\">Delete</button></li>");
    }

    let list = if items.is_empty() {
        format!("<p class=\"empty\">{}</p>", empty_message(filter))
    } else {
        format!("<ul class=\"todo-list\">{items}</ul>")
    };

    format!(
        "{list}<footer><span class=\"active-count\">{} active</span>\
         <span class=\"completed-count\">{} completed</span></footer>",
        counts.active, counts.completed
    )
}

/// Plain-text listing for the terminal.
#[must_use]
pub fn render_text<'a>(
    todos: impl IntoIterator<Item = &'a Todo>,
    filter: Filter,
    counts: Counts,
) -> String {
    let mut out = String::new();
    for todo in todos {
        let mark = if todo.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "[{mark}] {:>4}  {}", todo.id.get(), todo.title);
        if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "          {description}");
        }
    }
    if out.is_empty() {
        out.push_str(empty_message(filter));
        out.push('\n');
    }
    let _ = write!(
        out,
        "-- {} active, {} completed (filter: {filter})",
        counts.active, counts.completed
    );
    out
}
