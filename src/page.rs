use serde::Serialize;
use tera::{Context, Tera};

use crate::{model::Todo, schema::CONTENT_MAX_CHARS};

pub const EMPTY_MESSAGE: &str = "No todos yet. Add one above!";

const INDEX: &str = "index.html";

/// What the add form should show after a rejected submission.
#[derive(Debug, Default, Serialize)]
pub struct AddForm<'a> {
    pub content: &'a str,
    pub errors: &'a [String],
}

/// Compiled page templates. The `.html` name turns on tera's autoescaping,
/// which covers every piece of user-supplied text.
#[derive(Debug)]
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(INDEX, include_str!("../templates/index.html"))?;
        Ok(Self { tera })
    }

    pub fn render_index(&self, todos: &[Todo], form: &AddForm<'_>) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("todos", todos);
        context.insert("form", form);
        context.insert("max_chars", &CONTENT_MAX_CHARS);
        context.insert("empty_message", EMPTY_MESSAGE);
        self.tera.render(INDEX, &context)
    }
}
