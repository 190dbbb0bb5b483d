use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Comment, Recipe};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageThread {
    pub recipe_id: String,
    pub recipe_title: String,
    pub question: Option<Comment>,
    pub reply: Comment,
}

impl MessageThread {
    pub fn replied_at(&self) -> DateTime<Utc> {
        self.reply.created_at
    }
}

/// The user comment an assistant reply answers.
///
/// An explicit `in_reply_to` link wins. Without one, the nearest preceding
/// non-assistant comment is taken, which mis-pairs when two users comment
/// back to back before a single reply.
pub fn question_for<'a>(comments: &'a [Comment], reply_index: usize) -> Option<&'a Comment> {
    let reply = comments.get(reply_index)?;
    if let Some(target) = reply.in_reply_to.as_deref() {
        if let Some(linked) = comments.iter().find(|c| c.id == target) {
            return Some(linked);
        }
    }
    comments[..reply_index]
        .iter()
        .rev()
        .find(|c| !c.is_assistant())
}

/// Every assistant reply across `recipes`, newest first.
pub fn derive_threads<'a, I>(recipes: I) -> Vec<MessageThread>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    let mut threads: Vec<MessageThread> = recipes
        .into_iter()
        .flat_map(|recipe| {
            recipe
                .comments
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_assistant())
                .map(move |(index, reply)| MessageThread {
                    recipe_id: recipe.id.clone(),
                    recipe_title: recipe.title.clone(),
                    question: question_for(&recipe.comments, index).cloned(),
                    reply: reply.clone(),
                })
        })
        .collect();

    threads.sort_by(|a, b| b.replied_at().cmp(&a.replied_at()));
    threads
}
