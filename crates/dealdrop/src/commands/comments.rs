//! Discussion thread handlers.

use chrono::Utc;

use dealdrop_core::{CommentId, CommentTree, DealId, Market, ThreadEntry};

use crate::cli::{CommentsArgs, CommentsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Tint};

use super::util;

/// Render a thread with two spaces of indent per reply level.
fn render_thread(tree: &CommentTree, global: &GlobalOpts) -> String {
    let now = Utc::now();
    tree.walk()
        .iter()
        .map(|entry| {
            let indent = "  ".repeat(entry.depth);
            let c = entry.comment;
            let author = c
                .author_name
                .as_deref()
                .or(c.author_id.as_ref().map(|a| a.as_str()))
                .unwrap_or("anonymous");
            let when = c
                .created_at
                .map(|at| util::relative(at, now))
                .unwrap_or_default();
            let header = output::tint(global, format!("[{}] {author} {when}", c.id), Tint::Muted);
            format!("{indent}{header}\n{indent}{}", c.body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(
    market: &Market,
    args: CommentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CommentsCommand::Show { deal } => {
            let tree = market.comment_thread(&DealId::new(deal)).await?;
            let out = match global.output {
                OutputFormat::Table => {
                    if tree.is_empty() {
                        output::notice(global, "No comments yet");
                    }
                    render_thread(&tree, global)
                }
                _ => {
                    let entries: Vec<ThreadEntry<'_>> = tree.walk();
                    output::render_single(&global.output, &entries, |_| String::new(), |e| {
                        e.iter()
                            .map(|t| t.comment.id.to_string())
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CommentsCommand::Post {
            deal,
            body,
            reply_to,
        } => {
            let deal = DealId::new(deal);
            let mut tree = market.comment_thread(&deal).await?;
            let parent = reply_to.map(CommentId::new);
            let comment = market
                .post_comment(&mut tree, &deal, &body, parent.as_ref())
                .await?;
            output::notice(global, format!("Posted comment {}", comment.id));
            Ok(())
        }
    }
}
