//! services/cli/src/app/review_task.rs
//!
//! Interactive flashcard review. Confidence marks stay in memory.

use jobprep_core::domain::FlashcardSet;
use jobprep_core::review::{Confidence, FlashcardReview, ReviewError};
use tokio::io::AsyncRead;

use crate::app::console::Console;
use crate::app::render;
use crate::error::ClientError;

const HELP: &str = "[f] flip  [h/m/l] rate  [n] next  [p] previous  [r] restart  [q] back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewCommand {
    Flip,
    Mark(Confidence),
    Next,
    Previous,
    Restart,
    Quit,
}

fn parse(input: &str) -> Option<ReviewCommand> {
    match input.trim() {
        "f" | "" => Some(ReviewCommand::Flip),
        "n" => Some(ReviewCommand::Next),
        "p" => Some(ReviewCommand::Previous),
        "r" => Some(ReviewCommand::Restart),
        "q" => Some(ReviewCommand::Quit),
        other => other.parse().ok().map(ReviewCommand::Mark),
    }
}

fn apply(review: &mut FlashcardReview, command: ReviewCommand) -> Result<(), ReviewError> {
    match command {
        ReviewCommand::Flip => review.flip(),
        ReviewCommand::Mark(level) => review.mark(level),
        ReviewCommand::Next => review.next(),
        ReviewCommand::Previous => review.previous(),
        ReviewCommand::Restart => {
            review.restart();
            Ok(())
        }
        ReviewCommand::Quit => Ok(()),
    }
}

pub async fn run_review<R: AsyncRead + Unpin>(
    set: &FlashcardSet,
    console: &mut Console<R>,
) -> Result<(), ClientError> {
    let mut review = match FlashcardReview::new(set) {
        Ok(review) => review,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };
    println!("=== {} ===", review.title());
    if !set.description.is_empty() {
        println!("{}", set.description);
    }
    println!("{HELP}\n");
    println!("{}", render::card(&review));

    while let Some(line) = console.prompt("> ").await? {
        let Some(command) = parse(&line) else {
            println!("{HELP}");
            continue;
        };
        if command == ReviewCommand::Quit {
            break;
        }
        match apply(&mut review, command) {
            Ok(()) => println!("{}", render::card(&review)),
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}
