//! Implementation of the `vocabulary` subcommand.
//!
//! Prints the vocabulary a moderator would use, after applying any `--add`
//! entries, as pretty JSON.

use anyhow::{Result, bail};
use clipscreen_core::moderation::ModerationVocabulary;

use crate::cli::VocabularyArgs;
use crate::config::load_vocabulary;

/// Splits a `CATEGORY:WORD` addition.
pub fn parse_addition(entry: &str) -> Result<(&str, &str)> {
    match entry.split_once(':') {
        Some((category, word)) if !category.trim().is_empty() && !word.trim().is_empty() => {
            Ok((category.trim(), word.trim()))
        }
        _ => bail!("Invalid vocabulary addition '{entry}', expected CATEGORY:WORD"),
    }
}

/// Loads the vocabulary and applies the additions in order.
pub fn resolve_vocabulary(args: &VocabularyArgs) -> Result<ModerationVocabulary> {
    let mut vocabulary = load_vocabulary(args.vocabulary.as_deref())?;
    for entry in &args.additions {
        let (category, word) = parse_addition(entry)?;
        if !vocabulary.add_word(category, word) {
            log::info!("'{word}' is already in category '{category}'");
        }
    }
    Ok(vocabulary)
}

pub fn run_vocabulary(args: &VocabularyArgs) -> Result<bool> {
    let vocabulary = resolve_vocabulary(args)?;
    println!("{}", serde_json::to_string_pretty(&vocabulary)?);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additions_need_both_parts() {
        assert_eq!(parse_addition("violence:crossbow").unwrap(), ("violence", "crossbow"));
        assert_eq!(parse_addition(" drugs : pills ").unwrap(), ("drugs", "pills"));
        assert!(parse_addition("violence").is_err());
        assert!(parse_addition(":word").is_err());
        assert!(parse_addition("category:").is_err());
    }

    #[test]
    fn additions_extend_the_default_catalog() {
        let args = VocabularyArgs {
            vocabulary: None,
            additions: vec!["violence:crossbow".to_string(), "violence:gun".to_string()],
        };
        let base = ModerationVocabulary::default().word_count();
        let vocabulary = resolve_vocabulary(&args).unwrap();

        assert!(vocabulary.contains("violence", "crossbow"));
        assert_eq!(vocabulary.word_count(), base + 1);
    }
}
