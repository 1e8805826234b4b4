use crate::models::PatentMatch;
use crate::prompts::render_analysis_prompt;
use std::fmt::Write;

/// Abstract excerpts are cut at this many chars before entering the prompt.
pub const ABSTRACT_BUDGET: usize = 500;

/// Similarity scores are rendered with this many decimal places.
pub const SCORE_DECIMALS: usize = 3;

/// Builds the complete user prompt: the query plus the formatted prior-art
/// block, interpolated into the fixed instruction template. Pure and
/// deterministic.
pub fn assemble(query: &str, matches: &[PatentMatch]) -> String {
    render_analysis_prompt(query, &prior_art_block(matches))
}

/// Formats the retrieved matches into the prior-art block of the prompt.
/// Matches are rendered in the order given, which is already rank order
/// from the index.
pub fn prior_art_block(matches: &[PatentMatch]) -> String {
    let mut out = String::new();
    for (i, m) in matches.iter().enumerate() {
        let _ = write!(
            out,
            "\n--- Patent {} ---\nNumber: {}\nTitle: {}\nAbstract: {}\nSimilarity Score: {:.prec$}\n",
            i + 1,
            m.id,
            m.title(),
            excerpt(m.abstract_text(), ABSTRACT_BUDGET),
            m.score,
            prec = SCORE_DECIMALS,
        );
    }
    out
}

/// First `budget` chars, char-boundary safe, with a `...` marker when the
/// text was actually cut.
fn excerpt(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn patent(id: &str, score: f32, title: &str, abstract_text: &str) -> PatentMatch {
        let mut metadata = HashMap::new();
        metadata.insert("title".to_string(), title.to_string());
        metadata.insert("abstract".to_string(), abstract_text.to_string());
        PatentMatch {
            id: id.to_string(),
            score,
            metadata,
        }
    }

    #[test]
    fn renders_ids_and_scores_in_rank_order() {
        // "A smart water bottle that tracks hydration via Bluetooth and LED display"
        let matches = vec![
            patent("US-1", 0.91, "Hydration tracker", "A bottle with sensors."),
            patent("US-2", 0.77, "Smart container", "A container with a display."),
        ];
        let block = prior_art_block(&matches);

        let us1 = block.find("Number: US-1").unwrap();
        let us2 = block.find("Number: US-2").unwrap();
        assert!(us1 < us2);
        assert!(block.contains("Similarity Score: 0.910"));
        assert!(block.contains("Similarity Score: 0.770"));
        assert!(block.contains("--- Patent 1 ---"));
        assert!(block.contains("--- Patent 2 ---"));
    }

    #[test]
    fn long_abstract_is_cut_with_marker() {
        let long = "x".repeat(ABSTRACT_BUDGET + 100);
        let matches = vec![patent("US-3", 0.5, "T", &long)];
        let block = prior_art_block(&matches);
        let expected = format!("{}...", "x".repeat(ABSTRACT_BUDGET));
        assert!(block.contains(&expected));
        assert!(!block.contains(&"x".repeat(ABSTRACT_BUDGET + 1)));
    }

    #[test]
    fn short_abstract_has_no_marker() {
        let matches = vec![patent("US-4", 0.5, "T", "Short abstract.")];
        let block = prior_art_block(&matches);
        assert!(block.contains("Abstract: Short abstract.\n"));
    }

    #[test]
    fn missing_metadata_renders_na() {
        let matches = vec![PatentMatch {
            id: "US-5".to_string(),
            score: 0.2,
            metadata: HashMap::new(),
        }];
        let block = prior_art_block(&matches);
        assert!(block.contains("Title: N/A"));
        assert!(block.contains("Abstract: N/A"));
    }
}
