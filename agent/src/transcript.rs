//! Typed view of a raw solver transcript.
//!
//! A clingo-style transcript interleaves answer models with status noise:
//!
//! ```text
//! Answer: 1
//! certain-safe(2,2) candidate-safe(1,1)
//! Answer: 2
//! candidate-safe(1,1) candidate-safe(3,3)
//! SATISFIABLE
//!
//! Models       : 2
//! ```
//!
//! Parsing happens here, once, into `SafetyFact` records; the negotiation
//! logic never touches raw text. Coordinates are shifted from the solver's
//! 1-indexed convention to the engine's 0-indexed `Pos` at this boundary.

use tracing::{debug, warn};

use sweeper_common::models::Pos;

/// Classification of a coordinate suggested by the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SafetyKind {
    /// Provably safe under the rule program's guarantees.
    Certain,
    /// Safe in the answer model that emitted it, not necessarily in all.
    Candidate,
}

/// One safety atom, tagged with the 1-based answer model that emitted it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafetyFact {
    pub kind: SafetyKind,
    pub pos: Pos,
    pub model: usize,
}

/// Parsed form of one solver run, keeping the raw text for diagnostics.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    pub models: usize,
    pub facts: Vec<SafetyFact>,
    pub unsatisfiable: bool,
    pub raw: String,
}

/// Parses a raw solver transcript. Unknown tokens and status lines are
/// skipped; a missing model-count line falls back to the highest answer
/// index seen.
pub fn parse_transcript(raw: &str) -> Transcript {
    let mut transcript = Transcript {
        raw: raw.to_owned(),
        ..Transcript::default()
    };
    let mut current_model = 0;
    let mut reported_models = None;

    for line in raw.lines() {
        let line = line.trim();
        if line == "UNSATISFIABLE" {
            transcript.unsatisfiable = true;
        } else if let Some(rest) = line.strip_prefix("Answer:") {
            match rest.trim().parse::<usize>() {
                Ok(index) => current_model = index,
                Err(_) => warn!("Malformed answer header: {line:?}"),
            }
        } else if let Some(rest) = line.strip_prefix("Models") {
            // `Models       : 2` or `Models : 2+` when enumeration was cut.
            if let Some(count) = rest
                .trim_start()
                .strip_prefix(':')
                .and_then(|n| n.trim().trim_end_matches('+').parse::<usize>().ok())
            {
                reported_models = Some(count);
            }
        } else if current_model > 0 {
            for token in line.split_whitespace() {
                if let Some((kind, pos)) = parse_safety_atom(token) {
                    transcript.facts.push(SafetyFact {
                        kind,
                        pos,
                        model: current_model,
                    });
                }
            }
        }
    }

    let highest_answer = transcript
        .facts
        .iter()
        .map(|fact| fact.model)
        .max()
        .unwrap_or(current_model);
    transcript.models = reported_models.unwrap_or(highest_answer).max(highest_answer);
    debug!(
        "Parsed transcript: {} models, {} safety facts, unsatisfiable: {}",
        transcript.models,
        transcript.facts.len(),
        transcript.unsatisfiable
    );
    transcript
}

/// Recognizes `certain-safe(C,R)` and `candidate-safe(C,R)` with positive
/// 1-indexed arguments, shifting to a 0-indexed `Pos`.
fn parse_safety_atom(token: &str) -> Option<(SafetyKind, Pos)> {
    let (name, rest) = token.split_once('(')?;
    let kind = match name {
        "certain-safe" => SafetyKind::Certain,
        "candidate-safe" => SafetyKind::Candidate,
        _ => return None,
    };
    let args = rest.trim_end_matches('.').strip_suffix(')')?;
    let (col, row) = args.split_once(',')?;
    let col: usize = col.trim().parse().ok()?;
    let row: usize = row.trim().parse().ok()?;
    if col == 0 || row == 0 {
        warn!("Safety atom with 0-valued coordinate: {token:?}");
        return None;
    }
    Some((
        kind,
        Pos {
            x: col - 1,
            y: row - 1,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: usize, y: usize) -> Pos {
        Pos { x, y }
    }

    #[test]
    fn extracts_facts_models_and_indexing() {
        let raw = "clingo version 5.6.2\n\
                   Reading from rules.lp ...\n\
                   Solving...\n\
                   Answer: 1\n\
                   certain-safe(2,2) candidate-safe(1,1)\n\
                   Answer: 2\n\
                   candidate-safe(1,1) candidate-safe(3,4)\n\
                   SATISFIABLE\n\
                   \n\
                   Models       : 2\n\
                   Calls        : 1\n";
        let transcript = parse_transcript(raw);

        assert_eq!(transcript.models, 2);
        assert!(!transcript.unsatisfiable);
        assert_eq!(
            transcript.facts,
            vec![
                SafetyFact {
                    kind: SafetyKind::Certain,
                    pos: pos(1, 1),
                    model: 1,
                },
                SafetyFact {
                    kind: SafetyKind::Candidate,
                    pos: pos(0, 0),
                    model: 1,
                },
                SafetyFact {
                    kind: SafetyKind::Candidate,
                    pos: pos(0, 0),
                    model: 2,
                },
                SafetyFact {
                    kind: SafetyKind::Candidate,
                    pos: pos(2, 3),
                    model: 2,
                },
            ]
        );
    }

    #[test]
    fn flags_unsatisfiable_runs() {
        let transcript = parse_transcript("Solving...\nUNSATISFIABLE\n\nModels       : 0\n");
        assert!(transcript.unsatisfiable);
        assert!(transcript.facts.is_empty());
        assert_eq!(transcript.models, 0);
    }

    #[test]
    fn ignores_unknown_atoms_and_junk() {
        let raw = "Answer: 1\n\
                   mine(3,3) certain-safe(5,1) danger_level(1,1,0) not-a-fact\n\
                   Models : 1\n";
        let transcript = parse_transcript(raw);
        assert_eq!(transcript.facts.len(), 1);
        assert_eq!(transcript.facts[0].pos, pos(4, 0));
    }

    #[test]
    fn rejects_zero_indexed_coordinates() {
        let transcript = parse_transcript("Answer: 1\ncertain-safe(0,3)\nModels : 1\n");
        assert!(transcript.facts.is_empty());
    }

    #[test]
    fn falls_back_to_highest_answer_index_without_models_line() {
        let raw = "Answer: 1\ncandidate-safe(1,1)\nAnswer: 2\ncandidate-safe(2,2)\n";
        assert_eq!(parse_transcript(raw).models, 2);
    }

    #[test]
    fn cut_enumeration_keeps_reported_count() {
        let raw = "Answer: 1\ncandidate-safe(1,1)\nModels       : 1+\n";
        assert_eq!(parse_transcript(raw).models, 1);
    }

    #[test]
    fn atoms_outside_an_answer_block_are_not_facts() {
        let transcript = parse_transcript("certain-safe(1,1)\n");
        assert!(transcript.facts.is_empty());
    }
}
