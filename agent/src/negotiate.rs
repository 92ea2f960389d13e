//! Reconciles solver transcripts into a single recommended move.
//!
//! Certain facts are accepted unconditionally. Candidate facts are promoted
//! to certain when the transcript enumerated a single model, or when the
//! coordinate appears in every enumerated model; the rest stay probable,
//! ranked by how many models corroborate them. Transcripts from different
//! rule programs merge in the fixed order they are handed in, never by
//! solver completion order, so a round's answer is deterministic.

use tracing::{debug, instrument};

use sweeper_common::models::Pos;

use crate::oracle::OracleError;
use crate::transcript::{SafetyKind, Transcript};

/// The negotiated move sets for one round.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Negotiation {
    certain: Vec<Pos>,
    probable: Vec<(Pos, usize)>,
}

fn push_unique(set: &mut Vec<Pos>, pos: Pos) {
    if !set.contains(&pos) {
        set.push(pos);
    }
}

impl Negotiation {
    /// Classifies the safety facts of one or more transcripts.
    ///
    /// An unsatisfiable transcript is never expected under a correct
    /// encoding and fails the round with `Inconsistency` even when other
    /// transcripts produced usable moves.
    #[instrument(level = "debug", skip(transcripts))]
    pub fn from_transcripts(transcripts: &[Transcript]) -> Result<Self, OracleError> {
        if let Some(bad) = transcripts.iter().find(|t| t.unsatisfiable) {
            return Err(OracleError::Inconsistency {
                transcript: bad.raw.clone(),
            });
        }

        let mut negotiation = Negotiation::default();
        for transcript in transcripts {
            negotiation.absorb(transcript);
        }

        // Promotions may have landed after a coordinate was already counted
        // as probable; certain wins.
        let certain = &negotiation.certain;
        negotiation.probable.retain(|(pos, _)| !certain.contains(pos));

        // Descending corroboration; the stable sort keeps first-seen order
        // among equally-corroborated moves.
        negotiation.probable.sort_by(|a, b| b.1.cmp(&a.1));

        debug!(
            "Negotiated {} certain and {} probable moves",
            negotiation.certain.len(),
            negotiation.probable.len()
        );
        Ok(negotiation)
    }

    fn absorb(&mut self, transcript: &Transcript) {
        for fact in &transcript.facts {
            if fact.kind == SafetyKind::Certain {
                push_unique(&mut self.certain, fact.pos);
            }
        }

        // Distinct models per candidate coordinate, in first-seen order.
        let mut occurrences: Vec<(Pos, Vec<usize>)> = Vec::new();
        for fact in &transcript.facts {
            if fact.kind != SafetyKind::Candidate {
                continue;
            }
            match occurrences.iter_mut().find(|(pos, _)| *pos == fact.pos) {
                Some((_, models)) => {
                    if !models.contains(&fact.model) {
                        models.push(fact.model);
                    }
                }
                None => occurrences.push((fact.pos, vec![fact.model])),
            }
        }

        for (pos, models) in occurrences {
            // A single enumerated model collapses "possibly safe" into
            // "definitely safe", as does presence in every model.
            if transcript.models <= 1 || models.len() == transcript.models {
                push_unique(&mut self.certain, pos);
            } else {
                match self.probable.iter_mut().find(|(p, _)| *p == pos) {
                    Some((_, count)) => *count += models.len(),
                    None => self.probable.push((pos, models.len())),
                }
            }
        }
    }

    /// Certain moves in discovery order.
    pub fn certain(&self) -> &[Pos] {
        &self.certain
    }

    /// Probable moves ranked by descending occurrence count.
    pub fn probable(&self) -> &[(Pos, usize)] {
        &self.probable
    }

    /// All usable moves, best first: certain moves in discovery order, then
    /// probable moves by rank.
    pub fn ranked_moves(&self) -> impl Iterator<Item = Pos> + '_ {
        self.certain
            .iter()
            .copied()
            .chain(self.probable.iter().map(|(pos, _)| *pos))
    }

    /// The single recommended move for this round.
    pub fn recommend(&self) -> Result<Pos, OracleError> {
        self.ranked_moves()
            .next()
            .ok_or(OracleError::NoSafeMoveFound)
    }
}

#[cfg(test)]
mod tests {
    use crate::transcript::SafetyFact;

    use super::*;

    fn pos(x: usize, y: usize) -> Pos {
        Pos { x, y }
    }

    fn fact(kind: SafetyKind, x: usize, y: usize, model: usize) -> SafetyFact {
        SafetyFact {
            kind,
            pos: pos(x, y),
            model,
        }
    }

    fn transcript(models: usize, facts: Vec<SafetyFact>) -> Transcript {
        Transcript {
            models,
            facts,
            unsatisfiable: false,
            raw: String::new(),
        }
    }

    #[test]
    fn promotes_candidates_present_in_every_model() {
        // M = 3, certain (2,2), candidate (1,1) in all three models,
        // candidate (3,3) in one.
        let t = transcript(
            3,
            vec![
                fact(SafetyKind::Certain, 2, 2, 1),
                fact(SafetyKind::Candidate, 1, 1, 1),
                fact(SafetyKind::Candidate, 1, 1, 2),
                fact(SafetyKind::Candidate, 3, 3, 2),
                fact(SafetyKind::Candidate, 1, 1, 3),
            ],
        );
        let negotiation = Negotiation::from_transcripts(&[t]).unwrap();

        assert_eq!(negotiation.certain(), &[pos(2, 2), pos(1, 1)]);
        assert_eq!(negotiation.probable(), &[(pos(3, 3), 1)]);
        assert_eq!(negotiation.recommend().unwrap(), pos(2, 2));
    }

    #[test]
    fn single_model_promotes_all_candidates() {
        let t = transcript(1, vec![fact(SafetyKind::Candidate, 4, 4, 1)]);
        let negotiation = Negotiation::from_transcripts(&[t]).unwrap();

        assert_eq!(negotiation.certain(), &[pos(4, 4)]);
        assert!(negotiation.probable().is_empty());
        assert_eq!(negotiation.recommend().unwrap(), pos(4, 4));
    }

    #[test]
    fn no_facts_means_no_safe_move() {
        let t = transcript(2, Vec::new());
        let negotiation = Negotiation::from_transcripts(&[t]).unwrap();
        assert!(matches!(
            negotiation.recommend(),
            Err(OracleError::NoSafeMoveFound)
        ));
    }

    #[test]
    fn probable_moves_rank_by_corroboration_then_first_seen() {
        let t = transcript(
            4,
            vec![
                fact(SafetyKind::Candidate, 1, 1, 1),
                fact(SafetyKind::Candidate, 2, 2, 1),
                fact(SafetyKind::Candidate, 3, 3, 1),
                fact(SafetyKind::Candidate, 2, 2, 2),
                fact(SafetyKind::Candidate, 3, 3, 3),
            ],
        );
        let negotiation = Negotiation::from_transcripts(&[t]).unwrap();

        // (2,2) and (3,3) tie at two models; (2,2) was seen first.
        assert_eq!(
            negotiation.probable(),
            &[(pos(2, 2), 2), (pos(3, 3), 2), (pos(1, 1), 1)]
        );
        assert_eq!(negotiation.recommend().unwrap(), pos(2, 2));
    }

    #[test]
    fn duplicate_atoms_within_one_model_count_once() {
        let t = transcript(
            2,
            vec![
                fact(SafetyKind::Candidate, 1, 1, 1),
                fact(SafetyKind::Candidate, 1, 1, 1),
            ],
        );
        let negotiation = Negotiation::from_transcripts(&[t]).unwrap();
        assert_eq!(negotiation.probable(), &[(pos(1, 1), 1)]);
    }

    #[test]
    fn unsatisfiable_transcript_fails_even_with_other_answers() {
        let good = transcript(1, vec![fact(SafetyKind::Certain, 1, 1, 1)]);
        let bad = Transcript {
            models: 0,
            facts: Vec::new(),
            unsatisfiable: true,
            raw: "UNSATISFIABLE".to_owned(),
        };
        let result = Negotiation::from_transcripts(&[good, bad]);
        assert!(matches!(result, Err(OracleError::Inconsistency { .. })));
    }

    #[test]
    fn merge_order_follows_transcript_precedence_not_arrival() {
        let strict = transcript(1, vec![fact(SafetyKind::Certain, 5, 5, 1)]);
        let broad = transcript(
            2,
            vec![
                fact(SafetyKind::Certain, 6, 6, 1),
                fact(SafetyKind::Candidate, 7, 7, 1),
            ],
        );
        let negotiation = Negotiation::from_transcripts(&[strict, broad]).unwrap();

        // The strict program's certain move stays first regardless of which
        // solver run finished first.
        assert_eq!(negotiation.certain(), &[pos(5, 5), pos(6, 6)]);
        assert_eq!(negotiation.probable(), &[(pos(7, 7), 1)]);
        assert_eq!(negotiation.recommend().unwrap(), pos(5, 5));
    }

    #[test]
    fn certain_beats_probable_across_transcripts() {
        let broad = transcript(
            3,
            vec![
                fact(SafetyKind::Candidate, 1, 2, 1),
                fact(SafetyKind::Candidate, 1, 2, 2),
            ],
        );
        let strict = transcript(2, vec![fact(SafetyKind::Certain, 1, 2, 1)]);
        let negotiation = Negotiation::from_transcripts(&[strict, broad]).unwrap();

        // Promoted out of probable once certain.
        assert_eq!(negotiation.certain(), &[pos(1, 2)]);
        assert!(negotiation.probable().is_empty());
    }
}
