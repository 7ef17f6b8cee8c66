//! Top drainers and uplifters
//!
//! Ranks the raw, uncalibrated answers independently of the scoring stages.
//! Sorting is stable, so equal scores keep question order.

use crate::types::{Answer, Dimension, RankedAnswer, QUESTION_COUNT};

/// Number of entries in each ranked list
pub const TOP_N: usize = 3;

/// Drainers (lowest first) and uplifters (highest first)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub drainers: Vec<RankedAnswer>,
    pub uplifters: Vec<RankedAnswer>,
}

/// Rank the answered questions; never pads short lists
pub fn rank_answers(answers: &[Answer]) -> Rankings {
    let answered: Vec<RankedAnswer> = answers
        .iter()
        .take(QUESTION_COUNT)
        .enumerate()
        .filter_map(|(index, answer)| {
            let score = answer.score.filter(|s| s.is_finite())?;
            Some(RankedAnswer {
                index,
                score,
                note: answer.note.clone(),
            })
        })
        .collect();

    let mut ascending = answered.clone();
    ascending.sort_by(|a, b| a.score.total_cmp(&b.score));

    let mut descending = answered;
    descending.sort_by(|a, b| b.score.total_cmp(&a.score));

    Rankings {
        drainers: ascending.into_iter().take(TOP_N).collect(),
        uplifters: descending.into_iter().take(TOP_N).collect(),
    }
}

/// Dimension that occurs most often among the ranked questions.
///
/// Ties go to the earlier dimension in canonical order.
pub fn dominant_dimension(items: &[RankedAnswer]) -> Option<Dimension> {
    let mut counts = [0usize; 5];
    for item in items {
        if let Some(dimension) = Dimension::for_question(item.index) {
            if let Some(pos) = Dimension::ALL.iter().position(|d| *d == dimension) {
                counts[pos] += 1;
            }
        }
    }

    let mut best: Option<(Dimension, usize)> = None;
    for (dimension, count) in Dimension::ALL.into_iter().zip(counts) {
        if count > best.map(|(_, n)| n).unwrap_or(0) {
            best = Some((dimension, count));
        }
    }
    best.map(|(dimension, _)| dimension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ranked(index: usize, score: f64) -> RankedAnswer {
        RankedAnswer {
            index,
            score,
            note: None,
        }
    }

    #[test]
    fn test_drainers_and_uplifters() {
        let answers = vec![
            Answer::scored(5.0),
            Answer::scored(2.0).with_note("sleep debt"),
            Answer::scored(9.0),
            Answer::unanswered(),
            Answer::scored(7.0),
            Answer::scored(1.0),
        ];
        let rankings = rank_answers(&answers);

        assert_eq!(
            rankings.drainers,
            vec![
                ranked(5, 1.0),
                RankedAnswer {
                    index: 1,
                    score: 2.0,
                    note: Some("sleep debt".to_string()),
                },
                ranked(0, 5.0),
            ]
        );
        assert_eq!(
            rankings.uplifters,
            vec![ranked(2, 9.0), ranked(4, 7.0), ranked(0, 5.0)]
        );
    }

    #[test]
    fn test_ties_keep_question_order() {
        let answers = vec![
            Answer::scored(4.0),
            Answer::scored(4.0),
            Answer::scored(4.0),
            Answer::scored(4.0),
        ];
        let rankings = rank_answers(&answers);

        let drain_idx: Vec<usize> = rankings.drainers.iter().map(|r| r.index).collect();
        let lift_idx: Vec<usize> = rankings.uplifters.iter().map(|r| r.index).collect();
        assert_eq!(drain_idx, vec![0, 1, 2]);
        assert_eq!(lift_idx, vec![0, 1, 2]);
    }

    #[test]
    fn test_short_lists_are_not_padded() {
        let rankings = rank_answers(&[Answer::unanswered(), Answer::scored(6.0)]);
        assert_eq!(rankings.drainers, vec![ranked(1, 6.0)]);
        assert_eq!(rankings.uplifters, vec![ranked(1, 6.0)]);

        let rankings = rank_answers(&[]);
        assert!(rankings.drainers.is_empty());
        assert!(rankings.uplifters.is_empty());
    }

    #[test]
    fn test_answers_past_last_question_are_ignored() {
        let mut answers: Vec<Answer> = (0..QUESTION_COUNT).map(|_| Answer::scored(5.0)).collect();
        answers.push(Answer::scored(1.0));
        let rankings = rank_answers(&answers);
        assert!(rankings.drainers.iter().all(|r| r.index < QUESTION_COUNT));
        assert_eq!(rankings.drainers[0].score, 5.0);
    }

    #[test]
    fn test_dominant_dimension() {
        let items = vec![ranked(0, 1.0), ranked(21, 2.0), ranked(22, 2.0)];
        assert_eq!(dominant_dimension(&items), Some(Dimension::Peace));

        // one each: earliest dimension wins
        let items = vec![ranked(16, 1.0), ranked(6, 2.0), ranked(11, 2.0)];
        assert_eq!(dominant_dimension(&items), Some(Dimension::Connection));

        assert_eq!(dominant_dimension(&[]), None);
    }
}
