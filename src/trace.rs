//! Text rendering of scored retrieval candidates.
//!
//! Every line produced here has the same fixed four-space indent and renders
//! its score with exactly [`SCORE_DECIMALS`] fractional digits.

use crate::rulebot::{RetrievedRule, RetrievedSituation};

/// Fractional digits in a rendered score.
pub const SCORE_DECIMALS: usize = 4;

const LINE_PREFIX: &str = "    - ";

/// Render one retrieved rule.
///
/// `    - {id}: {title}[ - {subrule} ] (Score: {score})`. The sub-rule
/// fragment is only written when `subrule_title` is present and non-empty.
///
/// # Panics
///
/// Panics if `score` is not finite; see [`format_score`].
pub fn format_rule_line(id: &str, score: f64, title: &str, subrule_title: Option<&str>) -> String {
    let mut line = format!("{LINE_PREFIX}{id}: {title}");
    if let Some(subrule) = subrule_title.filter(|s| !s.is_empty()) {
        line.push_str(" - ");
        line.push_str(subrule);
        line.push(' ');
    }
    line.push_str(" (Score: ");
    line.push_str(&format_score(score));
    line.push(')');
    line
}

/// Render one retrieved situation.
///
/// # Panics
///
/// Panics if `score` is not finite; see [`format_score`].
pub fn format_situation_line(situation_id: &str, rule_id: &str, score: f64) -> String {
    format!(
        "{LINE_PREFIX}Situation:{situation_id} - Rule: {rule_id} (Score: {})",
        format_score(score)
    )
}

/// [`format_rule_line`] over a parsed candidate.
pub fn rule_line(rule: &RetrievedRule) -> String {
    format_rule_line(
        rule.rule_id.as_str(),
        rule.aggregate_score,
        &rule.rule_title,
        rule.subrule_title.as_deref(),
    )
}

/// [`format_situation_line`] over a parsed candidate.
pub fn situation_line(situation: &RetrievedSituation) -> String {
    format_situation_line(
        situation.situation_id.as_str(),
        situation.rule_id.as_str(),
        situation.similarity_score,
    )
}

/// Render `score` with exactly four fractional digits.
///
/// Rounds half away from zero on the shortest decimal representation of the
/// value, i.e. the digits `f64`'s `Display` prints. `0.91235` therefore
/// renders as `0.9124` even though its binary value lies just below the
/// midpoint.
///
/// # Panics
///
/// Panics on NaN or infinite input. Scores are checked for finiteness when a
/// service response is parsed, so reaching this with a non-finite value is a
/// broken caller contract.
pub fn format_score(score: f64) -> String {
    assert!(score.is_finite(), "retrieval score must be finite, got {score}");

    let repr = score.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(SCORE_DECIMALS))
        .map(|b| b - b'0')
        .collect();

    let round_up = frac_part
        .as_bytes()
        .get(SCORE_DECIMALS)
        .is_some_and(|&b| b >= b'5');

    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - SCORE_DECIMALS;
    let render = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let sign = if score < 0.0 { "-" } else { "" };

    format!("{sign}{}.{}", render(&digits[..split]), render(&digits[split..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rulebot::CandidateId;

    #[test]
    fn test_rule_line_without_subrule() {
        assert_eq!(
            format_rule_line("12", 0.5, "Icing", None),
            "    - 12: Icing (Score: 0.5000)"
        );
    }

    #[test]
    fn test_rule_line_with_subrule() {
        assert_eq!(
            format_rule_line("3", 0.91234, "Offside", Some("Delayed")),
            "    - 3: Offside - Delayed  (Score: 0.9123)"
        );
    }

    #[test]
    fn test_rule_line_empty_subrule_is_omitted() {
        assert_eq!(
            format_rule_line("4.1.", 1.2, "Goalkeeper", Some("")),
            "    - 4.1.: Goalkeeper (Score: 1.2000)"
        );
    }

    #[test]
    fn test_situation_line() {
        assert_eq!(
            format_situation_line("7", "3", 0.8),
            "    - Situation:7 - Rule: 3 (Score: 0.8000)"
        );
    }

    #[test]
    fn test_score_rounds_half_away_from_zero() {
        assert_eq!(format_score(0.91235), "0.9124");
        assert_eq!(format_score(0.91234), "0.9123");
        assert_eq!(format_score(1.23455), "1.2346");
        assert_eq!(format_score(0.00005), "0.0001");
        assert_eq!(format_score(0.000049), "0.0000");
    }

    #[test]
    fn test_score_carry_into_integer_part() {
        assert_eq!(format_score(0.99995), "1.0000");
        assert_eq!(format_score(9.99999), "10.0000");
    }

    #[test]
    fn test_score_padding_and_magnitude() {
        assert_eq!(format_score(0.0), "0.0000");
        assert_eq!(format_score(2.0), "2.0000");
        assert_eq!(format_score(12.5), "12.5000");
        assert_eq!(format_score(1234.56789), "1234.5679");
    }

    #[test]
    fn test_score_negative() {
        assert_eq!(format_score(-0.25), "-0.2500");
        assert_eq!(format_score(-0.00005), "-0.0001");
        assert_eq!(format_score(-0.00001), "-0.0000");
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn test_score_rejects_nan() {
        format_score(f64::NAN);
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn test_score_rejects_infinity() {
        format_situation_line("1", "1", f64::INFINITY);
    }

    #[test]
    fn test_typed_candidates() {
        let rule = RetrievedRule {
            rule_id: CandidateId::from("16.2."),
            rule_title: "Minor Penalties".to_string(),
            subrule_title: Some("Bench Minor".to_string()),
            aggregate_score: 2.13579,
        };
        assert_eq!(
            rule_line(&rule),
            "    - 16.2.: Minor Penalties - Bench Minor  (Score: 2.1358)"
        );

        let situation = RetrievedSituation {
            situation_id: CandidateId::from("41"),
            rule_id: CandidateId::from("16.2."),
            similarity_score: 0.87,
        };
        assert_eq!(
            situation_line(&situation),
            "    - Situation:41 - Rule: 16.2. (Score: 0.8700)"
        );
    }
}
