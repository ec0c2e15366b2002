use std::collections::HashSet;

pub trait Similarity {
    fn score(&self, left: &str, right: &str) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetJaccard;

impl TokenSetJaccard {
    pub fn tokens(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Similarity for TokenSetJaccard {
    fn score(&self, left: &str, right: &str) -> f64 {
        let left = Self::tokens(left);
        let right = Self::tokens(right);

        if left.is_empty() || right.is_empty() {
            return 0.0;
        }

        let intersection = left.intersection(&right).count();
        let union = left.union(&right).count();
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::{Similarity, TokenSetJaccard};

    #[test]
    fn case_and_order_do_not_matter() {
        let scorer = TokenSetJaccard;
        assert_eq!(scorer.score("john doe", "John Doe"), 1.0);
        assert_eq!(scorer.score("DOE  john", "john doe doe"), 1.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        let scorer = TokenSetJaccard;
        assert_eq!(scorer.score("", "anything"), 0.0);
        assert_eq!(scorer.score("anything", "   "), 0.0);
        assert_eq!(scorer.score("", ""), 0.0);
    }

    #[test]
    fn disjoint_and_partial_overlap() {
        let scorer = TokenSetJaccard;
        assert_eq!(scorer.score("alpha beta", "gamma delta"), 0.0);
        assert_eq!(scorer.score("john doe", "john smith"), 1.0 / 3.0);
    }

    #[test]
    fn score_is_symmetric() {
        let scorer = TokenSetJaccard;
        let pairs = [
            ("banco nacional de cuba", "Nacional Banco"),
            ("a b c", "c d"),
            ("x", "x y z"),
        ];
        for (left, right) in pairs {
            assert_eq!(scorer.score(left, right), scorer.score(right, left));
        }
    }
}
