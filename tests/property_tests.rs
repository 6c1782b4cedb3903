//! Property-based tests for fragment composition and decode results

use proptest::prelude::*;
use sqlweave::core::result::DecodeResult;
use sqlweave::core::{SqlFragment, SqlValue};

#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Bind(i64),
    Raw(String),
}

fn piece_strategy() -> impl Strategy<Value = Piece> {
    prop_oneof![
        "[a-z ]{0,8}".prop_map(Piece::Text),
        any::<i64>().prop_map(Piece::Bind),
        "[A-Z_]{1,6}".prop_map(Piece::Raw),
    ]
}

fn build(pieces: &[Piece]) -> SqlFragment {
    pieces
        .iter()
        .fold(SqlFragment::new(), |fragment, piece| match piece {
            Piece::Text(t) => fragment.push_text(t),
            Piece::Bind(v) => fragment.bind(*v),
            Piece::Raw(r) => fragment.raw(r),
        })
}

proptest! {
    /// Splitting a build sequence anywhere and appending the halves gives
    /// the same query as building it in one go
    #[test]
    fn test_append_is_associative_with_building(
        pieces in prop::collection::vec(piece_strategy(), 0..12),
        split in 0usize..13,
    ) {
        let split = split.min(pieces.len());
        let whole = build(&pieces).into_query();
        let halves = build(&pieces[..split])
            .append(build(&pieces[split..]))
            .into_query();
        prop_assert_eq!(whole, halves);
    }

    /// Appending a fragment onto an empty one changes nothing
    #[test]
    fn test_wrapping_in_an_empty_fragment_is_identity(
        pieces in prop::collection::vec(piece_strategy(), 0..12),
    ) {
        let plain = build(&pieces).into_query();
        let wrapped = SqlFragment::new().append(build(&pieces)).into_query();
        let trailed = build(&pieces).append(SqlFragment::new()).into_query();
        prop_assert_eq!(&plain, &wrapped);
        prop_assert_eq!(&plain, &trailed);
    }

    /// Placeholders are numbered 1..=n and values line up with them
    #[test]
    fn test_placeholder_numbering_matches_value_order(
        pieces in prop::collection::vec(piece_strategy(), 0..12),
    ) {
        let binds: Vec<i64> = pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Bind(v) => Some(*v),
                _ => None,
            })
            .collect();
        let query = build(&pieces).into_query();

        prop_assert_eq!(query.values().len(), binds.len());
        for (i, value) in query.values().iter().enumerate() {
            prop_assert_eq!(value, &SqlValue::Long(binds[i]));
            let placeholder = format!("${}", i + 1);
            prop_assert!(query.text().contains(&placeholder));
        }
        let one_past_last = format!("${}", binds.len() + 1);
        prop_assert!(!query.text().contains(&one_past_last));
    }

    /// Raw pieces and text pieces never contribute placeholders
    #[test]
    fn test_text_without_binds_has_no_placeholders(
        texts in prop::collection::vec("[a-z ]{0,8}", 0..8),
    ) {
        let fragment = texts
            .iter()
            .fold(SqlFragment::new(), |f, t| f.push_text(t).raw("X"));
        let query = fragment.into_query();
        prop_assert!(query.values().is_empty());
        prop_assert!(!query.text().contains('$'));
    }

    /// Functor identity: mapping the identity function changes nothing
    #[test]
    fn test_map_identity(value in any::<i64>()) {
        let mapped = DecodeResult::Success(value).map(|v| v);
        prop_assert_eq!(mapped, DecodeResult::Success(value));
    }

    /// Functor composition: map(f).map(g) == map(g ∘ f)
    #[test]
    fn test_map_composition(value in any::<i64>()) {
        let chained = DecodeResult::Success(value).map(|v| v.wrapping_mul(3)).map(|v| v ^ 1);
        let composed = DecodeResult::Success(value).map(|v| v.wrapping_mul(3) ^ 1);
        prop_assert_eq!(chained, composed);
    }

    /// and_then on a failure short-circuits and keeps the messages
    #[test]
    fn test_and_then_preserves_failure(message in "[a-z]{1,12}") {
        let failed: DecodeResult<i64> = DecodeResult::failure(message.clone());
        let chained = failed.and_then(|v| DecodeResult::Success(v + 1));
        prop_assert_eq!(chained, DecodeResult::failure(message));
    }

    /// zip concatenates failure messages left to right
    #[test]
    fn test_zip_accumulates_failures_in_order(
        left in prop::collection::vec("[a-z]{1,8}", 1..4),
        right in prop::collection::vec("[a-z]{1,8}", 1..4),
    ) {
        let a: DecodeResult<i64> = DecodeResult::Failure(left.clone());
        let b: DecodeResult<i64> = DecodeResult::Failure(right.clone());
        let mut expected = left;
        expected.extend(right);
        prop_assert_eq!(a.zip(b), DecodeResult::Failure(expected));
    }

    /// sequence succeeds only when every element succeeds, keeping order
    #[test]
    fn test_sequence_keeps_order(values in prop::collection::vec(any::<i64>(), 0..8)) {
        let sequenced =
            DecodeResult::sequence(values.iter().map(|v| DecodeResult::Success(*v)));
        prop_assert_eq!(sequenced, DecodeResult::Success(values));
    }
}
