//! Properties of the indented-text parser

use popmenu::tree::ItemId;
use popmenu::{parse_str, ItemTree};
use proptest::prelude::*;

/// One generated input line: indentation and either a label with an
/// optional output, or a separator (`None`)
type RawLine = (usize, Option<(String, Option<String>)>);

fn line_strategy() -> impl Strategy<Value = RawLine> {
    (
        0usize..4,
        prop::option::weighted(
            0.85,
            ("[a-z]{1,8}", prop::option::of("[a-z][a-z ]{0,10}")),
        ),
    )
}

/// Clamp generated depths so every line is a valid continuation: the first
/// line is at depth 0, nothing jumps more than one level, and separators
/// never get children.
fn normalize(raw: Vec<RawLine>) -> Vec<RawLine> {
    let mut lines: Vec<RawLine> = Vec::with_capacity(raw.len());
    for (depth, body) in raw {
        let depth = match lines.last() {
            None => 0,
            Some((prev, None)) => depth.min(*prev),
            Some((prev, Some(_))) => depth.min(prev + 1),
        };
        lines.push((depth, body));
    }
    lines
}

fn render(lines: &[RawLine]) -> String {
    let mut text = String::new();
    for (depth, body) in lines {
        text.push_str(&"\t".repeat(*depth));
        if let Some((label, output)) = body {
            text.push_str(label);
            if let Some(output) = output {
                text.push('\t');
                text.push_str(output);
            }
        }
        text.push('\n');
    }
    text
}

fn menu_input() -> impl Strategy<Value = Vec<RawLine>> {
    prop::collection::vec(line_strategy(), 1..40).prop_map(normalize)
}

fn depth_first(tree: &ItemTree) -> Vec<(usize, Option<String>)> {
    fn walk(tree: &ItemTree, id: ItemId, out: &mut Vec<(usize, Option<String>)>) {
        for child in tree.children(id) {
            out.push((tree.depth(child) - 1, tree.get(child).label.clone()));
            walk(tree, child, out);
        }
    }
    let mut out = Vec::new();
    walk(tree, ItemId::ROOT, &mut out);
    out
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    /// PROPERTY: Parsing arbitrary text never panics
    #[test]
    fn property_parse_never_panics(input in ".{0,400}") {
        let _ = parse_str(&input);
    }

    /// PROPERTY: Every line becomes one item; depth-first order is input order
    #[test]
    fn property_items_follow_input_order(lines in menu_input()) {
        let tree = parse_str(&render(&lines)).unwrap();
        prop_assert_eq!(tree.item_count(), lines.len());

        let expected: Vec<_> = lines
            .iter()
            .map(|(depth, body)| (*depth, body.as_ref().map(|(label, _)| label.clone())))
            .collect();
        prop_assert_eq!(depth_first(&tree), expected);
    }

    /// PROPERTY: The deepest item sits at the largest indentation
    #[test]
    fn property_max_indent_matches_input(lines in menu_input()) {
        let tree = parse_str(&render(&lines)).unwrap();
        let deepest = lines.iter().map(|(depth, _)| *depth).max();
        prop_assert_eq!(tree.max_indent(), deepest);
    }

    /// PROPERTY: Writing a tree back out and parsing it gives the same tree
    #[test]
    fn property_text_round_trip_is_isomorphic(lines in menu_input()) {
        let tree = parse_str(&render(&lines)).unwrap();
        let text = tree.to_text();
        let again = parse_str(&text).unwrap();
        prop_assert_eq!(again.dump(), tree.dump());
        prop_assert_eq!(again.to_text(), text);
    }

    /// PROPERTY: Any line indented below the first line's depth is rejected
    #[test]
    fn property_dedent_below_base_is_rejected(base in 1usize..4, label in "[a-z]{1,8}") {
        let input = format!("{}{label}\n{label}\n", "\t".repeat(base));
        prop_assert!(parse_str(&input).is_err());
    }
}
