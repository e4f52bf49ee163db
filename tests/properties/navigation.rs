//! Properties of keyboard selection

use popmenu::backend::TextMeasure;
use popmenu::engine::{cycle, nth, Cycle};
use popmenu::menu::Menu;
use popmenu::tree::ItemId;
use popmenu::{parse_str, Config, ItemTree, Metrics};
use proptest::prelude::*;

struct Fixed;

impl TextMeasure for Fixed {
    fn text_width(&self, text: &str) -> u32 {
        text.len() as u32 * 8
    }
}

/// `true` marks a separator row; at least one row is selectable
fn rows_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(prop::bool::weighted(0.3), 1..25)
        .prop_filter("needs a selectable row", |rows| rows.iter().any(|sep| !sep))
}

fn root_menu(rows: &[bool]) -> (ItemTree, Menu) {
    let input: String = rows
        .iter()
        .enumerate()
        .map(|(i, sep)| if *sep { "\n".to_string() } else { format!("item{i}\n") })
        .collect();
    let tree = parse_str(&input).unwrap();
    let items: Vec<_> = tree.root_items().collect();
    let metrics = Metrics::from_config(&Config::default());
    let menu = Menu::layout(&tree, ItemId::ROOT, &items, 0, &metrics, &Fixed, 100_000);
    (tree, menu)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    /// PROPERTY: Cycling forward never selects a separator and visits every
    /// selectable row exactly once per lap, in order
    #[test]
    fn property_cycle_next_visits_selectable_rows_in_order(rows in rows_strategy()) {
        let (_tree, mut menu) = root_menu(&rows);
        let selectable: Vec<usize> = (0..rows.len()).filter(|i| !rows[*i]).collect();

        let mut visited = Vec::new();
        for _ in 0..selectable.len() * 2 {
            let next = cycle(&menu, Cycle::Next).unwrap();
            prop_assert!(!menu.rows[next].separator);
            visited.push(next);
            menu.selected = Some(next);
        }
        let lap: Vec<usize> = selectable.iter().chain(selectable.iter()).copied().collect();
        prop_assert_eq!(visited, lap);
    }

    /// PROPERTY: Prev undoes Next from any selectable row
    #[test]
    fn property_cycle_prev_inverts_next(rows in rows_strategy(), pick in any::<prop::sample::Index>()) {
        let (_tree, mut menu) = root_menu(&rows);
        let selectable: Vec<usize> = (0..rows.len()).filter(|i| !rows[*i]).collect();
        let start = *pick.get(&selectable);

        menu.selected = Some(start);
        let next = cycle(&menu, Cycle::Next).unwrap();
        menu.selected = Some(next);
        prop_assert_eq!(cycle(&menu, Cycle::Prev), Some(start));
    }

    /// PROPERTY: Digit selection always lands on a selectable row, counting
    /// selectable rows only
    #[test]
    fn property_nth_counts_selectable_rows(rows in rows_strategy(), n in 1usize..10) {
        let (_tree, menu) = root_menu(&rows);
        let selectable: Vec<usize> = (0..rows.len()).filter(|i| !rows[*i]).collect();

        let row = nth(&menu, n).unwrap();
        prop_assert!(!menu.rows[row].separator);
        let expected = selectable[(n - 1).min(selectable.len() - 1)];
        prop_assert_eq!(row, expected);
    }
}
