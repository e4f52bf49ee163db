//! Properties of menu sizing, scrolling and placement

use popmenu::backend::TextMeasure;
use popmenu::menu::{Hit, Menu};
use popmenu::tree::ItemId;
use popmenu::{parse_str, Config, ItemTree, Metrics, Point, Rect};
use proptest::prelude::*;

struct Fixed;

impl TextMeasure for Fixed {
    fn text_width(&self, text: &str) -> u32 {
        text.len() as u32 * 8
    }
}

fn metrics(max_items: usize) -> Metrics {
    let mut metrics = Metrics::from_config(&Config::default());
    metrics.max_items = max_items;
    metrics
}

fn root_menu(count: usize, metrics: &Metrics, cap: u32) -> (ItemTree, Menu) {
    let input: String = (0..count).map(|i| format!("entry {i}\n")).collect();
    let tree = parse_str(&input).unwrap();
    let items: Vec<_> = tree.root_items().collect();
    let menu = Menu::layout(&tree, ItemId::ROOT, &items, 0, metrics, &Fixed, cap);
    (tree, menu)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    /// PROPERTY: A menu overflows exactly when its rows exceed the height
    /// cap or the configured item limit
    #[test]
    fn property_overflow_iff_content_exceeds_cap(
        count in 1usize..60,
        max_items in 0usize..12,
        cap in 105u32..2000,
    ) {
        let m = metrics(max_items);
        let (_tree, menu) = root_menu(count, &m, cap);
        let content = count as u32 * m.item_height;
        let expected = content > cap || (max_items > 0 && count > max_items);
        prop_assert_eq!(menu.overflow, expected);

        if menu.overflow {
            prop_assert!(menu.geometry.height <= cap);
            prop_assert!(menu.last >= menu.first);
            if max_items > 0 {
                prop_assert!(menu.last - menu.first < max_items);
            }
        } else {
            prop_assert_eq!(menu.first, 0);
            prop_assert_eq!(menu.last, count - 1);
            prop_assert_eq!(menu.geometry.height, content);
        }
    }

    /// PROPERTY: Scrolling keeps a contiguous window inside the list and
    /// stops at both ends
    #[test]
    fn property_scrolling_stays_in_bounds(
        count in 5usize..60,
        max_items in 1usize..5,
        steps in prop::collection::vec(any::<bool>(), 0..80),
    ) {
        let m = metrics(max_items);
        let (_tree, mut menu) = root_menu(count, &m, 2000);
        prop_assume!(menu.overflow);
        let span = menu.last - menu.first;

        for down in steps {
            let before = menu.first;
            let moved = menu.scroll_by(down, &m);
            if !moved {
                prop_assert_eq!(menu.first, before);
                let at_edge = if down { menu.last == count - 1 } else { menu.first == 0 };
                prop_assert!(at_edge);
            }
            prop_assert!(menu.last < count);
            prop_assert_eq!(menu.last - menu.first, span);
        }
    }

    /// PROPERTY: Every visible row hit-tests back to itself
    #[test]
    fn property_visible_rows_hit_themselves(
        count in 1usize..40,
        max_items in 0usize..8,
        scrolls in 0usize..10,
    ) {
        let m = metrics(max_items);
        let (_tree, mut menu) = root_menu(count, &m, 2000);
        for _ in 0..scrolls {
            menu.scroll_by(true, &m);
        }
        for row in menu.first..=menu.last {
            let top = menu.row_top(row, &m).unwrap() as i32;
            prop_assert_eq!(menu.hit(top, &m), Hit::Row(row));
            prop_assert_eq!(menu.hit(top + m.item_height as i32 - 1, &m), Hit::Row(row));
        }
    }

    /// PROPERTY: A root menu that fits on the monitor is placed entirely on it
    #[test]
    fn property_root_menu_stays_on_monitor(
        count in 1usize..15,
        x in 0i32..1920,
        y in 0i32..1080,
    ) {
        let m = metrics(0);
        let monitor = Rect::new(0, 0, 1920, 1080);
        let (_tree, mut menu) = root_menu(count, &m, monitor.height - 2 * m.border);
        menu.place_root(Point::new(x, y), false, monitor, &m);

        let g = menu.geometry;
        prop_assert!(g.x >= monitor.x && g.y >= monitor.y);
        prop_assert!(g.x + (g.width + 2 * m.border) as i32 <= monitor.right());
        prop_assert!(g.y + (g.height + 2 * m.border) as i32 <= monitor.bottom());
    }
}
