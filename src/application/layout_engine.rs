// Layout engine - derives per-breakpoint grid layouts from a base layout
use crate::domain::layout::{Layout, LockedDimensions};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Lg,
    Md,
    Sm,
    Xs,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 4] = [Breakpoint::Lg, Breakpoint::Md, Breakpoint::Sm, Breakpoint::Xs];

    pub fn columns(&self) -> u32 {
        match self {
            Self::Lg | Self::Md => 12,
            Self::Sm => 6,
            Self::Xs => 2,
        }
    }

    /// Multi-column breakpoints keep the designed arrangement.
    pub fn preserves_design(&self) -> bool {
        matches!(self, Self::Lg | Self::Md)
    }
}

/// One item as handed to the grid renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    pub i: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
    #[serde(rename = "static")]
    pub is_static: bool,
}

pub type BreakpointLayouts = BTreeMap<Breakpoint, Vec<GridItem>>;

/// Build the `lg`/`md`/`sm`/`xs` layouts for `layout`. An empty layout
/// yields an empty map, which callers render as the empty state.
pub fn derive_breakpoints(layout: &Layout, locks: &LockedDimensions) -> BreakpointLayouts {
    let mut layouts = BTreeMap::new();
    if layout.is_empty() {
        return layouts;
    }

    for breakpoint in Breakpoint::ALL {
        let items = if breakpoint.preserves_design() {
            preserve_design(layout, locks)
        } else {
            single_column(layout, breakpoint.columns())
        };
        layouts.insert(breakpoint, items);
    }
    layouts
}

/// Locked axes are pinned to the current size; both locked makes the item static.
fn preserve_design(layout: &Layout, locks: &LockedDimensions) -> Vec<GridItem> {
    layout
        .widgets()
        .iter()
        .map(|w| {
            let locked = locks.get(&w.id);
            let (min_w, max_w) = if locked.width { (Some(w.w), Some(w.w)) } else { (w.min_w, None) };
            let (min_h, max_h) = if locked.height { (Some(w.h), Some(w.h)) } else { (w.min_h, None) };
            GridItem {
                i: w.id.clone(),
                x: w.x,
                y: w.y,
                w: w.w,
                h: w.h,
                min_w,
                min_h,
                max_w,
                max_h,
                is_static: locked.is_fully_locked(),
            }
        })
        .collect()
}

fn single_column(layout: &Layout, columns: u32) -> Vec<GridItem> {
    let mut y = 0;
    layout
        .widgets()
        .iter()
        .map(|w| {
            let item = GridItem {
                i: w.id.clone(),
                x: 0,
                y,
                w: columns,
                h: w.h,
                min_w: Some(columns),
                min_h: w.min_h,
                max_w: None,
                max_h: None,
                is_static: false,
            };
            y += w.h;
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::{ComponentType, Dimension, Widget};

    fn two_cards() -> Layout {
        Layout::new(vec![
            Widget::new("a", ComponentType::MetricCard, 0, 0, 4, 2),
            Widget::new("b", ComponentType::MetricCard, 4, 0, 4, 3),
        ])
    }

    fn mixed() -> Layout {
        let mut layout = Layout::new(vec![
            Widget::new("a", ComponentType::MetricCard, 0, 0, 3, 2),
            Widget::new("b", ComponentType::RevenueChart, 3, 0, 9, 5),
            Widget::new("c", ComponentType::FormsSummary, 0, 5, 6, 1),
            Widget::new("d", ComponentType::RecentActivity, 6, 5, 6, 4),
        ]);
        layout.0[1].min_h = Some(3);
        layout
    }

    #[test]
    fn test_xs_scenario() {
        let layouts = derive_breakpoints(&two_cards(), &LockedDimensions::new());
        let xs = &layouts[&Breakpoint::Xs];
        let geometry: Vec<(&str, u32, u32, u32, u32)> =
            xs.iter().map(|g| (g.i.as_str(), g.x, g.y, g.w, g.h)).collect();
        assert_eq!(geometry, vec![("a", 0, 0, 2, 2), ("b", 0, 2, 2, 3)]);
        assert!(xs.iter().all(|g| g.min_w == Some(2)));
    }

    #[test]
    fn test_small_breakpoints_stack_cumulatively() {
        let layout = mixed();
        let layouts = derive_breakpoints(&layout, &LockedDimensions::new());

        for bp in [Breakpoint::Sm, Breakpoint::Xs] {
            let items = &layouts[&bp];
            let mut expected_y = 0;
            for (item, widget) in items.iter().zip(layout.widgets()) {
                assert_eq!(item.x, 0);
                assert_eq!(item.w, bp.columns());
                assert_eq!(item.min_w, Some(bp.columns()));
                assert_eq!(item.y, expected_y);
                assert_eq!(item.h, widget.h);
                assert_eq!(item.min_h, widget.min_h);
                expected_y += widget.h;
            }
        }
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let layout = mixed();
        let locks = LockedDimensions::new();
        let first = derive_breakpoints(&layout, &locks);

        // Feeding the stacked result back in stacks to the same place.
        let restacked = Layout::new(
            first[&Breakpoint::Sm]
                .iter()
                .map(|g| Widget::new(g.i.clone(), ComponentType::MetricCard, g.x, g.y, g.w, g.h))
                .collect(),
        );
        let second = derive_breakpoints(&restacked, &locks);
        let ys = |items: &Vec<GridItem>| items.iter().map(|g| (g.x, g.y)).collect::<Vec<_>>();
        assert_eq!(ys(&first[&Breakpoint::Sm]), ys(&second[&Breakpoint::Sm]));
        assert_eq!(ys(&first[&Breakpoint::Xs]), ys(&second[&Breakpoint::Xs]));
        assert_eq!(first, derive_breakpoints(&layout, &locks));
    }

    #[test]
    fn test_large_breakpoints_preserve_geometry() {
        let layout = mixed();
        let layouts = derive_breakpoints(&layout, &LockedDimensions::new());
        for bp in [Breakpoint::Lg, Breakpoint::Md] {
            for (item, widget) in layouts[&bp].iter().zip(layout.widgets()) {
                assert_eq!((item.x, item.y, item.w, item.h), (widget.x, widget.y, widget.w, widget.h));
                assert!(!item.is_static);
            }
        }
    }

    #[test]
    fn test_static_only_when_both_locked() {
        let layout = two_cards();
        let mut locks = LockedDimensions::new();

        locks.toggle("a", Dimension::Width);
        let layouts = derive_breakpoints(&layout, &locks);
        assert!(!layouts[&Breakpoint::Lg][0].is_static);

        locks.toggle("a", Dimension::Height);
        let layouts = derive_breakpoints(&layout, &locks);
        assert!(layouts[&Breakpoint::Lg][0].is_static);
        assert!(layouts[&Breakpoint::Md][0].is_static);
        assert!(!layouts[&Breakpoint::Lg][1].is_static);
        assert!(!layouts[&Breakpoint::Xs][0].is_static);

        locks.toggle("a", Dimension::Height);
        let layouts = derive_breakpoints(&layout, &locks);
        assert!(!layouts[&Breakpoint::Lg][0].is_static);
    }

    #[test]
    fn test_single_axis_lock_pins_that_axis() {
        let layout = two_cards();
        let mut locks = LockedDimensions::new();

        locks.toggle("a", Dimension::Width);
        let lg = &derive_breakpoints(&layout, &locks)[&Breakpoint::Lg];
        assert_eq!((lg[0].min_w, lg[0].max_w), (Some(4), Some(4)));
        assert_eq!((lg[0].min_h, lg[0].max_h), (None, None));
        assert!(!lg[0].is_static);

        locks.toggle("a", Dimension::Width);
        locks.toggle("b", Dimension::Height);
        let layouts = derive_breakpoints(&layout, &locks);
        let md = &layouts[&Breakpoint::Md];
        assert_eq!((md[1].min_h, md[1].max_h), (Some(3), Some(3)));
        assert_eq!((md[1].min_w, md[1].max_w), (None, None));
        assert_eq!((md[0].min_w, md[0].max_w), (None, None));
        assert_eq!(layouts[&Breakpoint::Xs][1].max_h, None);
    }

    #[test]
    fn test_empty_layout_has_no_breakpoints() {
        assert!(derive_breakpoints(&Layout::default(), &LockedDimensions::new()).is_empty());
    }

    #[test]
    fn test_grid_item_wire_format() {
        let layouts = derive_breakpoints(&two_cards(), &LockedDimensions::new());
        let json = serde_json::to_value(&layouts).unwrap();
        assert_eq!(json["xs"][1]["y"], 2);
        assert_eq!(json["lg"][0]["static"], false);
        assert_eq!(json["sm"][0]["minW"], 6);
    }
}
