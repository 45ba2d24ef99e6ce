//! Width and height invariants under random interaction streams.

use livepen_core::{LayoutConfig, PaneKind, PreviewHeightConfig};
use livepen_layout::{
    DividerId, EditorMetrics, PreviewHeightController, ResizeKey, SplitLayout, Unmeasured,
};
use proptest::prelude::*;

const MIN_WIDTH: f64 = 120.0;

#[derive(Debug, Clone)]
enum Op {
    Drag { divider: usize, from: f64, to: f64 },
    Key { divider: usize, right: bool },
    Fit { widths: [f64; 3] },
    Refit { widths: [f64; 3] },
}

struct Measured([f64; 3]);

impl EditorMetrics for Measured {
    fn content_width(&self, pane: PaneKind) -> Option<f64> {
        PaneKind::ALL
            .iter()
            .position(|candidate| *candidate == pane)
            .map(|index| self.0[index])
    }

    fn content_height(&self, _pane: PaneKind) -> Option<f64> {
        None
    }
}

fn op() -> impl Strategy<Value = Op> {
    let widths = prop::array::uniform3(0.0f64..2000.0);
    prop_oneof![
        (0usize..2, 0.0f64..2000.0, -500.0f64..2500.0)
            .prop_map(|(divider, from, to)| Op::Drag { divider, from, to }),
        (0usize..2, any::<bool>()).prop_map(|(divider, right)| Op::Key { divider, right }),
        widths.clone().prop_map(|widths| Op::Fit { widths }),
        widths.prop_map(|widths| Op::Refit { widths }),
    ]
}

fn apply(layout: &mut SplitLayout, op: &Op) {
    let dividers = layout.dividers();
    match op {
        Op::Drag { divider, from, to } => {
            let divider: DividerId = dividers[*divider % dividers.len()];
            layout.pointer_down(divider, 1, *from);
            layout.pointer_move(1, *to);
            layout.pointer_up(1);
        }
        Op::Key { divider, right } => {
            let key = if *right {
                ResizeKey::ArrowRight
            } else {
                ResizeKey::ArrowLeft
            };
            layout.key(dividers[*divider % dividers.len()], key, &Unmeasured);
        }
        Op::Fit { widths } => {
            layout.auto_fit_all(&Measured(*widths));
        }
        Op::Refit { widths } => {
            layout.refit(&Measured(*widths));
        }
    }
}

proptest! {
    #[test]
    fn widths_sum_to_100_and_respect_minimum(
        container in 360.0f64..3000.0,
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let config = LayoutConfig { min_panel_width: MIN_WIDTH, ..LayoutConfig::default() };
        let mut layout = SplitLayout::new(config);
        layout.set_container_width(Some(container));
        layout.sync_panels(&PaneKind::ALL, &Unmeasured);

        for op in &ops {
            apply(&mut layout, op);
            let widths = layout.widths();
            prop_assert!((widths.total() - 100.0).abs() < 1e-6, "total {}", widths.total());
            for (panel, _) in widths.iter() {
                let px = widths.pixels(panel, container).unwrap_or_default();
                prop_assert!(px >= MIN_WIDTH - 1e-6, "{panel:?} at {px}px after {op:?}");
            }
        }
    }

    #[test]
    fn preview_height_is_running_maximum(
        min in 0.0f64..400.0,
        reports in prop::collection::vec(0.0f64..5000.0, 0..30),
    ) {
        let config = PreviewHeightConfig { min_height: min, ..PreviewHeightConfig::default() };
        let mut controller = PreviewHeightController::new(config);
        let mut expected = min;
        let mut previous = controller.observed();
        for report in reports {
            controller.observe(report);
            expected = expected.max(report);
            prop_assert!(controller.observed() >= previous);
            prop_assert_eq!(controller.observed(), expected);
            previous = controller.observed();
        }
        prop_assert_eq!(controller.displayed(), expected.min(2000.0));
    }
}
