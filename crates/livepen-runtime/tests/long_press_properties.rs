use std::time::Duration;

use livepen_core::{InProcessChannel, WidgetConfig};
use livepen_layout::Unmeasured;
use livepen_runtime::{LongPressController, LongPressEvent, PreviewWidget, WidgetProps};
use proptest::prelude::*;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

proptest! {
    #[test]
    fn early_release_never_triggers(release in 0u64..1000, step in 1u64..120) {
        let mut press = LongPressController::default();
        press.press(ms(0));
        let mut events = Vec::new();
        let mut now = step;
        while now < release {
            events.extend(press.tick(ms(now)));
            now += step;
        }
        prop_assert_eq!(press.release(ms(release)), Some(LongPressEvent::Cancelled));
        prop_assert!(!events.contains(&LongPressEvent::Triggered));
        prop_assert_eq!(press.progress(), 0.0);
    }

    #[test]
    fn full_hold_resets_exactly_once(hold in 1000u64..3000, step in 1u64..120) {
        let (channel, _port) = InProcessChannel::pair();
        let mut widget = PreviewWidget::new(
            ms(0),
            WidgetProps {
                html: Some("<p>a</p>".to_string()),
                ..WidgetProps::default()
            },
            WidgetConfig::default(),
            channel,
            "frame",
            &Unmeasured,
        );
        widget.press_reset(ms(0));

        let mut resets = 0;
        let mut now = step;
        while now <= hold {
            resets += usize::from(widget.tick(ms(now), &Unmeasured, || None).reset);
            now += step;
        }
        resets += usize::from(widget.release_reset(ms(hold), &Unmeasured).reset);
        prop_assert_eq!(resets, 1);
    }
}
