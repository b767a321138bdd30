//! Integration coverage for visibility classification driving stopwatches.

use std::time::Duration;
use vismetrics_domain::{
    Percentage, Stopwatch, VisibilityState, VisibilityStatus, VisibilityThresholds,
};

#[test]
fn classified_statuses_drive_three_watches_without_overlap() {
    let thresholds = VisibilityThresholds::default();
    let readings = [
        (0, 0.0),
        (400, 0.6),
        (700, 1.0),
        (1_000, 0.0),
        (1_200, 0.3),
    ];

    let mut visible = Stopwatch::new();
    let mut fully_visible = Stopwatch::new();
    let mut hidden = Stopwatch::new();
    let mut totals = [Duration::ZERO; 3];

    for (at, percentage) in readings {
        let now = Duration::from_millis(at);
        let status = VisibilityStatus::classify(Percentage::new(percentage), &thresholds);
        totals[0] += visible.stop_and_then_restart_if(now, status.is_visible());
        totals[1] += fully_visible.stop_and_then_restart_if(now, status.is_fully_visible());
        totals[2] += hidden.stop_and_then_restart_if(now, status.is_hidden());
    }

    // 400..1000 visible, 700..1000 fully visible, 0..400 + 1000..1200 hidden.
    assert_eq!(totals[0], Duration::from_millis(600));
    assert_eq!(totals[1], Duration::from_millis(300));
    assert_eq!(totals[2], Duration::from_millis(600));
    assert_eq!(totals[0] + totals[2], Duration::from_millis(1_200));
}

#[test]
fn state_codes_are_stable() {
    let codes: Vec<u8> = [
        VisibilityState::Hidden,
        VisibilityState::Visible,
        VisibilityState::FullyVisible,
    ]
    .into_iter()
    .map(VisibilityState::code)
    .collect();

    assert_eq!(codes, vec![0, 1, 2]);
}
