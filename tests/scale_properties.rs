use meteo_rs::scale::{DEFAULT_TICKS, linear_map, min_max, peak, tick_values};

#[test]
fn linear_map_hits_range_endpoints() {
    for (lo, hi) in [(0.0, 10.0), (-5.0, 5.0), (100.0, 0.0), (-1e6, 1e6)] {
        assert!((linear_map(lo, lo, hi, 170.0, 8.0) - 170.0).abs() < 1e-9);
        assert!((linear_map(hi, lo, hi, 170.0, 8.0) - 8.0).abs() < 1e-9);
    }
}

#[test]
fn linear_map_degenerate_domain_returns_range_lo() {
    assert_eq!(linear_map(3.0, 2.0, 2.0, 10.0, 20.0), 10.0);
    assert_eq!(linear_map(f64::MAX, 0.0, 0.0, -4.0, 4.0), -4.0);
}

#[test]
fn min_max_is_ordered_and_ignores_non_finite() {
    let series = [3.0, f64::NAN, -2.0, f64::INFINITY, 7.5];
    let (lo, hi) = min_max(&series);
    assert_eq!((lo, hi), (-2.0, 7.5));
    assert!(lo < hi);
}

#[test]
fn min_max_defaults() {
    assert_eq!(min_max(&[]), (0.0, 1.0));
    assert_eq!(min_max(&[f64::NAN, f64::NEG_INFINITY]), (0.0, 1.0));
    assert_eq!(min_max(&[4.0, 4.0, 4.0]), (3.0, 5.0));
}

#[test]
fn ticks_are_evenly_spaced_and_inclusive() {
    let ticks = tick_values(0.0, 100.0, DEFAULT_TICKS);
    assert_eq!(ticks, vec![0.0, 25.0, 50.0, 75.0, 100.0]);

    let ticks = tick_values(-3.3, 17.9, 7);
    assert_eq!(ticks.len(), 8);
    assert_eq!(ticks[0], -3.3);
    assert_eq!(*ticks.last().unwrap(), 17.9);
    assert!(ticks.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn peak_of_empty_is_zero() {
    assert_eq!(peak(&[]), 0.0);
    assert_eq!(peak(&[f64::NAN]), 0.0);
    assert_eq!(peak(&[-3.0, -1.0]), -1.0);
}
