//! Integration tests: zonal statistics over synthetic rasters, both
//! polygon-filtered and rasterized-ID paths.

use aggregation_engine::{
    AggregationEngine, AggregationStrategy, Envelope, GeoTransform, MemoryRasterDataset,
    PixelPolyMode,
};
use test_utils::{assert_approx_eq, create_constant_grid, create_id_stripe_grid, rect_polygon};
use zonal_stats::{
    zonal_statistics, zonal_statistics_rasterized, BandStatsStrategy, PixelCountStrategy,
    SumStrategy, ZonalFeature,
};

fn unit_dataset(data: Vec<f32>, width: usize, height: usize) -> MemoryRasterDataset {
    MemoryRasterDataset::single_band(
        data,
        width,
        height,
        GeoTransform::new(0.0, height as f64, 1.0, -1.0),
    )
    .unwrap()
}

#[test]
fn sum_over_unit_square_feature() {
    // The end-to-end scenario: 4x4 raster of ones, unit-square polygon
    // covering pixel (1, 1) exactly. Sum must be 1.0 under both policies.
    let ds = unit_dataset(create_constant_grid(4, 4, 1.0), 4, 4);
    let engine = AggregationEngine::with_defaults();
    let feature = ZonalFeature::new(1, rect_polygon(1.0, 2.0, 2.0, 3.0)).unwrap();

    for mode in [PixelPolyMode::AreaWeighted, PixelPolyMode::CenterContainment] {
        let mut strategy = SumStrategy::new(1);
        let report = zonal_statistics(&engine, &[&ds], &[feature.clone()], mode, &mut strategy);

        assert!(report.failures.is_empty());
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].feature_id, 1);
        assert_approx_eq!(report.results[0].values[0], 1.0, 1e-9);
    }
}

#[test]
fn weighted_pixel_count_recovers_feature_area() {
    let ds = unit_dataset(create_constant_grid(10, 10, 0.0), 10, 10);
    let engine = AggregationEngine::with_defaults();
    // A 2.5 x 2 rectangle not aligned to the pixel lattice in X.
    let feature = ZonalFeature::new(4, rect_polygon(1.25, 3.0, 3.75, 5.0)).unwrap();

    let mut strategy = PixelCountStrategy::new();
    let report = zonal_statistics(
        &engine,
        &[&ds],
        &[feature],
        PixelPolyMode::AreaWeighted,
        &mut strategy,
    );

    assert_eq!(report.results.len(), 1);
    let values = &report.results[0].values;
    // Weighted count times pixel area (1.0) is the polygon area.
    assert_approx_eq!(values[1], 5.0, 1e-6);
    // Whole-pixel count is at least the weighted count.
    assert!(values[0] >= values[1]);
}

#[test]
fn multiple_features_reuse_one_strategy() {
    let ds = unit_dataset(create_constant_grid(8, 8, 2.0), 8, 8);
    let engine = AggregationEngine::with_defaults();
    let features = vec![
        ZonalFeature::new(1, rect_polygon(0.0, 0.0, 2.0, 2.0)).unwrap(),
        ZonalFeature::new(2, rect_polygon(4.0, 4.0, 8.0, 8.0)).unwrap(),
    ];

    let mut strategy = SumStrategy::new(1);
    let report = zonal_statistics(
        &engine,
        &[&ds],
        &features,
        PixelPolyMode::AreaWeighted,
        &mut strategy,
    );

    assert!(report.failures.is_empty());
    assert_eq!(report.results.len(), 2);
    // 4 pixels * 2.0 and 16 pixels * 2.0; the reset between features
    // prevents leakage from the first zone into the second.
    assert_approx_eq!(report.results[0].values[0], 8.0, 1e-9);
    assert_approx_eq!(report.results[1].values[0], 32.0, 1e-9);
}

#[test]
fn failing_feature_is_skipped_and_reported() {
    let ds = unit_dataset(create_constant_grid(4, 4, 1.0), 4, 4);
    let engine = AggregationEngine::with_defaults();
    let features = vec![
        // Entirely outside the raster: alignment fails with no overlap.
        ZonalFeature::new(10, rect_polygon(100.0, 100.0, 101.0, 101.0)).unwrap(),
        ZonalFeature::new(11, rect_polygon(0.0, 0.0, 2.0, 2.0)).unwrap(),
    ];

    let mut strategy = SumStrategy::new(1);
    let report = zonal_statistics(
        &engine,
        &[&ds],
        &features,
        PixelPolyMode::AreaWeighted,
        &mut strategy,
    );

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].feature_id, 10);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].feature_id, 11);
    assert_approx_eq!(report.results[0].values[0], 4.0, 1e-9);
}

#[test]
fn rasterized_zonal_stats_per_stripe() -> anyhow::Result<()> {
    let width = 6;
    let height = 4;
    let gt = GeoTransform::new(0.0, height as f64, 1.0, -1.0);
    let ids = MemoryRasterDataset::single_band(
        create_id_stripe_grid(width, height, &[7, 9]),
        width,
        height,
        gt,
    )?;
    // Values 3.0 everywhere.
    let values = MemoryRasterDataset::single_band(
        create_constant_grid(width, height, 3.0),
        width,
        height,
        gt,
    )?;

    let engine = AggregationEngine::with_defaults();
    let mut strategy = BandStatsStrategy::new(1);
    let report = zonal_statistics_rasterized(
        &engine,
        &[&ids, &values],
        &[7, 9, 42],
        None,
        &mut strategy,
    );

    assert!(report.failures.is_empty());
    assert_eq!(report.results.len(), 3);

    // Each stripe has 12 pixels of value 3.0.
    for result in &report.results[..2] {
        assert_eq!(result.values[0], 12.0); // count
        assert_approx_eq!(result.values[1], 3.0, 1e-12); // mean
        assert_approx_eq!(result.values[2], 0.0, 1e-12); // stddev
    }

    // Absent ID: an empty zone, not a failure.
    let absent = &report.results[2];
    assert_eq!(absent.feature_id, 42);
    assert_eq!(absent.values[0], 0.0);
    assert!(absent.values[1].is_nan());
    Ok(())
}

#[test]
fn envelope_restricts_rasterized_run() {
    let width = 6;
    let height = 4;
    let gt = GeoTransform::new(0.0, height as f64, 1.0, -1.0);
    let ids = MemoryRasterDataset::single_band(
        create_id_stripe_grid(width, height, &[7, 9]),
        width,
        height,
        gt,
    )
    .unwrap();
    let values = MemoryRasterDataset::single_band(
        create_constant_grid(width, height, 1.0),
        width,
        height,
        gt,
    )
    .unwrap();

    let engine = AggregationEngine::with_defaults();
    let mut strategy = PixelCountStrategy::new();
    // Only the top two rows.
    let envelope = Envelope::new(0.0, 2.0, 6.0, 4.0);
    let report = zonal_statistics_rasterized(
        &engine,
        &[&ids, &values],
        &[7],
        Some(&envelope),
        &mut strategy,
    );

    assert_eq!(report.results[0].values[0], 6.0);
}
