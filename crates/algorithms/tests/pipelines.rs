//! End-to-end runs of the elevation and imagery pipelines over GeoTIFF
//! fixtures written to a temporary directory.

use approx::assert_relative_eq;
use geolab_algorithms::classification::{apply_mask, class_mask, reclassify};
use geolab_algorithms::elevation::{convert_units, METERS_TO_FEET};
use geolab_algorithms::imagery::{
    classify_change, index_difference, ndvi_from_image, BandLayout, ChangeThresholds, IndexParams,
    CHANGE_DECREASE, CHANGE_INCREASE,
};
use geolab_core::io::{read_geotiff_bands, read_geotiff_masked, write_geotiff};
use geolab_core::{Error, GeoTransform, MaskedRaster, Raster, CRS};
use std::io::Cursor;
use std::path::Path;
use tiff::encoder::{colortype, TiffEncoder};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 3x3 DTM in meters, sentinel at (0, 0), two cells at or above 1005
fn write_dtm(path: &Path) {
    let values = vec![
        -9999.0, 1000.0, 1001.0,
        1002.0, 1003.0, 1004.0,
        1004.0, 1006.0, 1008.0,
    ];
    let mut dtm = Raster::from_vec(values, 3, 3).unwrap();
    dtm.set_transform(GeoTransform::new(472000.0, 4436000.0, 1.0, -1.0));
    dtm.set_crs(Some(CRS::from_epsg(32613)));
    dtm.set_nodata(Some(-9999.0));
    write_geotiff(&dtm, path).unwrap();
}

/// 2x2 four-band 8-bit image from (red, nir) pairs, row-major.
/// Green and blue are filled with a constant.
fn write_image(path: &Path, red_nir: [(u8, u8); 4]) {
    let pixels: Vec<u8> = red_nir
        .iter()
        .flat_map(|&(red, nir)| [red, 50, 50, nir])
        .collect();

    let mut buf = Vec::new();
    {
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
        encoder
            .write_image::<colortype::RGBA8>(2, 2, &pixels)
            .unwrap();
    }
    std::fs::write(path, buf).unwrap();
}

// ---------------------------------------------------------------------------
// Elevation pipeline
// ---------------------------------------------------------------------------

#[test]
fn elevation_pipeline_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pre_DTM.tif");
    write_dtm(&path);

    let (dtm, meta) = read_geotiff_masked(&path, None).unwrap();
    assert_eq!(meta.nodata, Some(-9999.0));
    assert_eq!(dtm.statistics().min, Some(1000.0));

    let feet = convert_units(&dtm, METERS_TO_FEET).unwrap();
    assert_relative_eq!(
        feet.statistics().max.unwrap(),
        1008.0 * METERS_TO_FEET,
        epsilon = 1e-9
    );
    assert!(feet.is_excluded(0, 0));

    let classes = reclassify(&dtm, &[1000.0, 1005.0, f64::INFINITY]).unwrap();
    assert_eq!(classes.label(0, 0).unwrap(), None);
    assert!(!classes.has_data(0, 0));
    assert_eq!(classes.label(2, 1).unwrap(), Some(2));
    assert_eq!(classes.label(2, 2).unwrap(), Some(2));
    assert_eq!(classes.class_counts()[&1], 6);
    assert_eq!(classes.unique_labels(), vec![1, 2]);
    assert_eq!(classes.boundary_count(), 3);

    let land = class_mask(&classes, 2).unwrap();
    assert_eq!(land.kept_count(), 2);
    assert!(land.is_kept(2, 1));
    assert!(!land.is_kept(0, 0));
    let land_dtm = apply_mask(&dtm, &land).unwrap();
    assert_eq!(land_dtm.valid_values().collect::<Vec<_>>(), vec![1006.0, 1008.0]);
    assert!(land_dtm.is_excluded(0, 0));
    assert_eq!(land_dtm.raster().transform(), dtm.raster().transform());
}

#[test]
fn elevation_bins_in_feet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pre_DTM.tif");
    write_dtm(&path);

    let (dtm, _) = read_geotiff_masked(&path, None).unwrap();
    let feet = convert_units(&dtm, METERS_TO_FEET).unwrap();
    let threshold = 1005.0 * METERS_TO_FEET;
    let classes = reclassify(&feet, &[feet.statistics().min.unwrap(), threshold, f64::INFINITY])
        .unwrap();

    assert_eq!(classes.class_counts()[&2], 2);
    assert!((0..3).all(|col| classes.in_range(0, col) == (col != 0)));
}

// ---------------------------------------------------------------------------
// Imagery pipeline
// ---------------------------------------------------------------------------

#[test]
fn ndvi_change_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pre_path = dir.path().join("pre_NAIP.tif");
    let post_path = dir.path().join("post_NAIP.tif");
    // pixel 0 loses vegetation, pixel 1 gains, pixel 2 unchanged, pixel 3 all zero
    write_image(&pre_path, [(40, 120), (100, 100), (60, 180), (0, 0)]);
    write_image(&post_path, [(100, 100), (40, 120), (60, 180), (0, 0)]);

    let params = IndexParams::default();
    let (pre, pre_meta) = read_geotiff_bands(&pre_path).unwrap();
    let (post, _) = read_geotiff_bands(&post_path).unwrap();
    assert_eq!(pre_meta.band_count, 4);

    let ndvi_pre = ndvi_from_image(&pre, BandLayout::default(), &params).unwrap();
    let ndvi_post = ndvi_from_image(&post, BandLayout::default(), &params).unwrap();
    assert_relative_eq!(ndvi_pre.get(0, 0).unwrap().unwrap(), 0.5);
    assert_relative_eq!(ndvi_pre.get(1, 0).unwrap().unwrap(), 0.5);
    // zero denominator
    assert!(ndvi_pre.is_excluded(1, 1));

    let diff = index_difference(&ndvi_pre, &ndvi_post).unwrap();
    assert_relative_eq!(diff.get(0, 0).unwrap().unwrap(), -0.5);
    assert_relative_eq!(diff.get(0, 1).unwrap().unwrap(), 0.5);
    assert_eq!(diff.get(1, 0).unwrap(), Some(0.0));
    assert!(diff.is_excluded(1, 1));
    assert!(diff.valid_values().all(|v| (-2.0..=2.0).contains(&v)));

    let change = classify_change(&diff, ChangeThresholds::default()).unwrap();
    assert_eq!(change.label(0, 0).unwrap(), Some(CHANGE_DECREASE));
    assert_eq!(change.label(0, 1).unwrap(), Some(CHANGE_INCREASE));
    assert_eq!(change.label(1, 1).unwrap(), None);
}

#[test]
fn swapped_bands_stay_in_unit_range_for_unsigned_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("naip.tif");
    write_image(&path, [(40, 120), (100, 100), (60, 180), (10, 0)]);

    // 8-bit reflectance is non-negative, so even swapped bands stay in range
    let (image, _) = read_geotiff_bands(&path).unwrap();
    let swapped = BandLayout { red: 3, nir: 0 };
    let ndvi = ndvi_from_image(&image, swapped, &IndexParams::default()).unwrap();
    assert_relative_eq!(ndvi.get(0, 0).unwrap().unwrap(), -0.5);
}

#[test]
fn band_index_past_the_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("naip.tif");
    write_image(&path, [(1, 2), (3, 4), (5, 6), (7, 8)]);

    let (image, _) = read_geotiff_bands(&path).unwrap();
    let result = ndvi_from_image(&image, BandLayout { red: 0, nir: 7 }, &IndexParams::default());
    assert!(matches!(result, Err(Error::BandOutOfRange { band: 7, count: 4 })));
}

#[test]
fn co_registration_is_required() {
    let a = constant_index(3);
    let b = constant_index(2);
    assert!(matches!(index_difference(&a, &b), Err(Error::SizeMismatch { .. })));

    let mut utm = Raster::filled(2, 2, 0.25);
    utm.set_crs(Some(CRS::from_epsg(32613)));
    let mut geographic = Raster::filled(2, 2, 0.5);
    geographic.set_crs(Some(CRS::from_epsg(4326)));
    assert!(matches!(
        index_difference(
            &MaskedRaster::from_raster(utm),
            &MaskedRaster::from_raster(geographic)
        ),
        Err(Error::CrsMismatch { .. })
    ));
}

fn constant_index(size: usize) -> MaskedRaster {
    MaskedRaster::from_raster(Raster::filled(size, size, 0.25))
}
