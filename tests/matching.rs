mod common;

use std::collections::HashMap;

use anyhow::Result;
use rayon::prelude::*;
use vitals::config::SiftOptions;
use vitals::extractor::FeatureExtractor;
use vitals::matcher::{RATIO_THRESHOLD, count_good_matches, rank_library};
use vitals::matrix::DescriptorMatrix;

use common::*;

fn library(extractor: &FeatureExtractor) -> Result<HashMap<String, DescriptorMatrix>> {
    CATALOGS
        .iter()
        .enumerate()
        .map(|(i, catalog)| {
            let cover = png_bytes(&synthetic_cover(i as u64 + 1));
            let features = extractor.detect_cover(&cover)?;
            Ok((catalog.to_string(), features.descriptors))
        })
        .collect()
}

#[test]
fn covers_have_features() -> Result<()> {
    let extractor = FeatureExtractor::from(&SiftOptions::default());
    for (catalog, descriptors) in library(&extractor)? {
        assert!(descriptors.nrows() >= 10, "{catalog}: {} descriptors", descriptors.nrows());
        assert_eq!(descriptors.ncols(), 128);
    }
    Ok(())
}

#[test]
fn cover_matches_itself_best() -> Result<()> {
    let extractor = FeatureExtractor::from(&SiftOptions::default());
    let library = library(&extractor)?;

    for (catalog, descriptors) in &library {
        let ranked = rank_library(descriptors, library.par_iter(), RATIO_THRESHOLD);
        assert_eq!(&ranked[0].0, catalog);
        assert!(ranked[0].1 > ranked[1].1, "{ranked:?}");
    }
    Ok(())
}

#[test]
fn photo_ranks_its_album_first() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let extractor = FeatureExtractor::from(&SiftOptions::default());
    let library = library(&extractor)?;

    let query = write_query(dir.path());
    let features = extractor.detect_file(&query, Some(extractor.query_resize_width()))?;

    let ranked = rank_library(&features.descriptors, library.par_iter(), RATIO_THRESHOLD);
    assert_eq!(ranked.len(), CATALOGS.len());
    assert_eq!(ranked[0].0, "SP-70040");
    assert!(ranked[0].1 > ranked[1].1, "{ranked:?}");
    assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    Ok(())
}

#[test]
fn stricter_ratio_accepts_fewer() -> Result<()> {
    let extractor = FeatureExtractor::from(&SiftOptions::default());
    let library = library(&extractor)?;
    let photo = png_bytes(&photo_of(&synthetic_cover(1)));
    let query = extractor.detect_query(&photo)?.descriptors;

    let cover = library["SP-70040"].view();
    let counts = [0.5, 0.6, 0.75, 0.9]
        .map(|ratio| count_good_matches(cover, query.view(), ratio));
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
    assert!(counts[2] > 0);
    Ok(())
}

#[test]
fn extraction_is_deterministic() -> Result<()> {
    let extractor = FeatureExtractor::from(&SiftOptions::default());
    let photo = png_bytes(&photo_of(&synthetic_cover(2)));
    let a = extractor.detect_query(&photo)?;
    let b = extractor.detect_query(&photo)?;
    assert_eq!(a.keypoints, b.keypoints);
    assert_eq!(a.descriptors, b.descriptors);
    Ok(())
}
