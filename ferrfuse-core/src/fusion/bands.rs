//! Document-wide detection of running headers and footers: text that sits at
//! the same height on many pages and repeats the same words.

use tracing::*;

use crate::analysis::{
    bbox::Bbox,
    cluster::{dbscan_1d, group_by_cluster},
    labels::RegionType,
    similarity::mean_cosine_similarity,
};
use crate::config::{BandConfig, BandCutoff};
use crate::layout::Region;

/// Native text of one page, as normalized before consolidation.
#[derive(Debug, Clone, Copy)]
pub struct PageText<'a> {
    pub page: usize,
    pub height: f32,
    pub text: &'a [Region],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandMember {
    pub page: usize,
    pub bbox: Bbox,
    pub text: Option<String>,
}

/// A cluster of repeated text accepted as a page header or page footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub label: RegionType,
    pub members: Vec<BandMember>,
}

struct Candidate<'a> {
    page: usize,
    page_height: f32,
    mid_y: f32,
    bbox: Bbox,
    text: &'a str,
}

fn in_margin(mid_y: f32, height: f32, margin: Option<f32>) -> bool {
    match margin {
        Some(fraction) => mid_y <= fraction * height || mid_y >= (1.0 - fraction) * height,
        None => true,
    }
}

/// Clusters text y-midpoints across all pages and keeps the clusters whose
/// texts are similar enough. Bands come in cluster order; members keep the
/// page order of the input.
#[tracing::instrument(skip_all, fields(pages = pages.len()))]
pub fn detect_bands(pages: &[PageText<'_>], config: &BandConfig) -> Vec<Band> {
    if !config.enabled {
        return Vec::new();
    }

    let candidates: Vec<Candidate> = pages
        .iter()
        .flat_map(|page| {
            page.text.iter().filter_map(move |region| {
                let text = region.text.as_deref()?;
                let mid_y = region.bbox.center().y;
                in_margin(mid_y, page.height, config.margin_fraction).then_some(Candidate {
                    page: page.page,
                    page_height: page.height,
                    mid_y,
                    bbox: region.bbox,
                    text,
                })
            })
        })
        .collect();

    let positions: Vec<f32> = candidates.iter().map(|c| c.mid_y).collect();
    let labels = dbscan_1d(&positions, config.var_threshold, config.min_samples);

    let mut bands = Vec::new();
    for (cluster, members) in group_by_cluster(&labels).into_iter().enumerate() {
        let texts: Vec<&str> = members.iter().map(|&idx| candidates[idx].text).collect();
        let similarity = mean_cosine_similarity(&texts);
        if similarity <= config.sim_threshold {
            debug!(
                "Cluster {} of {} texts not repeated enough: similarity {:.3}",
                cluster,
                members.len(),
                similarity
            );
            continue;
        }

        let count = members.len() as f32;
        let mean_y = members.iter().map(|&idx| candidates[idx].mid_y).sum::<f32>() / count;
        let cutoff = match config.cutoff {
            BandCutoff::PageFraction(fraction) => {
                let mean_height = members
                    .iter()
                    .map(|&idx| candidates[idx].page_height)
                    .sum::<f32>()
                    / count;
                fraction * mean_height
            }
            BandCutoff::Absolute(pixels) => pixels,
        };
        let label = if mean_y < cutoff {
            RegionType::PageHeader
        } else {
            RegionType::PageFooter
        };

        debug!(
            "Cluster {} is a {} band over {} texts, similarity {:.3}",
            cluster,
            label,
            members.len(),
            similarity
        );
        bands.push(Band {
            label,
            members: members
                .iter()
                .map(|&idx| BandMember {
                    page: candidates[idx].page,
                    bbox: candidates[idx].bbox,
                    text: Some(candidates[idx].text.to_string()),
                })
                .collect(),
        });
    }

    bands
}
