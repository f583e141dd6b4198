use glam::Vec2;
use tracing::*;

use crate::analysis::{bbox::Bbox, labels::RegionType};
use crate::config::{MergeStrategy, TextDetectionConfig};
use crate::layout::Region;

/// Two boxes are neighbours when the empty space between them is at most
/// `threshold` on both axes.
pub fn is_neighbour(a: &Bbox, b: &Bbox, threshold: f32) -> bool {
    let gap = a.gap(b);
    gap.x <= threshold && gap.y <= threshold
}

/// Non-transitive grouping: in input order, each unused region becomes an
/// anchor and collects every unused direct neighbour of itself.
pub fn group_by_anchor(regions: &[Region], threshold: f32) -> Vec<Vec<usize>> {
    let mut used = vec![false; regions.len()];
    let mut groups = Vec::new();

    for anchor in 0..regions.len() {
        if used[anchor] {
            continue;
        }
        used[anchor] = true;

        let mut group = vec![anchor];
        for other in 0..regions.len() {
            if used[other] {
                continue;
            }
            if is_neighbour(&regions[anchor].bbox, &regions[other].bbox, threshold) {
                used[other] = true;
                group.push(other);
            }
        }
        groups.push(group);
    }

    groups
}

/// Disjoint-set forest over region indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }

        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}

/// Transitive grouping: connected components of the neighbour relation.
/// Groups are ordered by their smallest member, members ascending.
pub fn group_transitive(regions: &[Region], threshold: f32) -> Vec<Vec<usize>> {
    let mut forest = UnionFind::new(regions.len());
    for i in 0..regions.len() {
        for j in (i + 1)..regions.len() {
            if is_neighbour(&regions[i].bbox, &regions[j].bbox, threshold) {
                forest.union(i, j);
            }
        }
    }

    let mut slot_of_root: Vec<Option<usize>> = vec![None; regions.len()];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for idx in 0..regions.len() {
        let root = forest.find(idx);
        match slot_of_root[root] {
            Some(slot) => groups[slot].push(idx),
            None => {
                slot_of_root[root] = Some(groups.len());
                groups.push(vec![idx]);
            }
        }
    }

    groups
}

/// Python-style `isupper`: at least one cased character and no lowercase one.
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Labels a text block as Title, Header or Text from its mean font size and
/// its words.
pub fn classify_text(
    text: &str,
    font_size: Option<f32>,
    config: &TextDetectionConfig,
) -> RegionType {
    if text.is_empty() {
        return RegionType::Text;
    }

    let font = font_size.unwrap_or(0.0);
    let words: Vec<&str> = text.split_whitespace().collect();

    if font > config.title_font_size || (is_upper(text) && words.len() <= config.title_max_words) {
        return RegionType::Title;
    }
    if font > config.header_font_size
        || (words.len() <= config.header_max_words && words.iter().any(|word| is_upper(word)))
    {
        return RegionType::Header;
    }

    RegionType::Text
}

/// Merges group members into the first member of the group.
///
/// The bbox is the union, texts are joined in top-to-bottom, left-to-right
/// order, the score is the best one and the font size the mean of the known
/// sizes.
pub fn merge_group(regions: &[Region], members: &[usize]) -> Region {
    let anchor = &regions[members[0]];

    let mut ordered: Vec<&Region> = members.iter().map(|&idx| &regions[idx]).collect();
    ordered.sort_by(|a, b| {
        a.bbox
            .min
            .y
            .total_cmp(&b.bbox.min.y)
            .then(a.bbox.min.x.total_cmp(&b.bbox.min.x))
    });

    let bbox = ordered
        .iter()
        .skip(1)
        .fold(ordered[0].bbox, |acc, region| acc.union(&region.bbox));
    let score = ordered.iter().map(|r| r.score).fold(0.0f32, f32::max);
    let text = ordered
        .iter()
        .filter_map(|r| r.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let fonts: Vec<f32> = ordered.iter().filter_map(|r| r.font_size).collect();
    let font_size = if fonts.is_empty() {
        None
    } else {
        Some(fonts.iter().sum::<f32>() / fonts.len() as f32)
    };

    Region {
        id: anchor.id,
        label: anchor.label.clone(),
        bbox,
        score,
        source: anchor.source,
        text: Some(text),
        font_size,
        table: None,
    }
}

/// Merges nearby native text runs into blocks, labels each block and pads it.
///
/// Input regions keep their relative order; every output block carries the id
/// of its anchor, so ids stay unique.
#[tracing::instrument(skip_all, fields(count = text.len()))]
pub fn consolidate_text(
    text: &[Region],
    page_size: Vec2,
    config: &TextDetectionConfig,
) -> Vec<Region> {
    let groups: Vec<Vec<usize>> = if config.merge_nearby_text {
        match config.merge_strategy {
            MergeStrategy::Anchor => group_by_anchor(text, config.text_merge_threshold),
            MergeStrategy::Transitive => group_transitive(text, config.text_merge_threshold),
        }
    } else {
        (0..text.len()).map(|idx| vec![idx]).collect()
    };

    let blocks: Vec<Region> = groups
        .iter()
        .map(|members| {
            let mut block = merge_group(text, members);
            let content = block.text.as_deref().unwrap_or_default();
            block.label = classify_text(content, block.font_size, config);
            if config.expand_text_boxes > 0.0 {
                block.bbox = block
                    .bbox
                    .expand(config.expand_text_boxes)
                    .clamp(Vec2::ZERO, page_size);
            }
            block
        })
        .collect();

    debug!("Consolidated {} text runs into {} blocks", text.len(), blocks.len());
    blocks
}
