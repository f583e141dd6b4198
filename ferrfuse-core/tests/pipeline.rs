use ferrfuse_core::analysis::{bbox::Bbox, labels::RegionType};
use ferrfuse_core::config::{BandCutoff, TableValidationConfig};
use ferrfuse_core::{
    DetectionSet, DocumentInput, FusionConfig, FusionConfigBuilder, FusionError, NativeElement,
    PageInput, RawDetection, Source, TableShape, fuse_document,
};

const WIDTH: f32 = 600.0;
const HEIGHT: f32 = 800.0;

fn text(bbox: [f32; 4], content: &str) -> NativeElement {
    NativeElement::text(Bbox::from(bbox), content, Some(10.0))
}

const CELLS: [&str; 12] = [
    "apples", "bricks", "cobalt", "dunes", "embers", "fjords", "garnet", "harbor", "indigo",
    "juniper", "kelp", "lanterns",
];

/// Three rows of four cells 80px wide with 20px gaps, rows 30px apart.
fn grid_page(index: usize) -> PageInput {
    let mut page = PageInput::new(index, WIDTH, HEIGHT);
    for row in 0..3 {
        for col in 0..4 {
            let x0 = 50.0 + col as f32 * 100.0;
            let y0 = 100.0 + row as f32 * 30.0;
            page.native
                .push(text([x0, y0, x0 + 80.0, y0 + 15.0], CELLS[row * 4 + col]));
        }
    }
    page
}

/// A page with a running header, a footer and one body paragraph.
fn report_page(index: usize, body: &str) -> PageInput {
    let mut page = PageInput::new(index, WIDTH, HEIGHT);
    page.native = vec![
        text([50.0, 20.0, 400.0, 35.0], "acme corp annual report"),
        text([50.0, 300.0, 550.0, 315.0], body),
        text([250.0, 760.0, 350.0, 775.0], "confidential draft"),
    ];
    page.detections = vec![DetectionSet {
        model: "doclaynet".into(),
        detections: vec![RawDetection::new(
            "picture",
            Bbox::from_xyxy(100.0, 400.0, 500.0, 700.0),
            0.9,
        )],
        error: None,
    }];
    page
}

fn report() -> DocumentInput {
    DocumentInput {
        pages: vec![
            report_page(0, "revenue grew strongly over the year"),
            report_page(1, "costs stayed flat despite inflation"),
            report_page(2, "the outlook remains positive overall"),
        ],
    }
}

#[test]
fn test_empty_document() {
    let document = fuse_document(&DocumentInput::default(), &FusionConfig::default()).unwrap();
    assert!(document.pages.is_empty());
    assert!(document.skipped.is_empty());
}

#[test]
fn test_empty_page() {
    let input = DocumentInput {
        pages: vec![PageInput::new(0, 612.0, 792.0)],
    };
    let document = fuse_document(&input, &FusionConfig::default()).unwrap();
    assert_eq!(document.pages.len(), 1);
    assert!(document.pages[0].regions.is_empty());
    assert!(document.pages[0].links.is_empty());
}

#[test]
fn test_invalid_page_is_skipped() {
    let input = DocumentInput {
        pages: vec![grid_page(0), PageInput::new(1, f32::NAN, 800.0), grid_page(2)],
    };
    let document = fuse_document(&input, &FusionConfig::default()).unwrap();

    let indices: Vec<usize> = document.pages.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert_eq!(document.skipped.len(), 1);
    assert_eq!(document.skipped[0].index, 1);
}

#[test]
fn test_all_pages_invalid() {
    let input = DocumentInput {
        pages: vec![PageInput::new(0, 0.0, 800.0), PageInput::new(1, 600.0, -1.0)],
    };
    assert!(matches!(
        fuse_document(&input, &FusionConfig::default()),
        Err(FusionError::NoPagesProcessed { total: 2 })
    ));
}

#[test]
fn test_structural_table_replaces_cells() {
    let input = DocumentInput {
        pages: vec![grid_page(0)],
    };
    let document = fuse_document(&input, &FusionConfig::default()).unwrap();

    // The cell text lies inside the table and is filtered out
    let regions = &document.pages[0].regions;
    assert_eq!(regions.len(), 1);
    let table = &regions[0];
    assert_eq!(table.label, RegionType::Table);
    assert_eq!(table.source, Source::StructuralAnalysis);
    assert_eq!(table.table, Some(TableShape { rows: 3, columns: 4 }));
    assert_eq!(table.bbox, Bbox::from_xyxy(40.0, 90.0, 440.0, 185.0));
    // Ids 0..12 belong to the cells
    assert_eq!(table.id, 12);
}

#[test]
fn test_structure_analysis_disabled() {
    let config = FusionConfigBuilder::default()
        .table_validation(TableValidationConfig {
            structure_analysis: false,
            ..Default::default()
        })
        .build()
        .unwrap();
    let input = DocumentInput {
        pages: vec![grid_page(0)],
    };
    let document = fuse_document(&input, &config).unwrap();
    let regions = &document.pages[0].regions;
    assert_eq!(regions.len(), 12);
    assert!(regions.iter().all(|r| r.label == RegionType::Text));
}

#[test]
fn test_bands_injected_on_every_page() {
    let document = fuse_document(&report(), &FusionConfig::default()).unwrap();
    assert_eq!(document.pages.len(), 3);

    for page in &document.pages {
        let headers: Vec<_> = page
            .regions
            .iter()
            .filter(|r| r.label == RegionType::PageHeader)
            .collect();
        let footers: Vec<_> = page
            .regions
            .iter()
            .filter(|r| r.label == RegionType::PageFooter)
            .collect();
        assert_eq!(headers.len(), 1, "page {}", page.index);
        assert_eq!(footers.len(), 1, "page {}", page.index);
        assert_eq!(headers[0].text.as_deref(), Some("acme corp annual report"));
        assert_eq!(headers[0].source, Source::NativeDocument);
        assert_eq!(headers[0].score, 1.0);

        // Ids stay unique after injection
        let mut ids: Vec<usize> = page.regions.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), page.regions.len());

        // Still in reading order
        assert!(
            page.regions
                .windows(2)
                .all(|pair| pair[0].bbox.min.y <= pair[1].bbox.min.y)
        );
    }
}

#[test]
fn test_bands_disabled_or_legacy_cutoff() {
    let mut config = FusionConfig::default();
    config.bands.enabled = false;
    let document = fuse_document(&report(), &config).unwrap();
    assert!(
        document.pages[0]
            .regions
            .iter()
            .all(|r| !matches!(r.label, RegionType::PageHeader | RegionType::PageFooter))
    );

    // Under the 100px rule the header still sits above the cutoff
    let mut config = FusionConfig::default();
    config.bands.cutoff = BandCutoff::Absolute(100.0);
    let document = fuse_document(&report(), &config).unwrap();
    let labels: Vec<&RegionType> = document.pages[0]
        .regions
        .iter()
        .map(|r| &r.label)
        .filter(|label| matches!(label, RegionType::PageHeader | RegionType::PageFooter))
        .collect();
    assert_eq!(labels, vec![&RegionType::PageHeader, &RegionType::PageFooter]);
}

#[test]
fn test_same_result_for_any_worker_count() {
    let mut input = report();
    input.pages.push(grid_page(3));
    input.pages.push(grid_page(4));

    let baseline = fuse_document(&input, &FusionConfig::default()).unwrap();
    for workers in [1, 2, 4] {
        let config = FusionConfigBuilder::default().workers(workers).build().unwrap();
        assert_eq!(fuse_document(&input, &config).unwrap(), baseline);
    }
}

#[test]
fn test_output_json_shape() {
    let input = DocumentInput {
        pages: vec![grid_page(0)],
    };
    let document = fuse_document(&input, &FusionConfig::default()).unwrap();
    let json = serde_json::to_value(&document).unwrap();

    let table = &json["pages"][0]["regions"][0];
    assert_eq!(table["label"], "Table");
    assert_eq!(table["source"], "structural_analysis");
    assert_eq!(table["rows"], 3);
    assert_eq!(table["columns"], 4);
    assert_eq!(table["bbox"][2], 440.0);
    assert!(json.get("skipped").is_none());
}
