use serde::{Deserialize, Serialize};

/// Canonical region label shared by every evidence source.
///
/// Detector vocabularies differ between models; [`normalize_label`] maps them
/// onto this set and keeps unknown labels as [`RegionType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegionType {
    Text,
    Title,
    Header,
    Table,
    Picture,
    Caption,
    PageHeader,
    PageFooter,
    Footnote,
    Formula,
    ListItem,
    Other(String),
}

impl RegionType {
    pub fn name(&self) -> &str {
        match self {
            RegionType::Text => "Text",
            RegionType::Title => "Title",
            RegionType::Header => "Header",
            RegionType::Table => "Table",
            RegionType::Picture => "Picture",
            RegionType::Caption => "Caption",
            RegionType::PageHeader => "Page-Header",
            RegionType::PageFooter => "Page-Footer",
            RegionType::Footnote => "Footnote",
            RegionType::Formula => "Formula",
            RegionType::ListItem => "List-Item",
            RegionType::Other(label) => label,
        }
    }

    /// Exact inverse of [`RegionType::name`]; anything else is kept verbatim.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Text" => RegionType::Text,
            "Title" => RegionType::Title,
            "Header" => RegionType::Header,
            "Table" => RegionType::Table,
            "Picture" => RegionType::Picture,
            "Caption" => RegionType::Caption,
            "Page-Header" => RegionType::PageHeader,
            "Page-Footer" => RegionType::PageFooter,
            "Footnote" => RegionType::Footnote,
            "Formula" => RegionType::Formula,
            "List-Item" => RegionType::ListItem,
            other => RegionType::Other(other.to_string()),
        }
    }

    /// Body text labels produced by text consolidation. These are the labels
    /// removed when they sit inside a container region.
    pub fn is_text_class(&self) -> bool {
        matches!(
            self,
            RegionType::Text | RegionType::Title | RegionType::Header
        )
    }

    pub fn is_container_class(&self) -> bool {
        !self.is_text_class()
    }

    /// Labels whose content native text already carries: text classes and
    /// running page headers and footers. Detections with these labels are
    /// dropped when native text is authoritative.
    pub fn is_native_text_role(&self) -> bool {
        self.is_text_class() || matches!(self, RegionType::PageHeader | RegionType::PageFooter)
    }
}

impl std::fmt::Display for RegionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for RegionType {
    fn from(name: String) -> Self {
        RegionType::from_name(&name)
    }
}

impl From<RegionType> for String {
    fn from(label: RegionType) -> Self {
        match label {
            RegionType::Other(label) => label,
            known => known.name().to_string(),
        }
    }
}

const LABEL_RULES: &[(&[&str], RegionType)] = &[
    (&["page-header"], RegionType::PageHeader),
    (&["page-footer"], RegionType::PageFooter),
    (&["footnote"], RegionType::Footnote),
    (&["formula", "equation"], RegionType::Formula),
    (&["list"], RegionType::ListItem),
    (&["text", "paragraph", "body"], RegionType::Text),
    (&["title", "heading", "header"], RegionType::Title),
    (&["table"], RegionType::Table),
    (&["figure", "image", "picture"], RegionType::Picture),
    (&["caption"], RegionType::Caption),
];

/// Maps a detector label onto a [`RegionType`].
///
/// Matching is a case-insensitive substring test and the first rule that
/// matches wins. `_` and spaces count as `-`, so `page_header` and
/// `Page Header` both become [`RegionType::PageHeader`].
///
/// # Example
/// ```
/// use ferrfuse_core::analysis::labels::{normalize_label, RegionType};
/// assert_eq!(normalize_label("Section-header"), RegionType::Title);
/// assert_eq!(normalize_label("TableCell"), RegionType::Table);
/// assert_eq!(normalize_label("stamp"), RegionType::Other("stamp".into()));
/// ```
pub fn normalize_label(raw: &str) -> RegionType {
    let lowered = raw.to_lowercase().replace(['_', ' '], "-");

    LABEL_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(_, label)| label.clone())
        .unwrap_or_else(|| RegionType::Other(raw.to_string()))
}
