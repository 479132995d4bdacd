//! The typed content graph.
//!
//! A build produces a [`ContentGraph`]: the book root owning ordered
//! chapters, each owning ordered fragments. Fragments are a closed-world
//! sum over the supported content types; every node carries the versioned
//! library reference it targets and a sub-content id unique within the
//! build. Serialization of the graph root is exactly the
//! `content/content.json` document of the emitted archive.

mod builder;
pub mod params;

pub use builder::{BookBuilder, ChapterBuilder, MediaEntry, MediaManifest};

use serde_json::{Value, json};

use params::*;

/// A versioned library reference: `H5P.DragText 1.10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryTag {
    pub machine_name: String,
    pub major_version: u32,
    pub minor_version: u32,
}

impl std::fmt::Display for LibraryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}.{}", self.machine_name, self.major_version, self.minor_version)
    }
}

/// One unit of content: the typed parameter tree for a single library.
#[derive(Debug, Clone)]
pub enum Fragment {
    Text(TextParams),
    Image(ImageParams),
    Audio(AudioParams),
    MultiChoice(MultiChoiceParams),
    Accordion(AccordionParams),
    DragText(DragTextParams),
    Blanks(BlanksParams),
    TrueFalse(TrueFalseParams),
    Essay(EssayParams),
    SingleChoiceSet(SingleChoiceSetParams),
    Crossword(CrosswordParams),
    Flashcards(FlashcardsParams),
    DialogCards(DialogCardsParams),
}

impl Fragment {
    /// Machine name of the library this fragment targets.
    pub fn library_name(&self) -> &'static str {
        match self {
            Fragment::Text(_) => "H5P.AdvancedText",
            Fragment::Image(_) => "H5P.Image",
            Fragment::Audio(_) => "H5P.Audio",
            Fragment::MultiChoice(_) => "H5P.MultiChoice",
            Fragment::Accordion(_) => "H5P.Accordion",
            Fragment::DragText(_) => "H5P.DragText",
            Fragment::Blanks(_) => "H5P.Blanks",
            Fragment::TrueFalse(_) => "H5P.TrueFalse",
            Fragment::Essay(_) => "H5P.Essay",
            Fragment::SingleChoiceSet(_) => "H5P.SingleChoiceSet",
            Fragment::Crossword(_) => "H5P.Crossword",
            Fragment::Flashcards(_) => "H5P.Flashcards",
            Fragment::DialogCards(_) => "H5P.DialogCards",
        }
    }

    /// Human-readable content type name, used as the default metadata title.
    pub fn display_name(&self) -> &'static str {
        match self {
            Fragment::Text(_) => "Text",
            Fragment::Image(_) => "Image",
            Fragment::Audio(_) => "Audio",
            Fragment::MultiChoice(_) => "Multiple Choice",
            Fragment::Accordion(_) => "Accordion",
            Fragment::DragText(_) => "Drag the Words",
            Fragment::Blanks(_) => "Fill in the Blanks",
            Fragment::TrueFalse(_) => "True/False Question",
            Fragment::Essay(_) => "Essay",
            Fragment::SingleChoiceSet(_) => "Single Choice Set",
            Fragment::Crossword(_) => "Crossword",
            Fragment::Flashcards(_) => "Flashcards",
            Fragment::DialogCards(_) => "Dialog Cards",
        }
    }

    /// The serialized parameter object.
    pub fn params_value(&self) -> Value {
        match self {
            Fragment::Text(p) => serde_json::to_value(p),
            Fragment::Image(p) => serde_json::to_value(p),
            Fragment::Audio(p) => serde_json::to_value(p),
            Fragment::MultiChoice(p) => serde_json::to_value(p),
            Fragment::Accordion(p) => serde_json::to_value(p),
            Fragment::DragText(p) => serde_json::to_value(p),
            Fragment::Blanks(p) => serde_json::to_value(p),
            Fragment::TrueFalse(p) => serde_json::to_value(p),
            Fragment::Essay(p) => serde_json::to_value(p),
            Fragment::SingleChoiceSet(p) => serde_json::to_value(p),
            Fragment::Crossword(p) => serde_json::to_value(p),
            Fragment::Flashcards(p) => serde_json::to_value(p),
            Fragment::DialogCards(p) => serde_json::to_value(p),
        }
        .expect("fragment parameters serialize")
    }
}

/// A fragment placed in a chapter, with its resolved library version and
/// assigned sub-content id.
#[derive(Debug, Clone)]
pub struct FragmentNode {
    pub library: LibraryTag,
    pub title: Option<String>,
    pub sub_content_id: String,
    pub fragment: Fragment,
}

impl FragmentNode {
    /// Serialize as a column list item.
    fn to_json(&self) -> Value {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| self.fragment.display_name().to_string());
        json!({
            "content": {
                "params": self.fragment.params_value(),
                "library": self.library.to_string(),
                "subContentId": &self.sub_content_id,
                "metadata": {
                    "contentType": self.fragment.display_name(),
                    "license": "U",
                    "title": title,
                },
            },
            "useSeparator": "auto",
        })
    }
}

/// A chapter: an `H5P.Column` instance owning its fragments.
#[derive(Debug, Clone)]
pub struct ChapterNode {
    pub title: String,
    pub library: LibraryTag,
    pub sub_content_id: String,
    pub fragments: Vec<FragmentNode>,
}

impl ChapterNode {
    fn to_json(&self) -> Value {
        json!({
            "params": {
                "content": self.fragments.iter().map(FragmentNode::to_json).collect::<Vec<Value>>(),
            },
            "library": self.library.to_string(),
            "subContentId": &self.sub_content_id,
            "metadata": {
                "contentType": "Chapter",
                "license": "U",
                "title": &self.title,
            },
        })
    }
}

/// The book cover page, when the definition declares a cover image.
#[derive(Debug, Clone)]
pub struct CoverPage {
    pub image: MediaFile,
    pub alt: String,
    pub description: Option<String>,
    pub library: LibraryTag,
    pub sub_content_id: String,
}

/// The completed content graph, rooted at the interactive book.
#[derive(Debug, Clone)]
pub struct ContentGraph {
    pub title: String,
    pub language: String,
    pub cover: Option<CoverPage>,
    pub chapters: Vec<ChapterNode>,
}

impl ContentGraph {
    /// Serialize the root content document (`content/content.json`).
    pub fn to_json(&self) -> Value {
        let mut root = json!({
            "title": &self.title,
            "showCoverPage": self.cover.is_some(),
            "chapters": self.chapters.iter().map(ChapterNode::to_json).collect::<Vec<Value>>(),
            "behaviour": {
                "defaultTableOfContents": true,
                "progressIndicators": true,
                "progressAuto": true,
                "displaySummary": true,
            },
            "read": "Read",
            "displayTOC": "Display 'Table of contents'",
            "hideTOC": "Hide 'Table of contents'",
            "nextPage": "Next page",
            "previousPage": "Previous page",
            "navigateToTop": "Navigate to the top",
            "chapterCompleted": "Page completed!",
            "partCompleted": "@pages of @total completed",
            "incompleteChapter": "Incomplete page",
            "markAsFinished": "I have finished this page",
            "fullscreen": "Fullscreen",
            "exitFullscreen": "Exit fullscreen",
        });
        if let Some(cover) = &self.cover {
            root["bookCover"] = json!({
                "coverDescription": cover.description.clone().unwrap_or_default(),
                "coverMedium": {
                    "params": {
                        "file": &cover.image,
                        "alt": &cover.alt,
                        "decorative": false,
                    },
                    "library": cover.library.to_string(),
                    "subContentId": &cover.sub_content_id,
                    "metadata": {
                        "contentType": "Image",
                        "license": "U",
                        "title": "Cover",
                    },
                },
            });
        }
        root
    }

    /// Every sub-content id in the graph, in document order.
    pub fn sub_content_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        if let Some(cover) = &self.cover {
            ids.push(cover.sub_content_id.as_str());
        }
        for chapter in &self.chapters {
            ids.push(chapter.sub_content_id.as_str());
            for fragment in &chapter.fragments {
                ids.push(fragment.sub_content_id.as_str());
            }
        }
        ids
    }
}
