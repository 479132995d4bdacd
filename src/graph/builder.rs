//! Fluent construction of the content graph.
//!
//! The [`BookBuilder`] owns the graph under construction, the media
//! manifest, and the sub-content id generator. Chapters are appended in
//! declaration order; [`ChapterBuilder`] borrows the book to append
//! fragments to the newest chapter. Media buffers registered here are
//! rewritten to canonical paths immediately, so fragments only ever hold
//! `images/<n>.<ext>`-style references.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::media::{LoadedMedia, MediaKind};
use crate::registry::LibraryRegistry;
use crate::util::{IdGenerator, escape_html};

use super::params::*;
use super::{ChapterNode, ContentGraph, CoverPage, Fragment, FragmentNode, LibraryTag};

/// One registered media buffer with its canonical path.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    /// Canonical path as referenced from fragments: `images/0.jpg`.
    pub path: String,
    pub data: Vec<u8>,
    pub mime: String,
}

/// All media registered during a build, in registration order.
#[derive(Debug, Default)]
pub struct MediaManifest {
    entries: Vec<MediaEntry>,
    counters: [usize; 3],
}

impl MediaManifest {
    /// Register a buffer, assigning the next canonical path of its kind.
    pub fn register(&mut self, kind: MediaKind, media: LoadedMedia) -> String {
        let index = match kind {
            MediaKind::Image => 0,
            MediaKind::Audio => 1,
            MediaKind::Video => 2,
        };
        let n = self.counters[index];
        self.counters[index] += 1;
        let path = format!("{}/{}.{}", kind.directory(), n, media.extension);
        self.entries.push(MediaEntry {
            path: path.clone(),
            data: media.data,
            mime: media.mime,
        });
        path
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds one book. Holds the registry so fragments get exact fetched
/// library versions at append time and schemas at validation time.
pub struct BookBuilder<'r> {
    registry: &'r LibraryRegistry,
    title: String,
    language: String,
    cover: Option<CoverPage>,
    chapters: Vec<ChapterNode>,
    media: MediaManifest,
    ids: IdGenerator,
    used_ids: HashSet<String>,
}

impl<'r> BookBuilder<'r> {
    pub fn new(
        title: impl Into<String>,
        language: impl Into<String>,
        registry: &'r LibraryRegistry,
    ) -> Self {
        Self {
            registry,
            title: title.into(),
            language: language.into(),
            cover: None,
            chapters: Vec::new(),
            media: MediaManifest::default(),
            ids: IdGenerator::new(),
            used_ids: HashSet::new(),
        }
    }

    /// Versioned tag for a library, as fetched from the catalog.
    pub fn library_tag(&self, machine_name: &str) -> Result<LibraryTag> {
        let library = self.registry.fetch(machine_name)?;
        Ok(LibraryTag {
            machine_name: library.machine_name.clone(),
            major_version: library.major_version,
            minor_version: library.minor_version,
        })
    }

    /// Draw a fresh sub-content id.
    pub fn next_sub_content_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if self.used_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Claim a proposed id, or rewrite it if already taken.
    fn claim_id(&mut self, proposed: Option<String>) -> String {
        match proposed {
            Some(id) if self.used_ids.insert(id.clone()) => id,
            _ => self.next_sub_content_id(),
        }
    }

    /// Declare the cover page. The buffer is registered under a canonical
    /// image path like any other media.
    pub fn set_cover(
        &mut self,
        media: LoadedMedia,
        alt: impl Into<String>,
        description: Option<String>,
    ) -> Result<()> {
        let mime = media.mime.clone();
        let path = self.media.register(MediaKind::Image, media);
        let library = self.library_tag("H5P.Image")?;
        let sub_content_id = self.next_sub_content_id();
        self.cover = Some(CoverPage {
            image: MediaFile::new(path, mime),
            alt: alt.into(),
            description: description.map(|text| format!("<p>{}</p>", escape_html(&text))),
            library,
            sub_content_id,
        });
        Ok(())
    }

    /// Start a new chapter and return its builder.
    pub fn chapter(&mut self, title: impl Into<String>) -> Result<ChapterBuilder<'_, 'r>> {
        let library = self.library_tag("H5P.Column")?;
        let sub_content_id = self.next_sub_content_id();
        self.chapters.push(ChapterNode {
            title: title.into(),
            library,
            sub_content_id,
            fragments: Vec::new(),
        });
        Ok(ChapterBuilder { book: self })
    }

    /// Validate the graph: structural invariants plus each fragment's
    /// parameters against the schema of its library.
    pub fn validate(&self) -> Result<()> {
        if self.chapters.is_empty() {
            return Err(Error::EmptyBook);
        }
        for (chapter_index, chapter) in self.chapters.iter().enumerate() {
            if chapter.fragments.is_empty() {
                return Err(Error::EmptyChapter(chapter.title.clone()));
            }
            for (item_index, node) in chapter.fragments.iter().enumerate() {
                let library = match self.registry.get(&node.library.machine_name) {
                    Some(library) => library,
                    None => continue,
                };
                let Some(schema) = &library.schema else {
                    continue;
                };
                let params = node.fragment.params_value();
                if let Some(violation) = schema.validate(&params).into_iter().next() {
                    return Err(Error::SchemaInvalid {
                        path: format!(
                            "chapter {} / item {} ({}): {}",
                            chapter_index + 1,
                            item_index + 1,
                            node.library.machine_name,
                            violation.path
                        ),
                        rule: violation.rule,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate, then hand over the finished graph and its media.
    pub fn build(self) -> Result<(ContentGraph, MediaManifest)> {
        self.validate()?;
        let graph = ContentGraph {
            title: self.title,
            language: self.language,
            cover: self.cover,
            chapters: self.chapters,
        };
        Ok((graph, self.media))
    }
}

/// Appends fragments to the chapter most recently started on the book.
pub struct ChapterBuilder<'a, 'r> {
    book: &'a mut BookBuilder<'r>,
}

impl ChapterBuilder<'_, '_> {
    /// Append a custom fragment, letting the builder assign its id.
    pub fn fragment(&mut self, fragment: Fragment, title: Option<String>) -> Result<()> {
        self.fragment_with_id(fragment, title, None)
    }

    /// Append a fragment with a proposed sub-content id. Duplicate
    /// proposals are rewritten to a fresh id.
    pub fn fragment_with_id(
        &mut self,
        fragment: Fragment,
        title: Option<String>,
        proposed_id: Option<String>,
    ) -> Result<()> {
        let library = self.book.library_tag(fragment.library_name())?;
        let sub_content_id = self.book.claim_id(proposed_id);
        let chapter = self
            .book
            .chapters
            .last_mut()
            .expect("chapter exists while its builder is alive");
        chapter.fragments.push(FragmentNode {
            library,
            title,
            sub_content_id,
            fragment,
        });
        Ok(())
    }

    /// Append a text page. Each input line becomes an escaped paragraph.
    pub fn text_page(&mut self, title: Option<String>, text: &str) -> Result<()> {
        let html = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| format!("<p>{}</p>", escape_html(line.trim())))
            .collect::<Vec<String>>()
            .join("\n");
        self.fragment(Fragment::Text(TextParams { text: html }), title)
    }

    /// Append an image page from a loaded buffer.
    pub fn image_page(
        &mut self,
        title: Option<String>,
        media: LoadedMedia,
        alt: &str,
        hover: Option<String>,
    ) -> Result<()> {
        let mime = media.mime.clone();
        let path = self.register_image(media);
        self.fragment(
            Fragment::Image(ImageParams {
                file: MediaFile::new(path, mime),
                alt: escape_html(alt),
                title: hover.map(|text| escape_html(&text)),
                decorative: false,
            }),
            title,
        )
    }

    /// Append an audio page from a loaded buffer.
    pub fn audio_page(
        &mut self,
        title: Option<String>,
        media: LoadedMedia,
        fit_to_wrapper: bool,
    ) -> Result<()> {
        let mime = media.mime.clone();
        let path = self.register_audio(media);
        self.fragment(
            Fragment::Audio(AudioParams::new(MediaFile::new(path, mime), fit_to_wrapper)),
            title,
        )
    }

    /// Append a multiple-choice quiz page. Question and answer markup must
    /// already be escaped.
    pub fn quiz_page(
        &mut self,
        title: Option<String>,
        question: String,
        answers: Vec<MultiChoiceAnswer>,
        single_answer: bool,
    ) -> Result<()> {
        self.fragment(
            Fragment::MultiChoice(MultiChoiceParams {
                question,
                answers,
                behaviour: MultiChoiceBehaviour {
                    single_answer,
                    ..MultiChoiceBehaviour::default()
                },
                ui: QuestionUi::default(),
                overall_feedback: default_overall_feedback(),
            }),
            title,
        )
    }

    /// Draw an id for an embedded sub-instance (accordion panel, single
    /// choice, ...).
    pub fn next_sub_content_id(&mut self) -> String {
        self.book.next_sub_content_id()
    }

    /// Versioned tag for a library, for embedded references.
    pub fn library_tag(&self, machine_name: &str) -> Result<LibraryTag> {
        self.book.library_tag(machine_name)
    }

    pub fn register_image(&mut self, media: LoadedMedia) -> String {
        self.book.media.register(MediaKind::Image, media)
    }

    pub fn register_audio(&mut self, media: LoadedMedia) -> String {
        self.book.media.register(MediaKind::Audio, media)
    }

    pub fn register_video(&mut self, media: LoadedMedia) -> String {
        self.book.media.register(MediaKind::Video, media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_fixtures::{MemoryCatalog, library_package};

    fn test_registry() -> LibraryRegistry {
        let schema = Some(r#"[{"name": "text", "type": "text"}]"#);
        let open_schema = Some("[]");
        LibraryRegistry::new(
            Box::new(MemoryCatalog::new(vec![
                ("H5P.Column", library_package("H5P.Column", 1, 18, &[], open_schema)),
                ("H5P.AdvancedText", library_package("H5P.AdvancedText", 1, 1, &[], schema)),
                ("H5P.Image", library_package("H5P.Image", 1, 1, &[], open_schema)),
                ("H5P.Audio", library_package("H5P.Audio", 1, 5, &[], open_schema)),
            ])),
            None,
        )
    }

    fn media(extension: &str, mime: &str) -> LoadedMedia {
        LoadedMedia {
            data: vec![1, 2, 3],
            extension: extension.to_string(),
            mime: mime.to_string(),
        }
    }

    #[test]
    fn test_media_numbering_per_kind() {
        let mut manifest = MediaManifest::default();
        assert_eq!(manifest.register(MediaKind::Image, media("jpg", "image/jpeg")), "images/0.jpg");
        assert_eq!(manifest.register(MediaKind::Audio, media("mp3", "audio/mpeg")), "audios/0.mp3");
        assert_eq!(manifest.register(MediaKind::Image, media("png", "image/png")), "images/1.png");
        assert_eq!(manifest.entries().len(), 3);
    }

    #[test]
    fn test_build_single_chapter() {
        let registry = test_registry();
        let mut builder = BookBuilder::new("Bio 101", "en", &registry);
        builder
            .chapter("Photosynthesis")
            .unwrap()
            .text_page(Some("Intro".to_string()), "Plants convert light...")
            .unwrap();
        let (graph, media) = builder.build().unwrap();
        assert_eq!(graph.chapters.len(), 1);
        assert_eq!(graph.chapters[0].library.to_string(), "H5P.Column 1.18");
        assert_eq!(
            graph.chapters[0].fragments[0].library.to_string(),
            "H5P.AdvancedText 1.1"
        );
        assert!(media.is_empty());
    }

    #[test]
    fn test_empty_book_fails() {
        let registry = test_registry();
        let builder = BookBuilder::new("T", "en", &registry);
        assert!(matches!(builder.build(), Err(Error::EmptyBook)));
    }

    #[test]
    fn test_empty_chapter_fails() {
        let registry = test_registry();
        let mut builder = BookBuilder::new("T", "en", &registry);
        builder.chapter("Empty").unwrap();
        match builder.build() {
            Err(Error::EmptyChapter(title)) => assert_eq!(title, "Empty"),
            other => panic!("expected EmptyChapter, got {other:?}"),
        }
    }

    #[test]
    fn test_text_page_escapes_markup() {
        let registry = test_registry();
        let mut builder = BookBuilder::new("T", "en", &registry);
        builder
            .chapter("C")
            .unwrap()
            .text_page(None, "a < b\n\nsecond line")
            .unwrap();
        let (graph, _) = builder.build().unwrap();
        match &graph.chapters[0].fragments[0].fragment {
            Fragment::Text(params) => {
                assert_eq!(params.text, "<p>a &lt; b</p>\n<p>second line</p>");
            }
            other => panic!("expected text fragment, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_proposed_id_rewritten() {
        let registry = test_registry();
        let mut builder = BookBuilder::new("T", "en", &registry);
        {
            let mut chapter = builder.chapter("C").unwrap();
            chapter
                .fragment_with_id(
                    Fragment::Text(TextParams { text: "<p>a</p>".to_string() }),
                    None,
                    Some("fixed-id".to_string()),
                )
                .unwrap();
            chapter
                .fragment_with_id(
                    Fragment::Text(TextParams { text: "<p>b</p>".to_string() }),
                    None,
                    Some("fixed-id".to_string()),
                )
                .unwrap();
        }
        let (graph, _) = builder.build().unwrap();
        let ids = graph.sub_content_ids();
        let unique: std::collections::HashSet<&&str> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(graph.chapters[0].fragments[0].sub_content_id, "fixed-id");
        assert_ne!(graph.chapters[0].fragments[1].sub_content_id, "fixed-id");
    }

    #[test]
    fn test_schema_validation_rejects_bad_params() {
        // A schema requiring a field the emitted params never carry.
        let registry = LibraryRegistry::new(
            Box::new(MemoryCatalog::new(vec![
                ("H5P.Column", library_package("H5P.Column", 1, 18, &[], Some("[]"))),
                (
                    "H5P.AdvancedText",
                    library_package(
                        "H5P.AdvancedText",
                        1,
                        1,
                        &[],
                        Some(r#"[{"name": "body", "type": "text"}]"#),
                    ),
                ),
            ])),
            None,
        );
        let mut builder = BookBuilder::new("T", "en", &registry);
        builder
            .chapter("C")
            .unwrap()
            .text_page(None, "hello")
            .unwrap();
        match builder.build() {
            Err(Error::SchemaInvalid { path, rule }) => {
                assert!(path.contains("chapter 1 / item 1"));
                assert!(path.contains("body"));
                assert!(rule.contains("missing"));
            }
            other => panic!("expected SchemaInvalid, got {other:?}"),
        }
    }

    #[test]
    fn test_cover_registers_media() {
        let registry = test_registry();
        let mut builder = BookBuilder::new("T", "en", &registry);
        builder
            .set_cover(media("jpg", "image/jpeg"), "cover", Some("About".to_string()))
            .unwrap();
        builder.chapter("C").unwrap().text_page(None, "x").unwrap();
        let (graph, media) = builder.build().unwrap();
        let cover = graph.cover.as_ref().unwrap();
        assert_eq!(cover.image.path, "images/0.jpg");
        assert_eq!(cover.description.as_deref(), Some("<p>About</p>"));
        assert_eq!(media.entries()[0].path, "images/0.jpg");
    }
}
