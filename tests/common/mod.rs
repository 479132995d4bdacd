//! Shared fixtures: an in-process catalog serving constructed library
//! packages, and a scripted generation transport.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use h5forge::ai::{AiClient, AiError, AiTransport};
use h5forge::{Catalog, Compiler, HandlerRegistry, LibraryRegistry, MediaLoader};

/// Build an in-memory library package ZIP.
pub fn package(
    name: &str,
    major: u32,
    minor: u32,
    runnable: bool,
    deps: &[(&str, u32, u32)],
    semantics: Option<&str>,
) -> Vec<u8> {
    let dependencies: Vec<String> = deps
        .iter()
        .map(|(dep, dep_major, dep_minor)| {
            format!(
                r#"{{"machineName": "{dep}", "majorVersion": {dep_major}, "minorVersion": {dep_minor}}}"#
            )
        })
        .collect();
    let manifest = format!(
        r#"{{"title": "{name}", "machineName": "{name}",
            "majorVersion": {major}, "minorVersion": {minor}, "patchVersion": 0,
            "runnable": {},
            "preloadedJs": [{{"path": "scripts/{name}.js"}}],
            "preloadedCss": [{{"path": "styles/{name}.css"}}],
            "preloadedDependencies": [{}]}}"#,
        u8::from(runnable),
        dependencies.join(", ")
    );

    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("library.json", options).unwrap();
    writer.write_all(manifest.as_bytes()).unwrap();
    if let Some(semantics) = semantics {
        writer.start_file("semantics.json", options).unwrap();
        writer.write_all(semantics.as_bytes()).unwrap();
    }
    writer.start_file(format!("scripts/{name}.js"), options).unwrap();
    writer.write_all(format!("// {name}\n").as_bytes()).unwrap();
    writer.start_file(format!("styles/{name}.css"), options).unwrap();
    writer.write_all(format!("/* {name} */\n").as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// In-process catalog backed by a map.
pub struct MemoryCatalog {
    packages: HashMap<String, Vec<u8>>,
}

impl Catalog for MemoryCatalog {
    fn download(&self, machine_name: &str) -> h5forge::Result<Vec<u8>> {
        self.packages.get(machine_name).cloned().ok_or_else(|| {
            h5forge::Error::CatalogUnavailable(
                format!("no such content type: {machine_name}").into(),
            )
        })
    }
}

/// Schema subsets mirroring the published libraries, so the builder's
/// pre-emit validation is exercised against real field requirements.
const TEXT_SEMANTICS: &str = r#"[{"name": "text", "type": "text"}]"#;

const IMAGE_SEMANTICS: &str = r#"[
    {"name": "file", "type": "image"},
    {"name": "alt", "type": "text"},
    {"name": "title", "type": "text", "optional": true},
    {"name": "decorative", "type": "boolean", "optional": true}
]"#;

const AUDIO_SEMANTICS: &str = r#"[
    {"name": "files", "type": "audio"},
    {"name": "playerMode", "type": "select",
     "options": ["minimalistic", "full", "transparent"]},
    {"name": "fitToWrapper", "type": "boolean", "optional": true},
    {"name": "controls", "type": "boolean", "optional": true},
    {"name": "autoplay", "type": "boolean", "optional": true}
]"#;

const MULTICHOICE_SEMANTICS: &str = r#"[
    {"name": "question", "type": "text"},
    {"name": "answers", "type": "list", "field":
        {"name": "answer", "type": "group", "fields": [
            {"name": "text", "type": "text"},
            {"name": "correct", "type": "boolean"}
        ]}},
    {"name": "behaviour", "type": "group", "fields": [
        {"name": "enableRetry", "type": "boolean", "optional": true},
        {"name": "enableSolutionsButton", "type": "boolean", "optional": true}
    ], "optional": true}
]"#;

const DRAGTEXT_SEMANTICS: &str = r#"[
    {"name": "taskDescription", "type": "text"},
    {"name": "textField", "type": "text"},
    {"name": "distractors", "type": "text", "optional": true},
    {"name": "behaviour", "type": "group", "fields": [
        {"name": "instantFeedback", "type": "boolean", "optional": true},
        {"name": "enableRetry", "type": "boolean", "optional": true},
        {"name": "enableSolutionsButton", "type": "boolean", "optional": true}
    ], "optional": true}
]"#;

const BLANKS_SEMANTICS: &str = r#"[
    {"name": "text", "type": "text"},
    {"name": "questions", "type": "list", "field":
        {"name": "question", "type": "text"}}
]"#;

const TRUEFALSE_SEMANTICS: &str = r#"[
    {"name": "question", "type": "text"},
    {"name": "correct", "type": "select", "options": ["true", "false"]}
]"#;

const CROSSWORD_SEMANTICS: &str = r#"[
    {"name": "taskDescription", "type": "text", "optional": true},
    {"name": "words", "type": "list", "field":
        {"name": "word", "type": "group", "fields": [
            {"name": "clue", "type": "text"},
            {"name": "answer", "type": "text"},
            {"name": "fixWord", "type": "boolean", "optional": true}
        ]}}
]"#;

/// A catalog carrying every library the default handler set requires,
/// with version numbers matching the published libraries.
pub fn full_catalog() -> MemoryCatalog {
    // Libraries whose parameter subset we don't model get an open schema.
    let open = Some("[]");
    let entries: Vec<(&str, Vec<u8>)> = vec![
        (
            "H5P.InteractiveBook",
            package(
                "H5P.InteractiveBook",
                1,
                11,
                true,
                &[("H5P.Column", 1, 18), ("FontAwesome", 4, 5)],
                open,
            ),
        ),
        ("H5P.Column", package("H5P.Column", 1, 18, true, &[], open)),
        ("FontAwesome", package("FontAwesome", 4, 5, false, &[], None)),
        (
            "H5P.AdvancedText",
            package("H5P.AdvancedText", 1, 1, true, &[], Some(TEXT_SEMANTICS)),
        ),
        ("H5P.Image", package("H5P.Image", 1, 1, true, &[], Some(IMAGE_SEMANTICS))),
        ("H5P.Audio", package("H5P.Audio", 1, 5, true, &[], Some(AUDIO_SEMANTICS))),
        (
            "H5P.MultiChoice",
            package(
                "H5P.MultiChoice",
                1,
                16,
                true,
                &[("H5P.Question", 1, 5)],
                Some(MULTICHOICE_SEMANTICS),
            ),
        ),
        ("H5P.Question", package("H5P.Question", 1, 5, false, &[], None)),
        ("H5P.Accordion", package("H5P.Accordion", 1, 0, true, &[], open)),
        (
            "H5P.DragText",
            package(
                "H5P.DragText",
                1,
                10,
                true,
                &[("H5P.Question", 1, 5)],
                Some(DRAGTEXT_SEMANTICS),
            ),
        ),
        (
            "H5P.Blanks",
            package(
                "H5P.Blanks",
                1,
                14,
                true,
                &[("H5P.Question", 1, 5)],
                Some(BLANKS_SEMANTICS),
            ),
        ),
        (
            "H5P.TrueFalse",
            package(
                "H5P.TrueFalse",
                1,
                8,
                true,
                &[("H5P.Question", 1, 5)],
                Some(TRUEFALSE_SEMANTICS),
            ),
        ),
        ("H5P.Essay", package("H5P.Essay", 1, 5, true, &[("H5P.Question", 1, 5)], open)),
        (
            "H5P.SingleChoiceSet",
            package("H5P.SingleChoiceSet", 1, 11, true, &[], open),
        ),
        (
            "H5P.Crossword",
            package(
                "H5P.Crossword",
                0,
                5,
                true,
                &[("H5P.Question", 1, 5)],
                Some(CROSSWORD_SEMANTICS),
            ),
        ),
        ("H5P.Flashcards", package("H5P.Flashcards", 1, 7, true, &[], open)),
        ("H5P.DialogCards", package("H5P.DialogCards", 1, 9, true, &[], open)),
    ];
    MemoryCatalog {
        packages: entries
            .into_iter()
            .map(|(name, bytes)| (name.to_string(), bytes))
            .collect(),
    }
}

/// A catalog that fails every download: for proving warm-cache offline
/// builds.
pub struct OfflineCatalog;

impl Catalog for OfflineCatalog {
    fn download(&self, machine_name: &str) -> h5forge::Result<Vec<u8>> {
        Err(h5forge::Error::CatalogUnavailable(
            format!("offline: {machine_name}").into(),
        ))
    }
}

pub fn registry() -> Arc<LibraryRegistry> {
    Arc::new(LibraryRegistry::new(Box::new(full_catalog()), None))
}

/// Scripted generation transport: pops canned responses in order, then
/// reports the service unavailable.
pub struct ScriptedAi {
    responses: Mutex<Vec<Result<String, AiError>>>,
}

impl ScriptedAi {
    pub fn client(responses: Vec<Result<String, AiError>>) -> AiClient {
        let mut responses = responses;
        responses.reverse();
        AiClient::new(Box::new(ScriptedAi {
            responses: Mutex::new(responses),
        }))
    }
}

impl AiTransport for ScriptedAi {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, AiError> {
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(AiError::Unavailable("script exhausted".to_string())))
    }
}

/// A compiler over the full fixture catalog, media rooted at `base_dir`,
/// with an optional scripted AI client.
pub fn compiler(base_dir: &std::path::Path, ai: Option<AiClient>) -> Compiler {
    Compiler::new(
        registry(),
        HandlerRegistry::with_default_handlers(),
        MediaLoader::new(base_dir),
        ai,
    )
}
