//! AI-assisted handlers against a scripted generation transport: real
//! responses, malformed responses, and the fallback path.

mod common;

use serde_json::Value;

use common::ScriptedAi;
use h5forge::ai::AiError;
use h5forge::BookDefinition;

fn fragment<'a>(document: &'a Value, chapter: usize, item: usize) -> &'a Value {
    &document["chapters"][chapter]["params"]["content"][item]["content"]
}

const AI_DRAGTEXT_BOOK: &str = r#"{
    "title": "Colors",
    "language": "en",
    "chapters": [{
        "title": "C",
        "content": [{
            "type": "ai-dragtext",
            "prompt": "colors",
            "sentenceCount": 2,
            "blanksPerSentence": 1,
            "difficulty": "easy"
        }]
    }]
}"#;

#[test]
fn test_ai_dragtext_good_response() {
    let definition = BookDefinition::from_json(AI_DRAGTEXT_BOOK).unwrap();
    let ai = ScriptedAi::client(vec![Ok(r#"```json
{"sentences": [
    {"text": "The sky is {blank}.", "blanks": ["blue"]},
    {"text": "Grass is {blank}.", "blanks": ["green"]}
 ],
 "distractors": ["red", "yellow", "purple"]}
```"#
        .to_string())]);
    let compiler = common::compiler(std::path::Path::new("."), Some(ai));
    let compiled = compiler.compile(&definition).unwrap();

    let document = compiled.graph.to_json();
    let fragment = fragment(&document, 0, 0);
    assert_eq!(fragment["library"], "H5P.DragText 1.10");
    assert_eq!(
        fragment["params"]["textField"],
        "The sky is *blue*.\nGrass is *green*."
    );
    assert_eq!(fragment["params"]["distractors"], "*red*\n*yellow*\n*purple*");
}

#[test]
fn test_ai_dragtext_empty_response_falls_back() {
    let definition = BookDefinition::from_json(AI_DRAGTEXT_BOOK).unwrap();
    let ai = ScriptedAi::client(vec![Ok(String::new())]);
    let compiler = common::compiler(std::path::Path::new("."), Some(ai));

    // The build still succeeds and a fallback fragment names the prompt.
    let compiled = compiler.compile(&definition).unwrap();
    let document = compiled.graph.to_json();
    let fragment = fragment(&document, 0, 0);
    let text_field = fragment["params"]["textField"].as_str().unwrap();
    assert!(text_field.contains("colors"));
    assert!(text_field.contains('*'), "fallback must stay well-formed");
}

#[test]
fn test_ai_dragtext_service_error_falls_back() {
    let definition = BookDefinition::from_json(AI_DRAGTEXT_BOOK).unwrap();
    let ai = ScriptedAi::client(vec![Err(AiError::Unavailable("503".to_string()))]);
    let compiler = common::compiler(std::path::Path::new("."), Some(ai));
    assert!(compiler.compile(&definition).is_ok());
}

#[test]
fn test_ai_without_credentials_falls_back() {
    let definition = BookDefinition::from_json(AI_DRAGTEXT_BOOK).unwrap();
    let compiler = common::compiler(std::path::Path::new("."), None);
    let compiled = compiler.compile(&definition).unwrap();
    let document = compiled.graph.to_json();
    let text_field = fragment(&document, 0, 0)["params"]["textField"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(text_field.contains("colors"));
}

const AI_CROSSWORD_BOOK: &str = r#"{
    "title": "Planets",
    "language": "en",
    "chapters": [{
        "title": "C",
        "content": [{"type": "ai-crossword", "prompt": "planets", "wordCount": 5}]
    }]
}"#;

#[test]
fn test_ai_crossword_drops_multi_word_answers() {
    let definition = BookDefinition::from_json(AI_CROSSWORD_BOOK).unwrap();
    let ai = ScriptedAi::client(vec![Ok(r#"{"words": [
        {"clue": "Red planet", "answer": "Mars"},
        {"clue": "Ringed", "answer": "Saturn"},
        {"clue": "Our galaxy", "answer": "Milky Way"},
        {"clue": "Morning star", "answer": "Venus"},
        {"clue": "Biggest", "answer": "gas giant"}
    ]}"#
        .to_string())]);
    let compiler = common::compiler(std::path::Path::new("."), Some(ai));
    let compiled = compiler.compile(&definition).unwrap();

    let document = compiled.graph.to_json();
    let words = fragment(&document, 0, 0)["params"]["words"].as_array().unwrap();
    let answers: Vec<&str> = words
        .iter()
        .map(|word| word["answer"].as_str().unwrap())
        .collect();
    assert_eq!(answers, vec!["MARS", "SATURN", "VENUS"]);
}

#[test]
fn test_ai_crossword_too_few_survivors_falls_back() {
    let definition = BookDefinition::from_json(AI_CROSSWORD_BOOK).unwrap();
    // Only one single-word answer survives: below the minimum of two.
    let ai = ScriptedAi::client(vec![Ok(r#"{"words": [
        {"clue": "Red planet", "answer": "Mars"},
        {"clue": "Our galaxy", "answer": "Milky Way"},
        {"clue": "Closest star", "answer": "the sun"}
    ]}"#
        .to_string())]);
    let compiler = common::compiler(std::path::Path::new("."), Some(ai));
    let compiled = compiler.compile(&definition).unwrap();

    let document = compiled.graph.to_json();
    let params = &fragment(&document, 0, 0)["params"];
    assert!(
        params["taskDescription"].as_str().unwrap().contains("could not be generated"),
        "expected the fallback crossword"
    );
    assert!(params["words"].as_array().unwrap().len() >= 2);
}

#[test]
fn test_ai_quiz_emits_fragment_per_question() {
    let definition = BookDefinition::from_json(
        r#"{"title": "Q", "language": "en",
            "chapters": [{"title": "C", "content": [
                {"type": "ai-quiz", "prompt": "planets", "questionCount": 2}
            ]}]}"#,
    )
    .unwrap();
    let ai = ScriptedAi::client(vec![Ok(r#"{"questions": [
        {"question": "Red planet?", "answers": [
            {"text": "Mars", "correct": true},
            {"text": "Venus", "correct": false}
        ]},
        {"question": "Ringed planet?", "answers": [
            {"text": "Saturn", "correct": true},
            {"text": "Mercury", "correct": false}
        ]}
    ]}"#
        .to_string())]);
    let compiler = common::compiler(std::path::Path::new("."), Some(ai));
    let compiled = compiler.compile(&definition).unwrap();

    let document = compiled.graph.to_json();
    let items = document["chapters"][0]["params"]["content"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["content"]["library"], "H5P.MultiChoice 1.16");
}

#[test]
fn test_ai_response_markup_is_stripped() {
    let definition = BookDefinition::from_json(
        r#"{"title": "T", "language": "en",
            "chapters": [{"title": "C", "content": [
                {"type": "ai-truefalse", "prompt": "space", "statementCount": 1}
            ]}]}"#,
    )
    .unwrap();
    let ai = ScriptedAi::client(vec![Ok(
        r#"{"statements": [{"statement": "<b>Mars</b> is<br>red.", "correct": true}]}"#.to_string(),
    )]);
    let compiler = common::compiler(std::path::Path::new("."), Some(ai));
    let compiled = compiler.compile(&definition).unwrap();

    let document = compiled.graph.to_json();
    let question = fragment(&document, 0, 0)["params"]["question"]
        .as_str()
        .unwrap()
        .to_string();
    // Tags stripped by sanitation, then the handler re-escapes and wraps.
    assert_eq!(question, "<p>Mars is red.</p>");
}

#[test]
fn test_ai_validation_errors_still_abort() {
    // Validation failures are not recoverable: only generation is.
    let definition = BookDefinition::from_json(
        r#"{"title": "T", "language": "en",
            "chapters": [{"title": "C", "content": [
                {"type": "ai-dragtext", "sentenceCount": 2}
            ]}]}"#,
    )
    .unwrap();
    let compiler = common::compiler(std::path::Path::new("."), None);
    match compiler.compile(&definition) {
        Err(h5forge::Error::InvalidContent { path, reason }) => {
            assert_eq!(path, "chapter 1 / item 1 (ai-dragtext)");
            assert!(reason.contains("prompt"));
        }
        other => panic!("expected InvalidContent, got {other:?}"),
    }
}
