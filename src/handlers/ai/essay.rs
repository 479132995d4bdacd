//! AI-generated essay task with scored keywords.

use serde_json::Value;

use crate::ai::AiError;
use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{
    EssayBehaviour, EssayKeyword, EssayKeywordOptions, EssayParams, EssaySolution,
};
use crate::handlers::{Handler, HandlerContext};
use crate::util::escape_html;

use super::{Difficulty, count_option, generate, required_prompt, warn_fallback};

pub struct AiEssayHandler;

struct Options {
    title: Option<String>,
    prompt: String,
    keyword_count: u32,
    difficulty: Difficulty,
}

impl AiEssayHandler {
    fn parse(item: &ContentItem) -> Result<Options> {
        Ok(Options {
            title: item.get_str("title").map(String::from),
            prompt: required_prompt(item)?,
            keyword_count: count_option(item, "keywordCount", 5)?,
            difficulty: Difficulty::parse(item)?,
        })
    }

    fn user_prompt(options: &Options) -> String {
        format!(
            "Create an essay-writing task about: {topic}\n\
             \n\
             Requirements:\n\
             - One short task description telling the learner what to write about.\n\
             - Exactly {count} keywords a good essay would mention, each a single \
               word or short phrase, with optional alternative spellings.\n\
             - {guidance}\n\
             \n\
             Return ONLY a JSON object with no surrounding markup, matching:\n\
             {{\"task\": \"Explain how plants make food.\", \
             \"keywords\": [{{\"keyword\": \"chlorophyll\", \"alternatives\": []}}]}}",
            topic = options.prompt,
            count = options.keyword_count,
            guidance = options.difficulty.guidance(),
        )
    }

    fn convert(document: &Value, options: &Options) -> std::result::Result<EssayParams, AiError> {
        let task = document
            .get("task")
            .and_then(Value::as_str)
            .filter(|task| !task.is_empty())
            .ok_or_else(|| AiError::MalformedResponse("missing 'task' string".to_string()))?;
        let keywords = document
            .get("keywords")
            .and_then(Value::as_array)
            .ok_or_else(|| AiError::MalformedResponse("missing 'keywords' array".to_string()))?;

        let mut converted = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let Some(word) = keyword.get("keyword").and_then(Value::as_str) else {
                log::warn!("discarding generated keyword without text");
                continue;
            };
            if word.is_empty() {
                log::warn!("discarding empty generated keyword");
                continue;
            }
            let alternatives = keyword
                .get("alternatives")
                .and_then(Value::as_array)
                .map(|alternatives| {
                    alternatives
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|alternative| !alternative.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            converted.push(EssayKeyword {
                keyword: word.to_string(),
                alternatives,
                options: EssayKeywordOptions::default(),
            });
        }

        if converted.is_empty() {
            return Err(AiError::MalformedResponse(
                "no usable keywords in response".to_string(),
            ));
        }
        Ok(Self::params(task.to_string(), converted))
    }

    fn fallback(options: &Options) -> EssayParams {
        Self::params(
            format!(
                "Write a short essay about {}. (Automatic keyword scoring could not \
                 be generated for this task.)",
                options.prompt
            ),
            vec![EssayKeyword {
                keyword: options.prompt.clone(),
                alternatives: Vec::new(),
                options: EssayKeywordOptions::default(),
            }],
        )
    }

    fn params(task: String, keywords: Vec<EssayKeyword>) -> EssayParams {
        EssayParams {
            task_description: format!("<p>{}</p>", escape_html(&task)),
            keywords,
            solution: EssaySolution::default(),
            behaviour: EssayBehaviour::default(),
        }
    }
}

impl Handler for AiEssayHandler {
    fn content_type(&self) -> &'static str {
        "ai-essay"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Essay"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let options = Self::parse(item)?;
        let params = generate(ctx, item, &Self::user_prompt(&options))
            .and_then(|document| Self::convert(&document, &options))
            .unwrap_or_else(|error| {
                warn_fallback(self.content_type(), &options.prompt, &error);
                Self::fallback(&options)
            });
        ctx.chapter.fragment(Fragment::Essay(params), options.title)
    }
}
