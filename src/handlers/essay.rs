//! Essay handler: keyword-scored free-text response.

use serde_json::Value;

use crate::definition::ContentItem;
use crate::error::Result;
use crate::graph::Fragment;
use crate::graph::params::{
    EssayBehaviour, EssayKeyword, EssayKeywordOptions, EssayParams, EssaySolution,
};
use crate::util::escape_html;

use super::{Handler, HandlerContext, invalid};

pub struct EssayHandler;

struct ParsedEssay {
    title: Option<String>,
    task: String,
    keywords: Vec<EssayKeyword>,
    min_chars: Option<u32>,
    max_chars: Option<u32>,
}

impl EssayHandler {
    fn parse(item: &ContentItem) -> Result<ParsedEssay> {
        let task = item
            .get_str("task")
            .filter(|task| !task.trim().is_empty())
            .ok_or_else(|| invalid("missing 'task' field"))?;

        let keywords = item
            .get("keywords")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("missing 'keywords' list"))?;
        if keywords.is_empty() {
            return Err(invalid("'keywords' must not be empty"));
        }

        let mut parsed = Vec::with_capacity(keywords.len());
        for (index, keyword) in keywords.iter().enumerate() {
            let number = index + 1;
            let object = keyword
                .as_object()
                .ok_or_else(|| invalid(format!("keyword {number} must be an object")))?;
            let word = object
                .get("keyword")
                .and_then(Value::as_str)
                .filter(|word| !word.is_empty())
                .ok_or_else(|| invalid(format!("keyword {number} missing 'keyword'")))?;

            let alternatives = match object.get("alternatives") {
                None => Vec::new(),
                Some(Value::Array(alternatives)) => alternatives
                    .iter()
                    .map(|alternative| {
                        alternative
                            .as_str()
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .ok_or_else(|| {
                                invalid(format!(
                                    "keyword {number}: alternatives must be non-empty strings"
                                ))
                            })
                    })
                    .collect::<Result<Vec<String>>>()?,
                Some(_) => {
                    return Err(invalid(format!("keyword {number}: 'alternatives' must be a list")));
                }
            };

            let points = match object.get("points") {
                None => 1,
                Some(value) => positive_u32(value)
                    .ok_or_else(|| invalid(format!("keyword {number}: 'points' must be positive")))?,
            };

            parsed.push(EssayKeyword {
                keyword: word.to_string(),
                alternatives,
                options: EssayKeywordOptions {
                    points,
                    ..EssayKeywordOptions::default()
                },
            });
        }

        let min_chars = bound(item, "minChars")?;
        let max_chars = bound(item, "maxChars")?;
        if let (Some(min), Some(max)) = (min_chars, max_chars) {
            if min > max {
                return Err(invalid("'minChars' must not exceed 'maxChars'"));
            }
        }

        Ok(ParsedEssay {
            title: item.get_str("title").map(String::from),
            task: task.to_string(),
            keywords: parsed,
            min_chars,
            max_chars,
        })
    }
}

fn bound(item: &ContentItem, field: &str) -> Result<Option<u32>> {
    match item.get(field) {
        None => Ok(None),
        Some(value) => positive_u32(value)
            .map(Some)
            .ok_or_else(|| invalid(format!("'{field}' must be a positive number"))),
    }
}

fn positive_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .filter(|&n| n > 0 && n <= u32::MAX as u64)
        .map(|n| n as u32)
}

impl Handler for EssayHandler {
    fn content_type(&self) -> &'static str {
        "essay"
    }

    fn required_libraries(&self) -> &'static [&'static str] {
        &["H5P.Essay"]
    }

    fn validate(&self, item: &ContentItem) -> Result<()> {
        Self::parse(item).map(drop)
    }

    fn process(&self, ctx: &mut HandlerContext<'_, '_, '_>, item: &ContentItem) -> Result<()> {
        let parsed = Self::parse(item)?;
        let params = EssayParams {
            task_description: format!("<p>{}</p>", escape_html(&parsed.task)),
            keywords: parsed.keywords,
            solution: EssaySolution::default(),
            behaviour: EssayBehaviour {
                minimum_length: parsed.min_chars,
                maximum_length: parsed.max_chars,
                ..EssayBehaviour::default()
            },
        };
        ctx.chapter.fragment(Fragment::Essay(params), parsed.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(payload: serde_json::Value) -> ContentItem {
        ContentItem::new("essay", payload.as_object().unwrap().clone())
    }

    #[test]
    fn test_parse_keywords() {
        let parsed = EssayHandler::parse(&item(json!({
            "task": "Explain photosynthesis.",
            "keywords": [
                {"keyword": "chlorophyll", "points": 2},
                {"keyword": "light", "alternatives": ["sunlight"]}
            ]
        })))
        .unwrap();
        assert_eq!(parsed.keywords.len(), 2);
        assert_eq!(parsed.keywords[0].options.points, 2);
        assert_eq!(parsed.keywords[1].alternatives, vec!["sunlight"]);
    }

    #[test]
    fn test_bounds_checked() {
        assert!(EssayHandler
            .validate(&item(json!({
                "task": "T",
                "keywords": [{"keyword": "k"}],
                "minChars": 100,
                "maxChars": 50
            })))
            .is_err());
        assert!(EssayHandler
            .validate(&item(json!({
                "task": "T",
                "keywords": [{"keyword": "k"}],
                "minChars": 0
            })))
            .is_err());
    }
}
