//! Typed parameter trees for each supported content type.
//!
//! Each struct serializes to exactly the JSON parameter object the matching
//! runtime library expects, localization tables and behaviour flags
//! included. Handlers construct these; the graph serializer embeds them
//! under `params` next to the versioned library reference.
//!
//! Text fields hold markup: callers escape user-supplied text with
//! [`crate::util::escape_html`] before it lands here.

use serde::Serialize;

// ============================================================================
// Shared pieces
// ============================================================================

/// Copyright block attached to every media file reference.
#[derive(Debug, Clone, Serialize)]
pub struct Copyright {
    pub license: String,
}

impl Default for Copyright {
    fn default() -> Self {
        Self {
            license: "U".to_string(),
        }
    }
}

/// A media file reference inside fragment parameters. The `path` is always
/// a canonical path assigned by the media manifest (`images/0.jpg`).
#[derive(Debug, Clone, Serialize)]
pub struct MediaFile {
    pub path: String,
    pub mime: String,
    pub copyright: Copyright,
}

impl MediaFile {
    pub fn new(path: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
            copyright: Copyright::default(),
        }
    }
}

/// One range of the overall feedback scale. The default single full-range
/// entry keeps runtimes from rendering an empty feedback section.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRange {
    pub from: u32,
    pub to: u32,
}

pub fn default_overall_feedback() -> Vec<FeedbackRange> {
    vec![FeedbackRange { from: 0, to: 100 }]
}

// ============================================================================
// Text / Image / Audio
// ============================================================================

/// H5P.AdvancedText parameters.
#[derive(Debug, Clone, Serialize)]
pub struct TextParams {
    pub text: String,
}

/// H5P.Image parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ImageParams {
    pub file: MediaFile,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub decorative: bool,
}

/// H5P.Audio parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioParams {
    pub files: Vec<MediaFile>,
    pub player_mode: String,
    pub fit_to_wrapper: bool,
    pub controls: bool,
    pub autoplay: bool,
}

impl AudioParams {
    pub fn new(file: MediaFile, fit_to_wrapper: bool) -> Self {
        Self {
            files: vec![file],
            player_mode: "minimalistic".to_string(),
            fit_to_wrapper,
            controls: true,
            autoplay: false,
        }
    }
}

// ============================================================================
// Multiple choice
// ============================================================================

/// H5P.MultiChoice parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceParams {
    pub question: String,
    pub answers: Vec<MultiChoiceAnswer>,
    pub behaviour: MultiChoiceBehaviour,
    #[serde(rename = "UI")]
    pub ui: QuestionUi,
    pub overall_feedback: Vec<FeedbackRange>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceAnswer {
    pub text: String,
    pub correct: bool,
    pub tips_and_feedback: TipsAndFeedback,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipsAndFeedback {
    pub tip: String,
    pub chosen_feedback: String,
    pub not_chosen_feedback: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceBehaviour {
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub enable_check_button: bool,
    pub single_point: bool,
    pub single_answer: bool,
    pub random_answers: bool,
}

impl Default for MultiChoiceBehaviour {
    fn default() -> Self {
        Self {
            enable_retry: true,
            enable_solutions_button: true,
            enable_check_button: true,
            single_point: false,
            single_answer: false,
            random_answers: true,
        }
    }
}

/// Button labels shared by the question-type libraries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionUi {
    pub check_answer_button: String,
    pub show_solution_button: String,
    pub try_again_button: String,
    pub tips_label: String,
    pub score_bar_label: String,
}

impl Default for QuestionUi {
    fn default() -> Self {
        Self {
            check_answer_button: "Check".to_string(),
            show_solution_button: "Show solution".to_string(),
            try_again_button: "Retry".to_string(),
            tips_label: "Show tip".to_string(),
            score_bar_label: "You got :num out of :total points".to_string(),
        }
    }
}

// ============================================================================
// Accordion
// ============================================================================

/// H5P.Accordion parameters. Panel bodies are embedded text-library
/// instances, so each carries its own sub-content id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccordionParams {
    pub panels: Vec<AccordionPanel>,
    pub h_tag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccordionPanel {
    pub title: String,
    pub content: EmbeddedText,
}

/// An embedded H5P.AdvancedText instance inside another fragment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedText {
    pub params: TextParams,
    pub library: String,
    pub sub_content_id: String,
}

// ============================================================================
// Drag the words
// ============================================================================

/// H5P.DragText parameters.
///
/// `text_field` uses the native marker syntax: one sentence per line,
/// draggable answers wrapped in `*asterisks*`, alternatives separated by
/// `/`, tips appended after `:`. `distractors` uses the same marker syntax
/// without sentence text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragTextParams {
    pub task_description: String,
    pub text_field: String,
    pub distractors: String,
    pub behaviour: DragTextBehaviour,
    pub overall_feedback: Vec<FeedbackRange>,
    #[serde(flatten)]
    pub l10n: DragTextL10n,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragTextBehaviour {
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub enable_check_button: bool,
    pub instant_feedback: bool,
}

impl Default for DragTextBehaviour {
    fn default() -> Self {
        Self {
            enable_retry: true,
            enable_solutions_button: true,
            enable_check_button: true,
            instant_feedback: false,
        }
    }
}

/// The full DragText localization table, flattened into the parameter
/// object as the runtime expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragTextL10n {
    pub check_answer: String,
    pub try_again: String,
    pub show_solution: String,
    pub submit_answer: String,
    pub drop_zone_index: String,
    pub empty: String,
    pub contains: String,
    pub aria_draggable_index: String,
    pub tip_label: String,
    pub correct_text: String,
    pub incorrect_text: String,
    pub reset_drop_title: String,
    pub reset_drop_description: String,
    pub grabbed: String,
    pub cancelled_dragging: String,
    pub correct_answer: String,
    pub feedback_header: String,
    pub score_bar_label: String,
    pub a11y_check: String,
    pub a11y_show_solution: String,
    pub a11y_retry: String,
}

impl Default for DragTextL10n {
    fn default() -> Self {
        Self {
            check_answer: "Check".to_string(),
            try_again: "Retry".to_string(),
            show_solution: "Show solution".to_string(),
            submit_answer: "Submit".to_string(),
            drop_zone_index: "Drop Zone @index.".to_string(),
            empty: "Drop Zone @index is empty.".to_string(),
            contains: "Drop Zone @index contains draggable @draggable.".to_string(),
            aria_draggable_index: "@index of @count draggables.".to_string(),
            tip_label: "Show tip".to_string(),
            correct_text: "Correct!".to_string(),
            incorrect_text: "Incorrect!".to_string(),
            reset_drop_title: "Reset drop".to_string(),
            reset_drop_description: "Are you sure you want to reset this drop zone?".to_string(),
            grabbed: "Draggable is grabbed.".to_string(),
            cancelled_dragging: "Cancelled dragging.".to_string(),
            correct_answer: "Correct answer:".to_string(),
            feedback_header: "Feedback".to_string(),
            score_bar_label: "You got :num out of :total points".to_string(),
            a11y_check: "Check the answers. The responses will be marked as correct, incorrect, or unanswered.".to_string(),
            a11y_show_solution: "Show the solution. The task will be marked with its correct solution.".to_string(),
            a11y_retry: "Retry the task. Reset all responses and start the task over again.".to_string(),
        }
    }
}

// ============================================================================
// Fill in the blanks
// ============================================================================

/// H5P.Blanks parameters. Questions use the same `*answer*` marker syntax
/// as drag-text, typed instead of dragged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlanksParams {
    pub text: String,
    pub questions: Vec<String>,
    pub behaviour: BlanksBehaviour,
    pub overall_feedback: Vec<FeedbackRange>,
    #[serde(flatten)]
    pub l10n: BlanksL10n,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlanksBehaviour {
    pub case_sensitive: bool,
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub enable_check_button: bool,
    pub auto_check: bool,
    pub accept_spelling_errors: bool,
    pub show_solutions_require_input: bool,
    pub separate_lines: bool,
}

impl Default for BlanksBehaviour {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            enable_retry: true,
            enable_solutions_button: true,
            enable_check_button: true,
            auto_check: false,
            accept_spelling_errors: false,
            show_solutions_require_input: true,
            separate_lines: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlanksL10n {
    pub check_answer: String,
    pub try_again: String,
    pub show_solutions: String,
    pub submit_answer: String,
    pub not_filled_out: String,
    pub answer_is_correct: String,
    pub answer_is_wrong: String,
    pub answered_correctly: String,
    pub answered_incorrectly: String,
    pub solution_label: String,
    pub input_label: String,
    pub input_has_tip_label: String,
    pub tip_label: String,
    pub score_bar_label: String,
}

impl Default for BlanksL10n {
    fn default() -> Self {
        Self {
            check_answer: "Check".to_string(),
            try_again: "Retry".to_string(),
            show_solutions: "Show solution".to_string(),
            submit_answer: "Submit".to_string(),
            not_filled_out: "Please fill in all blanks to view solution".to_string(),
            answer_is_correct: "':ans' is correct".to_string(),
            answer_is_wrong: "':ans' is wrong".to_string(),
            answered_correctly: "Answered correctly".to_string(),
            answered_incorrectly: "Answered incorrectly".to_string(),
            solution_label: "Correct answer:".to_string(),
            input_label: "Blank input @num of @total".to_string(),
            input_has_tip_label: "Tip available".to_string(),
            tip_label: "Tip".to_string(),
            score_bar_label: "You got :num out of :total points".to_string(),
        }
    }
}

// ============================================================================
// True / False
// ============================================================================

/// H5P.TrueFalse parameters. `correct` is the string `"true"` or
/// `"false"`, matching the library's select field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseParams {
    pub question: String,
    pub correct: String,
    pub behaviour: TrueFalseBehaviour,
    pub l10n: TrueFalseL10n,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseBehaviour {
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub enable_check_button: bool,
    pub confirm_check_dialog: bool,
    pub confirm_retry_dialog: bool,
    pub auto_check: bool,
}

impl Default for TrueFalseBehaviour {
    fn default() -> Self {
        Self {
            enable_retry: true,
            enable_solutions_button: true,
            enable_check_button: true,
            confirm_check_dialog: false,
            confirm_retry_dialog: false,
            auto_check: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseL10n {
    pub true_text: String,
    pub false_text: String,
    pub score: String,
    pub check_answer: String,
    pub show_solution_button: String,
    pub try_again: String,
    pub wrong_answer_message: String,
    pub correct_answer_message: String,
}

impl Default for TrueFalseL10n {
    fn default() -> Self {
        Self {
            true_text: "True".to_string(),
            false_text: "False".to_string(),
            score: "You got @score of @total points".to_string(),
            check_answer: "Check".to_string(),
            show_solution_button: "Show solution".to_string(),
            try_again: "Retry".to_string(),
            wrong_answer_message: "Wrong answer".to_string(),
            correct_answer_message: "Correct answer".to_string(),
        }
    }
}

// ============================================================================
// Essay
// ============================================================================

/// H5P.Essay parameters: keyword-scored free-text response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayParams {
    pub task_description: String,
    pub keywords: Vec<EssayKeyword>,
    pub solution: EssaySolution,
    pub behaviour: EssayBehaviour,
}

#[derive(Debug, Clone, Serialize)]
pub struct EssayKeyword {
    pub keyword: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    pub options: EssayKeywordOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayKeywordOptions {
    pub points: u32,
    pub occurrences: u32,
    pub case_sensitive: bool,
    pub forgive_mistakes: bool,
}

impl Default for EssayKeywordOptions {
    fn default() -> Self {
        Self {
            points: 1,
            occurrences: 1,
            case_sensitive: false,
            forgive_mistakes: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EssaySolution {
    pub introduction: String,
    pub sample: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayBehaviour {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<u32>,
    pub enable_retry: bool,
    pub ignore_scoring: bool,
    pub percentage_passing: u32,
}

impl Default for EssayBehaviour {
    fn default() -> Self {
        Self {
            minimum_length: None,
            maximum_length: None,
            enable_retry: true,
            ignore_scoring: false,
            percentage_passing: 50,
        }
    }
}

// ============================================================================
// Single choice set
// ============================================================================

/// H5P.SingleChoiceSet parameters. Answers list the correct choice first;
/// the runtime shuffles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChoiceSetParams {
    pub choices: Vec<SingleChoice>,
    pub behaviour: SingleChoiceSetBehaviour,
    pub l10n: SingleChoiceSetL10n,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChoice {
    pub question: String,
    pub answers: Vec<String>,
    pub sub_content_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChoiceSetBehaviour {
    pub auto_continue: bool,
    pub timeout_correct: u32,
    pub timeout_wrong: u32,
    pub sound_effects_enabled: bool,
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub pass_percentage: u32,
}

impl Default for SingleChoiceSetBehaviour {
    fn default() -> Self {
        Self {
            auto_continue: true,
            timeout_correct: 2000,
            timeout_wrong: 3000,
            sound_effects_enabled: true,
            enable_retry: true,
            enable_solutions_button: true,
            pass_percentage: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleChoiceSetL10n {
    pub next_button_label: String,
    pub show_solution_button_label: String,
    pub retry_button_label: String,
    pub solution_view_title: String,
    pub correct_text: String,
    pub incorrect_text: String,
    pub results_slide_title: String,
    pub score_bar_label: String,
}

impl Default for SingleChoiceSetL10n {
    fn default() -> Self {
        Self {
            next_button_label: "Next question".to_string(),
            show_solution_button_label: "Show solution".to_string(),
            retry_button_label: "Retry".to_string(),
            solution_view_title: "Solution".to_string(),
            correct_text: "Correct!".to_string(),
            incorrect_text: "Incorrect!".to_string(),
            results_slide_title: "You finished!".to_string(),
            score_bar_label: "You got :numcorrect of :maxscore correct".to_string(),
        }
    }
}

// ============================================================================
// Crossword
// ============================================================================

/// H5P.Crossword parameters. Answers are single words; the runtime lays
/// out the grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordParams {
    pub task_description: String,
    pub words: Vec<CrosswordWord>,
    pub behaviour: CrosswordBehaviour,
    pub l10n: CrosswordL10n,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordWord {
    pub clue: String,
    pub answer: String,
    pub fix_word: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordBehaviour {
    pub enable_retry: bool,
    pub enable_solutions_button: bool,
    pub enable_instant_feedback: bool,
    pub score_words: bool,
}

impl Default for CrosswordBehaviour {
    fn default() -> Self {
        Self {
            enable_retry: true,
            enable_solutions_button: true,
            enable_instant_feedback: false,
            score_words: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordL10n {
    pub across: String,
    pub down: String,
    pub check_answer: String,
    pub try_again: String,
    pub show_solution: String,
    pub could_not_generate_crossword: String,
    pub extra_clue: String,
    pub close_window: String,
}

impl Default for CrosswordL10n {
    fn default() -> Self {
        Self {
            across: "Across".to_string(),
            down: "Down".to_string(),
            check_answer: "Check".to_string(),
            try_again: "Retry".to_string(),
            show_solution: "Show solution".to_string(),
            could_not_generate_crossword: "Could not generate a crossword with the given words. Please try again with fewer words or words that have more characters in common.".to_string(),
            extra_clue: "Extra clue".to_string(),
            close_window: "Close window".to_string(),
        }
    }
}

// ============================================================================
// Flashcards
// ============================================================================

/// H5P.Flashcards parameters: typed-answer cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardsParams {
    pub description: String,
    pub cards: Vec<Flashcard>,
    pub case_sensitive: bool,
    pub random_cards: bool,
    pub show_solutions_requires_input: bool,
    #[serde(flatten)]
    pub l10n: FlashcardsL10n,
}

#[derive(Debug, Clone, Serialize)]
pub struct Flashcard {
    pub text: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardsL10n {
    pub progress_text: String,
    pub next: String,
    pub previous: String,
    pub check_answer_text: String,
    pub show_solution_text: String,
    pub default_answer_text: String,
    pub correct_answer_text: String,
    pub incorrect_answer_text: String,
    pub answer_short_text: String,
    pub information_text: String,
    pub results: String,
    pub of_correct: String,
    pub card_announcement: String,
}

impl Default for FlashcardsL10n {
    fn default() -> Self {
        Self {
            progress_text: "Card @card of @total".to_string(),
            next: "Next".to_string(),
            previous: "Previous".to_string(),
            check_answer_text: "Check answer".to_string(),
            show_solution_text: "Correct answer".to_string(),
            default_answer_text: "Your answer".to_string(),
            correct_answer_text: "Correct".to_string(),
            incorrect_answer_text: "Incorrect".to_string(),
            answer_short_text: "A:".to_string(),
            information_text: "Information".to_string(),
            results: "Results".to_string(),
            of_correct: "@score of @total correct".to_string(),
            card_announcement: "Incorrect answer. Correct answer was @answer".to_string(),
        }
    }
}

// ============================================================================
// Dialog cards
// ============================================================================

/// H5P.DialogCards parameters: turnable front/back cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogCardsParams {
    pub title: String,
    pub mode: String,
    pub description: String,
    pub dialogs: Vec<DialogCard>,
    pub behaviour: DialogCardsBehaviour,
    #[serde(flatten)]
    pub l10n: DialogCardsL10n,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogCard {
    pub text: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Vec<MediaFile>>,
    pub tips: DialogCardTips,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DialogCardTips {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogCardsBehaviour {
    pub enable_retry: bool,
    pub disable_backwards_navigation: bool,
    pub scale_text_not_card: bool,
    pub random_cards: bool,
}

impl Default for DialogCardsBehaviour {
    fn default() -> Self {
        Self {
            enable_retry: true,
            disable_backwards_navigation: false,
            scale_text_not_card: false,
            random_cards: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogCardsL10n {
    pub next: String,
    pub prev: String,
    pub retry: String,
    pub answer: String,
    pub progress_text: String,
    pub card_front_label: String,
    pub card_back_label: String,
    pub tip_button_label: String,
}

impl Default for DialogCardsL10n {
    fn default() -> Self {
        Self {
            next: "Next".to_string(),
            prev: "Previous".to_string(),
            retry: "Retry".to_string(),
            answer: "Turn".to_string(),
            progress_text: "Card @card of @total".to_string(),
            card_front_label: "Card front".to_string(),
            card_back_label: "Card back".to_string(),
            tip_button_label: "Show tip".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_file_serialization() {
        let value = serde_json::to_value(MediaFile::new("images/0.jpg", "image/jpeg")).unwrap();
        assert_eq!(value["path"], "images/0.jpg");
        assert_eq!(value["mime"], "image/jpeg");
        assert_eq!(value["copyright"]["license"], "U");
    }

    #[test]
    fn test_drag_text_field_names() {
        let params = DragTextParams {
            task_description: "Drag the words".to_string(),
            text_field: "Sky is *blue*.".to_string(),
            distractors: "*green*".to_string(),
            behaviour: DragTextBehaviour::default(),
            overall_feedback: default_overall_feedback(),
            l10n: DragTextL10n::default(),
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["taskDescription"], "Drag the words");
        assert_eq!(value["textField"], "Sky is *blue*.");
        // l10n flattens into the parameter object itself.
        assert_eq!(value["checkAnswer"], "Check");
        assert_eq!(value["behaviour"]["instantFeedback"], false);
        assert_eq!(value["behaviour"]["enableRetry"], true);
    }

    #[test]
    fn test_multi_choice_ui_key_is_upper() {
        let params = MultiChoiceParams {
            question: "Q".to_string(),
            answers: vec![],
            behaviour: MultiChoiceBehaviour::default(),
            ui: QuestionUi::default(),
            overall_feedback: default_overall_feedback(),
        };
        let value = serde_json::to_value(&params).unwrap();
        assert!(value.get("UI").is_some());
        assert_eq!(value["UI"]["checkAnswerButton"], "Check");
    }

    #[test]
    fn test_true_false_correct_is_string() {
        let params = TrueFalseParams {
            question: "Q".to_string(),
            correct: "true".to_string(),
            behaviour: TrueFalseBehaviour::default(),
            l10n: TrueFalseL10n::default(),
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["correct"], "true");
        assert_eq!(value["l10n"]["trueText"], "True");
    }
}
