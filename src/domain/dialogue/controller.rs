//! Dialogue controller.
//!
//! The turn-based state machine that drives the form-filling conversation:
//! prompt, validate through the oracle, normalize, apply skip rules, store,
//! and compose the next response. One conversation is strictly turn-based;
//! each input is fully resolved before the next is accepted.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::normalize::Normalizer;
use crate::domain::schema::{flatten, FieldSpec, FlattenedSequence, FormSchema, SchemaError};
use crate::ports::{ValidationOracle, ValidationRequest};

use super::skip::SkipRuleSet;
use super::state::{ConversationId, ConversationState};
use super::store::StoreError;

/// Rejections beyond this count get the expanded re-prompt that restates the
/// original question alongside the error.
const EXPANDED_REPROMPT_AFTER: u32 = 2;

/// Shown when the oracle boundary fails entirely and the turn cannot be
/// judged; the user is simply asked again.
const ORACLE_FAILURE_MESSAGE: &str =
    "I was unable to process your answer just now. Nothing is wrong with what you said.";

/// Errors surfaced by the controller itself. A single bad turn never crashes
/// the conversation; these cover misuse of the turn interface and internal
/// invariant violations.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("conversation is already complete")]
    AlreadyComplete,

    #[error("conversation is not complete yet")]
    NotComplete,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The outcome of one processed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Text to show the user: error + re-ask, or acknowledgment + next
    /// prompt, or the completion summary.
    pub response: String,
    /// True once every field is collected; no further input is accepted.
    pub is_complete: bool,
}

/// Drives one form-filling conversation over a flattened schema.
pub struct DialogueController {
    id: ConversationId,
    form_name: String,
    sequence: FlattenedSequence,
    rules: SkipRuleSet,
    oracle: Arc<dyn ValidationOracle>,
    normalizer: Normalizer,
    state: ConversationState,
    entered_groups: HashSet<String>,
}

impl DialogueController {
    /// Builds a controller for `schema`. Fails on a malformed schema (empty
    /// sequence, duplicate paths); this is the only fatal condition.
    pub fn new(
        schema: &FormSchema,
        oracle: Arc<dyn ValidationOracle>,
        normalizer: Normalizer,
        rules: SkipRuleSet,
    ) -> Result<Self, SchemaError> {
        let sequence = flatten(schema)?;

        let mut entered_groups = HashSet::new();
        if let Some(first) = sequence.get(0) {
            entered_groups.insert(first.path.top().to_string());
        }

        Ok(Self {
            id: ConversationId::new(),
            form_name: schema.name.clone(),
            sequence,
            rules,
            oracle,
            normalizer,
            state: ConversationState::new(),
            entered_groups,
        })
    }

    /// This conversation's identifier.
    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// True once every field has been collected.
    pub fn is_complete(&self) -> bool {
        self.state.cursor() >= self.sequence.len()
    }

    /// The greeting plus the first question.
    pub fn start_conversation(&self) -> String {
        info!(conversation = %self.id, form = %self.form_name, "conversation started");
        let first = self
            .sequence
            .get(self.state.cursor())
            .map(|f| f.prompt.as_str())
            .unwrap_or_default();
        format!(
            "Hello! I'm here to help you fill out the {} form.\n\nLet's begin!\n\n{}",
            self.form_name, first
        )
    }

    /// Processes one user turn.
    ///
    /// The cursor only advances on a successful store (possibly further via
    /// skip rules, clamped to the sequence length); a rejected answer leaves
    /// it in place and increments the field's attempt counter.
    pub async fn process_turn(&mut self, raw_input: &str) -> Result<TurnOutcome, DialogueError> {
        let field = match self.sequence.get(self.state.cursor()) {
            Some(field) => field.clone(),
            None => return Err(DialogueError::AlreadyComplete),
        };

        let request = ValidationRequest::for_field(&field, raw_input, self.state.collected());
        let verdict = match self.oracle.validate(request).await {
            Ok(verdict) => verdict,
            Err(err) => {
                // Terminal boundary failure: downgrade to a rejection so the
                // conversation stays alive and the question is asked again.
                warn!(conversation = %self.id, field = %field.path, error = %err,
                      "oracle boundary failed");
                return Ok(self.reject(&field, ORACLE_FAILURE_MESSAGE));
            }
        };

        debug!(conversation = %self.id, field = %field.path,
               is_valid = verdict.is_valid, "oracle verdict received");

        if !verdict.is_valid {
            return Ok(self.reject(&field, verdict.message()));
        }

        let normalized = match self
            .normalizer
            .normalize(field.field_type, &verdict.extracted_value)
        {
            Ok(value) => value,
            Err(err) => return Ok(self.reject(&field, &err.user_message())),
        };

        self.state.collected_mut().insert(&field.path, &normalized)?;

        let next_cursor = self.apply_skip_rules(&field, &normalized)?;
        self.state.advance_to(next_cursor);

        let acknowledgment = format!("Thank you! The data has been saved as {}.", normalized);

        if self.is_complete() {
            info!(conversation = %self.id, "conversation complete");
            return Ok(TurnOutcome {
                response: format!("{}\n\n{}", acknowledgment, self.completion_summary()),
                is_complete: true,
            });
        }

        // Not complete, so the next field exists.
        let next = match self.sequence.get(next_cursor) {
            Some(next) => next,
            None => return Err(DialogueError::AlreadyComplete),
        };

        let mut response = acknowledgment;
        // Only grouped fields form a section; moving between top-level
        // leaves is not a transition.
        if !next.path.groups().is_empty()
            && next.path.top() != field.path.top()
            && self.entered_groups.insert(next.path.top().to_string())
        {
            response.push_str(&format!(
                "\n\nNow let's move on to the {} section.",
                next.path.top().replace('_', " ")
            ));
        }
        response.push_str(&format!("\n\nNext question. {}", next.prompt));

        Ok(TurnOutcome {
            response,
            is_complete: false,
        })
    }

    /// The collected data, valid only once the conversation is complete.
    pub fn collected_data(&self) -> Result<Value, DialogueError> {
        if !self.is_complete() {
            return Err(DialogueError::NotComplete);
        }
        Ok(self.state.collected().as_json())
    }

    /// Evaluates the skip-rule table after a successful store and writes
    /// sentinels for bypassed fields. The returned cursor is clamped to the
    /// sequence length: a bypass past the end completes the conversation
    /// instead of indexing out of bounds.
    fn apply_skip_rules(
        &mut self,
        field: &FieldSpec,
        value: &str,
    ) -> Result<usize, DialogueError> {
        let natural_next = self.state.cursor() + 1;

        let rule = match self.rules.evaluate(field, value) {
            Some(rule) => rule.clone(),
            None => return Ok(natural_next),
        };

        debug!(conversation = %self.id, field = %field.path, bypass = rule.bypass,
               "skip rule fired");

        let mut index = natural_next;
        while index < natural_next + rule.bypass && index < self.sequence.len() {
            if let Some(bypassed) = self.sequence.get(index) {
                self.state
                    .collected_mut()
                    .insert(&bypassed.path, &rule.sentinel)?;
            }
            index += 1;
        }

        Ok((natural_next + rule.bypass).min(self.sequence.len()))
    }

    /// Composes a rejection response and records the attempt. The 1st and
    /// 2nd rejections re-ask briefly; from the 3rd on, the full question is
    /// restated alongside the error.
    fn reject(&mut self, field: &FieldSpec, message: &str) -> TurnOutcome {
        let attempts = self.state.record_rejection(&field.path);
        debug!(conversation = %self.id, field = %field.path, attempts,
               "answer rejected");

        let response = if attempts > EXPANDED_REPROMPT_AFTER {
            format!(
                "That did not work out quite well for the following reason:\n{}\n\n\
                 Let's try again. To recap, here is the original question:\n{}\n({})",
                message, field.prompt, field.description
            )
        } else {
            format!(
                "That did not work out quite well for the following reason:\n{}\n\n\
                 Let's try again. {}",
                message, field.prompt
            )
        };

        TurnOutcome {
            response,
            is_complete: false,
        }
    }

    /// Renders the collected values in interview order, with a header per
    /// group section.
    fn completion_summary(&self) -> String {
        let mut summary = String::from(
            "Excellent! That was everything I needed. Here is a summary of what you provided:\n",
        );
        let mut current_group: Option<String> = None;

        for field in self.sequence.iter() {
            let group = field.path.groups().join(".");
            if !group.is_empty() && current_group.as_deref() != Some(group.as_str()) {
                summary.push_str(&format!("\n{}:\n", group.replace('_', " ")));
            }
            current_group = Some(group.clone());

            let value = self
                .state
                .collected()
                .get(&field.path)
                .unwrap_or("Not provided");
            let indent = if group.is_empty() { "" } else { "  " };
            summary.push_str(&format!(
                "{}- {}: {}\n",
                indent,
                field.path.leaf().replace('_', " "),
                value
            ));
        }

        summary.push_str("\nThank you for providing all this information!");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::date::ChronoDateResolver;
    use crate::adapters::oracle::MockOracle;
    use crate::adapters::phone::DigitPhoneValidator;
    use crate::domain::schema::{
        default_skip_rules, letter_of_guarantee_schema, FieldType, SchemaNode,
    };
    use crate::ports::{OracleError, ValidationVerdict};
    use chrono::NaiveDate;

    fn normalizer() -> Normalizer {
        let today = NaiveDate::from_ymd_opt(2024, 12, 12).unwrap();
        Normalizer::new(
            Arc::new(ChronoDateResolver::fixed(today)),
            Arc::new(DigitPhoneValidator::japan()),
        )
    }

    fn three_field_schema() -> FormSchema {
        FormSchema {
            name: "Letter of Guarantee".to_string(),
            description: "test".to_string(),
            children: vec![
                SchemaNode::field("date", "Date?", "The date.", "", FieldType::Date),
                SchemaNode::field("name", "Name?", "Full name.", "", FieldType::PlainText),
                SchemaNode::field(
                    "nationality",
                    "Nationality?",
                    "Country.",
                    "",
                    FieldType::PlainText,
                ),
            ],
        }
    }

    fn controller_with(
        schema: &FormSchema,
        oracle: MockOracle,
        rules: SkipRuleSet,
    ) -> DialogueController {
        DialogueController::new(schema, Arc::new(oracle), normalizer(), rules).unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn empty_schema_is_fatal() {
            let schema = FormSchema {
                name: "Empty".to_string(),
                description: "".to_string(),
                children: vec![],
            };
            let result = DialogueController::new(
                &schema,
                Arc::new(MockOracle::new()),
                normalizer(),
                SkipRuleSet::none(),
            );
            assert!(matches!(result, Err(SchemaError::EmptySchema { .. })));
        }

        #[test]
        fn start_conversation_greets_and_asks_first_question() {
            let controller =
                controller_with(&three_field_schema(), MockOracle::new(), SkipRuleSet::none());
            let opening = controller.start_conversation();
            assert!(opening.contains("Letter of Guarantee"));
            assert!(opening.ends_with("Date?"));
        }
    }

    mod turns {
        use super::*;

        #[tokio::test]
        async fn three_valid_answers_complete_in_three_turns() {
            let oracle = MockOracle::new()
                .with_verdict(ValidationVerdict::valid("2024/12/17"))
                .with_verdict(ValidationVerdict::valid("Taro Yamada"))
                .with_verdict(ValidationVerdict::valid("Japan"));
            let mut controller =
                controller_with(&three_field_schema(), oracle, SkipRuleSet::none());

            let t1 = controller.process_turn("December 17, 2024").await.unwrap();
            assert!(!t1.is_complete);
            assert!(t1.response.contains("saved as 2024-12-17"));
            assert!(t1.response.contains("Next question. Name?"));

            let t2 = controller.process_turn("Taro Yamada").await.unwrap();
            assert!(!t2.is_complete);

            let t3 = controller.process_turn("Japanese").await.unwrap();
            assert!(t3.is_complete);

            let data = controller.collected_data().unwrap();
            assert_eq!(data["date"], "2024-12-17");
            assert_eq!(data["name"], "Taro Yamada");
            assert_eq!(data["nationality"], "Japan");
        }

        #[tokio::test]
        async fn rejection_keeps_cursor_and_reasks_same_question() {
            let oracle = MockOracle::new()
                .with_verdict(ValidationVerdict::invalid("asdf", "That is not a date."))
                .with_verdict(ValidationVerdict::valid("2024/12/17"));
            let mut controller =
                controller_with(&three_field_schema(), oracle, SkipRuleSet::none());

            let rejected = controller.process_turn("asdf").await.unwrap();
            assert!(!rejected.is_complete);
            assert!(rejected.response.contains("That is not a date."));
            assert!(rejected.response.contains("Let's try again. Date?"));

            // Same question answered again; now we move to the second field.
            let accepted = controller.process_turn("2024/12/17").await.unwrap();
            assert!(accepted.response.contains("Next question. Name?"));
        }

        #[tokio::test]
        async fn third_rejection_restates_the_original_question() {
            let oracle = MockOracle::new()
                .with_verdict(ValidationVerdict::invalid("x", "Not a date."))
                .with_verdict(ValidationVerdict::invalid("y", "Still not a date."))
                .with_verdict(ValidationVerdict::invalid("z", "Again not a date."));
            let mut controller =
                controller_with(&three_field_schema(), oracle, SkipRuleSet::none());

            let first = controller.process_turn("x").await.unwrap();
            let second = controller.process_turn("y").await.unwrap();
            let third = controller.process_turn("z").await.unwrap();

            assert!(!first.response.contains("To recap"));
            assert!(!second.response.contains("To recap"));
            assert!(third.response.contains("To recap, here is the original question:"));
            assert!(third.response.contains("Date?"));
            assert!(third.response.contains("The date."));
        }

        #[tokio::test]
        async fn normalization_failure_is_a_rejection_not_an_error() {
            // Oracle accepts "asdf" as a date, but the resolver cannot parse it.
            let oracle = MockOracle::new().with_verdict(ValidationVerdict::valid("asdf"));
            let mut controller =
                controller_with(&three_field_schema(), oracle, SkipRuleSet::none());

            let outcome = controller.process_turn("asdf").await.unwrap();
            assert!(!outcome.is_complete);
            assert!(outcome.response.contains("asdf"));
            assert!(outcome.response.contains("Let's try again."));
            assert!(controller.collected_data().is_err());
        }

        #[tokio::test]
        async fn oracle_boundary_failure_reasks_with_generic_message() {
            let oracle = MockOracle::new()
                .with_error(OracleError::InvalidRequest("broken".to_string()));
            let mut controller =
                controller_with(&three_field_schema(), oracle, SkipRuleSet::none());

            let outcome = controller.process_turn("2024/12/17").await.unwrap();
            assert!(!outcome.is_complete);
            assert!(outcome.response.contains("unable to process"));
            assert!(outcome.response.contains("Let's try again. Date?"));
        }

        #[tokio::test]
        async fn input_after_completion_is_refused() {
            let oracle = MockOracle::new()
                .with_verdict(ValidationVerdict::valid("2024/12/17"))
                .with_verdict(ValidationVerdict::valid("Taro Yamada"))
                .with_verdict(ValidationVerdict::valid("Japan"));
            let mut controller =
                controller_with(&three_field_schema(), oracle, SkipRuleSet::none());

            controller.process_turn("a").await.unwrap();
            controller.process_turn("b").await.unwrap();
            let last = controller.process_turn("c").await.unwrap();
            assert!(last.is_complete);

            let result = controller.process_turn("anything").await;
            assert!(matches!(result, Err(DialogueError::AlreadyComplete)));
        }

        #[tokio::test]
        async fn collected_data_is_unavailable_before_completion() {
            let controller =
                controller_with(&three_field_schema(), MockOracle::new(), SkipRuleSet::none());
            assert!(matches!(
                controller.collected_data(),
                Err(DialogueError::NotComplete)
            ));
        }

        #[tokio::test]
        async fn oracle_receives_prior_answers_as_context() {
            let oracle = MockOracle::new()
                .with_verdict(ValidationVerdict::valid("2024/12/17"))
                .with_verdict(ValidationVerdict::valid("Taro Yamada"));
            let mut controller = controller_with(
                &three_field_schema(),
                oracle.clone(),
                SkipRuleSet::none(),
            );

            controller.process_turn("the 17th").await.unwrap();
            controller.process_turn("Taro Yamada").await.unwrap();

            let calls = oracle.calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[0].context, serde_json::json!({}));
            assert_eq!(calls[1].context["date"], "2024-12-17");
        }
    }

    mod skip_rules {
        use super::*;
        use crate::domain::dialogue::{SkipRule, SkipTrigger};

        #[tokio::test]
        async fn japanese_guarantor_skips_residence_fields() {
            // Walk the full guarantee schema up to the guarantor nationality.
            let answers = [
                "2024/12/17",
                "Taro Yamada",
                "Japan",
                "Hanako Yamada",
                "100-0001 Tokyo, Chiyoda City",
                "090-1234-5678",
                "Acme Corp",
                "03-1234-5678",
                "Japan",
                "Mother",
            ];
            let mut oracle = MockOracle::new();
            for answer in answers {
                oracle = oracle.with_verdict(ValidationVerdict::valid(answer));
            }
            let mut controller = controller_with(
                &letter_of_guarantee_schema(),
                oracle,
                default_skip_rules(),
            );

            let mut last = None;
            for answer in answers {
                last = Some(controller.process_turn(answer).await.unwrap());
            }

            let last = last.unwrap();
            assert!(last.is_complete, "10 answers should finish a 12-field form");

            let data = controller.collected_data().unwrap();
            assert_eq!(data["guarantor"]["nationality"], "Japan");
            assert_eq!(data["guarantor"]["status_of_residence"], "NA");
            assert_eq!(data["guarantor"]["period_of_stay"], "NA");
            assert_eq!(data["guarantor"]["guarantor_relationship"], "Mother");
        }

        #[tokio::test]
        async fn skipped_fields_are_never_prompted() {
            let oracle = MockOracle::new().with_default_echo();
            let mut controller = controller_with(
                &letter_of_guarantee_schema(),
                oracle,
                default_skip_rules(),
            );

            // Answer everything up to and including guarantor nationality.
            for answer in [
                "2024/12/17",
                "Taro Yamada",
                "France",
                "Hanako Yamada",
                "Tokyo",
                "090-1234-5678",
                "Acme",
                "03-1234-5678",
            ] {
                controller.process_turn(answer).await.unwrap();
            }
            let outcome = controller.process_turn("Japan").await.unwrap();

            // The next prompt jumps straight to the relationship question.
            assert!(outcome.response.contains("relationship"));
            assert!(!outcome.response.contains("status of residence"));
        }

        #[tokio::test]
        async fn bypass_past_the_end_clamps_and_completes() {
            // Two-field schema with a rule that would skip five fields.
            let schema = FormSchema {
                name: "Tiny".to_string(),
                description: "".to_string(),
                children: vec![
                    SchemaNode::field("country", "Country?", "", "", FieldType::PlainText),
                    SchemaNode::field("visa", "Visa?", "", "", FieldType::PlainText),
                ],
            };
            let rules = SkipRuleSet::new(vec![SkipRule {
                field: "country".into(),
                trigger: SkipTrigger::Equals("Japan".to_string()),
                bypass: 5,
                sentinel: "NA".to_string(),
            }]);
            let oracle = MockOracle::new().with_verdict(ValidationVerdict::valid("Japan"));
            let mut controller = controller_with(&schema, oracle, rules);

            let outcome = controller.process_turn("Japan").await.unwrap();
            assert!(outcome.is_complete);

            let data = controller.collected_data().unwrap();
            assert_eq!(data["country"], "Japan");
            assert_eq!(data["visa"], "NA");
        }
    }

    mod sections {
        use super::*;

        #[tokio::test]
        async fn transition_sentence_appears_once_on_entering_guarantor() {
            let oracle = MockOracle::new().with_default_echo();
            let mut controller = controller_with(
                &letter_of_guarantee_schema(),
                oracle,
                SkipRuleSet::none(),
            );

            controller.process_turn("2024/12/17").await.unwrap();
            controller.process_turn("Taro Yamada").await.unwrap();
            let entering = controller.process_turn("France").await.unwrap();
            assert!(entering
                .response
                .contains("Now let's move on to the guarantor section."));

            let inside = controller.process_turn("Hanako Yamada").await.unwrap();
            assert!(!inside.response.contains("Now let's move on"));
        }

        #[tokio::test]
        async fn no_transition_between_top_level_fields() {
            let oracle = MockOracle::new().with_default_echo();
            let mut controller = controller_with(
                &letter_of_guarantee_schema(),
                oracle,
                SkipRuleSet::none(),
            );

            // date -> full_name -> nationality are all ungrouped leaves.
            let after_date = controller.process_turn("2024/12/17").await.unwrap();
            assert!(!after_date.response.contains("Now let's move on"));
            assert!(after_date.response.contains("What is your full name?"));

            let after_name = controller.process_turn("Taro Yamada").await.unwrap();
            assert!(!after_name.response.contains("Now let's move on"));
        }
    }

    mod summary {
        use super::*;

        #[tokio::test]
        async fn completion_summary_lists_fields_in_interview_order() {
            let oracle = MockOracle::new()
                .with_verdict(ValidationVerdict::valid("2024/12/17"))
                .with_verdict(ValidationVerdict::valid("Taro Yamada"))
                .with_verdict(ValidationVerdict::valid("Japan"));
            let mut controller =
                controller_with(&three_field_schema(), oracle, SkipRuleSet::none());

            controller.process_turn("a").await.unwrap();
            controller.process_turn("b").await.unwrap();
            let last = controller.process_turn("c").await.unwrap();

            let date_at = last.response.find("date: 2024-12-17").unwrap();
            let name_at = last.response.find("name: Taro Yamada").unwrap();
            let nat_at = last.response.find("nationality: Japan").unwrap();
            assert!(date_at < name_at && name_at < nat_at);
            assert!(last.response.contains("Thank you for providing"));
        }
    }
}
