//! Built-in letter-of-guarantee schema.
//!
//! The prompts, descriptions and validation-policy texts here are authored
//! for the oracle: the engine forwards them verbatim and never interprets
//! them. Phone policies spell out the digit-preservation contract so the
//! oracle's extracted value keeps the user's original digits even when
//! rejecting.

use crate::domain::dialogue::{SkipRule, SkipRuleSet, SkipTrigger};

use super::field::FieldType;
use super::node::{FormSchema, SchemaNode};

const COUNTRY_POLICY: &str = "Check against a list of countries if the input is a valid country. \
    Convert adjective to noun if needed, e.g. 'Japanese' to 'Japan', or 'American' to \
    'United States of America'. The name of the country should be a valid name in English.";

const FULL_NAME_POLICY: &str =
    "The name must be a non-empty string. It should at least contain a first name and a last name.";

const PHONE_POLICY: &str = "1. The phone number should be a valid Japanese phone number. It should \
    start with a country code +81 or 0, followed by 9 to 11 digits.\n\
    2. Return the EXACT input with only formatting changes if needed (like adding hyphens).\n\
    3. If you need to reformat, only add separators - NEVER change digits.\n\
    4. If the input is invalid, set is_valid to false but still preserve the original digits \
    in the extracted value.";

/// The letter-of-guarantee form: three applicant fields followed by the
/// guarantor section.
pub fn letter_of_guarantee_schema() -> FormSchema {
    FormSchema {
        name: "Letter of Guarantee".to_string(),
        description: "Form fields for the letter of guarantee.".to_string(),
        children: vec![
            SchemaNode::field(
                "date",
                "What date do you want to put on this form?",
                "Date for this form.",
                "Should be a valid date in any format.",
                FieldType::Date,
            ),
            SchemaNode::field(
                "full_name",
                "What is your full name?",
                "Full name of the person filling this form.",
                FULL_NAME_POLICY,
                FieldType::PlainText,
            ),
            SchemaNode::field(
                "nationality",
                "What is your nationality?",
                "Nationality of the person filling this form.",
                COUNTRY_POLICY,
                FieldType::PlainText,
            ),
            SchemaNode::group(
                "guarantor",
                vec![
                    SchemaNode::field(
                        "name",
                        "Could you please provide the full name of your guarantor?",
                        "The full name of the guarantor.",
                        FULL_NAME_POLICY,
                        FieldType::PlainText,
                    ),
                    SchemaNode::field(
                        "address_in_japan",
                        "What is the address of your guarantor in Japan? Please provide the \
                         full address including postal code.",
                        "The address of the guarantor in Japan.",
                        "The address should be a valid address in Japan in the format Postal \
                         Code, Prefecture, City, Building Name (if applicable).",
                        FieldType::PlainText,
                    ),
                    SchemaNode::field(
                        "guarantor_phone_number",
                        "What is your guarantor's phone number in Japan?",
                        "The phone number of the guarantor in Japan.",
                        PHONE_POLICY,
                        FieldType::PhoneNumber,
                    ),
                    SchemaNode::field(
                        "place_of_employment",
                        "Where does your guarantor work?",
                        "The place of employment of the guarantor.",
                        "The place of employment can be a company name, organization, or \
                         institution. It should not be empty.",
                        FieldType::PlainText,
                    ),
                    SchemaNode::field(
                        "occupation_phone_number",
                        "What is the phone number of your guarantor's place of employment?",
                        "The phone number of the guarantor's place of employment.",
                        PHONE_POLICY,
                        FieldType::PhoneNumber,
                    ),
                    SchemaNode::field(
                        "nationality",
                        "What is your guarantor's nationality?",
                        "The nationality of the guarantor.",
                        COUNTRY_POLICY,
                        FieldType::PlainText,
                    ),
                    SchemaNode::field(
                        "status_of_residence",
                        "What is your guarantor's status of residence in Japan?",
                        "The status of residence of the guarantor.",
                        "Check against a list of valid statuses of residence in Japan. It \
                         should be a valid status such as 'Permanent Resident', 'Student', \
                         'Work Visa', etc.",
                        FieldType::PlainText,
                    ),
                    SchemaNode::field(
                        "period_of_stay",
                        "If your guarantor is not a Japanese citizen, what is their period of \
                         stay in Japan? Please provide the start and end dates.",
                        "The period of stay of the guarantor if they are not a Japanese citizen.",
                        "Should be a valid date range.",
                        FieldType::PlainText,
                    ),
                    SchemaNode::field(
                        "guarantor_relationship",
                        "What is your relationship with the guarantor?",
                        "The relationship of the guarantor to the user.",
                        "The relationship should be a valid relationship such as 'Parent', \
                         'Sibling', 'Friend', 'Colleague', etc. It should not be empty.",
                        FieldType::PlainText,
                    ),
                ],
            ),
        ],
    }
}

/// Dependent-field rules shipped with the letter-of-guarantee schema.
///
/// A Japanese guarantor has no status of residence or period of stay, so
/// both are auto-filled with the sentinel and never asked.
pub fn default_skip_rules() -> SkipRuleSet {
    SkipRuleSet::new(vec![SkipRule {
        field: "guarantor.nationality".into(),
        trigger: SkipTrigger::Equals("Japan".to_string()),
        bypass: 2,
        sentinel: "NA".to_string(),
    }])
}
