//! Dealer inquiry email drafting: input validation, prompt construction and
//! reply parsing.
//!
//! Most dealers are Japanese and answer far more readily to a polite
//! Japanese business letter, so the model is asked for a Japanese email
//! plus an English rendering the collector can check. The model call itself
//! happens in the api crate.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const MAX_MESSAGE_LEN: usize = 2000;
pub const MAX_NAME_LEN: usize = 100;

/// What the collector wants from the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryIntent {
    Purchase,
    Question,
    Shipping,
    Other,
}

impl InquiryIntent {
    fn instruction(self) -> &'static str {
        match self {
            InquiryIntent::Purchase => {
                "The buyer wishes to purchase this item. Ask the dealer to confirm availability, \
                 the total price including shipping to the buyer's country, and accepted payment methods."
            }
            InquiryIntent::Question => {
                "The buyer has questions about this item. Ask them politely and request any \
                 additional photographs or documentation the dealer can share."
            }
            InquiryIntent::Shipping => {
                "The buyer asks about international shipping: export permits, carrier, insurance \
                 and estimated cost to the buyer's country."
            }
            InquiryIntent::Other => "Convey the buyer's message faithfully and politely.",
        }
    }
}

/// Request body for a draft.
#[derive(Debug, Clone, Deserialize)]
pub struct InquiryInput {
    pub listing_id: DbId,
    pub buyer_name: String,
    pub buyer_country: String,
    pub intent: InquiryIntent,
    #[serde(default)]
    pub message: Option<String>,
}

/// Listing context injected into the prompt.
#[derive(Debug, Clone)]
pub struct InquiryListingContext {
    pub title: String,
    pub url: String,
    pub dealer_name: String,
    pub price_display: Option<String>,
    pub cert_label: Option<String>,
    pub artisan: Option<String>,
}

pub fn validate_inquiry(input: &InquiryInput) -> Vec<String> {
    let mut errors = Vec::new();
    if input.listing_id <= 0 {
        errors.push("listing_id must be positive".to_string());
    }
    let name = input.buyer_name.trim();
    if name.is_empty() {
        errors.push("buyer_name is required".to_string());
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(format!("buyer_name must be at most {MAX_NAME_LEN} characters"));
    }
    if input.buyer_country.trim().is_empty() {
        errors.push("buyer_country is required".to_string());
    }
    if let Some(msg) = &input.message {
        if msg.chars().count() > MAX_MESSAGE_LEN {
            errors.push(format!("message must be at most {MAX_MESSAGE_LEN} characters"));
        }
    }
    if input.intent == InquiryIntent::Other
        && input.message.as_deref().map_or(true, |m| m.trim().is_empty())
    {
        errors.push("message is required when intent is 'other'".to_string());
    }
    errors
}

/// System + user message pair for a chat completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryPrompt {
    pub system: String,
    pub user: String,
}

const SYSTEM_PROMPT: &str = "\
You write inquiry emails from overseas collectors to Japanese sword and fittings dealers.
Write the Japanese email in formal business Japanese (keigo): open with a seasonal-neutral \
greeting, introduce the buyer by name and country, reference the item by its title and URL, \
state the request, and close with a courteous sign-off. Do not invent facts about the item. \
Do not promise payment or commit the buyer to a purchase.
Reply with a single JSON object and nothing else, with exactly these string fields:
\"subject_ja\", \"subject_en\", \"body_ja\", \"body_en\". \
\"body_en\" is a faithful English rendering of \"body_ja\".";

pub fn build_inquiry_prompt(input: &InquiryInput, listing: &InquiryListingContext) -> InquiryPrompt {
    let mut user = String::new();
    user.push_str("Item:\n");
    user.push_str(&format!("- Title: {}\n", listing.title));
    user.push_str(&format!("- URL: {}\n", listing.url));
    user.push_str(&format!("- Dealer: {}\n", listing.dealer_name));
    if let Some(price) = &listing.price_display {
        user.push_str(&format!("- Listed price: {price}\n"));
    } else {
        user.push_str("- Listed price: price on request\n");
    }
    if let Some(cert) = &listing.cert_label {
        user.push_str(&format!("- Certification: {cert}\n"));
    }
    if let Some(artisan) = &listing.artisan {
        user.push_str(&format!("- Attributed to: {artisan}\n"));
    }
    user.push_str("\nBuyer:\n");
    user.push_str(&format!("- Name: {}\n", input.buyer_name.trim()));
    user.push_str(&format!("- Country: {}\n", input.buyer_country.trim()));
    user.push_str(&format!("\nRequest: {}\n", input.intent.instruction()));
    if let Some(msg) = input.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        user.push_str(&format!("\nBuyer's own words (translate and incorporate):\n{msg}\n"));
    }

    InquiryPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// A validated draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject_ja: String,
    pub subject_en: String,
    pub body_ja: String,
    pub body_en: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DraftParseError {
    #[error("reply is not a JSON object: {0}")]
    NotJson(String),
    #[error("reply field '{0}' is missing or empty")]
    MissingField(&'static str),
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse and validate the model's reply.
pub fn parse_draft_response(raw: &str) -> Result<EmailDraft, DraftParseError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| DraftParseError::NotJson(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| DraftParseError::NotJson("top-level value is not an object".into()))?;

    let field = |name: &'static str| -> Result<String, DraftParseError> {
        obj.get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or(DraftParseError::MissingField(name))
    };

    Ok(EmailDraft {
        subject_ja: field("subject_ja")?,
        subject_en: field("subject_en")?,
        body_ja: field("body_ja")?,
        body_en: field("body_en")?,
    })
}

/// Draft returned when the model is unavailable: a template the collector
/// can fill in by hand.
pub fn placeholder_draft(input: &InquiryInput, listing: &InquiryListingContext) -> EmailDraft {
    let name = input.buyer_name.trim();
    let country = input.buyer_country.trim();
    EmailDraft {
        subject_ja: format!("お問い合わせ：{}", listing.title),
        subject_en: format!("Inquiry: {}", listing.title),
        body_ja: format!(
            "{dealer} 御中\n\n突然のご連絡失礼いたします。{country}在住の{name}と申します。\n\
             貴店の「{title}」（{url}）について問い合わせをさせていただきたく存じます。\n\n\
             [ご質問内容をご記入ください]\n\nどうぞよろしくお願い申し上げます。\n{name}",
            dealer = listing.dealer_name,
            title = listing.title,
            url = listing.url,
        ),
        body_en: format!(
            "Dear {dealer},\n\nMy name is {name} and I live in {country}. \
             I am writing about \"{title}\" ({url}).\n\n[Write your question here]\n\n\
             Kind regards,\n{name}",
            dealer = listing.dealer_name,
            title = listing.title,
            url = listing.url,
        ),
    }
}
