//! Hidden-state extraction.
//!
//! Pulls the view-state, event-validation and generator tokens out of a
//! rendered ASP.NET page so the next postback can echo them back.

use scraper::{Html, Selector};

use crate::models::PageState;
use crate::models::form::{EVENT_VALIDATION, VIEW_STATE, VIEW_STATE_GENERATOR};

/// Stateless extractor for the postback tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct StateExtractor;

impl StateExtractor {
    /// Extract the three tokens; any token not on the page comes back empty.
    pub fn extract(document: &Html) -> PageState {
        PageState {
            view_state: Self::hidden_value(document, VIEW_STATE),
            event_validation: Self::hidden_value(document, EVENT_VALIDATION),
            generator: Self::hidden_value(document, VIEW_STATE_GENERATOR),
        }
    }

    /// Value of the `<input>` whose id (or, failing that, name) is `key`.
    fn hidden_value(document: &Html, key: &str) -> String {
        let Ok(input_selector) = Selector::parse("input") else {
            return String::new();
        };

        let inputs: Vec<_> = document.select(&input_selector).collect();
        inputs
            .iter()
            .find(|el| el.value().id() == Some(key))
            .or_else(|| inputs.iter().find(|el| el.value().attr("name") == Some(key)))
            .and_then(|el| el.value().attr("value"))
            .unwrap_or_default()
            .to_string()
    }
}
