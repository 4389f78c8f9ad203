//! Hidden form state carried between postbacks.

pub const VIEW_STATE: &str = "__VIEWSTATE";
pub const EVENT_VALIDATION: &str = "__EVENTVALIDATION";
pub const VIEW_STATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";
pub const EVENT_TARGET: &str = "__EVENTTARGET";
pub const EVENT_ARGUMENT: &str = "__EVENTARGUMENT";

/// The three opaque tokens a postback must echo back.
///
/// A token missing from a response is held as an empty string. A fresh
/// `PageState` is extracted from every response and replaces the previous
/// one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub view_state: String,
    pub event_validation: String,
    pub generator: String,
}

impl PageState {
    /// True when the page carried none of the tokens.
    pub fn is_empty(&self) -> bool {
        self.view_state.is_empty() && self.event_validation.is_empty() && self.generator.is_empty()
    }

    /// Form body that "clicks" the control named by `event_target`.
    pub fn postback_form(&self, event_target: &str) -> Vec<(String, String)> {
        [
            (EVENT_TARGET, event_target),
            (EVENT_ARGUMENT, ""),
            (VIEW_STATE, self.view_state.as_str()),
            (VIEW_STATE_GENERATOR, self.generator.as_str()),
            (EVENT_VALIDATION, self.event_validation.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postback_form_carries_tokens_and_empty_argument() {
        let state = PageState {
            view_state: "vs".into(),
            event_validation: "ev".into(),
            generator: String::new(),
        };
        let form = state.postback_form("ctl00$pager$btnNo2");

        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get(EVENT_TARGET), Some("ctl00$pager$btnNo2"));
        assert_eq!(get(EVENT_ARGUMENT), Some(""));
        assert_eq!(get(VIEW_STATE), Some("vs"));
        assert_eq!(get(VIEW_STATE_GENERATOR), Some(""));
        assert_eq!(get(EVENT_VALIDATION), Some("ev"));
        assert_eq!(form.len(), 5);
    }

    #[test]
    fn test_is_empty() {
        assert!(PageState::default().is_empty());
        let state = PageState {
            generator: "CA0B0334".into(),
            ..PageState::default()
        };
        assert!(!state.is_empty());
    }
}
