//! Boolean entry point of the filter channel.
use crate::channel::{Channel, ChannelKind, Encoding, FilterEncoding};
use crate::error::{Error, Result};
use crate::expr::{normalize_body, split_lambda};

/// Parameter name used when a filter expression has no `"<param> =>"` prefix.
const DEFAULT_PARAM: &str = "x";

impl Channel {
    /// Set the filter from a boolean expression; entries are 1 where it holds, else 0.
    ///
    /// Accepts a bare body (`"x > 5"`), a full lambda (`"year => year > 2000"`) or a
    /// [`FilterEncoding::Lambda`]; with no expression at all every point passes.
    pub fn update_filter(&mut self, encoding: impl Into<FilterEncoding>) -> Result<()> {
        if self.kind() != ChannelKind::Filter {
            return Err(Error::UnsupportedOperation(format!(
                "update_filter on the {} channel",
                self.label()
            )));
        }

        let (field, text) = match encoding.into() {
            FilterEncoding::Expression(text) => (None, Some(text)),
            FilterEncoding::Lambda { field, lambda } => (field, lambda),
        };
        let (param, body) = match text.as_deref() {
            None => (DEFAULT_PARAM, "true"),
            Some(text) if text.contains("=>") => split_lambda(text)?,
            Some(text) => (DEFAULT_PARAM, text.trim()),
        };

        let lambda = format!("{param} => {}", normalize_body(body));
        let field = field.unwrap_or_else(|| param.to_string());
        self.update(Encoding {
            field: Some(field),
            lambda: Some(lambda),
            ..Encoding::default()
        })
    }
}
