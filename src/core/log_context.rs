//! Request-scoped context for structured logging
//!
//! A [`Context`] carries an ordered, append-only list of fields and,
//! optionally, a bound [`Logger`]. Attaching fields never mutates the list
//! held by the parent context: the list is copied and extended, and the new
//! context owns the result. Sibling contexts derived from one parent therefore
//! never observe each other's additions.
//!
//! # Example
//!
//! ```
//! use teelog::{fields_from_context, store_fields, Field};
//!
//! let parent = store_fields(None, [Field::new("tenant", "acme")]);
//! let a = store_fields(Some(&parent), [Field::new("request_id", "a")]);
//! let b = store_fields(Some(&parent), [Field::new("request_id", "b")]);
//!
//! assert_eq!(fields_from_context(Some(&parent)).len(), 1);
//! assert_eq!(fields_from_context(Some(&a))[1].value.to_string(), "a");
//! assert_eq!(fields_from_context(Some(&b))[1].value.to_string(), "b");
//! ```

use super::field::{Field, FieldValue};
use super::logger::Logger;
use std::fmt;
use std::sync::Arc;

/// Header carrying the request identifier, also used as its field key
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Immutable request-scoped state read at logging call sites
#[derive(Clone, Default)]
pub struct Context {
    fields: Arc<Vec<Field>>,
    logger: Option<Logger>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new context whose field list is this one's plus `fields`
    #[must_use]
    pub fn with_fields<I>(&self, fields: I) -> Context
    where
        I: IntoIterator,
        I::Item: Into<Field>,
    {
        let added = fields.into_iter().map(Into::into);
        let mut next = Vec::with_capacity(self.fields.len() + added.size_hint().0);
        next.extend_from_slice(&self.fields);
        next.extend(added);

        Context {
            fields: Arc::new(next),
            logger: self.logger.clone(),
        }
    }

    /// Return a new context with `key = value` appended
    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Context {
        self.with_fields([Field::new(key, value)])
    }

    /// Return a new context bound to `logger`
    #[must_use]
    pub fn with_logger(&self, logger: Logger) -> Context {
        Context {
            fields: Arc::clone(&self.fields),
            logger: Some(logger),
        }
    }

    /// Fields attached so far, in attachment order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Logger bound with [`Context::with_logger`], if any
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("fields", &self.fields)
            .field("has_logger", &self.logger.is_some())
            .finish()
    }
}

/// Attach `fields` to `ctx`, starting from an empty list when `ctx` is absent
pub fn store_fields<I>(ctx: Option<&Context>, fields: I) -> Context
where
    I: IntoIterator,
    I::Item: Into<Field>,
{
    match ctx {
        Some(ctx) => ctx.with_fields(fields),
        None => Context::new().with_fields(fields),
    }
}

/// Fields attached to `ctx`; empty when `ctx` is absent or has none
pub fn fields_from_context(ctx: Option<&Context>) -> &[Field] {
    ctx.map(Context::fields).unwrap_or(&[])
}

/// Attach a request identifier under [`REQUEST_ID_HEADER`]
pub fn with_request_id(ctx: Option<&Context>, id: impl Into<String>) -> Context {
    store_fields(ctx, [Field::string(REQUEST_ID_HEADER, id)])
}

/// Most recently attached request identifier
pub fn request_id(ctx: &Context) -> Option<&str> {
    ctx.fields()
        .iter()
        .rev()
        .find(|field| field.key == REQUEST_ID_HEADER)
        .and_then(|field| match &field.value {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        })
}
