//! Context assembly
//!
//! [`ContextBuilder`] takes an immutable [`Payload`] and runs it through each
//! stage in turn. Every stage consumes the context and returns a new one, so
//! no stage iterates a map while editing it.

use chrono::NaiveDate;
use tracing::debug;

use crate::clause::apply_clause;
use crate::contracts::apply_contract_list;
use crate::dates::{apply_date_fields, today};
use crate::money::{expand_float_fields, format_monetary_fields};
use crate::normalize::{ingest, normalize, Payload};
use crate::value::{Context, Value};

/// Header fields rendered in capitals
pub const UPPERCASE_FIELDS: [&str; 5] = [
    "CIDADE",
    "ESTADO",
    "TIPO_ORGAO",
    "NOME_COMPLETO",
    "NOME_EMPRESA",
];

/// Builds the template context for one request
#[derive(Debug, Clone)]
pub struct ContextBuilder<'a> {
    payload: &'a Payload,
    date: Option<NaiveDate>,
}

impl<'a> ContextBuilder<'a> {
    /// Start from a payload
    pub fn new(payload: &'a Payload) -> Self {
        Self {
            payload,
            date: None,
        }
    }

    /// Use a fixed signature date instead of today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Run all stages
    pub fn build(&self) -> Context {
        let ctx = ingest(self.payload);
        let ctx = format_monetary_fields(ctx);
        let ctx = expand_float_fields(ctx);
        let ctx = normalize(ctx);
        let ctx = uppercase_header_fields(ctx);
        let ctx = apply_date_fields(ctx, self.date.unwrap_or_else(today));
        let ctx = apply_clause(ctx);
        let ctx = apply_contract_list(ctx);
        debug!(fields = ctx.len(), "context built");
        ctx
    }
}

/// Shorthand for `ContextBuilder::new(payload).build()`
pub fn build_context(payload: &Payload) -> Context {
    ContextBuilder::new(payload).build()
}

/// Uppercase the header fields that hold non-empty text
pub fn uppercase_header_fields(ctx: Context) -> Context {
    UPPERCASE_FIELDS.iter().fold(ctx, |ctx, field| {
        ctx.map_value(field, |value| match value {
            Value::Text(s) if !s.is_empty() => Value::Text(s.to_uppercase()),
            other => other,
        })
    })
}
