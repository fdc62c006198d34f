//! Channel engine: per-channel encoding state and its current/previous lookup tables.
//!
//! A [`Channel`] binds one visual property ([`ChannelKind`]) to a data field. Every
//! [`Channel::update`] resolves domain, range and transform (explicit value, then the
//! field's cached domain, then the catalog default), rebuilds the table and publishes two
//! snapshots to the rendering backend: the table before the update ("previous") and after
//! it ("current"), so the renderer can animate between them.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::{extent, DataSource};
use crate::error::{Error, Result};
use crate::expr::Lambda;
use crate::palette::Palettes;
use crate::scale::{Extent, Scale, Transform};
use crate::table::{codec, table_bytes, TableBackend, TableHandle, TABLE_SIZE};

pub mod encoding;
pub mod filter;
pub mod kind;

pub use encoding::{Encoding, EncodingInput, FilterEncoding, RangeSpec};
pub use kind::{ChannelKind, Packing, DEFAULT_COLOR};

/// Domain reported while no field (or no data) is available.
const FALLBACK_DOMAIN: Extent = [1.0, 1.0];

/// Configuration shared by the channels of one engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Entries per table. Fixed for the lifetime of a channel.
    pub table_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            table_size: TABLE_SIZE,
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of table entries.
    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.table_size < 4 {
            return Err(Error::InvalidConfig("table_size must be >= 4".into()));
        }
        if self.table_size % 2 != 0 {
            return Err(Error::InvalidConfig("table_size must be even".into()));
        }
        if u32::try_from(self.table_size).is_err() {
            return Err(Error::InvalidConfig("table_size must fit in u32".into()));
        }
        Ok(())
    }
}

/// One visual channel and its double-buffered lookup table.
pub struct Channel {
    kind: ChannelKind,
    table_size: usize,
    palettes: Arc<Palettes>,
    source: Option<Arc<dyn DataSource>>,

    field: Option<String>,
    domain: Option<Extent>,
    range: Option<RangeSpec>,
    transform: Option<Transform>,
    lambda: Option<Lambda>,

    last_field: Option<String>,
    last_domain: Option<Extent>,
    last_range: Option<RangeSpec>,

    /// Per-field default domains, filled on first use and never invalidated.
    domains: RefCell<HashMap<String, Extent>>,

    current: Vec<u8>,
    previous: Vec<u8>,
    current_handle: Box<dyn TableHandle>,
    previous_handle: Box<dyn TableHandle>,
}

impl Channel {
    /// Create a channel and its two backend tables, both holding the idle default.
    ///
    /// Tables are created previous first, then current.
    pub fn new(
        kind: ChannelKind,
        config: &ChannelConfig,
        backend: &mut dyn TableBackend,
        palettes: Arc<Palettes>,
    ) -> Result<Self> {
        config.validate()?;
        if palettes.table_size() != config.table_size {
            return Err(Error::InvalidConfig(format!(
                "palettes hold {} entries but channel tables hold {}",
                palettes.table_size(),
                config.table_size
            )));
        }

        let table_size = config.table_size;
        let current = kind.default_table(table_size);
        let previous = current.clone();
        let height = table_height(table_size);
        let previous_handle = backend.create_table(&previous, 1, height);
        let current_handle = backend.create_table(&current, 1, height);

        Ok(Self {
            kind,
            table_size,
            palettes,
            source: None,
            field: None,
            domain: None,
            range: None,
            transform: None,
            lambda: None,
            last_field: None,
            last_domain: None,
            last_range: None,
            domains: RefCell::new(HashMap::new()),
            current,
            previous,
            current_handle,
            previous_handle,
        })
    }

    /// Attach the data source used for domains and expressions.
    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace (or detach) the data source. Cached domains are kept.
    pub fn set_source(&mut self, source: Option<Arc<dyn DataSource>>) {
        self.source = source;
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Currently bound field.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Field bound before the most recent clear or rebinding.
    pub fn last_field(&self) -> Option<&str> {
        self.last_field.as_deref()
    }

    /// Domain in effect just before the most recent update.
    pub fn last_domain(&self) -> Option<Extent> {
        self.last_domain
    }

    /// Range in effect just before the most recent update.
    pub fn last_range(&self) -> Option<&RangeSpec> {
        self.last_range.as_ref()
    }

    /// Source text of the bound expression, if any.
    pub fn lambda_source(&self) -> Option<&str> {
        self.lambda.as_ref().map(Lambda::source)
    }

    /// Explicit domain, else the bound field's cached domain, else `[1, 1]`.
    pub fn domain(&self) -> Extent {
        self.domain.unwrap_or_else(|| self.default_domain())
    }

    /// Explicit range, else the catalog default.
    pub fn range(&self) -> RangeSpec {
        self.range
            .clone()
            .unwrap_or_else(|| self.kind.default_range())
    }

    /// Explicit transform, else the catalog default.
    pub fn transform(&self) -> Transform {
        self.transform
            .unwrap_or_else(|| self.kind.default_transform())
    }

    /// Change-detection key over field, domain, range and transform.
    pub fn key(&self) -> String {
        let [d0, d1] = self.domain();
        format!(
            "{}|{d0},{d1}|{}|{}",
            self.field.as_deref().unwrap_or("undefined"),
            self.range(),
            self.transform()
        )
    }

    /// Table as last published to the "current" slot.
    pub fn current_table(&self) -> &[u8] {
        &self.current
    }

    /// Table as last published to the "previous" slot.
    pub fn previous_table(&self) -> &[u8] {
        &self.previous
    }

    /// Current table decoded to reals; `None` for colour channels.
    pub fn decoded_table(&self) -> Option<Vec<f64>> {
        match self.kind.packing() {
            Packing::Float => Some(codec::decode_all(&self.current)),
            Packing::Rgba => None,
        }
    }

    /// Reset to the idle table and forget the encoding. Idempotent.
    pub fn clear(&mut self) {
        let defaults = self.kind.default_table(self.table_size);
        self.commit(defaults);
        if let Some(field) = self.field.take() {
            self.last_field = Some(field);
        }
        self.domain = None;
        self.range = None;
        self.transform = None;
        self.lambda = None;
        debug!("Cleared {} channel.", self.label());
    }

    /// Apply a new encoding and publish previous/current tables.
    ///
    /// Fails only when an expression cannot be compiled; in that case nothing changes.
    pub fn update(&mut self, input: impl Into<EncodingInput>) -> Result<()> {
        let mut encoding = match input.into() {
            EncodingInput::Null => {
                self.clear();
                return Ok(());
            }
            EncodingInput::Constant(value) => Encoding {
                range: Some(RangeSpec::constant(value)),
                ..Encoding::default()
            },
            EncodingInput::Expression(text) => Encoding {
                lambda: Some(text),
                ..Encoding::default()
            },
            EncodingInput::Spec(encoding) => encoding,
        };

        // The expression's parameter name wins over any field given alongside it.
        let lambda = match encoding.lambda.as_deref() {
            Some(text) => {
                let lambda = Lambda::parse(text)?;
                encoding.field = Some(lambda.field().to_string());
                Some(lambda)
            }
            None => None,
        };

        let previous_field = self.field.clone();
        if encoding.field != self.field {
            self.clear();
        }
        self.last_field = previous_field;
        self.last_domain = Some(self.domain());
        self.last_range = Some(self.range());

        self.field = encoding.field;
        self.domain = encoding.domain;
        self.range = encoding.range;
        self.transform = encoding.transform;
        self.lambda = lambda;
        self.warn_if_column_missing();

        self.previous.copy_from_slice(&self.current);
        let height = table_height(self.table_size);
        self.previous_handle.publish(&self.previous, 1, height);

        let mut scratch = self.current.clone();
        match &self.lambda {
            Some(lambda) => self.encode_lambda(lambda, &mut scratch),
            None => self.encode_range(&mut scratch),
        }
        self.commit(scratch);

        debug!(
            "Updated {} channel: {}{}",
            self.label(),
            self.key(),
            self.lambda_source()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default()
        );
        Ok(())
    }

    /// Copy `table` into the current slot and publish it.
    fn commit(&mut self, table: Vec<u8>) {
        debug_assert_eq!(table.len(), table_bytes(self.table_size));
        self.current = table;
        let height = table_height(self.table_size);
        self.current_handle.publish(&self.current, 1, height);
    }

    fn default_domain(&self) -> Extent {
        let Some(field) = self.field.as_deref() else {
            return FALLBACK_DOMAIN;
        };
        if let Some(domain) = self.domains.borrow().get(field) {
            return *domain;
        }
        let Some(source) = self.available_source() else {
            return FALLBACK_DOMAIN;
        };
        let Some(column) = source.column(field) else {
            debug!("No column '{}'; domain falls back to {:?}.", field, FALLBACK_DOMAIN);
            return FALLBACK_DOMAIN;
        };

        let domain = if column.is_categorical() {
            [0.0, (self.table_size - 1) as f64]
        } else {
            extent(&column.values()).unwrap_or_else(|| {
                debug!("Field '{}' has no values; using {:?}.", field, FALLBACK_DOMAIN);
                FALLBACK_DOMAIN
            })
        };
        self.domains.borrow_mut().insert(field.to_string(), domain);
        domain
    }

    fn warn_if_column_missing(&self) {
        let (Some(field), Some(source)) = (self.field.as_deref(), self.available_source()) else {
            return;
        };
        if source.column(field).is_none() {
            warn!("Unknown field '{}' for {} channel.", field, self.label());
        }
    }

    fn available_source(&self) -> Option<&dyn DataSource> {
        self.source.as_deref().filter(|s| s.is_available())
    }

    /// Plain path: sample the configured scale (float) or copy palette bytes (colour).
    fn encode_range(&self, table: &mut [u8]) {
        let range = self.range();
        match self.kind.packing() {
            Packing::Rgba => match &range {
                RangeSpec::Palette(name) => match self.palettes.get(name) {
                    Some(bytes) => table.copy_from_slice(bytes),
                    None => warn!("Palette '{}' unknown; color table unchanged.", name),
                },
                RangeSpec::Bytes(bytes) if bytes.len() == table.len() => {
                    table.copy_from_slice(bytes)
                }
                other => warn!("Color range {} unknown; color table unchanged.", other),
            },
            Packing::Float => match range.as_extent() {
                Some(extent) => {
                    let scale = Scale::index(self.transform(), self.table_size, extent);
                    codec::encode_into(
                        (0..self.table_size).map(|i| scale.apply(i as f64)),
                        table,
                    );
                }
                None => warn!(
                    "Range {} is not numeric; {} table unchanged.",
                    range,
                    self.label()
                ),
            },
        }
    }

    /// Expression path: map each index to a field value, apply the expression, pack.
    fn encode_lambda(&self, lambda: &Lambda, table: &mut [u8]) {
        match self.lambda_inputs() {
            Some(inputs) => codec::encode_into(inputs.into_iter().map(|v| lambda.call(v)), table),
            None => codec::encode_into(std::iter::repeat(1.0).take(self.table_size), table),
        }
    }

    /// Field value behind every table index, or `None` when there is nothing to read.
    ///
    /// Continuous fields always use a linear index-to-domain map, whatever the transform.
    fn lambda_inputs(&self) -> Option<Vec<f64>> {
        let n = self.table_size;
        let field = self.field.as_deref()?;
        let source = self.available_source()?;
        let Some(column) = source.column(field) else {
            debug!("No column '{}'; expression table is constant 1.", field);
            return None;
        };

        if !column.is_categorical() {
            let scale = Scale::linear([0.0, (n - 1) as f64], self.domain());
            return Some(scale.sample(n));
        }

        let Some(dictionary) = source.dictionary(field) else {
            warn!("Categorical field '{}' has no dictionary.", field);
            return Some(vec![f64::NAN; n]);
        };
        let mut misses = 0usize;
        let inputs: Vec<f64> = (0..n)
            .map(|code| {
                dictionary.get(code).unwrap_or_else(|| {
                    misses += 1;
                    f64::NAN
                })
            })
            .collect();
        if misses > 0 {
            warn!(
                "{} of {} codes of '{}' have no dictionary entry; they evaluate as NaN.",
                misses, n, field
            );
        }
        Some(inputs)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("kind", &self.kind)
            .field("table_size", &self.table_size)
            .field("field", &self.field)
            .field("domain", &self.domain)
            .field("range", &self.range)
            .field("transform", &self.transform)
            .field("lambda", &self.lambda_source())
            .field("last_field", &self.last_field)
            .finish_non_exhaustive()
    }
}

#[inline]
fn table_height(table_size: usize) -> u32 {
    // `ChannelConfig::validate` guarantees the size fits.
    u32::try_from(table_size).unwrap_or(u32::MAX)
}
