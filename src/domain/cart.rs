//! Cart Aggregate

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::events::CartEvent;
use crate::domain::value_objects::{effective_quantity, PriceField};

/// Secondary selection attributes that split one product into distinct cart
/// lines. The persisted record always carries `color`; `storage` (shoe size
/// on some screens) is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl Variant {
    pub fn color(color: impl Into<String>) -> Self {
        Self { color: color.into(), storage: None }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Upstream screens pass the id as either a string or a number; it is
    /// normalized to a string here so identity matching never depends on
    /// the wire type.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Raw persisted price; entries without one contribute 0 to the total
    /// but stay in the cart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceField>,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(flatten)]
    pub variant: Variant,
}

fn default_quantity() -> u32 {
    1
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

impl CartLine {
    /// Line identity: same product id AND same variant attributes.
    pub fn matches(&self, id: &str, variant: &Variant) -> bool {
        self.id == id && self.variant == *variant
    }

    pub fn line_total(&self) -> f64 {
        match &self.price {
            Some(price) => price.normalize() * f64::from(effective_quantity(self.quantity)),
            None => 0.0,
        }
    }
}

/// Pure total over a set of lines; entries without a price are skipped.
pub fn total_of(items: &[CartLine]) -> f64 {
    items.iter().map(CartLine::line_total).sum()
}

/// The cart: an ordered sequence of lines plus a derived total.
///
/// `total` is a cached value; every mutation recomputes it, so it always
/// equals `Σ normalize(price) × max(1, quantity)` over the lines.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    items: Vec<CartLine>,
    #[serde(default)]
    total: f64,
    #[serde(skip)]
    events: Vec<CartEvent>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a line, merging by identity: an existing line with the same
    /// `(id, variant)` grows its quantity; otherwise the line is appended.
    /// Repeated identical adds grow quantity, never line count.
    pub fn add_line(&mut self, line: CartLine) {
        let incoming = effective_quantity(line.quantity);
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|l| l.matches(&line.id, &line.variant))
        {
            existing.quantity = existing.quantity.saturating_add(incoming);
            let quantity = existing.quantity;
            self.raise_event(CartEvent::LineMerged { id: line.id, quantity });
        } else {
            self.raise_event(CartEvent::LineAdded { id: line.id.clone(), quantity: incoming });
            self.items.push(CartLine { quantity: incoming, ..line });
        }
        self.recalculate();
    }

    /// Sets the matching line's quantity, floored at 1; dropping a line is
    /// the explicit `remove_line` action, never a quantity update. An
    /// unknown identity is a no-op.
    pub fn set_quantity(&mut self, id: &str, variant: &Variant, quantity: i64) {
        let quantity = quantity.clamp(1, i64::from(u32::MAX)) as u32;
        if let Some(line) = self.items.iter_mut().find(|l| l.matches(id, variant)) {
            line.quantity = quantity;
            self.raise_event(CartEvent::QuantityChanged { id: id.to_string(), quantity });
            self.recalculate();
        }
    }

    /// Removes the line with exactly this identity; other variants of the
    /// same product are untouched.
    pub fn remove_line(&mut self, id: &str, variant: &Variant) {
        let before = self.items.len();
        self.items.retain(|l| !l.matches(id, variant));
        if self.items.len() != before {
            self.raise_event(CartEvent::LineRemoved { id: id.to_string() });
            self.recalculate();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.raise_event(CartEvent::Cleared);
        self.recalculate();
    }

    pub fn take_events(&mut self) -> Vec<CartEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise_event(&mut self, e: CartEvent) {
        self.events.push(e);
    }

    pub(crate) fn recalculate(&mut self) {
        self.total = total_of(&self.items);
    }
}
