//! Cart domain events

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    LineAdded { id: String, quantity: u32 },
    LineMerged { id: String, quantity: u32 },
    QuantityChanged { id: String, quantity: u32 },
    LineRemoved { id: String },
    Cleared,
}
