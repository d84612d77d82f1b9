use serde::{Deserialize, Serialize};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Advisory token lifetime; the client does no expiry tracking of its own.
    #[serde(default = "default_expiry_days")]
    pub expires_in_days: u32,
    pub role: String,
    pub token: String,
}

fn default_expiry_days() -> u32 {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub status: String,
    pub user: String,
}

// ============================================================================
// Products & inventory
// ============================================================================

/// One product row, mirroring the backend sheet column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 1-indexed sheet row, echoed back on updates.
    pub row_number: u32,
    pub material_no: String,
    pub formula_code: String,
    pub product_name: String,
    pub product_form: String,
    pub unit_weight: String,
    pub purina_cost: f64,
    pub pallet_cost: f64,
    pub markup_pct: f64,
    /// Derived server-side from cost and markup.
    pub retail_pre_tax: f64,
    /// Tax-inclusive derivation of `retail_pre_tax`, also server-side.
    pub retail_with_tax: f64,
    pub qty_on_hand: i64,
    pub reorder_point: i64,
    pub last_updated: String,
    pub notes: String,
}

/// Append-only inventory change record, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub product_name: String,
    pub material_no: String,
    pub change_type: String,
    pub qty_changed: i64,
    pub previous_qty: i64,
    pub new_qty: i64,
    pub changed_by: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Adjustment,
    Restock,
    Sale,
}

impl ChangeType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "adjustment" => Some(ChangeType::Adjustment),
            "restock" => Some(ChangeType::Restock),
            "sale" => Some(ChangeType::Sale),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Adjustment => "adjustment",
            ChangeType::Restock => "restock",
            ChangeType::Sale => "sale",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryAdjustment {
    pub change_type: ChangeType,
    pub material_no: String,
    /// Free-form note recorded alongside the change.
    #[serde(default)]
    pub notes: String,
    /// Positive to add stock, negative to remove.
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkAdjustment {
    pub adjustments: Vec<InventoryAdjustment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkupUpdate {
    pub markup_pct: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderUpdate {
    pub reorder_point: i64,
}

// ============================================================================
// Price list
// ============================================================================

/// Raw contents of the price list archive tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Outcome of a price list CSV import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub message: String,
    pub new_products: Vec<String>,
    pub updated: u64,
}

// ============================================================================
// Invoices
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub extended: f64,
    pub material_no: String,
    pub product_name: String,
    pub qty: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub customer_name: String,
    pub invoice_date: String,
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub paid: bool,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceReceipt {
    #[serde(default)]
    pub drive_url: String,
    #[serde(default)]
    pub invoice_number: String,
    pub message: String,
}
