use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON snapshot of a paid order sent to the PDF ticket service.
///
/// The field names on the wire are fixed by the ticket service contract
/// (French keys, `nomPlat`-style casing included) and must not change;
/// the Rust-side names stay idiomatic via serde renames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub ticket_number: String,
    #[serde(rename = "commande_id")]
    pub order_id: Uuid,
    #[serde(rename = "commande_numero")]
    pub order_number: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "statut_commande")]
    pub order_status: String,
    #[serde(rename = "type_commande")]
    pub order_type: String,
    #[serde(rename = "numero_table")]
    pub table_number: Option<String>,
    pub total: i64,
    #[serde(rename = "paiement")]
    pub payment: TicketPayment,
    #[serde(rename = "lignes")]
    pub lines: Vec<TicketLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPayment {
    #[serde(rename = "methode")]
    pub method: String,
    #[serde(rename = "statut")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketLine {
    #[serde(rename = "quantite")]
    pub quantity: i32,
    #[serde(rename = "nomPlat")]
    pub dish_name: Option<String>,
    #[serde(rename = "commentaire")]
    pub notes: Option<String>,
    #[serde(rename = "prixUnitaire")]
    pub unit_price: i64,
    #[serde(rename = "totalLigne")]
    pub line_total: i64,
}

#[async_trait]
pub trait TicketRenderer: Send + Sync {
    /// Render a snapshot into PDF bytes.
    async fn render(
        &self,
        ticket: &TicketSnapshot,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Renderer that produces a fixed placeholder body; used in tests and as a
/// stand-in when no ticket service is reachable from a dev environment.
pub struct StaticTicketRenderer;

#[async_trait]
impl TicketRenderer for StaticTicketRenderer {
    async fn render(
        &self,
        ticket: &TicketSnapshot,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Rendering placeholder ticket {}", ticket.ticket_number);
        Ok(format!("%PDF-placeholder {}\n", ticket.ticket_number).into_bytes())
    }
}
