use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brigade_core::{TicketRenderer, TicketSnapshot};
use tracing::{error, info};

use crate::error::StoreError;

/// Renderer backed by the external PDF ticket service. The snapshot is
/// posted as JSON; the response body is the finished PDF.
pub struct HttpTicketRenderer {
    client: reqwest::Client,
    service_url: String,
}

impl HttpTicketRenderer {
    pub fn new(
        service_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            service_url: service_url.into(),
        })
    }
}

#[async_trait]
impl TicketRenderer for HttpTicketRenderer {
    async fn render(
        &self,
        ticket: &TicketSnapshot,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .client
            .post(&self.service_url)
            .json(ticket)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("ticket service returned {}", response.status()).into());
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Renders tickets and stores the PDFs on local disk, one file per ticket
/// number.
pub struct TicketService {
    renderer: Arc<dyn TicketRenderer>,
    output_dir: PathBuf,
}

impl TicketService {
    pub fn new(renderer: Arc<dyn TicketRenderer>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            output_dir: output_dir.into(),
        }
    }

    /// Render the snapshot and persist the PDF. Returns the stored path.
    /// No file is written when rendering fails.
    pub async fn generate(&self, snapshot: &TicketSnapshot) -> Result<String, StoreError> {
        let bytes = self.renderer.render(snapshot).await.map_err(|e| {
            error!("Ticket rendering failed for {}: {e}", snapshot.ticket_number);
            StoreError::Ticket(e.to_string())
        })?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(format!("ticket-{}.pdf", snapshot.ticket_number));
        tokio::fs::write(&path, &bytes).await?;

        info!(
            "Stored ticket {} ({} bytes)",
            snapshot.ticket_number,
            bytes.len()
        );
        Ok(path.to_string_lossy().into_owned())
    }

    /// Read a previously stored ticket PDF back for download.
    pub async fn read_ticket(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound("Ticket file")
            } else {
                StoreError::from(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_core::StaticTicketRenderer;
    use brigade_core::{TicketLine, TicketPayment};
    use chrono::Utc;
    use uuid::Uuid;

    struct FailingRenderer;

    #[async_trait]
    impl TicketRenderer for FailingRenderer {
        async fn render(
            &self,
            _ticket: &TicketSnapshot,
        ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }
    }

    fn snapshot() -> TicketSnapshot {
        TicketSnapshot {
            ticket_number: "TCKT-632800-240305".to_string(),
            order_id: Uuid::new_v4(),
            order_number: "CMD-050324-32800".to_string(),
            created_at: Utc::now(),
            order_status: "served".to_string(),
            order_type: "on-site".to_string(),
            table_number: Some("4".to_string()),
            total: 3500,
            payment: TicketPayment {
                method: "cash".to_string(),
                status: "paid".to_string(),
            },
            lines: vec![TicketLine {
                quantity: 2,
                dish_name: Some("Margherita".to_string()),
                notes: None,
                unit_price: 1000,
                line_total: 2000,
            }],
        }
    }

    fn temp_output_dir() -> PathBuf {
        std::env::temp_dir().join(format!("brigade-tickets-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn generates_and_stores_a_ticket_pdf() {
        let dir = temp_output_dir();
        let service = TicketService::new(Arc::new(StaticTicketRenderer), &dir);

        let path = service.generate(&snapshot()).await.unwrap();
        assert!(path.ends_with("ticket-TCKT-632800-240305.pdf"));

        let bytes = service.read_ticket(&path).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn renderer_failure_leaves_no_file_behind() {
        let dir = temp_output_dir();
        let service = TicketService::new(Arc::new(FailingRenderer), &dir);

        let err = service.generate(&snapshot()).await.unwrap_err();
        assert!(matches!(err, StoreError::Ticket(_)));

        let expected = dir.join("ticket-TCKT-632800-240305.pdf");
        assert!(!expected.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_ticket_file_maps_to_not_found() {
        let dir = temp_output_dir();
        let service = TicketService::new(Arc::new(StaticTicketRenderer), &dir);

        let err = service
            .read_ticket("/nonexistent/ticket-TCKT-000000-000000.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Ticket file")));
    }
}
