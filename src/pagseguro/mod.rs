//! PagSeguro integration via REST API (no SDK dependency)
//!
//! Creates gateway orders against `POST /orders` (API v4). The gateway
//! deduplicates by `reference_id`, which we set to our order id, so retrying
//! a payment request for the same order is safe.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const SANDBOX_BASE_URL: &str = "https://sandbox.api.pagseguro.com";
const PRODUCTION_BASE_URL: &str = "https://api.pagseguro.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PagSeguroError {
    #[error("PagSeguro request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("PagSeguro returned {status}: {body}")]
    Gateway { status: u16, body: String },
}

// ==================== Request payload ====================

#[derive(Debug, Serialize)]
pub struct CreateOrderRequest {
    pub reference_id: String,
    pub customer: Customer,
    pub items: Vec<Item>,
    pub qr_codes: Vec<QrCodeRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notification_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub tax_id: String,
}

#[derive(Debug, Serialize)]
pub struct Item {
    pub name: String,
    pub quantity: i64,
    /// Integer centavos
    pub unit_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct QrCodeRequest {
    pub amount: Amount,
}

#[derive(Debug, Serialize)]
pub struct Amount {
    /// Integer centavos
    pub value: i64,
}

// ==================== Response payload ====================

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub qr_codes: Vec<QrCode>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub struct QrCode {
    pub text: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// What the client needs to complete the payment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum PaymentArtifact {
    /// Hosted checkout page
    Redirect { payment_url: String },
    /// PIX copy-paste code plus rendered QR image
    Pix {
        qr_code_text: String,
        qr_code_image_url: Option<String>,
    },
}

/// Pick the payment artifact out of a gateway response: a PAY link wins,
/// otherwise the first QR code.
pub fn extract_artifact(response: &OrderResponse) -> Option<PaymentArtifact> {
    if let Some(link) = response.links.iter().find(|l| l.rel == "PAY") {
        return Some(PaymentArtifact::Redirect {
            payment_url: link.href.clone(),
        });
    }

    let qr = response.qr_codes.first()?;
    let text = qr.text.clone()?;
    let image = qr
        .links
        .iter()
        .find(|l| l.rel == "QRCODE.PNG")
        .map(|l| l.href.clone());
    Some(PaymentArtifact::Pix {
        qr_code_text: text,
        qr_code_image_url: image,
    })
}

// ==================== Client ====================

#[derive(Clone)]
pub struct PagSeguroClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    notification_url: Option<String>,
}

impl PagSeguroClient {
    pub fn new(
        token: String,
        sandbox: bool,
        notification_url: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = if sandbox {
            SANDBOX_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        };
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            token,
            notification_url,
        })
    }

    pub fn notification_urls(&self) -> Vec<String> {
        self.notification_url.iter().cloned().collect()
    }

    /// Create a gateway order and return the parsed response.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderResponse, PagSeguroError> {
        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .bearer_auth(&self.token)
            .header("x-api-version", "4.0")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PagSeguroError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
