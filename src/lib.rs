//! Booking Receipt
//!
//! Resolves a hotel booking by its confirmation code, renders the
//! "payment successful" page with a receipt card, and exports that card as a
//! PNG image.
//!
//! # Features
//!
//! - **HTTP backend** (default, `http` feature): resolves bookings over the
//!   booking REST API with a blocking `reqwest` client
//! - **Tri-state view**: `Loading`, `Ready` or `Failed`, never a half-filled receipt
//! - **Region capture**: the `#receipt` subtree of the rendered page is laid
//!   out, rasterized at 2x on white and written as `booking-receipt-<code>.png`
//!
//! # Example
//!
//! ```no_run
//! use booking_receipt::{ReceiptConfig, export::ReceiptExporter, view::ReceiptView};
//! use booking_receipt::rendering::markup::PageOverlay;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReceiptConfig {
//!     api_base_url: "http://localhost:4040".to_string(),
//!     ..Default::default()
//! };
//!
//! // Lookups are blocking; export runs on a tokio runtime
//! let source = booking_receipt::new_booking_source(&config)?;
//! let mut view = ReceiptView::new(source, config.hotel.clone())
//!     .with_confirmation_code("RB-2024-001234");
//! view.load();
//!
//! let page = view.render(&PageOverlay::default());
//! let exporter = ReceiptExporter::new(&config);
//! let runtime = tokio::runtime::Runtime::new()?;
//! let outcome = runtime.block_on(exporter.export(&page, "RB-2024-001234"));
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod model;
pub use model::{BookingDetails, BookingRecord, DerivedReceipt, Receipt, RoomRecord, UserRecord};

// REST booking client
#[cfg(feature = "http")]
pub mod client;

pub mod contact;
pub mod export;
pub mod notify;
pub mod rendering;
pub mod storage;
pub mod view;

/// Default booking API location used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4040";

/// RGBA colour, one byte per channel
pub type Rgba = (u8, u8, u8, u8);

/// Opaque white, the capture background
pub const WHITE: Rgba = (255, 255, 255, 255);

/// Static hotel details printed on every receipt
#[derive(Debug, Clone, PartialEq)]
pub struct HotelInfo {
    pub name: String,
    pub address: String,
    /// Displayed under the check-in date
    pub check_in_time: String,
    /// Displayed under the check-out date
    pub check_out_time: String,
}

impl Default for HotelInfo {
    fn default() -> Self {
        Self {
            name: "Grand Plaza Hotel".to_string(),
            address: "123 Ocean Drive, Miami Beach, FL 33139".to_string(),
            check_in_time: "3:00 PM".to_string(),
            check_out_time: "11:00 AM".to_string(),
        }
    }
}

/// Configuration for fetching and exporting receipts
///
/// The defaults match the behaviour of the booking site: captures are taken
/// at 2x on an opaque white background and notifications disappear after
/// three seconds.
///
/// # Examples
///
/// ```
/// let cfg = booking_receipt::ReceiptConfig::default();
/// assert_eq!(cfg.export_scale, 2);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ReceiptConfig {
    /// Base URL of the booking API
    pub api_base_url: String,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Timeout for booking lookups in milliseconds
    pub timeout_ms: u64,
    /// Custom HTTP headers sent with every lookup
    pub headers: HashMap<String, String>,
    /// Width of the receipt card in logical pixels
    pub card_width: u32,
    /// Supersampling factor applied when rasterizing
    pub export_scale: u32,
    /// Background painted under the capture
    pub background: Rgba,
    /// How long a notification stays visible, in milliseconds
    pub notification_ms: u64,
    /// Directory exported receipts are written to
    pub output_dir: PathBuf,
    pub hotel: HotelInfo,
    /// Phone number for the floating WhatsApp link; no link when unset
    pub whatsapp_phone: Option<String>,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("booking-receipt/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 30000,
            headers: HashMap::new(),
            card_width: 480,
            export_scale: 2,
            background: WHITE,
            notification_ms: 3000,
            output_dir: PathBuf::from("."),
            hotel: HotelInfo::default(),
            whatsapp_phone: None,
        }
    }
}

impl ReceiptConfig {
    /// Check the values that would otherwise fail late, mid-export
    pub fn validate(&self) -> Result<()> {
        #[cfg(feature = "http")]
        let _ = url::Url::parse(&self.api_base_url)?;

        if !(1..=4).contains(&self.export_scale) {
            return Err(Error::ConfigError(format!(
                "export scale must be between 1 and 4, got {}",
                self.export_scale
            )));
        }
        if self.card_width < 160 {
            return Err(Error::ConfigError(format!(
                "card width must be at least 160px, got {}",
                self.card_width
            )));
        }
        Ok(())
    }

    /// Capture parameters derived from this configuration
    pub fn capture_options(&self) -> rendering::CaptureOptions {
        rendering::CaptureOptions {
            width: self.card_width,
            scale: self.export_scale,
            background: self.background,
        }
    }
}

/// Resolves confirmation codes into booking, room and user records
///
/// This is the seam between the view and the booking service. The HTTP
/// implementation lives in [`client`]; tests provide in-memory sources.
pub trait BookingSource {
    /// Look up the booking for `code`
    ///
    /// Implementations must return all three records or an error; a
    /// response missing the room or the user is an error, not a partial
    /// success.
    fn get_booking_by_confirmation_code(&self, code: &str) -> Result<BookingDetails>;
}

impl<T: BookingSource + ?Sized> BookingSource for Box<T> {
    fn get_booking_by_confirmation_code(&self, code: &str) -> Result<BookingDetails> {
        (**self).get_booking_by_confirmation_code(code)
    }
}

/// Create the default booking source (HTTP) for the given configuration
#[cfg(feature = "http")]
pub fn new_booking_source(config: &ReceiptConfig) -> Result<impl BookingSource> {
    client::HttpBookingClient::new(config)
}
