//! The receipt view model.
//!
//! A view is `Loading` until a lookup for its confirmation code settles, then
//! `Ready` with a complete [`Receipt`] or `Failed` with a reason the page can
//! show next to a retry button. Each code value is looked up once; `retry`
//! forces another lookup.

use log::{debug, warn};

use crate::model::Receipt;
use crate::rendering::markup::{self, PageOverlay};
use crate::{BookingSource, HotelInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready(Receipt),
    Failed(String),
}

impl ViewState {
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            ViewState::Ready(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

pub struct ReceiptView<S: BookingSource> {
    source: S,
    hotel: HotelInfo,
    confirmation_code: Option<String>,
    /// Code the last lookup was issued for
    fetched_for: Option<String>,
    state: ViewState,
}

impl<S: BookingSource> ReceiptView<S> {
    pub fn new(source: S, hotel: HotelInfo) -> Self {
        Self {
            source,
            hotel,
            confirmation_code: None,
            fetched_for: None,
            state: ViewState::Loading,
        }
    }

    pub fn with_confirmation_code(mut self, code: impl Into<String>) -> Self {
        self.set_confirmation_code(Some(code.into()));
        self
    }

    /// Switch to another code. A different value resets the view to `Loading`.
    pub fn set_confirmation_code(&mut self, code: Option<String>) {
        if code == self.confirmation_code {
            return;
        }
        debug!("confirmation code changed to {:?}", code);
        self.confirmation_code = code;
        self.fetched_for = None;
        self.state = ViewState::Loading;
    }

    pub fn confirmation_code(&self) -> Option<&str> {
        self.confirmation_code.as_deref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve the current code unless it was already looked up.
    ///
    /// Without a usable code the view stays `Loading` and nothing is fetched.
    pub fn load(&mut self) -> &ViewState {
        let code = match self.confirmation_code.as_deref() {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => {
                debug!("no confirmation code; staying in loading state");
                return &self.state;
            }
        };
        if self.fetched_for.as_deref() == Some(code.as_str()) {
            return &self.state;
        }

        self.fetched_for = Some(code.clone());
        self.state = match self
            .source
            .get_booking_by_confirmation_code(&code)
            .and_then(Receipt::from_details)
        {
            Ok(receipt) => {
                debug!("booking {} resolved ({} nights)", code, receipt.derived.stay_nights);
                ViewState::Ready(receipt)
            }
            Err(e) => {
                warn!("failed to fetch booking {}: {}", code, e);
                ViewState::Failed(e.to_string())
            }
        };
        &self.state
    }

    /// Look the current code up again regardless of earlier results
    pub fn retry(&mut self) -> &ViewState {
        self.fetched_for = None;
        self.state = ViewState::Loading;
        self.load()
    }

    /// Render the whole page for the current state
    pub fn render(&self, overlay: &PageOverlay<'_>) -> String {
        markup::page(&self.state, self.confirmation_code.as_deref(), &self.hotel, overlay)
    }
}
