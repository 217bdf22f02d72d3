/// HTML markup for the payment-success page.
///
/// The receipt card is the `#receipt` subtree; it is only emitted for a
/// ready view, which is what makes region capture a no-op otherwise.

use crate::contact::WhatsAppLink;
use crate::model::Receipt;
use crate::notify::{Notification, NotificationKind};
use crate::view::ViewState;
use crate::HotelInfo;

/// Selector of the region captured by the exporter
pub const RECEIPT_SELECTOR: &str = "#receipt";

/// Transient page chrome layered on top of the view state
#[derive(Debug, Default)]
pub struct PageOverlay<'a> {
    /// An export is running; the download button is disabled
    pub exporting: bool,
    pub notification: Option<&'a Notification>,
    pub contact: Option<&'a WhatsAppLink>,
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The receipt card for a resolved booking
pub fn receipt_card(receipt: &Receipt, confirmation_code: &str, hotel: &HotelInfo) -> String {
    let d = &receipt.details;
    let derived = &receipt.derived;
    let contact_line = [d.user.email.as_str(), d.user.phone_number.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" • ");

    format!(
        r#"<div id="receipt">
<div class="banner"><h2>Booking Confirmation</h2><p>Confirmation #: {code}</p></div>
<h3>{hotel_name}</h3><p class="muted">{hotel_address}</p>
<hr>
<h3>Check-in</h3><p>{check_in}</p><p class="muted">{check_in_time}</p>
<h3>Check-out</h3><p>{check_out}</p><p class="muted">{check_out_time}</p>
<hr>
<h3>Guest</h3><p>{guest}</p><p class="muted">{contact}</p>
<hr>
<h3>{room_type}</h3><p>{summary}</p>
<hr>
<h3>Payment Method</h3>
<p class="amount">{total}</p><p class="muted">Total Amount</p>
</div>"#,
        code = escape(confirmation_code),
        hotel_name = escape(&hotel.name),
        hotel_address = escape(&hotel.address),
        check_in = escape(&derived.check_in_display),
        check_in_time = escape(&hotel.check_in_time),
        check_out = escape(&derived.check_out_display),
        check_out_time = escape(&hotel.check_out_time),
        guest = escape(&d.user.name),
        contact = escape(&contact_line),
        room_type = escape(&d.room.room_type),
        summary = escape(&receipt.guest_summary()),
        total = escape(&receipt.total_display()),
    )
}

fn notification_block(n: &Notification) -> String {
    let class = match n.kind {
        NotificationKind::Success => "success",
        NotificationKind::Error => "error",
    };
    format!(
        r#"<div class="notification {}" role="status"><p>{}</p></div>"#,
        class,
        escape(&n.message)
    )
}

fn download_button(exporting: bool) -> &'static str {
    if exporting {
        r#"<button id="download-receipt" disabled>Downloading...</button>"#
    } else {
        r#"<button id="download-receipt">Download Receipt</button>"#
    }
}

const NEXT_STEPS: &str = r#"<div class="next-steps">
<h3>What's Next?</h3>
<ul>
<li>A confirmation email has been sent to your registered email address</li>
<li>Present your confirmation number at check-in</li>
<li>Contact the hotel directly for any special requests</li>
</ul>
</div>
<nav><a href="/">Return to Home</a> • <a href="/bookings">View My Bookings</a></nav>"#;

/// The complete page for the given view state
pub fn page(
    state: &ViewState,
    confirmation_code: Option<&str>,
    hotel: &HotelInfo,
    overlay: &PageOverlay<'_>,
) -> String {
    let mut body = String::new();

    if let Some(n) = overlay.notification {
        body.push_str(&notification_block(n));
        body.push('\n');
    }

    body.push_str(
        "<header><h1>Payment Successful!</h1>\
         <p>Your room booking has been confirmed</p></header>\n",
    );

    match state {
        ViewState::Loading => {
            body.push_str(
                "<div id=\"loading\" aria-busy=\"true\">\
                 <p>Loading your booking details...</p></div>",
            );
        }
        ViewState::Failed(reason) => {
            body.push_str(&format!(
                "<div id=\"load-error\" role=\"alert\"><h3>We couldn't load your booking</h3>\
                 <p>{}</p><button id=\"retry\">Try Again</button></div>",
                escape(reason)
            ));
        }
        ViewState::Ready(receipt) => {
            let code = confirmation_code.unwrap_or(&receipt.details.booking.confirmation_code);
            body.push_str(&receipt_card(receipt, code, hotel));
            body.push('\n');
            body.push_str(download_button(overlay.exporting));
            body.push('\n');
            body.push_str(NEXT_STEPS);
        }
    }

    if let Some(link) = overlay.contact {
        body.push('\n');
        body.push_str(&link.html());
    }

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>Payment Successful</title></head><body>\n{}\n</body></html>\n",
        body
    )
}
