use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};

use booking_receipt::contact::WhatsAppLink;
use booking_receipt::export::{ExportOutcome, ReceiptExporter};
use booking_receipt::rendering::markup::{PageOverlay, RECEIPT_SELECTOR};
use booking_receipt::rendering::capture_region;
use booking_receipt::storage::{resolve_confirmation_code, LocalStorage, CONFIRMATION_CODE_KEY};
use booking_receipt::view::{ReceiptView, ViewState};
use booking_receipt::{ReceiptConfig, DEFAULT_API_BASE_URL};

/// Fetch a hotel booking receipt and export it as a PNG image
#[derive(Parser, Debug)]
#[command(name = "booking-receipt", version)]
struct Cli {
    /// Confirmation code; falls back to the code left in local storage
    confirmation_code: Option<String>,

    /// Base URL of the booking API
    #[arg(long, env = "BOOKING_API_URL", default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Directory the PNG is written to
    #[arg(long, short = 'o', default_value = ".")]
    out_dir: PathBuf,

    /// Local storage file holding the handoff code
    #[arg(long, env = "BOOKING_RECEIPT_STORAGE")]
    storage: Option<PathBuf>,

    /// Supersampling factor for the exported image
    #[arg(long, default_value_t = 2)]
    scale: u32,

    /// Receipt card width in logical pixels
    #[arg(long, default_value_t = 480)]
    width: u32,

    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Also write the rendered page markup to this file
    #[arg(long)]
    html: Option<PathBuf>,

    /// Phone number for the WhatsApp contact link
    #[arg(long, env = "WHATSAPP_PHONE_NUMBER")]
    whatsapp: Option<String>,

    /// Fetch and render only
    #[arg(long)]
    no_export: bool,

    /// Print the receipt image as a data URL
    #[arg(long)]
    data_url: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("booking-receipt: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = ReceiptConfig {
        api_base_url: cli.api_url,
        timeout_ms: cli.timeout_ms,
        card_width: cli.width,
        export_scale: cli.scale,
        output_dir: cli.out_dir,
        whatsapp_phone: cli.whatsapp,
        ..Default::default()
    };
    config.validate()?;

    let mut storage = match cli.storage.or_else(LocalStorage::default_path) {
        Some(path) => match LocalStorage::open(&path) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("ignoring local storage: {}", e);
                None
            }
        },
        None => None,
    };

    let code = match resolve_confirmation_code(cli.confirmation_code.as_deref(), storage.as_ref()) {
        Some(code) => code,
        None => bail!("no confirmation code given and none stored under {}", CONFIRMATION_CODE_KEY),
    };
    if cli.confirmation_code.is_some() {
        if let Some(s) = storage.as_mut() {
            if let Err(e) = s.set_item(CONFIRMATION_CODE_KEY, &code) {
                warn!("could not cache confirmation code: {}", e);
            }
        }
    }

    let source = booking_receipt::new_booking_source(&config)?;
    let mut view =
        ReceiptView::new(source, config.hotel.clone()).with_confirmation_code(code.clone());
    view.load();

    let contact = WhatsAppLink::from_config(config.whatsapp_phone.as_deref());
    let page = view.render(&PageOverlay { contact: contact.as_ref(), ..Default::default() });
    if let Some(path) = &cli.html {
        std::fs::write(path, &page).with_context(|| format!("writing {}", path.display()))?;
    }

    let receipt = match view.state() {
        ViewState::Ready(receipt) => receipt,
        ViewState::Failed(reason) => bail!("could not load booking {}: {}", code, reason),
        ViewState::Loading => bail!("booking {} is still loading", code),
    };
    println!(
        "{}  {}  {} -> {}  {}  {}",
        code,
        receipt.details.room.room_type,
        receipt.derived.check_in_display,
        receipt.derived.check_out_display,
        receipt.guest_summary(),
        receipt.total_display()
    );

    if cli.data_url {
        match capture_region(&page, RECEIPT_SELECTOR, &config.capture_options())? {
            Some(shot) => println!("{}", shot.to_data_url()),
            None => warn!("nothing rendered to capture"),
        }
    }

    if cli.no_export {
        return Ok(ExitCode::SUCCESS);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting export runtime")?;
    let exporter = ReceiptExporter::new(&config);
    let outcome = runtime.block_on(exporter.export(&page, &code));
    if let Some(n) = exporter.notifications().current() {
        info!("{}", n.message);
    }

    match outcome {
        ExportOutcome::Saved(path) => {
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        ExportOutcome::Skipped | ExportOutcome::Ignored => {
            warn!("receipt was not exported");
            Ok(ExitCode::FAILURE)
        }
        ExportOutcome::Failed(reason) => bail!("export failed: {}", reason),
    }
}
