// src/services/document_service.rs

use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::to_money},
    db::{InvoiceRepository, QuoteRepository, SettingsRepository},
    models::{
        quote::{Quote, QuoteItem},
        settings::CompanyProfile,
    },
};

/// Where genpdf looks for `{family}-Regular.ttf`, `{family}-Bold.ttf`...
#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub fonts_dir: String,
    pub font_family: String,
}

// ============================================================================
//  Text helpers
// ============================================================================

pub fn format_amount(value: Decimal) -> String {
    format!("INR {}", to_money(value))
}

/// Label/amount rows printed under the item table. Zero charges are left out.
pub fn charge_lines(quote: &Quote) -> Vec<(&'static str, Decimal)> {
    let mut lines = vec![("Subtotal", quote.subtotal)];

    let optional = [
        ("Discount", -quote.discount),
        ("CGST", quote.cgst),
        ("SGST", quote.sgst),
        ("IGST", quote.igst),
        ("Shipping", quote.shipping_charges),
    ];
    lines.extend(optional.into_iter().filter(|(_, amount)| !amount.is_zero()));

    lines.push(("Total", quote.total));
    lines
}

/// UPI deep link understood by Indian payment apps.
pub fn upi_payment_uri(upi_id: &str, payee: &str, amount: Decimal, note: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR&tn={}",
        urlencoding::encode(upi_id.trim()),
        urlencoding::encode(payee),
        to_money(amount),
        urlencoding::encode(note)
    )
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("PDF rendering failed: {e}"))
}

// ============================================================================
//  Rendering
// ============================================================================

struct PrintableDocument {
    title: String,
    date_line: String,
    client_name: String,
    items: Vec<QuoteItem>,
    charges: Vec<(&'static str, Decimal)>,
    // Printed after the totals (payment state, notes, terms)
    footer_lines: Vec<String>,
    qr_payload: Option<String>,
}

#[derive(Clone)]
pub struct DocumentService {
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    settings_repo: SettingsRepository,
    pdf: PdfConfig,
}

impl DocumentService {
    pub fn new(
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        settings_repo: SettingsRepository,
        pdf: PdfConfig,
    ) -> Self {
        Self { quote_repo, invoice_repo, settings_repo, pdf }
    }

    pub async fn generate_quote_pdf<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let entry = self
            .quote_repo
            .find_list_entry(&mut *tx, quote_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;
        let items = self.quote_repo.list_items(&mut *tx, quote_id).await?;
        let settings = self.settings_repo.list_settings(&mut *tx).await?;

        tx.commit().await?;

        let quote = entry.quote;
        let mut footer_lines = Vec::new();
        if let Some(valid_until) = quote.valid_until {
            footer_lines.push(format!("Valid until: {}", valid_until.format("%d/%m/%Y")));
        }
        footer_lines.extend(quote.notes.iter().map(|n| format!("Notes: {n}")));
        footer_lines.extend(quote.terms.iter().map(|t| format!("Terms: {t}")));

        let document = PrintableDocument {
            title: format!("QUOTATION {}", quote.quote_number),
            date_line: format!("Date: {}", quote.quote_date.format("%d/%m/%Y")),
            client_name: entry.client_name,
            charges: charge_lines(&quote),
            items,
            footer_lines,
            qr_payload: None,
        };

        self.render(&CompanyProfile::from_settings(&settings), document)
    }

    pub async fn generate_invoice_pdf<'e, E>(&self, executor: E, invoice_id: Uuid) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let entry = self
            .invoice_repo
            .find_list_entry(&mut *tx, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice".into()))?;
        let quote = self
            .quote_repo
            .find_by_id(&mut *tx, entry.invoice.quote_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote".into()))?;
        let items = self.quote_repo.list_items(&mut *tx, quote.id).await?;
        let settings = self.settings_repo.list_settings(&mut *tx).await?;

        tx.commit().await?;

        let company = CompanyProfile::from_settings(&settings);
        let invoice = entry.invoice;
        let balance = invoice.balance_due();

        let footer_lines = vec![
            format!("Quote: {}", entry.quote_number),
            format!("Due date: {}", invoice.due_date.format("%d/%m/%Y")),
            format!("Paid: {}", format_amount(invoice.paid_amount)),
            format!("Balance due: {}", format_amount(balance)),
        ];

        // QR only makes sense while something is left to pay
        let qr_payload = company
            .upi_id
            .as_deref()
            .filter(|_| balance > Decimal::ZERO)
            .map(|upi_id| {
                let payee = company.name.as_deref().unwrap_or("Merchant");
                upi_payment_uri(upi_id, payee, balance, &invoice.invoice_number)
            });

        let document = PrintableDocument {
            title: format!("INVOICE {}", invoice.invoice_number),
            date_line: format!("Date: {}", invoice.invoice_date.format("%d/%m/%Y")),
            client_name: entry.client_name,
            charges: charge_lines(&quote),
            items,
            footer_lines,
            qr_payload,
        };

        self.render(&company, document)
    }

    fn render(&self, company: &CompanyProfile, document: PrintableDocument) -> Result<Vec<u8>, AppError> {
        let font_family = genpdf::fonts::from_files(&self.pdf.fonts_dir, &self.pdf.font_family, None)
            .map_err(|_| {
                AppError::FontNotFound(format!("{} in {}", self.pdf.font_family, self.pdf.fonts_dir))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(document.title.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- Company header ---
        let company_name = company.name.clone().unwrap_or_else(|| "Quotes & Invoices".to_string());
        doc.push(elements::Paragraph::new(company_name).styled(style::Style::new().bold().with_font_size(18)));
        if let Some(address) = &company.address {
            doc.push(elements::Paragraph::new(address.as_str()).styled(style::Style::new().with_font_size(9)));
        }
        if let Some(gstin) = &company.gstin {
            doc.push(elements::Paragraph::new(format!("GSTIN: {gstin}")).styled(style::Style::new().with_font_size(9)));
        }

        doc.push(elements::Break::new(1.5));

        doc.push(elements::Paragraph::new(document.title).styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Paragraph::new(document.date_line));
        doc.push(elements::Paragraph::new(format!("Bill to: {}", document.client_name)));

        doc.push(elements::Break::new(2));

        // --- Items ---
        let mut table = elements::TableLayout::new(vec![5, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Description").styled(bold))
            .element(elements::Paragraph::new("Qty").styled(bold))
            .element(elements::Paragraph::new("Unit price").styled(bold))
            .element(elements::Paragraph::new("Amount").styled(bold))
            .push()
            .map_err(pdf_error)?;

        for item in document.items {
            table
                .row()
                .element(elements::Paragraph::new(item.description))
                .element(elements::Paragraph::new(item.quantity.to_string()))
                .element(elements::Paragraph::new(format_amount(item.unit_price)))
                .element(elements::Paragraph::new(format_amount(item.subtotal)))
                .push()
                .map_err(pdf_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(1));

        // --- Totals ---
        for (label, amount) in document.charges {
            let mut line = elements::Paragraph::new(format!("{label}: {}", format_amount(amount)));
            line.set_alignment(Alignment::Right);
            if label == "Total" {
                doc.push(line.styled(style::Style::new().bold().with_font_size(12)));
            } else {
                doc.push(line);
            }
        }

        doc.push(elements::Break::new(1.5));
        for text in document.footer_lines {
            doc.push(elements::Paragraph::new(text).styled(style::Style::new().with_font_size(10)));
        }

        // --- UPI payment ---
        if let Some(payload) = document.qr_payload {
            doc.push(elements::Break::new(1.5));
            doc.push(elements::Paragraph::new("PAY WITH UPI").styled(style::Style::new().bold().with_font_size(12)));

            let code = QrCode::new(payload.as_bytes()).map_err(pdf_error)?;
            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let qr = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(pdf_error)?
                .with_scale(genpdf::Scale::new(0.5, 0.5));
            doc.push(qr);
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        Ok(buffer)
    }
}
