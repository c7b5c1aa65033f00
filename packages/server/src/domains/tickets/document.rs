//! Printable ticket rendering.
//!
//! Tickets are a fixed 5.5in x 2in PDF: event and attendee details on the
//! left, the QR code on the right, a one-line footer. Layout constants are in
//! points (1/72 in) and converted at the draw call.

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt, Rect, Rgb,
};

use super::issuer::TicketData;
use super::qr::QrMatrix;

pub const PAGE_WIDTH: f32 = 396.0;
pub const PAGE_HEIGHT: f32 = 144.0;

const MARGIN: f32 = 10.0;
const TEXT_LEFT: f32 = 20.0;
const SECOND_COLUMN: f32 = 190.0;
const QR_SIZE: f32 = 70.0;
const LINE_HEIGHT: f32 = 10.0;
const DETAIL_FONT_SIZE: f32 = 8.0;
// Helvetica averages about half an em per glyph.
const MAX_DETAIL_CHARS: usize = 40;
const MAX_TITLE_CHARS: usize = 44;

const PLACEHOLDER_TEXT: &str = "Error generating ticket. Please contact support.";

fn pt(value: f32) -> Mm {
    Mm::from(Pt(value))
}

fn grey(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32, color: Color) {
    layer.set_fill_color(color);
    layer.add_rect(Rect::new(pt(x), pt(y), pt(x + width), pt(y + height)));
}

/// "November 05, 2026"
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// "06:30 PM"
pub fn format_event_time(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Detail lines in print order: `(left column, right column)`.
pub fn detail_lines(ticket: &TicketData) -> (Vec<String>, Vec<String>) {
    let left = vec![
        format!("Date: {}", format_event_date(ticket.event_date)),
        format!("Time: {}", format_event_time(ticket.event_time)),
        format!("Venue: {}", ticket.venue),
        format!("Attendee: {}", ticket.attendee_name),
        format!("Email: {}", ticket.attendee_email),
    ];

    let mut right = vec![format!("Seats: {}", ticket.number_of_seats)];
    if let Some(dietary) = non_blank(&ticket.dietary_requirements) {
        right.push(format!("Dietary: {}", dietary));
    }
    if let Some(size) = non_blank(&ticket.t_shirt_size) {
        right.push(format!("T-Shirt: {}", size));
    }

    (left, right)
}

fn draw_qr(layer: &PdfLayerReference, qr: &QrMatrix, left: f32, bottom: f32) {
    fill_rect(layer, left, bottom, QR_SIZE, QR_SIZE, grey(1.0));

    let modules = qr.width() + 2 * super::qr::QUIET_ZONE as usize;
    let module = QR_SIZE / modules as f32;
    let origin_x = left + module * super::qr::QUIET_ZONE as f32;
    let top = bottom + QR_SIZE - module * super::qr::QUIET_ZONE as f32;

    layer.set_fill_color(grey(0.0));
    for y in 0..qr.width() {
        for x in 0..qr.width() {
            if qr.is_dark(x, y) {
                let x0 = origin_x + x as f32 * module;
                let y0 = top - (y + 1) as f32 * module;
                layer.add_rect(Rect::new(pt(x0), pt(y0), pt(x0 + module), pt(y0 + module)));
            }
        }
    }
}

fn draw_lines(layer: &PdfLayerReference, font: &IndirectFontRef, lines: &[String], x: f32, top: f32) {
    for (index, line) in lines.iter().enumerate() {
        let y = top - index as f32 * LINE_HEIGHT;
        layer.use_text(truncate(line, MAX_DETAIL_CHARS), DETAIL_FONT_SIZE, pt(x), pt(y), font);
    }
}

/// Render the full ticket. Fails only if the PDF backend fails.
pub fn render_ticket_pdf(ticket: &TicketData, qr: &QrMatrix) -> Result<Vec<u8>> {
    let title = format!("Ticket {}", ticket.registration_id);
    let (doc, page, layer) = PdfDocument::new(&title, pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "ticket");
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    fill_rect(&layer, 0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, grey(0.95));
    fill_rect(
        &layer,
        MARGIN,
        MARGIN,
        PAGE_WIDTH - 2.0 * MARGIN,
        PAGE_HEIGHT - 2.0 * MARGIN,
        grey(1.0),
    );

    draw_qr(
        &layer,
        qr,
        PAGE_WIDTH - MARGIN - 10.0 - QR_SIZE,
        PAGE_HEIGHT - 120.0,
    );

    layer.set_fill_color(grey(0.0));
    layer.use_text(
        truncate(&ticket.event_title, MAX_TITLE_CHARS),
        12.0,
        pt(TEXT_LEFT),
        pt(PAGE_HEIGHT - 40.0),
        &bold,
    );
    layer.use_text(
        format!("Ticket ID: {}", ticket.registration_id),
        DETAIL_FONT_SIZE,
        pt(TEXT_LEFT),
        pt(PAGE_HEIGHT - 55.0),
        &regular,
    );

    let (left, right) = detail_lines(ticket);
    draw_lines(&layer, &regular, &left, TEXT_LEFT, PAGE_HEIGHT - 70.0);
    draw_lines(&layer, &regular, &right, SECOND_COLUMN, PAGE_HEIGHT - 70.0);

    layer.use_text("Valid for one-time entry only", 6.0, pt(TEXT_LEFT), pt(16.0), &regular);
    layer.use_text(
        format!(
            "Generated: {}",
            format_event_date(ticket.registration_date.date_naive())
        ),
        6.0,
        pt(PAGE_WIDTH - 120.0),
        pt(16.0),
        &regular,
    );

    Ok(doc.save_to_bytes()?)
}

/// Minimal PDF asking the holder to contact support. Used when the real
/// ticket could not be rendered.
pub fn placeholder_pdf() -> Vec<u8> {
    render_placeholder().unwrap_or_else(|_| MINIMAL_PLACEHOLDER.to_vec())
}

fn render_placeholder() -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new("Ticket unavailable", pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "ticket");
    let layer = doc.get_page(page).get_layer(layer);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    layer.use_text(PLACEHOLDER_TEXT, 10.0, pt(TEXT_LEFT), pt(72.0), &font);
    Ok(doc.save_to_bytes()?)
}

// Last resort if the PDF backend itself is broken.
const MINIMAL_PLACEHOLDER: &[u8] = b"%PDF-1.4
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 396 144] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj
4 0 obj << /Length 84 >> stream
BT /F1 10 Tf 20 72 Td (Error generating ticket. Please contact support.) Tj ET
endstream endobj
5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj
trailer << /Root 1 0 R >>
%%EOF
";
